//! Folding linked record groups into single entries
//!
//! Grisbi stores a split as a parent plus one record per child, and a
//! transfer as two records pointing at each other. Ledger wants one
//! transaction for each. Collapsing removes the redundant records from the
//! book's entry set; the records themselves stay in the book so rendering
//! can still reach them through the surviving entry.

use std::collections::BTreeSet;

use crate::book::Book;
use crate::types::TransactionId;

/// Records removed from the entry set by [`collapse`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CollapseSummary {
    /// Split children and their transfer legs
    pub split_folded: usize,
    /// Second legs of transfers
    pub transfer_folded: usize,
}

/// Reduce the entry set to one entry per economic event.
///
/// Expects a graph that passed validation. Running it again on a collapsed
/// book changes nothing.
pub fn collapse(book: &mut Book) -> CollapseSummary {
    let before = book.entries.len();

    // Split children and the far side of any transfer they take part in
    let absorbed: BTreeSet<TransactionId> = book
        .entries()
        .filter(|t| t.is_split)
        .flat_map(|parent| parent.children.values())
        .flat_map(|child| {
            std::iter::once(*child).chain(book.transaction(*child).contra)
        })
        .collect();
    book.entries.retain(|id| !absorbed.contains(id));
    let after_splits = book.entries.len();

    // Keep the lowest-numbered surviving leg of each transfer
    let mut removed = BTreeSet::new();
    for txn in book.entries() {
        if removed.contains(&txn.id) {
            continue;
        }
        if let Some(contra) = txn.contra {
            removed.insert(contra);
        }
    }
    book.entries.retain(|id| !removed.contains(id));

    let summary = CollapseSummary {
        split_folded: before - after_splits,
        transfer_folded: after_splits - book.entries.len(),
    };
    log::info!(
        "Collapsed {} split records and {} transfer legs, {} entries remain",
        summary.split_folded,
        summary.transfer_folded,
        book.entries.len()
    );
    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::*;

    fn entry_ids(book: &Book) -> Vec<u32> {
        book.entries().map(|t| t.id.0).collect()
    }

    fn assert_postcondition(book: &Book) {
        for txn in book.entries() {
            if let Some(contra) = txn.contra {
                assert!(!book.is_entry(contra), "{} and {} both survive", txn.id, contra);
            }
            if let Some(mother) = txn.mother {
                assert!(!book.is_entry(mother), "{} survives with its mother", txn.id);
            }
        }
    }

    fn transfer_book() -> Book {
        let mut records = base_records();
        records.extend([
            Txn::new(5, 1, "2/1/2021", "-100.00").party(3).contra(9).build(),
            Txn::new(8, 1, "2/2/2021", "-4.00").party(1).category(1).build(),
            Txn::new(9, 2, "2/1/2021", "100.00").party(3).contra(5).build(),
        ]);
        book_from(document(&records))
    }

    #[test]
    fn test_transfer_keeps_lower_leg() {
        let mut book = transfer_book();
        let summary = collapse(&mut book);
        assert_eq!(entry_ids(&book), vec![5, 8]);
        assert_eq!(summary, CollapseSummary { split_folded: 0, transfer_folded: 1 });
        assert_postcondition(&book);
        // The folded leg stays reachable
        assert_eq!(book.transaction(TransactionId(9)).contra, Some(TransactionId(5)));
    }

    #[test]
    fn test_split_absorbs_children_and_their_contras() {
        let mut book = book_from(split_with_transfer_fixture());
        let summary = collapse(&mut book);
        assert_eq!(entry_ids(&book), vec![3]);
        assert_eq!(summary, CollapseSummary { split_folded: 3, transfer_folded: 0 });
        assert_postcondition(&book);

        let parent = book.transaction(TransactionId(3));
        let children: Vec<u32> = parent.children.values().map(|id| id.0).collect();
        assert_eq!(children, vec![4, 6]);
    }

    #[test]
    fn test_transfer_into_split_from_lower_number() {
        // Plain transaction 2 is the contra of split child 11
        let mut records = base_records();
        records.extend([
            Txn::new(2, 2, "3/1/2021", "25.00").party(1).contra(11).build(),
            Txn::new(10, 1, "3/1/2021", "-40.00").party(1).split().build(),
            Txn::new(11, 1, "(null)", "-25.00").party(1).mother(10).contra(2).build(),
            Txn::new(12, 1, "(null)", "-15.00").party(1).category(1).mother(10).build(),
        ]);
        let mut book = book_from(document(&records));
        collapse(&mut book);
        assert_eq!(entry_ids(&book), vec![10]);
        assert_postcondition(&book);
    }

    #[test]
    fn test_collapse_is_idempotent() {
        let mut book = book_from(split_with_transfer_fixture());
        collapse(&mut book);
        let first = entry_ids(&book);
        let summary = collapse(&mut book);
        assert_eq!(entry_ids(&book), first);
        assert_eq!(summary, CollapseSummary::default());

        let mut book = transfer_book();
        collapse(&mut book);
        let first = entry_ids(&book);
        collapse(&mut book);
        assert_eq!(entry_ids(&book), first);
    }
}
