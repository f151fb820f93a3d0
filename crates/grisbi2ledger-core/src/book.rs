//! The resolved record graph
//!
//! All entities live in maps keyed by their identity number. Transactions
//! are kept in two places: `transactions` holds every loaded record for the
//! whole run, while `entries` is the set of transactions that stand for an
//! economic event of their own. Collapsing only shrinks `entries`, so split
//! children and absorbed transfer legs stay reachable for rendering.

use chrono::NaiveDate;
use std::collections::{BTreeMap, BTreeSet};

use crate::models::{Account, Category, Currency, Party, Reconcile, SubCategory, Transaction};
use crate::types::{
    AccountId, CategoryId, CurrencyId, PartyId, ReconcileId, SubCategoryId, TransactionId,
};

/// In-memory record graph
#[derive(Debug, Default)]
pub struct Book {
    pub(crate) accounts: BTreeMap<AccountId, Account>,
    pub(crate) categories: BTreeMap<CategoryId, Category>,
    pub(crate) sub_categories: BTreeMap<SubCategoryId, SubCategory>,
    pub(crate) currencies: BTreeMap<CurrencyId, Currency>,
    pub(crate) parties: BTreeMap<PartyId, Party>,
    pub(crate) reconciles: BTreeMap<ReconcileId, Reconcile>,
    pub(crate) transactions: BTreeMap<TransactionId, Transaction>,
    pub(crate) entries: BTreeSet<TransactionId>,
}

// Handles are only created by the loader for records it has stored, so the
// lookups below cannot miss.
impl Book {
    pub fn account(&self, id: AccountId) -> &Account {
        &self.accounts[&id]
    }

    pub fn category(&self, id: CategoryId) -> &Category {
        &self.categories[&id]
    }

    pub fn sub_category(&self, id: SubCategoryId) -> &SubCategory {
        &self.sub_categories[&id]
    }

    pub fn currency(&self, id: CurrencyId) -> &Currency {
        &self.currencies[&id]
    }

    pub fn party(&self, id: PartyId) -> &Party {
        &self.parties[&id]
    }

    pub fn reconcile(&self, id: ReconcileId) -> &Reconcile {
        &self.reconciles[&id]
    }

    pub fn transaction(&self, id: TransactionId) -> &Transaction {
        &self.transactions[&id]
    }

    /// Accounts in ascending identity order
    pub fn accounts(&self) -> impl Iterator<Item = &Account> {
        self.accounts.values()
    }

    pub fn categories(&self) -> impl Iterator<Item = &Category> {
        self.categories.values()
    }

    pub fn currencies(&self) -> impl Iterator<Item = &Currency> {
        self.currencies.values()
    }

    pub fn reconciles(&self) -> impl Iterator<Item = &Reconcile> {
        self.reconciles.values()
    }

    /// Every loaded transaction, including folded ones
    pub fn transactions(&self) -> impl Iterator<Item = &Transaction> {
        self.transactions.values()
    }

    /// Transactions that still stand on their own, ascending
    pub fn entries(&self) -> impl Iterator<Item = &Transaction> {
        self.entries.iter().map(|id| self.transaction(*id))
    }

    pub fn is_entry(&self, id: TransactionId) -> bool {
        self.entries.contains(&id)
    }

    pub fn entry_count(&self) -> usize {
        self.entries.len()
    }

    /// Display symbol of a currency
    pub fn symbol(&self, id: CurrencyId) -> &str {
        &self.currency(id).display_symbol
    }

    /// Earliest transaction date in the whole graph
    pub fn earliest_date(&self) -> Option<NaiveDate> {
        self.transactions.values().map(|t| t.date).min()
    }

    /// A transaction followed by its split descendants, depth first, in
    /// ascending number at each level.
    pub fn flatten(&self, id: TransactionId) -> Flatten<'_> {
        Flatten {
            book: self,
            stack: vec![id],
        }
    }

    /// The records an entry stands for: the transaction, its contra, its
    /// split descendants and their contras, each once, in that order.
    pub fn flatten_with_contras(&self, id: TransactionId) -> Vec<&Transaction> {
        let mut seen = BTreeSet::new();
        let mut members = Vec::new();
        for txn in self.flatten(id) {
            if seen.insert(txn.id) {
                members.push(txn);
            }
            if let Some(contra) = txn.contra {
                if seen.insert(contra) {
                    members.push(self.transaction(contra));
                }
            }
        }
        members
    }
}

/// Restartable depth-first walk over a split tree, see [`Book::flatten`]
#[derive(Debug, Clone)]
pub struct Flatten<'a> {
    book: &'a Book,
    stack: Vec<TransactionId>,
}

impl<'a> Iterator for Flatten<'a> {
    type Item = &'a Transaction;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.stack.pop()?;
        let txn = self.book.transaction(id);
        self.stack.extend(txn.children.values().rev().copied());
        Some(txn)
    }
}
