//! Consistency checks over the loaded graph
//!
//! Collapsing and rendering assume a handful of structural properties that
//! the loader does not enforce. [`validate`] runs every check over the
//! un-collapsed graph and reports all violations at once.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::book::Book;
use crate::models::Transaction;
use crate::types::AccountId;

/// The individual checks, in the order they run
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Check {
    /// Every non-split transaction has a party
    PartyPresent,
    /// Split flag set iff the transaction has children
    SplitHasChildren,
    /// Contra links point both ways
    ContraSymmetric,
    /// Non-split transactions have a category or a contra
    CategoryOrContra,
    /// Category names survive as Ledger account names
    CategoryName,
    /// A transfer does not join two split children
    ContraNotBothSplit,
    /// No two reconciliations of one account share a date
    ReconcileDateUnique,
    /// Reconciled iff a reconciliation is attached
    ReconciledHasReconcile,
    /// Reconciliations belong to the account they reconcile
    ReconcileAccount,
}

impl std::fmt::Display for Check {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Check::PartyPresent => write!(f, "party_present"),
            Check::SplitHasChildren => write!(f, "split_has_children"),
            Check::ContraSymmetric => write!(f, "contra_symmetric"),
            Check::CategoryOrContra => write!(f, "category_or_contra"),
            Check::CategoryName => write!(f, "category_name"),
            Check::ContraNotBothSplit => write!(f, "contra_not_both_split"),
            Check::ReconcileDateUnique => write!(f, "reconcile_date_unique"),
            Check::ReconciledHasReconcile => write!(f, "reconciled_has_reconcile"),
            Check::ReconcileAccount => write!(f, "reconcile_account"),
        }
    }
}

/// One violated check
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Finding {
    pub check: Check,
    /// Offending transaction, if the check is about one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transaction: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
    pub message: String,
}

impl Finding {
    fn about(check: Check, book: &Book, txn: &Transaction, detail: impl AsRef<str>) -> Self {
        let account = &book.account(txn.account).name;
        Self {
            check,
            transaction: Some(txn.id.0),
            account: Some(account.clone()),
            date: Some(txn.date),
            message: format!(
                "Transaction {} in account {} on {} {}",
                txn.id,
                account,
                txn.date,
                detail.as_ref()
            ),
        }
    }
}

impl std::fmt::Display for Finding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.check, self.message)
    }
}

/// Outcome of [`validate`]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub findings: Vec<Finding>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.findings.is_empty()
    }

    pub fn len(&self) -> usize {
        self.findings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.findings.is_empty()
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// Run every check and collect all findings, ordered by check and then by
/// ascending identity number
pub fn validate(book: &Book) -> ValidationReport {
    let mut findings = Vec::new();

    // 1
    for txn in book.transactions() {
        if txn.party.is_none() && !txn.is_split {
            findings.push(Finding::about(
                Check::PartyPresent,
                book,
                txn,
                "has no party and is not a split",
            ));
        }
    }

    // 2
    for txn in book.transactions() {
        let detail = match (txn.is_split, txn.has_children()) {
            (true, false) => "is a split without children",
            (false, true) => "has children but is not a split",
            _ => continue,
        };
        findings.push(Finding::about(Check::SplitHasChildren, book, txn, detail));
    }

    // 3
    for txn in book.transactions() {
        let Some(contra_id) = txn.contra else { continue };
        let contra = book.transaction(contra_id);
        if contra.contra != Some(txn.id) {
            let back = match contra.contra {
                Some(other) => format!("transaction {}", other),
                None => "nothing".to_string(),
            };
            findings.push(Finding::about(
                Check::ContraSymmetric,
                book,
                txn,
                format!(
                    "names transaction {} in account {} as its contra, which points back at {}",
                    contra.id,
                    book.account(contra.account).name,
                    back
                ),
            ));
        }
    }

    // 4
    for txn in book.transactions() {
        if txn.category.is_none() && txn.contra.is_none() && !txn.is_split {
            findings.push(Finding::about(
                Check::CategoryOrContra,
                book,
                txn,
                "has neither a category nor a contra and is not a split",
            ));
        }
    }

    // 5
    for category in book.categories() {
        if is_bad_name(&category.name) {
            findings.push(Finding {
                check: Check::CategoryName,
                transaction: None,
                account: None,
                date: None,
                message: format!(
                    "Category {:?} contains a tab or two consecutive spaces",
                    category.name
                ),
            });
        }
        for sub_id in category.sub_categories.values() {
            let sub = book.sub_category(*sub_id);
            if is_bad_name(&sub.name) {
                findings.push(Finding {
                    check: Check::CategoryName,
                    transaction: None,
                    account: None,
                    date: None,
                    message: format!(
                        "Subcategory {:?} of {:?} contains a tab or two consecutive spaces",
                        sub.name, category.name
                    ),
                });
            }
        }
    }

    // 6
    for txn in book.transactions() {
        let Some(contra_id) = txn.contra else { continue };
        let contra = book.transaction(contra_id);
        if txn.mother.is_some() && contra.mother.is_some() {
            findings.push(Finding::about(
                Check::ContraNotBothSplit,
                book,
                txn,
                format!(
                    "and its contra {} in account {} are both part of splits",
                    contra.id,
                    book.account(contra.account).name
                ),
            ));
        }
    }

    // 7
    let mut seen: BTreeMap<AccountId, BTreeMap<Option<NaiveDate>, &str>> = BTreeMap::new();
    for reconcile in book.reconciles() {
        let dates = seen.entry(reconcile.account).or_default();
        if let Some(earlier) = dates.get(&reconcile.date) {
            let account = &book.account(reconcile.account).name;
            let when = reconcile
                .date
                .map(|d| d.to_string())
                .unwrap_or_else(|| "an unknown date".to_string());
            findings.push(Finding {
                check: Check::ReconcileDateUnique,
                transaction: None,
                account: Some(account.clone()),
                date: reconcile.date,
                message: format!(
                    "Reconciliation {} in account {} on {} falls on the same day as reconciliation {}",
                    reconcile.name, account, when, earlier
                ),
            });
        }
        dates.insert(reconcile.date, &reconcile.name);
    }

    // 8
    for txn in book.transactions() {
        if txn.reconciled && txn.reconciliation.is_none() {
            findings.push(Finding::about(
                Check::ReconciledHasReconcile,
                book,
                txn,
                "is reconciled but has no reconciliation",
            ));
        }
    }

    // 9
    for top in book.transactions().filter(|t| t.mother.is_none()) {
        for txn in book.flatten(top.id) {
            let Some(reconcile_id) = txn.reconciliation else { continue };
            let reconcile = book.reconcile(reconcile_id);
            if txn.reconciled && reconcile.account != txn.account {
                findings.push(Finding::about(
                    Check::ReconcileAccount,
                    book,
                    txn,
                    format!(
                        "is reconciled by reconciliation {} of account {}",
                        reconcile.name,
                        book.account(reconcile.account).name
                    ),
                ));
            }
        }
    }

    ValidationReport { findings }
}

fn is_bad_name(name: &str) -> bool {
    name.contains("  ") || name.contains('\t')
}
