//! Resolved entities of the record graph
//!
//! Entities refer to each other through typed identity numbers; the
//! [`Book`](crate::Book) owns every entity and resolves those handles.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;

use crate::types::{
    AccountId, AccountKind, CategoryId, CurrencyId, PartyId, ReconcileId, SubCategoryId,
    TransactionId,
};

/// Account information
#[derive(Debug, Clone, Serialize)]
pub struct Account {
    pub id: AccountId,
    /// Display name, never empty
    pub name: String,
    /// Native currency
    pub currency: CurrencyId,
    pub opening_balance: Decimal,
    pub kind: AccountKind,
    pub branch_code: Option<String>,
    pub account_number: Option<String>,
}

impl Account {
    /// Full Ledger account name, e.g. `Assets:Chequing`
    pub fn ledger_name(&self) -> String {
        format!("{}:{}", self.kind.ledger_root(), self.name)
    }

    /// Bank account number note, with the branch code in front when known
    pub fn number_note(&self) -> Option<String> {
        let number = self.account_number.as_deref()?;
        Some(match self.branch_code.as_deref() {
            Some(branch) => format!("Account number {}-{}", branch, number),
            None => format!("Account number {}", number),
        })
    }
}

/// Transaction category
#[derive(Debug, Clone, Serialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    /// Expense category (as opposed to income)
    pub is_expenses: bool,
    /// Subcategories by local number, filled in during resolution
    pub sub_categories: BTreeMap<u32, SubCategoryId>,
}

impl Category {
    pub fn ledger_root(&self) -> &'static str {
        if self.is_expenses {
            "Expenses"
        } else {
            "Income"
        }
    }
}

/// Second-level category
#[derive(Debug, Clone, Serialize)]
pub struct SubCategory {
    /// Parent category and local number
    pub id: SubCategoryId,
    pub name: String,
}

/// Currency information
#[derive(Debug, Clone, Serialize)]
pub struct Currency {
    pub id: CurrencyId,
    /// Long name, e.g. Canadian Dollar
    pub name: String,
    /// Short marker, e.g. `$`
    pub symbol: Option<String>,
    /// Code, e.g. CAD
    pub abbreviation: String,
    /// Marker used in the output, see [`Currency::pick_display_symbol`]
    pub display_symbol: String,
}

impl Currency {
    /// Choose the output marker for this currency among all loaded ones.
    ///
    /// The symbol is used unless the currency has none or a currency with a
    /// lower identity number already claims the same symbol, in which case
    /// the abbreviation is used.
    pub fn pick_display_symbol<'a, I>(&self, all: I) -> String
    where
        I: IntoIterator<Item = (CurrencyId, Option<&'a str>)>,
    {
        match self.symbol.as_deref() {
            None => self.abbreviation.clone(),
            Some(symbol) => {
                let claimed = all
                    .into_iter()
                    .any(|(id, other)| id < self.id && other == Some(symbol));
                if claimed {
                    self.abbreviation.clone()
                } else {
                    symbol.to_string()
                }
            }
        }
    }
}

/// Counterparty to transactions
#[derive(Debug, Clone, Serialize)]
pub struct Party {
    pub id: PartyId,
    pub name: String,
}

/// Point-in-time statement attestation for one account
#[derive(Debug, Clone, Serialize)]
pub struct Reconcile {
    pub id: ReconcileId,
    pub name: String,
    pub account: AccountId,
    pub date: Option<NaiveDate>,
    /// Statement balance at the reconciled point
    pub balance: Decimal,
}

/// Transaction record
#[derive(Debug, Clone, Serialize)]
pub struct Transaction {
    pub id: TransactionId,
    pub account: AccountId,
    /// Own date, or the mother's when the record had none
    pub date: NaiveDate,
    /// Currency the amount is measured in
    pub currency: CurrencyId,
    pub amount: Decimal,
    /// Divide by the exchange rate instead of multiplying
    pub rate_is_divisor: bool,
    pub exchange_rate: Decimal,
    pub party: Option<PartyId>,
    pub category: Option<CategoryId>,
    /// Only set together with `category`
    pub sub_category: Option<SubCategoryId>,
    pub is_split: bool,
    pub notes: Option<String>,
    pub reconciled: bool,
    /// Present iff the record is reconciled and the reconciliation was kept
    pub reconciliation: Option<ReconcileId>,
    pub bank_reference: Option<String>,
    /// Other leg of an inter-account transfer
    pub contra: Option<TransactionId>,
    /// Split this record belongs to
    pub mother: Option<TransactionId>,
    /// Split children by number, filled in during resolution
    pub children: BTreeMap<u32, TransactionId>,
}

impl Transaction {
    /// Rate converting `amount` into the currency of an account
    pub fn effective_rate(&self, account_currency: CurrencyId) -> Decimal {
        if self.currency == account_currency {
            Decimal::ONE
        } else if self.rate_is_divisor {
            Decimal::ONE / self.exchange_rate
        } else {
            self.exchange_rate
        }
    }

    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }
}
