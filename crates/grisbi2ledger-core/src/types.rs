//! Basic types for the record graph

use serde::{Deserialize, Serialize};

/// The record kinds read from a Grisbi file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RecordKind {
    Account,
    Category,
    SubCategory,
    Currency,
    Party,
    Reconcile,
    Transaction,
}

impl RecordKind {
    /// Tag of the record in the source document
    pub fn tag(&self) -> &'static str {
        match self {
            RecordKind::Account => "Account",
            RecordKind::Category => "Category",
            RecordKind::SubCategory => "Sub_category",
            RecordKind::Currency => "Currency",
            RecordKind::Party => "Party",
            RecordKind::Reconcile => "Reconcile",
            RecordKind::Transaction => "Transaction",
        }
    }

    /// Kind for a source tag, if it is one we read
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "Account" => Some(RecordKind::Account),
            "Category" => Some(RecordKind::Category),
            "Sub_category" => Some(RecordKind::SubCategory),
            "Currency" => Some(RecordKind::Currency),
            "Party" => Some(RecordKind::Party),
            "Reconcile" => Some(RecordKind::Reconcile),
            "Transaction" => Some(RecordKind::Transaction),
            _ => None,
        }
    }
}

impl std::fmt::Display for RecordKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RecordKind::Account => write!(f, "Account"),
            RecordKind::Category => write!(f, "Category"),
            RecordKind::SubCategory => write!(f, "Subcategory"),
            RecordKind::Currency => write!(f, "Currency"),
            RecordKind::Party => write!(f, "Party"),
            RecordKind::Reconcile => write!(f, "Reconciliation"),
            RecordKind::Transaction => write!(f, "Transaction"),
        }
    }
}

/// Account identity number
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AccountId(pub u32);

/// Category identity number
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CategoryId(pub u32);

/// Subcategory identity: its local number is only unique within the parent
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SubCategoryId {
    pub category: CategoryId,
    pub number: u32,
}

/// Currency identity number
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CurrencyId(pub u32);

/// Party identity number
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PartyId(pub u32);

/// Reconciliation identity number
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ReconcileId(pub u32);

/// Transaction identity number
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TransactionId(pub u32);

macro_rules! display_number {
    ($($id:ty),*) => {
        $(impl std::fmt::Display for $id {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        })*
    };
}

display_number!(AccountId, CategoryId, CurrencyId, PartyId, ReconcileId, TransactionId);

impl std::fmt::Display for SubCategoryId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.category, self.number)
    }
}

/// Account kind enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountKind {
    /// Bank account
    Bank,
    /// Cash on hand
    Cash,
    /// Credit card or loan
    Liability,
    /// Any other asset
    Asset,
}

impl AccountKind {
    /// Kind for the numeric code stored in the source file
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(AccountKind::Bank),
            1 => Some(AccountKind::Cash),
            2 => Some(AccountKind::Liability),
            3 => Some(AccountKind::Asset),
            _ => None,
        }
    }

    /// Top-level Ledger account the kind lives under
    pub fn ledger_root(&self) -> &'static str {
        match self {
            AccountKind::Liability => "Liabilities",
            AccountKind::Bank | AccountKind::Cash | AccountKind::Asset => "Assets",
        }
    }
}

impl std::fmt::Display for AccountKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AccountKind::Bank => write!(f, "bank"),
            AccountKind::Cash => write!(f, "cash"),
            AccountKind::Liability => write!(f, "liability"),
            AccountKind::Asset => write!(f, "asset"),
        }
    }
}
