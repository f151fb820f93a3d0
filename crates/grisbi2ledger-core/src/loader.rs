//! Building the record graph from the source tree
//!
//! Loading happens in two phases. Every record is first decoded into a raw
//! entry keyed by its identity number, with references kept as plain
//! numbers. Once all records are in, references are resolved kind by kind
//! (Account, Category, SubCategory, Currency, Party, Reconcile, Transaction)
//! into typed handles, so a reference can point at a record that appears
//! later in the file.

use chrono::NaiveDate;
use grisbi2ledger_parser::Element;
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use std::fmt::Display;

use crate::book::Book;
use crate::error::{CoreError, CoreResult};
use crate::fields::{Record, NULL_SENTINEL};
use crate::models::{Account, Category, Currency, Party, Reconcile, SubCategory, Transaction};
use crate::types::{
    AccountId, AccountKind, CategoryId, CurrencyId, PartyId, ReconcileId, RecordKind,
    SubCategoryId, TransactionId,
};

/// Marking code of a reconciled transaction; 0 is unmarked
const MARKED_RECONCILED: i64 = 3;

struct RawAccount {
    number: u32,
    name: String,
    currency: u32,
    opening_balance: Decimal,
    kind: AccountKind,
    branch_code: Option<String>,
    account_number: Option<String>,
}

struct RawCategory {
    number: u32,
    name: String,
    is_expenses: bool,
}

struct RawSubCategory {
    category: u32,
    number: u32,
    name: String,
}

struct RawCurrency {
    number: u32,
    name: String,
    symbol: Option<String>,
    abbreviation: String,
}

struct RawParty {
    number: u32,
    name: String,
}

struct RawReconcile {
    number: u32,
    name: String,
    account: u32,
    date: Option<NaiveDate>,
    balance: Decimal,
}

struct RawTransaction {
    number: u32,
    position: usize,
    account: u32,
    date: Option<NaiveDate>,
    currency: u32,
    amount: Decimal,
    rate_is_divisor: bool,
    exchange_rate: Decimal,
    party: Option<u32>,
    category: Option<u32>,
    sub_category: Option<u32>,
    is_split: bool,
    notes: Option<String>,
    reconciled: bool,
    reconciliation: Option<u32>,
    bank_reference: Option<String>,
    contra: Option<u32>,
    mother: Option<u32>,
}

/// Decoded records before reference resolution
#[derive(Default)]
struct RawBook {
    accounts: BTreeMap<u32, RawAccount>,
    categories: BTreeMap<u32, RawCategory>,
    sub_categories: BTreeMap<(u32, u32), RawSubCategory>,
    currencies: BTreeMap<u32, RawCurrency>,
    parties: BTreeMap<u32, RawParty>,
    reconciles: BTreeMap<u32, RawReconcile>,
    transactions: BTreeMap<u32, RawTransaction>,
}

/// Loads a Grisbi record tree into a resolved [`Book`]
pub struct Loader;

impl Loader {
    /// Decode every record under `root`, then resolve all references.
    ///
    /// Fails on the first record that cannot be decoded, is a duplicate, or
    /// refers to something that does not exist.
    pub fn load(root: &Element) -> CoreResult<Book> {
        let mut raw = RawBook::default();

        for child in &root.children {
            let Some(kind) = RecordKind::from_tag(&child.tag) else {
                log::debug!("Skipping <{}> record at byte {}", child.tag, child.position);
                continue;
            };
            let record = Record::new(kind, child);
            match kind {
                RecordKind::Account => {
                    let account = decode_account(&record)?;
                    insert_unique(&mut raw.accounts, account.number, account, kind)?;
                }
                RecordKind::Category => {
                    let category = decode_category(&record)?;
                    insert_unique(&mut raw.categories, category.number, category, kind)?;
                }
                RecordKind::SubCategory => {
                    let sub = decode_sub_category(&record)?;
                    let key = (sub.category, sub.number);
                    if raw.sub_categories.contains_key(&key) {
                        return Err(CoreError::DuplicateEntry {
                            kind,
                            number: format!("{}:{}", key.0, key.1),
                        });
                    }
                    raw.sub_categories.insert(key, sub);
                }
                RecordKind::Currency => {
                    let currency = decode_currency(&record)?;
                    insert_unique(&mut raw.currencies, currency.number, currency, kind)?;
                }
                RecordKind::Party => {
                    let party = decode_party(&record)?;
                    insert_unique(&mut raw.parties, party.number, party, kind)?;
                }
                RecordKind::Reconcile => {
                    let reconcile = decode_reconcile(&record)?;
                    insert_unique(&mut raw.reconciles, reconcile.number, reconcile, kind)?;
                }
                RecordKind::Transaction => {
                    let txn = decode_transaction(&record, child.position)?;
                    insert_unique(&mut raw.transactions, txn.number, txn, kind)?;
                }
            }
        }

        log::info!(
            "Loaded {} accounts, {} categories, {} subcategories, {} currencies, {} parties, {} reconciliations, {} transactions",
            raw.accounts.len(),
            raw.categories.len(),
            raw.sub_categories.len(),
            raw.currencies.len(),
            raw.parties.len(),
            raw.reconciles.len(),
            raw.transactions.len(),
        );

        raw.resolve()
    }
}

fn insert_unique<V>(
    map: &mut BTreeMap<u32, V>,
    number: u32,
    value: V,
    kind: RecordKind,
) -> CoreResult<()> {
    if map.contains_key(&number) {
        return Err(CoreError::DuplicateEntry {
            kind,
            number: number.to_string(),
        });
    }
    map.insert(number, value);
    Ok(())
}

// ==================== Record Decoding ====================

fn decode_account(record: &Record<'_>) -> CoreResult<RawAccount> {
    let name = record.text("Name")?;
    if name.is_empty() || name == NULL_SENTINEL {
        return Err(record.invalid("Name", name, "account name is empty".to_string()));
    }
    let kind_code = record.code("Kind")?;
    let kind = AccountKind::from_code(kind_code).ok_or_else(|| {
        record.unsupported("Kind", &kind_code.to_string(), "expected 0 to 3")
    })?;

    Ok(RawAccount {
        number: record.number("Number")?,
        name: name.to_string(),
        currency: record.number("Currency")?,
        opening_balance: record.amount("Initial_balance")?,
        kind,
        branch_code: record.optional_text("Bank_branch_code"),
        account_number: record.optional_text("Bank_account_number"),
    })
}

fn decode_category(record: &Record<'_>) -> CoreResult<RawCategory> {
    let is_expenses = match record.code("Kd")? {
        0 => false,
        1 => true,
        other => return Err(record.unsupported("Kd", &other.to_string(), "expected 0 or 1")),
    };
    Ok(RawCategory {
        number: record.number("Nb")?,
        name: record.text("Na")?.to_string(),
        is_expenses,
    })
}

fn decode_sub_category(record: &Record<'_>) -> CoreResult<RawSubCategory> {
    Ok(RawSubCategory {
        category: record.number("Nbc")?,
        number: record.number("Nb")?,
        name: record.text("Na")?.to_string(),
    })
}

fn decode_currency(record: &Record<'_>) -> CoreResult<RawCurrency> {
    let decimals = record.text("Fl")?;
    if decimals.trim() != "2" {
        return Err(record.unsupported(
            "Fl",
            decimals,
            "only two-decimal currencies are supported",
        ));
    }
    Ok(RawCurrency {
        number: record.number("Nb")?,
        name: record.text("Na")?.to_string(),
        symbol: record.optional_text("Co"),
        abbreviation: record.text("Ico")?.to_string(),
    })
}

fn decode_party(record: &Record<'_>) -> CoreResult<RawParty> {
    Ok(RawParty {
        number: record.number("Nb")?,
        name: record.text("Na")?.to_string(),
    })
}

fn decode_reconcile(record: &Record<'_>) -> CoreResult<RawReconcile> {
    Ok(RawReconcile {
        number: record.number("Nb")?,
        name: record.text("Na")?.to_string(),
        account: record.number("Acc")?,
        date: record.date("Fdate")?,
        balance: record.amount("Fbal")?,
    })
}

fn decode_transaction(record: &Record<'_>, position: usize) -> CoreResult<RawTransaction> {
    let fee = record.decimal("Exf")?;
    if !fee.is_zero() {
        return Err(record.unsupported(
            "Exf",
            record.text("Exf")?,
            "exchange fees are not supported",
        ));
    }

    let marked = record.code("Ma")?;
    let reconciled = match marked {
        0 => false,
        MARKED_RECONCILED => true,
        other => {
            return Err(record.unsupported(
                "Ma",
                &other.to_string(),
                "only unmarked (0) and reconciled (3) transactions are supported",
            ))
        }
    };
    let reconciliation = if reconciled {
        record.reference("Re")?
    } else {
        None
    };

    Ok(RawTransaction {
        number: record.number("Nb")?,
        position,
        account: record.number("Ac")?,
        date: record.date("Dt")?,
        currency: record.number("Cu")?,
        amount: record.amount("Am")?,
        rate_is_divisor: record.flag("Exb")?,
        exchange_rate: record.decimal("Exr")?,
        party: record.reference("Pa")?,
        category: record.reference("Ca")?,
        sub_category: record.reference("Sca")?,
        is_split: record.flag("Br")?,
        notes: record.optional_text("No"),
        reconciled,
        reconciliation,
        bank_reference: record.optional_text("Ba"),
        contra: record.reference("Trt")?,
        mother: record.reference("Mo")?,
    })
}

// ==================== Resolution ====================

fn unresolved(
    kind: RecordKind,
    number: impl Display,
    attribute: &'static str,
    target: RecordKind,
    target_number: impl Display,
) -> CoreError {
    CoreError::UnresolvedReference {
        kind,
        number: number.to_string(),
        attribute,
        target,
        target_number: target_number.to_string(),
    }
}

impl RawBook {
    fn resolve(self) -> CoreResult<Book> {
        let mut book = Book::default();

        for raw in self.accounts.values() {
            if !self.currencies.contains_key(&raw.currency) {
                return Err(unresolved(
                    RecordKind::Account,
                    raw.number,
                    "Currency",
                    RecordKind::Currency,
                    raw.currency,
                ));
            }
            let id = AccountId(raw.number);
            book.accounts.insert(
                id,
                Account {
                    id,
                    name: raw.name.clone(),
                    currency: CurrencyId(raw.currency),
                    opening_balance: raw.opening_balance,
                    kind: raw.kind,
                    branch_code: raw.branch_code.clone(),
                    account_number: raw.account_number.clone(),
                },
            );
        }

        for raw in self.categories.values() {
            let id = CategoryId(raw.number);
            book.categories.insert(
                id,
                Category {
                    id,
                    name: raw.name.clone(),
                    is_expenses: raw.is_expenses,
                    sub_categories: BTreeMap::new(),
                },
            );
        }

        for raw in self.sub_categories.values() {
            let category = book
                .categories
                .get_mut(&CategoryId(raw.category))
                .ok_or_else(|| {
                    unresolved(
                        RecordKind::SubCategory,
                        format!("{}:{}", raw.category, raw.number),
                        "Nbc",
                        RecordKind::Category,
                        raw.category,
                    )
                })?;
            let id = SubCategoryId {
                category: category.id,
                number: raw.number,
            };
            category.sub_categories.insert(raw.number, id);
            book.sub_categories.insert(
                id,
                SubCategory {
                    id,
                    name: raw.name.clone(),
                },
            );
        }

        // Symbol collisions are decided against the complete currency set
        let symbols: Vec<(CurrencyId, Option<&str>)> = self
            .currencies
            .values()
            .map(|c| (CurrencyId(c.number), c.symbol.as_deref()))
            .collect();
        for raw in self.currencies.values() {
            let mut currency = Currency {
                id: CurrencyId(raw.number),
                name: raw.name.clone(),
                symbol: raw.symbol.clone(),
                abbreviation: raw.abbreviation.clone(),
                display_symbol: String::new(),
            };
            currency.display_symbol = currency.pick_display_symbol(symbols.iter().copied());
            book.currencies.insert(currency.id, currency);
        }

        for raw in self.parties.values() {
            let id = PartyId(raw.number);
            book.parties.insert(
                id,
                Party {
                    id,
                    name: raw.name.clone(),
                },
            );
        }

        for raw in self.reconciles.values() {
            if !book.accounts.contains_key(&AccountId(raw.account)) {
                return Err(unresolved(
                    RecordKind::Reconcile,
                    raw.number,
                    "Acc",
                    RecordKind::Account,
                    raw.account,
                ));
            }
            let id = ReconcileId(raw.number);
            book.reconciles.insert(
                id,
                Reconcile {
                    id,
                    name: raw.name.clone(),
                    account: AccountId(raw.account),
                    date: raw.date,
                    balance: raw.balance,
                },
            );
        }

        self.resolve_transactions(&mut book)?;

        Ok(book)
    }

    fn resolve_transactions(&self, book: &mut Book) -> CoreResult<()> {
        // Links between transactions are checked against the complete
        // transaction mapping before any transaction is built.
        let mut children: BTreeMap<u32, BTreeMap<u32, TransactionId>> = BTreeMap::new();
        for raw in self.transactions.values() {
            if let Some(contra) = raw.contra {
                if !self.transactions.contains_key(&contra) {
                    return Err(unresolved(
                        RecordKind::Transaction,
                        raw.number,
                        "Trt",
                        RecordKind::Transaction,
                        contra,
                    ));
                }
            }
            if let Some(mother) = raw.mother {
                let parent = self.transactions.get(&mother).ok_or_else(|| {
                    unresolved(
                        RecordKind::Transaction,
                        raw.number,
                        "Mo",
                        RecordKind::Transaction,
                        mother,
                    )
                })?;
                if parent.mother.is_some() {
                    return Err(CoreError::NestedSplit {
                        transaction: raw.number,
                        mother,
                    });
                }
                children
                    .entry(mother)
                    .or_default()
                    .insert(raw.number, TransactionId(raw.number));
            }
        }

        for raw in self.transactions.values() {
            let txn = self.resolve_transaction(raw, book, &mut children)?;
            book.entries.insert(txn.id);
            book.transactions.insert(txn.id, txn);
        }

        Ok(())
    }

    fn resolve_transaction(
        &self,
        raw: &RawTransaction,
        book: &Book,
        children: &mut BTreeMap<u32, BTreeMap<u32, TransactionId>>,
    ) -> CoreResult<Transaction> {
        let kind = RecordKind::Transaction;
        let mother = raw.mother.and_then(|m| self.transactions.get(&m));

        let account = book
            .accounts
            .get(&AccountId(raw.account))
            .ok_or_else(|| unresolved(kind, raw.number, "Ac", RecordKind::Account, raw.account))?;

        let currency = CurrencyId(raw.currency);
        if !book.currencies.contains_key(&currency) {
            return Err(unresolved(kind, raw.number, "Cu", RecordKind::Currency, raw.currency));
        }
        if currency != account.currency && raw.exchange_rate.is_zero() {
            return Err(CoreError::InvalidValue {
                kind,
                position: raw.position,
                attribute: "Exr",
                value: raw.exchange_rate.to_string(),
                reason: "foreign-currency transaction needs a non-zero exchange rate".to_string(),
            });
        }

        let party = match raw.party {
            Some(number) if !book.parties.contains_key(&PartyId(number)) => {
                return Err(unresolved(kind, raw.number, "Pa", RecordKind::Party, number))
            }
            other => other.map(PartyId),
        };

        let category = match raw.category {
            Some(number) => Some(
                book.categories
                    .get(&CategoryId(number))
                    .ok_or_else(|| unresolved(kind, raw.number, "Ca", RecordKind::Category, number))?,
            ),
            None => None,
        };

        let sub_category = match (raw.sub_category, category) {
            (None, _) => None,
            (Some(number), None) => {
                return Err(CoreError::InvalidValue {
                    kind,
                    position: raw.position,
                    attribute: "Sca",
                    value: number.to_string(),
                    reason: "subcategory set without a category".to_string(),
                })
            }
            (Some(number), Some(category)) => Some(
                *category.sub_categories.get(&number).ok_or_else(|| {
                    unresolved(
                        kind,
                        raw.number,
                        "Sca",
                        RecordKind::SubCategory,
                        format!("{}:{}", category.id, number),
                    )
                })?,
            ),
        };

        // Split children take their reconciliation status from the mother;
        // the markings stored on children are not reliable.
        let (reconciled, reconciliation) = match mother {
            Some(m) => (m.reconciled, m.reconciliation),
            None => (raw.reconciled, raw.reconciliation),
        };
        let reconciliation = match reconciliation {
            Some(number) if !book.reconciles.contains_key(&ReconcileId(number)) => {
                return Err(unresolved(kind, raw.number, "Re", RecordKind::Reconcile, number))
            }
            other => other.map(ReconcileId),
        };

        let date = raw
            .date
            .or_else(|| mother.and_then(|m| m.date))
            .ok_or(CoreError::MissingDate {
                transaction: raw.number,
            })?;

        Ok(Transaction {
            id: TransactionId(raw.number),
            account: account.id,
            date,
            currency,
            amount: raw.amount,
            rate_is_divisor: raw.rate_is_divisor,
            exchange_rate: raw.exchange_rate,
            party,
            category: category.map(|c| c.id),
            sub_category,
            is_split: raw.is_split,
            notes: raw.notes.clone(),
            reconciled,
            reconciliation,
            bank_reference: raw.bank_reference.clone(),
            contra: raw.contra.map(TransactionId),
            mother: raw.mother.map(TransactionId),
            children: children.remove(&raw.number).unwrap_or_default(),
        })
    }
}
