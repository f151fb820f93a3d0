//! Inline Grisbi documents for unit tests

use grisbi2ledger_parser::{DefaultSourceParser, SourceParser};

use crate::book::Book;
use crate::error::CoreResult;
use crate::loader::Loader;

fn escape(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\t', "&#9;")
}

fn record(tag: &str, attrs: &[(&str, String)]) -> String {
    let mut out = format!("<{}", tag);
    for (name, value) in attrs {
        out.push_str(&format!(" {}=\"{}\"", name, escape(value)));
    }
    out.push_str(" />");
    out
}

pub fn document(records: &[String]) -> String {
    let mut out = String::from("<?xml version=\"1.0\"?>\n<Grisbi>\n");
    out.push_str("  <General File_version=\"1.0.0\" />\n");
    for r in records {
        out.push_str("  ");
        out.push_str(r);
        out.push('\n');
    }
    out.push_str("</Grisbi>\n");
    out
}

pub fn currency(nb: u32, name: &str, symbol: &str, code: &str) -> String {
    record(
        "Currency",
        &[
            ("Nb", nb.to_string()),
            ("Na", name.to_string()),
            ("Co", symbol.to_string()),
            ("Ico", code.to_string()),
            ("Fl", "2".to_string()),
        ],
    )
}

/// Account of kind `kind` (0 bank, 1 cash, 2 liability, 3 asset)
pub fn account(number: u32, name: &str, currency: u32, kind: u32, opening: &str) -> String {
    account_with_bank(number, name, currency, kind, opening, "(null)", "(null)")
}

pub fn account_with_bank(
    number: u32,
    name: &str,
    currency: u32,
    kind: u32,
    opening: &str,
    branch: &str,
    account_number: &str,
) -> String {
    record(
        "Account",
        &[
            ("Name", name.to_string()),
            ("Number", number.to_string()),
            ("Currency", currency.to_string()),
            ("Initial_balance", opening.to_string()),
            ("Kind", kind.to_string()),
            ("Bank_branch_code", branch.to_string()),
            ("Bank_account_number", account_number.to_string()),
        ],
    )
}

pub fn category(nb: u32, name: &str, expenses: bool) -> String {
    record(
        "Category",
        &[
            ("Nb", nb.to_string()),
            ("Na", name.to_string()),
            ("Kd", if expenses { "1" } else { "0" }.to_string()),
        ],
    )
}

pub fn sub_category(category: u32, nb: u32, name: &str) -> String {
    record(
        "Sub_category",
        &[
            ("Nbc", category.to_string()),
            ("Nb", nb.to_string()),
            ("Na", name.to_string()),
        ],
    )
}

pub fn party(nb: u32, name: &str) -> String {
    record("Party", &[("Nb", nb.to_string()), ("Na", name.to_string())])
}

pub fn reconcile(nb: u32, name: &str, account: u32, date: &str, balance: &str) -> String {
    record(
        "Reconcile",
        &[
            ("Nb", nb.to_string()),
            ("Na", name.to_string()),
            ("Acc", account.to_string()),
            ("Fdate", date.to_string()),
            ("Fbal", balance.to_string()),
        ],
    )
}

/// Transaction record builder with the defaults of a plain, unmarked
/// transaction in the account's currency
#[derive(Clone)]
pub struct Txn {
    attrs: Vec<(&'static str, String)>,
}

impl Txn {
    pub fn new(nb: u32, account: u32, date: &str, amount: &str) -> Self {
        let attrs = vec![
            ("Ac", account.to_string()),
            ("Nb", nb.to_string()),
            ("Dt", date.to_string()),
            ("Cu", "1".to_string()),
            ("Am", amount.to_string()),
            ("Exb", "0".to_string()),
            ("Exr", "0.00".to_string()),
            ("Exf", "0.00".to_string()),
            ("Pa", "0".to_string()),
            ("Ca", "0".to_string()),
            ("Sca", "0".to_string()),
            ("Br", "0".to_string()),
            ("No", "(null)".to_string()),
            ("Ma", "0".to_string()),
            ("Re", "0".to_string()),
            ("Ba", "(null)".to_string()),
            ("Trt", "0".to_string()),
            ("Mo", "0".to_string()),
        ];
        Self { attrs }
    }

    /// Override any attribute
    pub fn set(mut self, name: &'static str, value: impl ToString) -> Self {
        let value = value.to_string();
        match self.attrs.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = value,
            None => self.attrs.push((name, value)),
        }
        self
    }

    pub fn party(self, nb: u32) -> Self {
        self.set("Pa", nb)
    }

    pub fn category(self, nb: u32) -> Self {
        self.set("Ca", nb)
    }

    pub fn sub_category(self, nb: u32) -> Self {
        self.set("Sca", nb)
    }

    pub fn split(self) -> Self {
        self.set("Br", 1)
    }

    pub fn mother(self, nb: u32) -> Self {
        self.set("Mo", nb)
    }

    pub fn contra(self, nb: u32) -> Self {
        self.set("Trt", nb)
    }

    pub fn reconciled(self, reconcile: u32) -> Self {
        self.set("Ma", 3).set("Re", reconcile)
    }

    pub fn bank_reference(self, reference: &str) -> Self {
        self.set("Ba", reference)
    }

    pub fn notes(self, notes: &str) -> Self {
        self.set("No", notes)
    }

    pub fn currency(self, nb: u32, rate: &str, divisor: bool) -> Self {
        self.set("Cu", nb)
            .set("Exr", rate)
            .set("Exb", if divisor { 1 } else { 0 })
    }

    pub fn build(&self) -> String {
        record("Transaction", &self.attrs)
    }
}

pub fn try_book_from(xml: impl AsRef<str>) -> CoreResult<Book> {
    let root = DefaultSourceParser.parse(xml.as_ref())?;
    Loader::load(&root)
}

pub fn book_from(xml: impl AsRef<str>) -> Book {
    try_book_from(xml).expect("fixture should load")
}

/// Currencies, accounts, categories and parties shared by most fixtures
pub fn base_records() -> Vec<String> {
    vec![
        currency(1, "Canadian Dollar", "$", "CAD"),
        currency(2, "US Dollar", "$", "USD"),
        account_with_bank(1, "Chequing", 1, 0, "100.00", "00042", "123456"),
        account(2, "Savings", 1, 0, "0.00"),
        account(3, "Visa", 1, 2, "0.00"),
        category(1, "Food", true),
        sub_category(1, 1, "Groceries"),
        category(2, "Salary", false),
        party(1, "Corner Store"),
        party(2, "Employer"),
        party(3, "Bank"),
    ]
}

/// Split 3 in Chequing with a grocery child 4 and a child 6 that is a
/// transfer leg whose contra 7 sits in Savings
pub fn split_with_transfer_fixture() -> String {
    let mut records = base_records();
    records.extend([
        Txn::new(3, 1, "1/10/2021", "-50.00").party(1).split().build(),
        Txn::new(4, 1, "(null)", "-30.00")
            .party(1)
            .category(1)
            .sub_category(1)
            .mother(3)
            .build(),
        Txn::new(6, 1, "(null)", "-20.00")
            .party(1)
            .mother(3)
            .contra(7)
            .build(),
        Txn::new(7, 2, "1/10/2021", "20.00").party(1).contra(6).build(),
    ]);
    document(&records)
}
