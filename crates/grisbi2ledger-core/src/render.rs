//! Ledger journal output
//!
//! The journal is written in five parts: commodity declarations, account
//! declarations, the opening balance, the entries interleaved with
//! reconciliation markers, and the markers still pending at the end.
//! Blocks are separated by one blank line.

use chrono::NaiveDate;
use grisbi2ledger_config::LedgerConfig;
use rust_decimal::Decimal;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt::{self, Display, Formatter};
use std::io::{self, Write};

use crate::book::Book;
use crate::fields::AMOUNT_SCALE;
use crate::format::{double_quoted, format, plain, COMMA, GUTTER, INDENT};
use crate::models::{Account, Currency, Transaction};
use crate::types::{AccountId, ReconcileId, TransactionId};

const RECONCILIATION_PAYEE: &str = "Reconciliation";

/// Target of a category leg whose record has no category
const UNCATEGORISED: &str = "Expenses:Uncategorised";

// ==================== Text Elements ====================

/// Commodity symbol, quoted when Ledger would not read it bare
struct Commodity<'a>(&'a str);

impl Commodity<'_> {
    fn needs_quotes(&self) -> bool {
        self.0.is_empty()
            || self.0.chars().any(|c| {
                c.is_ascii_digit() || c.is_whitespace() || "-+*/^&|=<>[](){}@;.,:!?'~%#".contains(c)
            })
    }
}

impl Display for Commodity<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if self.needs_quotes() {
            double_quoted(f, self.0)
        } else {
            plain(f, self.0)
        }
    }
}

/// Quantity of a commodity, symbol first
#[derive(Debug, Clone, Copy)]
struct Amount<'a> {
    commodity: &'a str,
    quantity: Decimal,
}

impl<'a> Amount<'a> {
    /// Money value rounded to two decimals
    fn money(commodity: &'a str, value: Decimal) -> Self {
        let mut quantity = value.round_dp(AMOUNT_SCALE);
        quantity.rescale(AMOUNT_SCALE);
        if quantity.is_zero() {
            quantity.set_sign_positive(true);
        }
        Self { commodity, quantity }
    }

    /// Per-unit price, at full precision
    fn rate(commodity: &'a str, value: Decimal) -> Self {
        Self {
            commodity,
            quantity: value.normalize(),
        }
    }
}

impl Display for Amount<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", Commodity(self.commodity), self.quantity)
    }
}

struct Posting<'a> {
    cleared: bool,
    account: String,
    amount: Option<Amount<'a>>,
    price: Option<Amount<'a>>,
    assertion: Option<Amount<'a>>,
    /// Bank references, when they cannot be the entry's code
    references: Vec<&'a str>,
    notes: Vec<String>,
}

impl<'a> Posting<'a> {
    fn new(account: String, cleared: bool) -> Self {
        Self {
            cleared,
            account,
            amount: None,
            price: None,
            assertion: None,
            references: Vec::new(),
            notes: Vec::new(),
        }
    }

    fn with_amount(mut self, amount: Amount<'a>) -> Self {
        self.amount = Some(amount);
        self
    }

    fn with_price(mut self, price: Amount<'a>) -> Self {
        self.price = Some(price);
        self
    }

    fn with_assertion(mut self, balance: Amount<'a>) -> Self {
        self.assertion = Some(balance);
        self
    }

    fn with_references(mut self, references: Vec<&'a str>) -> Self {
        self.references = references;
        self
    }

    fn with_note(mut self, note: String) -> Self {
        self.notes.push(note);
        self
    }
}

impl Display for Posting<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(INDENT)?;
        if self.cleared {
            f.write_str("* ")?;
        }
        f.write_str(&self.account)?;
        if let Some(amount) = &self.amount {
            write!(f, "{GUTTER}{amount}")?;
        }
        if let Some(price) = &self.price {
            write!(f, " @ {price}")?;
        }
        if let Some(balance) = &self.assertion {
            write!(f, " = {balance}")?;
        }
        if !self.references.is_empty() {
            f.write_str(" ; ")?;
            format(f, &self.references, plain, COMMA)?;
        }
        writeln!(f)?;
        for note in &self.notes {
            writeln!(f, "{INDENT}; {note}")?;
        }
        Ok(())
    }
}

struct Entry<'a> {
    date: NaiveDate,
    code: Option<&'a str>,
    payee: Option<&'a str>,
    comments: Vec<String>,
    postings: Vec<Posting<'a>>,
}

impl Display for Entry<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.date.format("%Y-%m-%d"))?;
        if let Some(code) = self.code {
            write!(f, " ({code})")?;
        }
        if let Some(payee) = self.payee {
            write!(f, " {payee}")?;
        }
        writeln!(f)?;
        for comment in &self.comments {
            writeln!(f, "{INDENT}; {comment}")?;
        }
        for posting in &self.postings {
            posting.fmt(f)?;
        }
        Ok(())
    }
}

struct CommodityDecl<'a>(&'a Currency);

impl Display for CommodityDecl<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        writeln!(f, "commodity {}", Commodity(&self.0.display_symbol))?;
        writeln!(f, "{INDENT}note {}", self.0.name)
    }
}

struct AccountDecl<'a> {
    name: String,
    commodity: Option<&'a str>,
    note: Option<String>,
}

impl<'a> AccountDecl<'a> {
    fn of(book: &'a Book, account: &Account) -> Self {
        Self {
            name: account.ledger_name(),
            commodity: Some(book.symbol(account.currency)),
            note: account.number_note(),
        }
    }
}

impl Display for AccountDecl<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        writeln!(f, "account {}", self.name)?;
        if let Some(commodity) = self.commodity {
            write!(f, "{INDENT}assert commodity == ")?;
            double_quoted(f, commodity)?;
            writeln!(f)?;
        }
        if let Some(note) = &self.note {
            writeln!(f, "{INDENT}note {note}")?;
        }
        Ok(())
    }
}

// ==================== Reconciliation Tracking ====================

/// Reconciliation of one account whose marker is not written yet
#[derive(Debug)]
struct Pending {
    account: AccountId,
    reconcile: ReconcileId,
    covered: Vec<TransactionId>,
    last_date: NaiveDate,
}

impl Pending {
    fn new(reconcile: ReconcileId, txn: &Transaction) -> Self {
        Self {
            account: txn.account,
            reconcile,
            covered: vec![txn.id],
            last_date: txn.date,
        }
    }

    fn cover(&mut self, txn: &Transaction) {
        if !self.covered.contains(&txn.id) {
            self.covered.push(txn.id);
        }
        self.last_date = self.last_date.max(txn.date);
    }
}

/// Most recent reconciliation seen per account
#[derive(Default)]
struct ReconcileTracker {
    pending: BTreeMap<AccountId, Pending>,
}

impl ReconcileTracker {
    /// Record the members of one entry and return the reconciliations
    /// they close. A member whose reconciliation differs from the one
    /// tracked for its account closes it, including a member with none.
    fn observe(&mut self, members: &[&Transaction]) -> Vec<Pending> {
        let mut due = Vec::new();
        for txn in members {
            let tracked = self.pending.get(&txn.account).map(|p| p.reconcile);
            if tracked == txn.reconciliation {
                if let Some(pending) = self.pending.get_mut(&txn.account) {
                    pending.cover(txn);
                }
                continue;
            }
            let closed = match txn.reconciliation {
                Some(reconcile) => self.pending.insert(txn.account, Pending::new(reconcile, txn)),
                None => self.pending.remove(&txn.account),
            };
            due.extend(closed);
        }
        due
    }

    /// Everything still open, in account order
    fn finish(self) -> impl Iterator<Item = Pending> {
        self.pending.into_values()
    }
}

// ==================== Writer ====================

/// Writes blocks separated by blank lines
struct Sink<W> {
    out: W,
    blocks: usize,
}

impl<W: io::Write> Sink<W> {
    fn block(&mut self, block: impl Display) -> io::Result<()> {
        if self.blocks > 0 {
            self.out.write_all(b"\n")?;
        }
        write!(self.out, "{}", block)?;
        self.blocks += 1;
        Ok(())
    }
}

/// Serialises a collapsed [`Book`] as a Ledger journal
pub struct LedgerWriter<'a> {
    book: &'a Book,
    config: &'a LedgerConfig,
}

impl<'a> LedgerWriter<'a> {
    pub fn new(book: &'a Book, config: &'a LedgerConfig) -> Self {
        Self { book, config }
    }

    pub fn write<W: io::Write>(&self, out: W) -> io::Result<()> {
        let book = self.book;
        let mut sink = Sink { out, blocks: 0 };

        for currency in book.currencies() {
            sink.block(CommodityDecl(currency))?;
        }
        for account in book.accounts() {
            sink.block(AccountDecl::of(book, account))?;
        }

        if let Some(opening) = self.opening_balance() {
            sink.block(AccountDecl {
                name: self.config.opening_balance_account.clone(),
                commodity: None,
                note: None,
            })?;
            sink.block(opening)?;
        }

        let mut tracker = ReconcileTracker::default();
        let mut markers = 0;
        for txn in book.entries() {
            let members = book.flatten_with_contras(txn.id);
            for pending in tracker.observe(&members) {
                sink.block(self.marker(&pending))?;
                markers += 1;
            }
            sink.block(self.entry(txn, &members))?;
        }
        for pending in tracker.finish() {
            sink.block(self.marker(&pending))?;
            markers += 1;
        }

        log::info!(
            "Wrote {} entries and {} reconciliation markers",
            book.entry_count(),
            markers
        );
        sink.out.flush()
    }

    /// Render the whole journal in memory
    pub fn render_to_string(&self) -> io::Result<String> {
        let mut buf = Vec::new();
        self.write(&mut buf)?;
        String::from_utf8(buf).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
    }

    fn opening_balance(&self) -> Option<Entry<'a>> {
        let book = self.book;
        let mut postings: Vec<Posting<'a>> = book
            .accounts()
            .filter(|a| !a.opening_balance.is_zero())
            .map(|a| {
                Posting::new(a.ledger_name(), true)
                    .with_amount(Amount::money(book.symbol(a.currency), a.opening_balance))
            })
            .collect();
        if postings.is_empty() {
            return None;
        }
        postings.push(Posting::new(self.config.opening_balance_account.clone(), false));

        let date = book.earliest_date().unwrap_or_else(|| {
            log::debug!("No transactions, dating the opening balance from configuration");
            self.config.fallback_opening_date
        });
        Some(Entry {
            date,
            code: None,
            payee: Some(self.config.opening_balance_payee.as_str()),
            comments: Vec::new(),
            postings,
        })
    }

    fn marker(&self, pending: &Pending) -> Entry<'a> {
        let book = self.book;
        let reconcile = book.reconcile(pending.reconcile);
        let account = book.account(pending.account);
        let symbol = book.symbol(account.currency);
        log::debug!(
            "Reconciliation marker for {} in {}",
            reconcile.name,
            account.ledger_name()
        );

        let mut comments = vec![format!("Grisbi reconciliation {}", reconcile.name)];
        comments.extend(
            pending
                .covered
                .iter()
                .map(|id| format!("Covers Grisbi transaction {}", id)),
        );
        Entry {
            date: reconcile.date.unwrap_or(pending.last_date),
            code: None,
            payee: Some(RECONCILIATION_PAYEE),
            comments,
            postings: vec![Posting::new(account.ledger_name(), true)
                .with_amount(Amount::money(symbol, Decimal::ZERO))
                .with_assertion(Amount::money(symbol, reconcile.balance))],
        }
    }

    fn entry(&self, txn: &'a Transaction, members: &[&'a Transaction]) -> Entry<'a> {
        let book = self.book;

        let references: BTreeSet<&'a str> = members
            .iter()
            .filter_map(|t| t.bank_reference.as_deref())
            .collect();
        let per_posting = references.len() > 1;
        let code = if references.len() == 1 {
            references.first().copied()
        } else {
            None
        };
        let refs = |sources: &[&'a Transaction]| -> Vec<&'a str> {
            if per_posting {
                sources
                    .iter()
                    .filter_map(|t| t.bank_reference.as_deref())
                    .collect()
            } else {
                Vec::new()
            }
        };

        let mut comments = vec![format!("Grisbi transaction {}", txn.id)];
        if let Some(notes) = &txn.notes {
            comments.extend(notes.lines().map(str::to_string));
        }

        let mut postings = Vec::new();
        if txn.is_split {
            comments.push(format!(
                "Split total {}",
                Amount::money(book.symbol(txn.currency), txn.amount)
            ));
            postings.push(self.account_leg(txn).with_references(refs(&[txn])));
            for child_id in txn.children.values() {
                let child = book.transaction(*child_id);
                match child.contra {
                    None => postings.push(self.category_leg(child).with_references(refs(&[child]))),
                    Some(contra_id) => {
                        let contra = book.transaction(contra_id);
                        postings.push(
                            self.account_leg(contra)
                                .with_references(refs(&[child, contra]))
                                .with_note(format!("Grisbi transaction {}", contra.id)),
                        );
                    }
                }
            }
        } else if let Some(contra_id) = txn.contra {
            let contra = book.transaction(contra_id);
            postings.push(self.account_leg(txn).with_references(refs(&[txn])));
            postings.push(
                self.account_leg(contra)
                    .with_references(refs(&[contra]))
                    .with_note(format!("Grisbi transaction {}", contra.id)),
            );
        } else {
            postings.push(self.account_leg(txn).with_references(refs(&[txn])));
            postings.push(self.category_leg(txn));
        }

        Entry {
            date: txn.date,
            code,
            payee: txn.party.map(|p| book.party(p).name.as_str()),
            comments,
            postings,
        }
    }

    /// The record's amount in its account's currency
    fn account_leg(&self, txn: &Transaction) -> Posting<'a> {
        let account = self.book.account(txn.account);
        let rate = txn.effective_rate(account.currency);
        Posting::new(account.ledger_name(), txn.reconciled).with_amount(Amount::money(
            self.book.symbol(account.currency),
            txn.amount * rate,
        ))
    }

    /// The other side of the record, in the record's own currency
    fn category_leg(&self, txn: &Transaction) -> Posting<'a> {
        let book = self.book;
        let account = book.account(txn.account);
        let posting = Posting::new(self.category_name(txn), txn.reconciled)
            .with_amount(Amount::money(book.symbol(txn.currency), -txn.amount));
        if txn.currency == account.currency {
            posting
        } else {
            posting.with_price(Amount::rate(
                book.symbol(account.currency),
                txn.effective_rate(account.currency),
            ))
        }
    }

    fn category_name(&self, txn: &Transaction) -> String {
        let Some(category) = txn.category.map(|id| self.book.category(id)) else {
            return UNCATEGORISED.to_string();
        };
        let mut name = format!("{}:{}", category.ledger_root(), category.name);
        if let Some(sub) = txn.sub_category {
            name.push(':');
            name.push_str(&self.book.sub_category(sub).name);
        }
        name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collapse::collapse;
    use crate::testutil::*;
    use crate::validate::validate;
    use std::str::FromStr;

    fn lines(lines: &[&str]) -> String {
        let mut out = lines.join("\n");
        out.push('\n');
        out
    }

    fn render(xml: String) -> String {
        let mut book = book_from(xml);
        let report = validate(&book);
        assert!(report.is_valid(), "{:?}", report.findings);
        collapse(&mut book);
        let config = LedgerConfig::default();
        LedgerWriter::new(&book, &config).render_to_string().unwrap()
    }

    fn with(extra: Vec<String>) -> String {
        let mut records = base_records();
        records.extend(extra);
        document(&records)
    }

    #[test]
    fn test_split_with_transfer_journal() {
        let expected = lines(&[
            "commodity $",
            "\tnote Canadian Dollar",
            "",
            "commodity USD",
            "\tnote US Dollar",
            "",
            "account Assets:Chequing",
            "\tassert commodity == \"$\"",
            "\tnote Account number 00042-123456",
            "",
            "account Assets:Savings",
            "\tassert commodity == \"$\"",
            "",
            "account Liabilities:Visa",
            "\tassert commodity == \"$\"",
            "",
            "account Equity:Opening Balance",
            "",
            "2021-01-10 Opening Balance",
            "\t* Assets:Chequing  $100.00",
            "\tEquity:Opening Balance",
            "",
            "2021-01-10 Corner Store",
            "\t; Grisbi transaction 3",
            "\t; Split total $-50.00",
            "\tAssets:Chequing  $-50.00",
            "\tExpenses:Food:Groceries  $30.00",
            "\tAssets:Savings  $20.00",
            "\t; Grisbi transaction 7",
        ]);
        assert_eq!(render(split_with_transfer_fixture()), expected);
    }

    #[test]
    fn test_opening_balance_dated_on_earliest_transaction() {
        let output = render(with(vec![
            Txn::new(2, 2, "3/1/2021", "-5.00").party(1).category(1).build(),
            Txn::new(3, 1, "1/4/2021", "-5.00").party(1).category(1).build(),
        ]));
        assert!(output.contains(&lines(&[
            "account Equity:Opening Balance",
            "",
            "2021-01-04 Opening Balance",
            "\t* Assets:Chequing  $100.00",
            "\tEquity:Opening Balance",
        ])));
    }

    #[test]
    fn test_opening_balance_without_transactions() {
        let output = render(with(vec![]));
        assert!(output.ends_with(&lines(&[
            "account Equity:Opening Balance",
            "",
            "1970-01-01 Opening Balance",
            "\t* Assets:Chequing  $100.00",
            "\tEquity:Opening Balance",
        ])));

        let mut config = LedgerConfig::default();
        config.opening_balance_account = "Equity:Start".to_string();
        config.opening_balance_payee = "Start".to_string();
        config.fallback_opening_date = NaiveDate::from_ymd_opt(2020, 12, 31).unwrap();
        let book = book_from(with(vec![]));
        let output = LedgerWriter::new(&book, &config).render_to_string().unwrap();
        assert!(output.contains("account Equity:Start\n"));
        assert!(output.ends_with(&lines(&[
            "2020-12-31 Start",
            "\t* Assets:Chequing  $100.00",
            "\tEquity:Start",
        ])));
    }

    #[test]
    fn test_no_opening_balance_when_all_zero() {
        let xml = document(&[
            currency(1, "Euro", "€", "EUR"),
            account(1, "Wallet", 1, 1, "0.00"),
        ]);
        let output = render(xml);
        assert_eq!(
            output,
            lines(&[
                "commodity €",
                "\tnote Euro",
                "",
                "account Assets:Wallet",
                "\tassert commodity == \"€\"",
            ])
        );
    }

    #[test]
    fn test_transfer_renders_both_legs() {
        let output = render(with(vec![
            Txn::new(5, 1, "2/1/2021", "-100.00").party(3).contra(9).build(),
            Txn::new(9, 2, "2/1/2021", "100.00").party(3).contra(5).build(),
        ]));
        assert!(output.ends_with(&lines(&[
            "2021-02-01 Bank",
            "\t; Grisbi transaction 5",
            "\tAssets:Chequing  $-100.00",
            "\tAssets:Savings  $100.00",
            "\t; Grisbi transaction 9",
        ])));
    }

    #[test]
    fn test_plain_transaction_with_notes() {
        let output = render(with(vec![Txn::new(1, 3, "4/2/2021", "-12.34")
            .party(1)
            .category(1)
            .sub_category(1)
            .notes("Weekly shop")
            .build()]));
        assert!(output.ends_with(&lines(&[
            "2021-04-02 Corner Store",
            "\t; Grisbi transaction 1",
            "\t; Weekly shop",
            "\tLiabilities:Visa  $-12.34",
            "\tExpenses:Food:Groceries  $12.34",
        ])));
    }

    #[test]
    fn test_income_category_leg() {
        let output = render(with(vec![Txn::new(1, 1, "4/2/2021", "2000.00")
            .party(2)
            .category(2)
            .build()]));
        assert!(output.contains("\tIncome:Salary  $-2000.00\n"));
    }

    #[test]
    fn test_foreign_currency_conversion() {
        let output = render(with(vec![
            Txn::new(1, 1, "5/1/2021", "-10.00")
                .party(1)
                .category(1)
                .currency(2, "1.25", false)
                .build(),
            Txn::new(2, 1, "5/2/2021", "-10.00")
                .party(1)
                .category(1)
                .currency(2, "1.25", true)
                .build(),
        ]));
        assert!(output.contains(&lines(&[
            "\tAssets:Chequing  $-12.50",
            "\tExpenses:Food  USD10.00 @ $1.25",
        ])));
        assert!(output.contains(&lines(&[
            "\tAssets:Chequing  $-8.00",
            "\tExpenses:Food  USD10.00 @ $0.8",
        ])));
    }

    #[test]
    fn test_single_bank_reference_becomes_code() {
        let output = render(with(vec![
            Txn::new(5, 1, "2/1/2021", "-100.00")
                .party(3)
                .contra(9)
                .bank_reference("T-1")
                .build(),
            Txn::new(9, 2, "2/1/2021", "100.00")
                .party(3)
                .contra(5)
                .bank_reference("T-1")
                .build(),
        ]));
        assert!(output.contains("2021-02-01 (T-1) Bank\n"));
        assert!(!output.contains(" ; T-1"));
    }

    #[test]
    fn test_distinct_bank_references_move_to_postings() {
        let output = render(with(vec![
            Txn::new(5, 1, "2/1/2021", "-100.00")
                .party(3)
                .contra(9)
                .bank_reference("A1")
                .build(),
            Txn::new(9, 2, "2/1/2021", "100.00")
                .party(3)
                .contra(5)
                .bank_reference("B2")
                .build(),
        ]));
        assert!(output.contains(&lines(&[
            "2021-02-01 Bank",
            "\t; Grisbi transaction 5",
            "\tAssets:Chequing  $-100.00 ; A1",
            "\tAssets:Savings  $100.00 ; B2",
        ])));
    }

    #[test]
    fn test_reconciliation_markers() {
        let output = render(with(vec![
            reconcile(1, "R1", 1, "1/31/2021", "70.00"),
            reconcile(2, "R2", 1, "(null)", "60.00"),
            Txn::new(1, 1, "1/5/2021", "-10.00").party(1).category(1).reconciled(1).build(),
            Txn::new(2, 1, "1/6/2021", "-20.00").party(1).category(1).reconciled(1).build(),
            Txn::new(3, 1, "2/3/2021", "-10.00").party(1).category(1).reconciled(2).build(),
        ]));

        let r1 = lines(&[
            "2021-01-31 Reconciliation",
            "\t; Grisbi reconciliation R1",
            "\t; Covers Grisbi transaction 1",
            "\t; Covers Grisbi transaction 2",
            "\t* Assets:Chequing  $0.00 = $70.00",
        ]);
        let r2 = lines(&[
            "2021-02-03 Reconciliation",
            "\t; Grisbi reconciliation R2",
            "\t; Covers Grisbi transaction 3",
            "\t* Assets:Chequing  $0.00 = $60.00",
        ]);
        assert_eq!(output.matches("Reconciliation\n").count(), 2);

        let second = output.find("; Grisbi transaction 2").unwrap();
        let marker_one = output.find(&r1).unwrap();
        let third = output.find("; Grisbi transaction 3").unwrap();
        assert!(second < marker_one && marker_one < third);
        assert!(output.ends_with(&r2));
        assert!(output.contains("\t* Assets:Chequing  $-10.00\n\t* Expenses:Food  $10.00\n"));
    }

    #[test]
    fn test_unreconciled_entry_closes_marker() {
        let output = render(with(vec![
            reconcile(1, "R1", 1, "1/31/2021", "90.00"),
            Txn::new(1, 1, "1/5/2021", "-10.00").party(1).category(1).reconciled(1).build(),
            Txn::new(2, 1, "2/6/2021", "-20.00").party(1).category(1).build(),
            Txn::new(3, 1, "2/7/2021", "-5.00").party(1).category(1).build(),
        ]));
        let marker = lines(&[
            "2021-01-31 Reconciliation",
            "\t; Grisbi reconciliation R1",
            "\t; Covers Grisbi transaction 1",
            "\t* Assets:Chequing  $0.00 = $90.00",
        ]);
        assert_eq!(output.matches("Reconciliation\n").count(), 1);

        let first = output.find("; Grisbi transaction 1").unwrap();
        let marker_at = output.find(&marker).unwrap();
        let second = output.find("; Grisbi transaction 2").unwrap();
        assert!(first < marker_at && marker_at < second);
        assert!(output.ends_with("\tExpenses:Food  $5.00\n"));
    }

    #[test]
    fn test_reconciliation_tracked_per_account() {
        let output = render(with(vec![
            reconcile(1, "R1", 1, "1/31/2021", "90.00"),
            Txn::new(1, 1, "1/5/2021", "-10.00").party(1).category(1).reconciled(1).build(),
            Txn::new(2, 2, "1/6/2021", "-20.00").party(1).category(1).build(),
        ]));
        let marker_at = output.find("2021-01-31 Reconciliation\n").unwrap();
        let second = output.find("; Grisbi transaction 2").unwrap();
        assert!(second < marker_at);
        assert!(output.ends_with("\t* Assets:Chequing  $0.00 = $90.00\n"));
    }

    #[test]
    fn test_category_leg_without_category() {
        let book = book_from(with(vec![
            Txn::new(1, 1, "1/5/2021", "-10.00").party(1).build(),
        ]));
        let config = LedgerConfig::default();
        let output = LedgerWriter::new(&book, &config).render_to_string().unwrap();
        assert!(output.ends_with("\tAssets:Chequing  $-10.00\n\tExpenses:Uncategorised  $10.00\n"));
    }

    #[test]
    fn test_commodity_quoting() {
        assert_eq!(Commodity("$").to_string(), "$");
        assert_eq!(Commodity("€").to_string(), "€");
        assert_eq!(Commodity("USD").to_string(), "USD");
        assert_eq!(Commodity("R2").to_string(), "\"R2\"");
        assert_eq!(Commodity("US D").to_string(), "\"US D\"");
        assert_eq!(Commodity("Fr.").to_string(), "\"Fr.\"");

        let xml = document(&[
            currency(1, "Rand", "R2", "ZAR"),
            account(1, "Wallet", 1, 1, "5.00"),
        ]);
        let output = render(xml);
        assert!(output.starts_with("commodity \"R2\"\n"));
        assert!(output.contains("\tassert commodity == \"R2\"\n"));
        assert!(output.contains("\t* Assets:Wallet  \"R2\"5.00\n"));
    }

    #[test]
    fn test_money_amount_formatting() {
        let zero = Decimal::from_str("-0.00").unwrap();
        assert_eq!(Amount::money("$", zero).to_string(), "$0.00");
        let third = Decimal::from_str("3.335").unwrap();
        assert_eq!(Amount::money("$", third).to_string(), "$3.34");
        assert_eq!(Amount::money("$", Decimal::from(7)).to_string(), "$7.00");
        let rate = Decimal::from_str("1.2500").unwrap();
        assert_eq!(Amount::rate("$", rate).to_string(), "$1.25");
    }
}
