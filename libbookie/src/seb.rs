//! SEB Estonia account statement (`kontovv`) CSV import.
//!
//! Every row becomes a two posting ledger transaction between the statement
//! account and the counterparty account picked by the [`Classifier`].

use crate::account::AccountPath;
use crate::amount::Amount;
use crate::classify::fees::KeywordFees;
use crate::classify::{BankContext, Classifier};
use crate::config::Config;
use crate::directive::{Directive, ACCOUNT_WIDTH};
use crate::registry::OpenRegistry;
use crate::transaction::{Direction, Transaction};

use anyhow::{Context, Result};
use chrono::NaiveDate;
use indexmap::IndexMap;
use serde::Deserialize;

use std::fmt;

pub const BANK_NAME: &str = "SEB";
const HEADER_PREFIX: &str = "Kliendi konto;Dokumendi number";
const DATE_FORMAT: &str = "%d.%m.%Y";
const DEFAULT_CURRENCY: &str = "EUR";

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Row {
    #[serde(rename = "Kliendi konto")]
    client_account: String,
    #[serde(rename = "Kuupäev")]
    date: String,
    #[serde(rename = "Saaja/maksja konto")]
    counterparty_account: String,
    #[serde(rename = "Saaja/maksja nimi")]
    payee: String,
    #[serde(rename = "Deebet/Kreedit (D/C)")]
    debit_credit: String,
    #[serde(rename = "Summa")]
    amount: String,
    #[serde(rename = "Valuuta")]
    currency: String,
    #[serde(rename = "Arhiveerimistunnus")]
    reference: String,
    #[serde(rename = "Selgitus")]
    explanation: String,
    #[serde(rename = "Tüüp")]
    txn_type: String,
}

impl Row {
    fn is_empty(&self) -> bool {
        self.date.is_empty() && self.amount.is_empty() && self.client_account.is_empty()
    }

    fn narration(&self) -> String {
        let mut parts = Vec::new();
        if !self.explanation.is_empty() {
            parts.push(self.explanation.clone());
        }
        if !self.txn_type.is_empty() && self.txn_type != "MK" && self.txn_type != "H" {
            parts.push(format!("({})", self.txn_type));
        }
        if parts.is_empty() {
            return "SEB Transaction".to_string();
        }
        parts.join(" | ")
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Posting {
    pub account: AccountPath,
    pub amount: Amount,
}

/// An imported transaction.
#[derive(Clone, Debug, PartialEq)]
pub struct Entry {
    pub date: NaiveDate,
    pub payee: String,
    pub narration: String,
    pub link: Option<String>,
    pub postings: [Posting; 2],
}

fn quoted(s: &str) -> String {
    format!("\"{}\"", s.replace('\\', "\\\\").replace('"', "\\\""))
}

impl fmt::Display for Entry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} * {} {}",
            self.date.format("%Y-%m-%d"),
            quoted(&self.payee),
            quoted(&self.narration)
        )?;
        if let Some(link) = &self.link {
            write!(f, " ^{}", link)?;
        }
        writeln!(f)?;
        for posting in &self.postings {
            writeln!(
                f,
                "  {:<aw$} {}",
                posting.account,
                posting.amount,
                aw = ACCOUNT_WIDTH
            )?;
        }
        Ok(())
    }
}

pub struct SebImporter {
    account_prefix: AccountPath,
    open_accounts: bool,
}

impl SebImporter {
    pub fn new(account_prefix: AccountPath) -> Self {
        SebImporter {
            account_prefix,
            open_accounts: true,
        }
    }

    /// Whether [`open_directives`][Self::open_directives] emits anything, on by default.
    pub fn with_open_directives(mut self, enabled: bool) -> Self {
        self.open_accounts = enabled;
        self
    }

    /// Date of the latest transaction in the statement.
    pub fn date(entries: &[Entry]) -> Option<NaiveDate> {
        entries.iter().map(|e| e.date).max()
    }

    /// One `open` per posting account of `entries` missing from `existing`,
    /// dated at the account's first use with the currency of that posting.
    /// Accounts keep the order they were first seen in.
    pub fn open_directives(&self, entries: &[Entry], existing: &OpenRegistry) -> Vec<Directive> {
        if !self.open_accounts {
            return Vec::new();
        }

        let mut opens: IndexMap<&AccountPath, Directive> = IndexMap::new();
        for entry in entries {
            for posting in &entry.postings {
                if existing.contains(&posting.account) {
                    continue;
                }
                let directive = Directive {
                    date: entry.date,
                    account: posting.account.clone(),
                    currency: posting.amount.currency().to_string(),
                };
                match opens.get_mut(&posting.account) {
                    Some(open) if open.date > entry.date => *open = directive,
                    Some(_) => {}
                    None => {
                        opens.insert(&posting.account, directive);
                    }
                }
            }
        }

        log::debug!("{} accounts to open", opens.len());
        opens.into_values().collect()
    }

    /// Whether `input` looks like an SEB statement export.
    pub fn identify(input: &str) -> bool {
        strip_bom(input).starts_with(HEADER_PREFIX)
    }

    /// A classifier with the SEB fee hook registered.
    pub fn classifier(config: &Config) -> Classifier<'_> {
        Classifier::new(config).with_fee_hook(BANK_NAME, KeywordFees::for_bank(BANK_NAME))
    }

    /// `<prefix>:<last four characters of the client account>`.
    pub fn account(&self, client_account: &str) -> AccountPath {
        let client_account = client_account.trim();
        if client_account.is_empty() {
            return self.account_prefix.clone();
        }
        let chars: Vec<char> = client_account.chars().collect();
        let suffix: String = chars[chars.len().saturating_sub(4)..].iter().collect();
        self.account_prefix.join(&suffix).unwrap_or_else(|e| {
            log::debug!("using `{}' for client account: {}", self.account_prefix, e);
            self.account_prefix.clone()
        })
    }

    /// Reads every transaction row of `input`. Rows without a usable date or
    /// amount are skipped.
    pub fn extract(&self, input: &str, classifier: &Classifier<'_>) -> Result<Vec<Entry>> {
        let bank = BankContext::new(BANK_NAME);
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(b';')
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(strip_bom(input).as_bytes());

        let mut entries = Vec::new();
        for (idx, row) in reader.deserialize::<Row>().enumerate() {
            let row = row.with_context(|| format!("invalid SEB statement row {}", idx + 1))?;
            if row.is_empty() {
                continue;
            }

            let date = match NaiveDate::parse_from_str(&row.date, DATE_FORMAT) {
                Ok(date) => date,
                Err(e) => {
                    log::debug!("row {}: invalid date `{}': {}", idx + 1, row.date, e);
                    continue;
                }
            };

            let currency = if row.currency.is_empty() {
                DEFAULT_CURRENCY
            } else {
                row.currency.as_str()
            };
            let direction = Direction::try_from(row.debit_credit.as_str()).unwrap_or(Direction::Credit);
            let amount = match Amount::new(&row.amount, currency) {
                Ok(amount) if direction == Direction::Debit => -&amount,
                Ok(amount) => amount,
                Err(e) => {
                    log::debug!("row {}: {}", idx + 1, e);
                    continue;
                }
            };

            let txn = Transaction::new(direction)
                .payee(&row.payee)
                .explanation(&row.explanation)
                .txn_type(&row.txn_type)
                .counterparty(&row.counterparty_account);
            let counterparty = classifier.classify(&txn, &bank);

            entries.push(Entry {
                date,
                payee: row.payee.clone(),
                narration: row.narration(),
                link: Some(&row.reference)
                    .filter(|r| !r.is_empty())
                    .map(|r| format!("seb-{}", r)),
                postings: [
                    Posting {
                        account: self.account(&row.client_account),
                        amount: amount.clone(),
                    },
                    Posting {
                        account: counterparty,
                        amount: -&amount,
                    },
                ],
            });
        }

        log::info!("{} transactions imported", entries.len());
        Ok(entries)
    }
}

fn strip_bom(input: &str) -> &str {
    input.strip_prefix('\u{feff}').unwrap_or(input)
}

/// Open directives first, then the entries separated by blank lines.
pub fn render(opens: &[Directive], entries: &[Entry]) -> String {
    let mut out = String::new();
    for open in opens {
        out.push_str(&open.to_string());
        out.push('\n');
    }
    if !opens.is_empty() && !entries.is_empty() {
        out.push('\n');
    }
    out.push_str(
        &entries
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join("\n"),
    );
    out
}
