//! Bookie - bookkeeping helpers for plain text ledgers
//! ---
//!
//! Two jobs, both pure functions of their input text:
//!
//! * discover every account used by the postings of a ledger file and emit the
//!   `open` directives still missing, grouped by category,
//! * classify bank transactions into ledger accounts with an ordered rule table.
//!

extern crate pest;
#[macro_use]
extern crate pest_derive;

/// Account paths such as `Assets:Bank:SEB` and their top level [`Category`][account::Category].
pub mod account;

mod amount;

/// Transaction classification, see [`Classifier`][classify::Classifier].
pub mod classify;

pub mod config;

/// `open` directive generation.
pub mod directive;

/// Line level ledger grammar.
pub mod parser;

pub mod registry;
pub mod scanner;

/// SEB Estonia statement import.
pub mod seb;

mod statement;
mod transaction;

pub use account::{AccountPath, Category};
pub use amount::Amount;
pub use classify::{BankContext, Classification, Classifier};
pub use config::Config;
pub use directive::{DirectiveGenerator, Generated, Header};
pub use registry::OpenRegistry;
pub use scanner::{scan, Discovered};
pub use statement::Statement;
pub use transaction::{Direction, Transaction};

use std::fmt;

/// Contextual error for ledger file handling.
/// LedgerError carries a static message, and an additional context value
/// of any type complying [std::fmt::Debug], typically the offending path.
#[derive(Debug)]
pub struct LedgerError<T: fmt::Debug>(&'static str, T);

impl LedgerError<()> {
    /// Create new error without any context.
    pub fn new(msg: &'static str) -> LedgerError<()> {
        LedgerError(msg, ())
    }

    /// Attach context to existing error.
    pub fn with_context<U: fmt::Debug>(self, ctx: U) -> LedgerError<U> {
        LedgerError(self.0, ctx)
    }
}

impl<T: fmt::Debug> LedgerError<T> {
    pub fn message(&self) -> &'static str {
        self.0
    }

    pub fn context(&self) -> &T {
        &self.1
    }
}

impl<T: fmt::Debug> fmt::Display for LedgerError<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {:?}", self.0, self.1)
    }
}

impl<T: fmt::Debug> std::error::Error for LedgerError<T> {}

/// The input ledger does not resolve to a readable file.
pub fn input_not_found<T: fmt::Debug>(path: T) -> LedgerError<T> {
    LedgerError::new("input file not found or unreadable").with_context(path)
}
