use crate::account::AccountPath;
use crate::parser;
use crate::statement::Statement;

use std::collections::{btree_set, BTreeSet};

/// Accounts already declared with an `open` directive.
///
/// An empty registry is the normal first run state, not an error.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct OpenRegistry {
    accounts: BTreeSet<AccountPath>,
}

impl OpenRegistry {
    pub fn new() -> Self {
        Default::default()
    }

    /// Reads every well formed `open` directive of `input`; anything else is ignored.
    pub fn load(input: &str) -> Self {
        let mut registry = Self::new();
        for (lineno, statement) in parser::statements(input) {
            if let Statement::Open { account, .. } = statement {
                match AccountPath::parse(account) {
                    Ok(account) => registry.open(account),
                    Err(e) => log::debug!("line {}: ignoring open of `{}': {}", lineno, account, e),
                }
            }
        }
        registry
    }

    pub fn open(&mut self, account: AccountPath) {
        self.accounts.insert(account);
    }

    pub fn contains(&self, account: &AccountPath) -> bool {
        self.accounts.contains(account)
    }

    pub fn iter(&self) -> btree_set::Iter<'_, AccountPath> {
        self.accounts.iter()
    }

    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }
}
