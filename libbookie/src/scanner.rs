use crate::account::AccountPath;
use crate::parser;
use crate::statement::Statement;

use std::collections::{btree_map, BTreeMap, BTreeSet};

/// Accounts referenced by postings, with every currency seen for each.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Discovered {
    accounts: BTreeMap<AccountPath, BTreeSet<String>>,
}

impl Discovered {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn insert(&mut self, account: AccountPath, currency: Option<&str>) {
        let currencies = self.accounts.entry(account).or_default();
        if let Some(currency) = currency {
            currencies.insert(currency.to_string());
        }
    }

    pub fn contains(&self, account: &AccountPath) -> bool {
        self.accounts.contains_key(account)
    }

    pub fn currencies(&self, account: &AccountPath) -> Option<&BTreeSet<String>> {
        self.accounts.get(account)
    }

    pub fn accounts(&self) -> impl Iterator<Item = &AccountPath> {
        self.accounts.keys()
    }

    pub fn iter(&self) -> btree_map::Iter<'_, AccountPath, BTreeSet<String>> {
        self.accounts.iter()
    }

    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }
}

impl FromIterator<(AccountPath, String)> for Discovered {
    fn from_iter<T: IntoIterator<Item = (AccountPath, String)>>(iter: T) -> Self {
        let mut discovered = Discovered::new();
        for (account, currency) in iter {
            discovered.insert(account, Some(&currency));
        }
        discovered
    }
}

/// Collects every account used by a posting line of `input`.
///
/// Lines that are not postings are skipped, and so are postings whose
/// account does not start with a known category.
pub fn scan(input: &str) -> Discovered {
    let mut discovered = Discovered::new();
    let mut rejected = 0;

    for (lineno, statement) in parser::statements(input) {
        if let Statement::Posting { account, amount } = statement {
            match AccountPath::parse(account) {
                Ok(account) => discovered.insert(account, Some(amount.currency())),
                Err(e) => {
                    rejected += 1;
                    log::debug!("line {}: ignoring account `{}': {}", lineno, account, e);
                }
            }
        }
    }

    if rejected > 0 {
        log::debug!("{} postings with unrecognised accounts ignored", rejected);
    }
    discovered
}
