use crate::account::{AccountPath, Category};
use crate::config::Config;
use crate::registry::OpenRegistry;
use crate::scanner::Discovered;

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use indexmap::IndexMap;

use std::collections::BTreeSet;
use std::fmt;

pub const DATE_WIDTH: usize = 10;
pub const ACCOUNT_WIDTH: usize = 35;

/// One `open` line.
#[derive(Clone, Debug, PartialEq)]
pub struct Directive {
    pub date: NaiveDate,
    pub account: AccountPath,
    pub currency: String,
}

impl fmt::Display for Directive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:<dw$.dw$} open {:<aw$} {}",
            self.date.to_string(),
            self.account,
            self.currency,
            dw = DATE_WIDTH,
            aw = ACCOUNT_WIDTH,
        )
    }
}

/// Directives of one category, rendered under a `;; <Category> accounts` header.
#[derive(Clone, Debug, PartialEq)]
pub struct Section {
    pub category: Category,
    pub directives: Vec<Directive>,
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, ";; {} accounts", self.category)?;
        for directive in &self.directives {
            writeln!(f, "{}", directive)?;
        }
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Generated {
    /// Non empty sections, in category order.
    Sections(Vec<Section>),
    /// The ledger uses no account at all.
    NoAccountsDiscovered,
    /// Every discovered account is already open.
    NoNewAccounts,
}

impl Generated {
    pub fn count(&self) -> usize {
        match self {
            Generated::Sections(sections) => sections.iter().map(|s| s.directives.len()).sum(),
            _ => 0,
        }
    }

    /// Sections separated by a blank line, empty when nothing was generated.
    pub fn render(&self) -> String {
        match self {
            Generated::Sections(sections) => sections
                .iter()
                .map(|s| s.to_string())
                .collect::<Vec<_>>()
                .join("\n"),
            _ => String::new(),
        }
    }
}

/// Comment block placed above generated directives.
#[derive(Clone, Debug, PartialEq)]
pub struct Header {
    pub source: String,
    pub generated_on: DateTime<Utc>,
}

impl fmt::Display for Header {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, ";; Account opening directives")?;
        writeln!(f, ";; Generated from: {}", self.source)?;
        writeln!(
            f,
            ";; Generated on: {}",
            self.generated_on.to_rfc3339_opts(SecondsFormat::Secs, true)
        )?;
        writeln!(f)
    }
}

pub struct DirectiveGenerator<'c> {
    config: &'c Config,
}

impl<'c> DirectiveGenerator<'c> {
    pub fn new(config: &'c Config) -> Self {
        DirectiveGenerator { config }
    }

    /// Open directives for every discovered account not in `existing`,
    /// grouped by category and sorted by account within each group.
    pub fn generate(
        &self,
        discovered: &Discovered,
        existing: &OpenRegistry,
        open_date: NaiveDate,
    ) -> Generated {
        if discovered.is_empty() {
            return Generated::NoAccountsDiscovered;
        }

        let mut groups: IndexMap<Category, Vec<Directive>> = self
            .config
            .category_order()
            .iter()
            .map(|category| (*category, Vec::new()))
            .collect();

        for (account, currencies) in discovered.iter() {
            if existing.contains(account) {
                continue;
            }
            if let Some(group) = groups.get_mut(&account.category()) {
                group.push(Directive {
                    date: open_date,
                    account: account.clone(),
                    currency: self.primary_currency(currencies),
                });
            }
        }

        let sections: Vec<Section> = groups
            .into_iter()
            .filter(|(_, directives)| !directives.is_empty())
            .map(|(category, mut directives)| {
                directives.sort_by(|a, b| a.account.cmp(&b.account));
                Section {
                    category,
                    directives,
                }
            })
            .collect();

        if sections.is_empty() {
            return Generated::NoNewAccounts;
        }

        log::info!(
            "{} open directives generated",
            sections.iter().map(|s| s.directives.len()).sum::<usize>()
        );
        Generated::Sections(sections)
    }

    /// The default currency when the account used it, otherwise the
    /// smallest currency seen.
    fn primary_currency(&self, currencies: &BTreeSet<String>) -> String {
        let default = self.config.default_currency();
        if currencies.is_empty() || currencies.contains(default) {
            return default.to_string();
        }
        currencies
            .iter()
            .next()
            .cloned()
            .unwrap_or_else(|| default.to_string())
    }
}
