//! Maps a bank transaction onto the counterparty account.
//!
//! Steps are tried in a fixed order and the first one producing an account
//! wins:
//!
//! 1. the bank's fee hook, giving the bank fee account,
//! 2. a counterparty that is an account path, giving an external transfer
//!    account under `Expenses` for debits or `Income` for credits,
//! 3. the keyword rule table,
//! 4. the income rule table, only for credits,
//! 5. the fallback account.
//!
//! Classification never fails.

pub mod fees;
pub mod rules;

use crate::account::AccountPath;
use crate::config::Config;
use crate::transaction::{Direction, Transaction};

use fees::{FeeDetector, KeywordFees};
use rules::Subject;

use std::collections::HashMap;

/// Identifies the bank a transaction comes from, used to pick its fee hook.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BankContext {
    name: String,
}

impl BankContext {
    pub fn new(name: &str) -> Self {
        BankContext {
            name: name.trim().to_uppercase(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Step {
    Fee,
    Transfer,
    Rule,
    Income,
    Fallback,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Classification {
    pub account: AccountPath,
    pub step: Step,
    /// Name of the matching rule for [`Step::Rule`] and [`Step::Income`].
    pub rule: Option<String>,
}

impl Classification {
    fn new(account: &AccountPath, step: Step) -> Self {
        Classification {
            account: account.clone(),
            step,
            rule: None,
        }
    }
}

pub struct Classifier<'c> {
    config: &'c Config,
    default_hook: Box<dyn FeeDetector>,
    hooks: HashMap<String, Box<dyn FeeDetector>>,
}

impl<'c> Classifier<'c> {
    pub fn new(config: &'c Config) -> Self {
        Classifier {
            config,
            default_hook: Box::new(KeywordFees::standard()),
            hooks: HashMap::new(),
        }
    }

    /// Fee hook for transactions whose bank has none registered.
    pub fn with_default_hook<F: FeeDetector + 'static>(mut self, hook: F) -> Self {
        self.default_hook = Box::new(hook);
        self
    }

    /// Registers the fee hook of one bank, matched case-insensitively.
    pub fn with_fee_hook<F: FeeDetector + 'static>(mut self, bank: &str, hook: F) -> Self {
        self.hooks.insert(BankContext::new(bank).name, Box::new(hook));
        self
    }

    fn fee_hook(&self, bank: &BankContext) -> &dyn FeeDetector {
        self.hooks
            .get(bank.name())
            .map(|hook| &**hook)
            .unwrap_or(&*self.default_hook)
    }

    pub fn classify(&self, txn: &Transaction<'_>, bank: &BankContext) -> AccountPath {
        self.explain(txn, bank).account
    }

    /// Like [`classify`][Self::classify], also telling which step decided.
    pub fn explain(&self, txn: &Transaction<'_>, bank: &BankContext) -> Classification {
        let text = txn.normalized_text();
        let config = self.config;

        if self.fee_hook(bank).is_bank_fee(&text) {
            return Classification::new(config.bank_fee_account(), Step::Fee);
        }

        if let Some(account) = self.transfer_account(txn) {
            return Classification::new(&account, Step::Transfer);
        }

        let subject = Subject {
            text: &text,
            txn_type: txn.txn_type,
        };

        if let Some(rule) = config.rules().first_match(&subject) {
            return Classification {
                account: rule.target().clone(),
                step: Step::Rule,
                rule: Some(rule.name().to_string()),
            };
        }

        if txn.direction == Direction::Credit {
            if let Some(rule) = config.credit_rules().first_match(&subject) {
                return Classification {
                    account: rule.target().clone(),
                    step: Step::Income,
                    rule: Some(rule.name().to_string()),
                };
            }
        }

        Classification::new(config.fallback_account(), Step::Fallback)
    }

    fn transfer_account(&self, txn: &Transaction<'_>) -> Option<AccountPath> {
        let counterparty = txn.counterparty.trim();
        if counterparty.is_empty() {
            return None;
        }
        if let Err(e) = AccountPath::parse(counterparty) {
            log::debug!("counterparty `{}' is not a transfer: {}", counterparty, e);
            return None;
        }

        let base = match txn.direction {
            Direction::Debit => self.config.transfer_out_account(),
            Direction::Credit => self.config.transfer_in_account(),
        };
        Some(
            base.join(&payee_segment(txn.payee))
                .unwrap_or_else(|_| base.clone()),
        )
    }
}

/// Turns a payee name into an account segment: `Jane Doe & Co` gives `JANE-DOE--CO`.
fn payee_segment(payee: &str) -> String {
    let segment: String = payee
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("-")
        .to_uppercase()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '-')
        .collect();

    if segment.is_empty() {
        "Unknown".to_string()
    } else {
        segment
    }
}

#[cfg(test)]
mod tests {
    use crate::account::AccountPath;
    use crate::classify::{payee_segment, BankContext, Classifier, Step};
    use crate::classify::fees::KeywordFees;
    use crate::config::Config;
    use crate::transaction::{Direction, Transaction};

    use anyhow::Result;

    fn seb() -> BankContext {
        BankContext::new("SEB")
    }

    #[test]
    fn test_payee_segment() {
        assert_eq!(payee_segment("Jane Doe & Co"), "JANE-DOE--CO");
        assert_eq!(payee_segment("  OÜ   Näide "), "O-NIDE");
        assert_eq!(payee_segment(""), "Unknown");
        assert_eq!(payee_segment("ÕÄÖ"), "Unknown");
    }

    #[test]
    fn test_bank_fee() -> Result<()> {
        let config = Config::standard()?;
        let classifier = Classifier::new(&config).with_fee_hook("seb", KeywordFees::for_bank("SEB"));

        let txn = Transaction::new(Direction::Debit).payee("SEB").explanation("Kuutasu");
        let result = classifier.explain(&txn, &seb());
        assert_eq!(result.account.as_str(), "Expenses:Bank:Fees");
        assert_eq!(result.step, Step::Fee);

        // without the SEB hook only fee keywords count
        let result = classifier.explain(&txn, &BankContext::default());
        assert_eq!(result.step, Step::Fallback);

        let txn = Transaction::new(Direction::Debit).explanation("Teenustasu 01.2024");
        assert_eq!(
            classifier.classify(&txn, &BankContext::default()).as_str(),
            "Expenses:Bank:Fees"
        );
        Ok(())
    }

    #[test]
    fn test_fee_before_keywords() -> Result<()> {
        let config = Config::standard()?;
        let classifier = Classifier::new(&config);
        let txn = Transaction::new(Direction::Debit).explanation("Rimi kaardi teenustasu");
        assert_eq!(classifier.classify(&txn, &seb()).as_str(), "Expenses:Bank:Fees");
        Ok(())
    }

    #[test]
    fn test_transfer() -> Result<()> {
        let config = Config::standard()?;
        let classifier = Classifier::new(&config);

        let out = Transaction::new(Direction::Debit)
            .payee("Jane Doe")
            .explanation("Selver")
            .counterparty("Assets:EE:LHV:1234");
        let result = classifier.explain(&out, &seb());
        assert_eq!(result.account.as_str(), "Expenses:External:JANE-DOE");
        assert_eq!(result.step, Step::Transfer);

        let incoming = Transaction::new(Direction::Credit).counterparty(" Assets:EE:LHV:1234 ");
        assert_eq!(
            classifier.classify(&incoming, &seb()).as_str(),
            "Income:External:Unknown"
        );
        Ok(())
    }

    #[test]
    fn test_invalid_counterparty_falls_through() -> Result<()> {
        let config = Config::standard()?;
        let classifier = Classifier::new(&config);
        let txn = Transaction::new(Direction::Debit)
            .payee("Selver AS")
            .counterparty("EE471010220123456789");
        let result = classifier.explain(&txn, &seb());
        assert_eq!(result.account.as_str(), "Expenses:Food:Groceries");
        assert_eq!(result.step, Step::Rule);
        assert_eq!(result.rule.as_deref(), Some("groceries"));
        Ok(())
    }

    #[test]
    fn test_keyword_table() -> Result<()> {
        let config = Config::standard()?;
        let classifier = Classifier::new(&config);
        let cases = [
            ("", "Kaart ...1234 CIRCLE  K TALLINN", "", "Expenses:Transportation:Fuel"),
            ("H&M", "", "", "Expenses:Clothing"),
            ("", "Spotify P2A4", "", "Expenses:Entertainment:Subscriptions"),
            ("Hotell Telegraaf", "", "", "Expenses:Travel:Accommodation"),
            ("Eesti Energia AS", "Arve 123", "", "Expenses:Utilities"),
            ("", "Kodu kindlustus", "", "Expenses:Insurance"),
            ("", "Tagasimakse", "L", "Liabilities:Loan"),
            ("", "Laenu lep. 99", "", "Liabilities:Loan"),
            ("Toidupank", "Annetus", "", "Expenses:Charity"),
        ];
        for (payee, explanation, txn_type, expected) in cases {
            let txn = Transaction::new(Direction::Debit)
                .payee(payee)
                .explanation(explanation)
                .txn_type(txn_type);
            assert_eq!(
                classifier.classify(&txn, &seb()).as_str(),
                expected,
                "{} / {}",
                payee,
                explanation
            );
        }
        Ok(())
    }

    #[test]
    fn test_rule_priority() -> Result<()> {
        let config = Config::standard()?;
        let classifier = Classifier::new(&config);
        let txn = Transaction::new(Direction::Debit).explanation("Neste kiosk / Selver");
        assert_eq!(
            classifier.classify(&txn, &seb()).as_str(),
            "Expenses:Food:Groceries"
        );
        Ok(())
    }

    #[test]
    fn test_income_only_for_credit() -> Result<()> {
        let config = Config::standard()?;
        let classifier = Classifier::new(&config);

        let salary = Transaction::new(Direction::Credit).explanation("Töötasu 03.2024");
        assert_eq!(classifier.classify(&salary, &seb()).as_str(), "Income:Salary");

        let interest = Transaction::new(Direction::Credit)
            .payee("SEB")
            .explanation("Intresside väljamaks");
        let result = classifier.explain(&interest, &seb());
        assert_eq!(result.account.as_str(), "Income:Interest");
        assert_eq!(result.step, Step::Income);

        let refund = Transaction::new(Direction::Debit).explanation("Palk");
        assert_eq!(classifier.classify(&refund, &seb()).as_str(), "Expenses:Unknown");
        Ok(())
    }

    #[test]
    fn test_totality() -> Result<()> {
        let config = Config::standard()?;
        let classifier = Classifier::new(&config);
        for direction in [Direction::Debit, Direction::Credit] {
            let result = classifier.explain(&Transaction::new(direction), &BankContext::default());
            assert_eq!(result.account.as_str(), "Expenses:Unknown");
            assert_eq!(result.step, Step::Fallback);
        }

        let classifier = classifier.with_fee_hook("SEB", KeywordFees::for_bank("SEB"));
        let odd = [
            ("---", "", "", "Foo:Bar"),
            ("", "   ", "??", "Assets"),
            ("\u{feff}", "\t\n", "L L", "EE471010220123456789"),
            ("Ülle Õun", "ÄÖ 12,50", "", ":::"),
        ];
        for bank in ["", "SEB", "ACME"] {
            for (payee, explanation, txn_type, counterparty) in odd {
                for direction in [Direction::Debit, Direction::Credit] {
                    let txn = Transaction::new(direction)
                        .payee(payee)
                        .explanation(explanation)
                        .txn_type(txn_type)
                        .counterparty(counterparty);
                    let result = classifier.explain(&txn, &BankContext::new(bank));
                    assert_eq!(
                        result.account.as_str(),
                        "Expenses:Unknown",
                        "payee `{}' counterparty `{}' bank `{}'",
                        payee,
                        counterparty,
                        bank
                    );
                    assert_eq!(result.step, Step::Fallback);
                }
            }
        }

        // a valid counterparty with an unusable payee still yields a valid account
        for payee in ["---", "", "@@@", "Ülle"] {
            let txn = Transaction::new(Direction::Credit)
                .payee(payee)
                .counterparty("Assets:EE:LHV:1234");
            let account = classifier.classify(&txn, &BankContext::new("ACME"));
            assert!(account.as_str().starts_with("Income:External:"));
            assert!(AccountPath::parse(account.as_str()).is_ok(), "{}", account);
        }
        Ok(())
    }

    #[test]
    fn test_custom_default_hook() -> Result<()> {
        let config = Config::standard()?;
        let classifier =
            Classifier::new(&config).with_default_hook(|text: &str| text.contains("kuutasu"));
        let txn = Transaction::new(Direction::Debit).explanation("Kuutasu");
        assert_eq!(classifier.classify(&txn, &seb()).as_str(), "Expenses:Bank:Fees");
        Ok(())
    }
}
