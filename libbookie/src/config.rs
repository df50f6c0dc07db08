use crate::account::{AccountPath, Category};
use crate::classify::rules::{Predicate, RuleSet};
use crate::rule_set;

use anyhow::{anyhow, Result};
use chrono::NaiveDate;

/// Everything the classifier and the directive generator are parameterised
/// with. Built once, then only read.
#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    category_order: [Category; 5],
    default_currency: String,
    open_date: NaiveDate,
    bank_fee_account: AccountPath,
    fallback_account: AccountPath,
    transfer_out_account: AccountPath,
    transfer_in_account: AccountPath,
    rules: RuleSet,
    credit_rules: RuleSet,
}

impl Config {
    /// The reference configuration: `EUR`, `1900-01-01` and the keyword
    /// tables for Estonian bank statements.
    pub fn standard() -> Result<Config> {
        let rules = rule_set! {
            "groceries" => "Expenses:Food:Groceries" :
                Predicate::keywords(["selver", "kiosk", "rimi", "maxima"]),
            "fuel" => "Expenses:Transportation:Fuel" :
                Predicate::keywords(["circle k", "neste", "alexela"]),
            "clothing" => "Expenses:Clothing" :
                Predicate::keywords(["takko", "h&m", "reserved"]),
            "subscriptions" => "Expenses:Entertainment:Subscriptions" :
                Predicate::keywords(["netflix", "apple", "spotify"]),
            "accommodation" => "Expenses:Travel:Accommodation" :
                Predicate::keywords(["hotell", "hotel"]),
            "utilities" => "Expenses:Utilities" :
                Predicate::keywords(["eesti energia", "telia", "elion"]),
            "insurance" => "Expenses:Insurance" :
                Predicate::keywords(["kindlustus", "poliis"]),
            "loan" => "Liabilities:Loan" :
                Predicate::Any(vec![Predicate::TxnType("L".to_string()), Predicate::keywords(["lep."])]),
            "charity" => "Expenses:Charity" :
                Predicate::keywords(["annetus", "annetamine"]),
        };

        let credit_rules = rule_set! {
            "interest" => "Income:Interest" : Predicate::keywords(["intresside väljamaks"]),
            "salary" => "Income:Salary" : Predicate::keywords(["puhkusetasu", "palk", "töötasu"]),
        };

        Ok(Config {
            category_order: Category::ORDER,
            default_currency: "EUR".to_string(),
            open_date: NaiveDate::from_ymd_opt(1900, 1, 1).ok_or(anyhow!("invalid date"))?,
            bank_fee_account: AccountPath::parse("Expenses:Bank:Fees")?,
            fallback_account: AccountPath::parse("Expenses:Unknown")?,
            transfer_out_account: AccountPath::parse("Expenses:External")?,
            transfer_in_account: AccountPath::parse("Income:External")?,
            rules,
            credit_rules,
        })
    }

    /// Overrides the currency used when a scanned account has none to offer.
    pub fn with_default_currency(mut self, currency: &str) -> Result<Self> {
        if currency.len() != 3 || !currency.chars().all(|c| c.is_ascii_uppercase()) {
            return Err(anyhow!(
                "`{}' is not a currency code, expected three uppercase letters",
                currency
            ));
        }
        self.default_currency = currency.to_string();
        Ok(self)
    }

    pub fn with_open_date(mut self, date: NaiveDate) -> Self {
        self.open_date = date;
        self
    }

    /// Replaces the keyword rule table.
    pub fn with_rules(mut self, rules: RuleSet) -> Self {
        self.rules = rules;
        self
    }

    pub fn category_order(&self) -> &[Category; 5] {
        &self.category_order
    }

    pub fn default_currency(&self) -> &str {
        &self.default_currency
    }

    pub fn open_date(&self) -> NaiveDate {
        self.open_date
    }

    pub fn bank_fee_account(&self) -> &AccountPath {
        &self.bank_fee_account
    }

    pub fn fallback_account(&self) -> &AccountPath {
        &self.fallback_account
    }

    pub fn transfer_out_account(&self) -> &AccountPath {
        &self.transfer_out_account
    }

    pub fn transfer_in_account(&self) -> &AccountPath {
        &self.transfer_in_account
    }

    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    pub fn credit_rules(&self) -> &RuleSet {
        &self.credit_rules
    }
}

#[cfg(test)]
mod tests {
    use crate::account::Category;
    use crate::classify::rules::{Predicate, Rule};
    use crate::config::Config;
    use chrono::NaiveDate;

    use anyhow::{anyhow, Result};

    #[test]
    fn standard_config() -> Result<()> {
        let config = Config::standard()?;
        assert_eq!(config.default_currency(), "EUR");
        assert_eq!(config.open_date().to_string(), "1900-01-01");
        assert_eq!(config.category_order()[1], Category::Liabilities);
        assert_eq!(
            config.rules().iter().map(|r| r.name()).collect::<Vec<_>>(),
            vec![
                "groceries",
                "fuel",
                "clothing",
                "subscriptions",
                "accommodation",
                "utilities",
                "insurance",
                "loan",
                "charity"
            ]
        );
        assert_eq!(config.credit_rules().len(), 2);
        Ok(())
    }

    #[test]
    fn override_defaults() -> Result<()> {
        let date = NaiveDate::from_ymd_opt(2020, 1, 1).ok_or(anyhow!("invalid date"))?;
        let config = Config::standard()?
            .with_default_currency("USD")?
            .with_open_date(date);
        assert_eq!(config.default_currency(), "USD");
        assert_eq!(config.open_date(), date);
        Ok(())
    }

    #[test]
    fn reject_bad_currency() -> Result<()> {
        for currency in ["usd", "EURO", "", "E1R"] {
            assert!(Config::standard()?.with_default_currency(currency).is_err());
        }
        Ok(())
    }

    #[test]
    fn extend_rules() -> Result<()> {
        let config = Config::standard()?;
        let mut rules = config.rules().clone();
        rules.push(Rule::new(
            "pharmacy",
            Predicate::keywords(["apteek"]),
            "Expenses:Health".try_into()?,
        ));
        let config = config.with_rules(rules);
        assert_eq!(config.rules().iter().last().map(|r| r.name()), Some("pharmacy"));
        Ok(())
    }
}
