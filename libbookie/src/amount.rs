use crate::parser::Rule;
use anyhow::{anyhow, Result};
use pest::iterators::Pair;

use std::fmt;

/// Amount as written on a posting line; the number may be elided.
#[derive(Debug, PartialEq)]
pub struct ParsedAmount<'s> {
    pub(crate) nominal: Option<&'s str>,
    pub(crate) currency: &'s str,
}

impl<'a> ParsedAmount<'a> {
    pub fn parse(token: Pair<'a, Rule>) -> Result<ParsedAmount<'a>> {
        match token.as_rule() {
            Rule::amount => {
                let mut amount = token.into_inner();
                Ok(Self {
                    nominal: Some(
                        amount
                            .next()
                            .ok_or(anyhow!("invalid nominal: '{}'", amount.as_str()))?
                            .as_str(),
                    ),
                    currency: amount
                        .next()
                        .ok_or(anyhow!("invalid currency: '{}'", amount.as_str()))?
                        .as_str(),
                })
            }
            Rule::currency => Ok(Self {
                nominal: None,
                currency: token.as_str(),
            }),
            _ => Err(anyhow!(
                "unexpected token for amount: '{}'",
                token.as_str()
            )),
        }
    }

    pub fn nominal(&self) -> Option<&str> {
        self.nominal
    }

    pub fn currency(&self) -> &str {
        self.currency
    }
}

/// Decimal amount kept in its textual form so nothing is lost to rounding.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Amount {
    number: String,
    currency: String,
}

impl Amount {
    /// Accepts both decimal separators, `12,50` and `12.50` are the same amount.
    pub fn new(number: &str, currency: &str) -> Result<Amount> {
        let number = number.trim().replace(',', ".");
        let digits = number.strip_prefix(['-', '+']).unwrap_or(&number);
        if digits.is_empty()
            || digits.starts_with('.')
            || digits.matches('.').count() > 1
            || !digits.chars().all(|c| c.is_ascii_digit() || c == '.')
        {
            return Err(anyhow!("invalid amount: '{}'", number));
        }
        Ok(Amount {
            number: digits.to_string(),
            currency: currency.to_string(),
        }
        .signed(number.starts_with('-')))
    }

    fn signed(mut self, negative: bool) -> Self {
        if negative && !self.is_zero() {
            self.number.insert(0, '-');
        }
        self
    }

    pub fn is_zero(&self) -> bool {
        self.number.chars().all(|c| c == '0' || c == '.' || c == '-')
    }

    pub fn is_negative(&self) -> bool {
        self.number.starts_with('-')
    }

    pub fn currency(&self) -> &str {
        &self.currency
    }
}

impl std::ops::Neg for &Amount {
    type Output = Amount;

    fn neg(self) -> Self::Output {
        let digits = self.number.trim_start_matches('-');
        Amount {
            number: digits.to_string(),
            currency: self.currency.clone(),
        }
        .signed(!self.is_negative())
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.number, self.currency)
    }
}

#[cfg(test)]
mod tests {
    use crate::amount::{Amount, ParsedAmount};
    use crate::parser::{LedgerParser, Rule};
    use pest::Parser;

    use anyhow::Result;

    #[test]
    fn parse_wrong_token() -> Result<()> {
        let mut tokens = LedgerParser::parse(Rule::account, "Assets:Checking")?;
        let amount = ParsedAmount::parse(tokens.next().unwrap());
        assert_eq!(
            format!("{}", amount.unwrap_err()),
            "unexpected token for amount: 'Assets:Checking'"
        );
        Ok(())
    }

    #[test]
    fn parse_amount() -> Result<()> {
        let mut tokens = LedgerParser::parse(Rule::amount, "-1,337.00 USD")?;
        let amount = ParsedAmount::parse(tokens.next().unwrap())?;
        assert_eq!(amount.nominal(), Some("-1,337.00"));
        assert_eq!(amount.currency(), "USD");
        Ok(())
    }

    #[test]
    fn parse_bare_currency() -> Result<()> {
        let mut tokens = LedgerParser::parse(Rule::currency, "EUR")?;
        let amount = ParsedAmount::parse(tokens.next().unwrap())?;
        assert_eq!(amount, ParsedAmount { nominal: None, currency: "EUR" });
        Ok(())
    }

    #[test]
    fn decimal_comma() -> Result<()> {
        assert_eq!(format!("{}", Amount::new("12,50", "EUR")?), "12.50 EUR");
        assert_eq!(format!("{}", Amount::new(" 0.01 ", "EUR")?), "0.01 EUR");
        Ok(())
    }

    #[test]
    fn negate_amount() -> Result<()> {
        let amount = Amount::new("0.01", "EUR")?;
        assert_eq!(format!("{}", -&amount), "-0.01 EUR");
        assert_eq!(format!("{}", -&(-&amount)), "0.01 EUR");
        assert_eq!(format!("{}", -&Amount::new("0.00", "EUR")?), "0.00 EUR");
        Ok(())
    }

    #[test]
    fn reject_garbage() {
        assert!(Amount::new("", "EUR").is_err());
        assert!(Amount::new("-", "EUR").is_err());
        assert!(Amount::new("1.2.3", "EUR").is_err());
        assert!(Amount::new("abc", "EUR").is_err());
        assert!(Amount::new(".5", "EUR").is_err());
    }
}
