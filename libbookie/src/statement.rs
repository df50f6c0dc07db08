use crate::amount::ParsedAmount;
use crate::parser::Rule;
use pest::iterators::Pair;

use std::convert::TryFrom;

/// A ledger line the scanner cares about.
///
/// Account tokens are kept as written; turning them into
/// [`AccountPath`][crate::account::AccountPath] is left to the consumer
/// so that unknown categories can be skipped instead of failing the line.
#[derive(Debug, PartialEq)]
pub enum Statement<'s> {
    Posting {
        account: &'s str,
        amount: ParsedAmount<'s>,
    },
    Open {
        date: &'s str,
        account: &'s str,
        currency: Option<&'s str>,
    },
}

macro_rules! next_str {
    ($pairs:ident, $what:literal) => {
        $pairs
            .next()
            .ok_or(anyhow::Error::msg(concat!("invalid next token, expected ", $what)))?
            .as_str()
    };
}

impl<'s> TryFrom<Pair<'s, Rule>> for Statement<'s> {
    type Error = anyhow::Error;

    fn try_from(pair: Pair<'s, Rule>) -> Result<Self, Self::Error> {
        let tag = pair.as_rule();
        let mut pairs = pair.into_inner();

        let stmt = match tag {
            Rule::posting => {
                let account = next_str!(pairs, "account");
                let amount = ParsedAmount::parse(
                    pairs
                        .next()
                        .ok_or(anyhow::Error::msg("invalid next token, expected amount"))?,
                )?;
                Self::Posting { account, amount }
            }
            Rule::open_directive => Self::Open {
                date: next_str!(pairs, "date"),
                account: next_str!(pairs, "account"),
                currency: pairs.next().map(|p| p.as_str()),
            },
            _ => {
                return Err(anyhow::Error::msg(format!(
                    "unexpected token: {}",
                    pairs.as_str()
                )))
            }
        };

        Ok(stmt)
    }
}

impl<'s> Statement<'s> {
    pub fn account(&self) -> &'s str {
        match self {
            Self::Posting { account, .. } => account,
            Self::Open { account, .. } => account,
        }
    }
}
