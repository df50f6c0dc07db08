use anyhow::anyhow;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    Debit,  // 'D', money leaves the account
    Credit, // 'C', money arrives
}

impl TryFrom<&str> for Direction {
    type Error = anyhow::Error;

    fn try_from(code: &str) -> Result<Self, Self::Error> {
        match code.trim() {
            "D" | "d" => Ok(Direction::Debit),
            "C" | "c" => Ok(Direction::Credit),
            other => Err(anyhow!("invalid debit/credit indicator `{}'", other)),
        }
    }
}

/// Bank transaction fields the classifier looks at. Never mutated.
#[derive(Clone, Debug, PartialEq)]
pub struct Transaction<'t> {
    pub payee: &'t str,
    pub explanation: &'t str,
    pub txn_type: &'t str,
    pub direction: Direction,
    /// Counterparty account, already in account path form when present.
    pub counterparty: &'t str,
}

impl<'t> Transaction<'t> {
    pub fn new(direction: Direction) -> Self {
        Transaction {
            payee: "",
            explanation: "",
            txn_type: "",
            direction,
            counterparty: "",
        }
    }

    pub fn payee(mut self, payee: &'t str) -> Self {
        self.payee = payee;
        self
    }

    pub fn explanation(mut self, explanation: &'t str) -> Self {
        self.explanation = explanation;
        self
    }

    pub fn txn_type(mut self, txn_type: &'t str) -> Self {
        self.txn_type = txn_type;
        self
    }

    pub fn counterparty(mut self, counterparty: &'t str) -> Self {
        self.counterparty = counterparty;
        self
    }

    /// Payee and explanation joined, lower-cased and whitespace collapsed.
    pub fn normalized_text(&self) -> String {
        normalize(&format!("{} {}", self.payee, self.explanation))
    }
}

pub fn normalize(text: &str) -> String {
    text.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

#[cfg(test)]
mod tests {
    use crate::transaction::{normalize, Direction, Transaction};

    #[test]
    fn parse_direction() {
        assert_eq!(Direction::try_from("D").unwrap(), Direction::Debit);
        assert_eq!(Direction::try_from(" C ").unwrap(), Direction::Credit);
        assert_eq!(
            format!("{}", Direction::try_from("X").unwrap_err()),
            "invalid debit/credit indicator `X'"
        );
    }

    #[test]
    fn normalize_text() {
        assert_eq!(normalize("  Circle\tK   TALLINN \n"), "circle k tallinn");
        assert_eq!(normalize("TÖÖTASU"), "töötasu");
        assert_eq!(normalize(""), "");
    }

    #[test]
    fn normalized_transaction_text() {
        let txn = Transaction::new(Direction::Debit)
            .payee("Rimi  Eesti")
            .explanation("Kaart ...1234 RIMI");
        assert_eq!(txn.normalized_text(), "rimi eesti kaart ...1234 rimi");
        assert_eq!(Transaction::new(Direction::Credit).normalized_text(), "");
    }
}
