use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

use anyhow::anyhow;

/// Top level segment of every account path.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Category {
    Assets,
    Liabilities,
    Income,
    Expenses,
    Equity,
}

impl Category {
    /// The fixed section order of generated output.
    pub const ORDER: [Category; 5] = [
        Category::Assets,
        Category::Liabilities,
        Category::Income,
        Category::Expenses,
        Category::Equity,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Assets => "Assets",
            Category::Liabilities => "Liabilities",
            Category::Income => "Income",
            Category::Expenses => "Expenses",
            Category::Equity => "Equity",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl TryFrom<&str> for Category {
    type Error = anyhow::Error;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        match s {
            "Assets" => Ok(Category::Assets),
            "Liabilities" => Ok(Category::Liabilities),
            "Income" => Ok(Category::Income),
            "Expenses" => Ok(Category::Expenses),
            "Equity" => Ok(Category::Equity),
            _ => Err(anyhow!("`{}' is not an account category", s)),
        }
    }
}

/// A colon delimited account name, e.g. `Expenses:Food:Groceries`.
///
/// The first segment is always one of the five [`Category`] values and at
/// least one more segment follows it. Equality and ordering compare the
/// full name as a string.
#[derive(Clone, Debug)]
pub struct AccountPath {
    category: Category,
    name: String,
}

fn valid_segment(segment: &str) -> bool {
    !segment.is_empty()
        && segment
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

impl AccountPath {
    pub fn parse(s: &str) -> anyhow::Result<AccountPath> {
        s.try_into()
    }

    pub fn category(&self) -> Category {
        self.category
    }

    pub fn as_str(&self) -> &str {
        &self.name
    }

    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.name.split(':')
    }

    /// Appends one segment, e.g. `Expenses:External` + `ACME` gives
    /// `Expenses:External:ACME`.
    pub fn join(&self, segment: &str) -> anyhow::Result<AccountPath> {
        if !valid_segment(segment) {
            return Err(anyhow!(
                "`{}' is not a valid segment for account `{}'",
                segment,
                self.name
            ));
        }
        Ok(AccountPath {
            category: self.category,
            name: format!("{}:{}", self.name, segment),
        })
    }
}

impl TryFrom<&str> for AccountPath {
    type Error = anyhow::Error;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        let mut segments = s.split(':');
        let category = segments
            .next()
            .ok_or_else(|| anyhow!("empty account"))
            .and_then(Category::try_from)?;

        let mut rest = 0;
        for segment in segments {
            if !valid_segment(segment) {
                return Err(anyhow!("input `{}' is not a valid token for Account", s));
            }
            rest += 1;
        }
        if rest == 0 {
            return Err(anyhow!("account `{}' has no sub account", s));
        }

        Ok(AccountPath {
            category,
            name: s.to_string(),
        })
    }
}

impl fmt::Display for AccountPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.name)
    }
}

impl PartialEq for AccountPath {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for AccountPath {}

impl Hash for AccountPath {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state)
    }
}

impl PartialOrd for AccountPath {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for AccountPath {
    fn cmp(&self, other: &Self) -> Ordering {
        self.name.cmp(&other.name)
    }
}

#[cfg(test)]
mod tests {
    use crate::account::{AccountPath, Category};
    use anyhow::Result;

    #[test]
    fn test_parse_account() -> Result<()> {
        let account = AccountPath::parse("Assets:EE:SEB:2010")?;
        assert_eq!(account.category(), Category::Assets);
        assert_eq!(
            account.segments().collect::<Vec<_>>(),
            vec!["Assets", "EE", "SEB", "2010"]
        );
        assert_eq!(format!("{}", account), "Assets:EE:SEB:2010");
        Ok(())
    }

    #[test]
    fn test_reject_unknown_category() {
        assert_eq!(
            format!("{}", AccountPath::parse("Foo:Bar").unwrap_err()),
            "`Foo' is not an account category"
        );
    }

    #[test]
    fn test_reject_malformed() {
        assert!(AccountPath::parse("").is_err());
        assert!(AccountPath::parse("Assets").is_err());
        assert!(AccountPath::parse("Assets:").is_err());
        assert!(AccountPath::parse("Assets::Cash").is_err());
        assert!(AccountPath::parse("Assets:Cash On Hand").is_err());
        assert!(AccountPath::parse("EE471010220123456789").is_err());
    }

    #[test]
    fn test_ordering_is_lexicographic() -> Result<()> {
        let mut accounts = vec![
            AccountPath::parse("Expenses:Food")?,
            AccountPath::parse("Assets:Cash")?,
            AccountPath::parse("Assets:Bank:SEB")?,
        ];
        accounts.sort();
        assert_eq!(
            accounts.iter().map(|a| a.as_str()).collect::<Vec<_>>(),
            vec!["Assets:Bank:SEB", "Assets:Cash", "Expenses:Food"]
        );
        Ok(())
    }

    #[test]
    fn test_padding() -> Result<()> {
        let account = AccountPath::parse("Income:Salary")?;
        assert_eq!(format!("[{:<15}]", account), "[Income:Salary  ]");
        Ok(())
    }

    #[test]
    fn test_join() -> Result<()> {
        let base = AccountPath::parse("Income:External")?;
        assert_eq!(base.join("JOHN-DOE")?.as_str(), "Income:External:JOHN-DOE");
        assert!(base.join("").is_err());
        assert!(base.join("a:b").is_err());
        Ok(())
    }
}
