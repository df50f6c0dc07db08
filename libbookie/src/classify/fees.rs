use crate::transaction::normalize;

/// Per bank capability deciding whether a transaction is a bank fee.
///
/// `text` is the normalised payee and explanation of the transaction.
pub trait FeeDetector {
    fn is_bank_fee(&self, text: &str) -> bool;
}

impl<F> FeeDetector for F
where
    F: Fn(&str) -> bool,
{
    fn is_bank_fee(&self, text: &str) -> bool {
        self(text)
    }
}

/// Substring based fee detection.
///
/// A transaction is a fee when any indicator occurs in the text and no
/// exclusion does. Short indicators such as a bank name will also hit
/// unrelated words containing them.
#[derive(Clone, Debug, PartialEq)]
pub struct KeywordFees {
    indicators: Vec<String>,
    exclusions: Vec<String>,
}

const FEE_KEYWORDS: [&str; 2] = ["teenustasu", "intressi tulumaks"];
const INTEREST_PAYOUT: &str = "intresside väljamaks";

impl KeywordFees {
    pub fn new<I, E>(indicators: I, exclusions: E) -> Self
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
        E: IntoIterator,
        E::Item: AsRef<str>,
    {
        let normalized = |s: &str| Some(normalize(s)).filter(|s| !s.is_empty());
        KeywordFees {
            indicators: indicators
                .into_iter()
                .filter_map(|s| normalized(s.as_ref()))
                .collect(),
            exclusions: exclusions
                .into_iter()
                .filter_map(|s| normalized(s.as_ref()))
                .collect(),
        }
    }

    /// Service fees and interest income tax, never interest payouts.
    pub fn standard() -> Self {
        Self::new(FEE_KEYWORDS, [INTEREST_PAYOUT])
    }

    /// [`standard`][Self::standard] plus the bank's own name as an indicator.
    ///
    /// The name is looked up in the whole text, explanation included, so a
    /// card payment whose explanation mentions the bank (`Kaart ...1234 SEB
    /// Rimi`) counts as a fee even though the payee is a shop.
    pub fn for_bank(bank_name: &str) -> Self {
        let mut fees = Self::standard();
        let name = normalize(bank_name);
        if !name.is_empty() {
            fees.indicators.insert(0, name);
        }
        fees
    }
}

impl FeeDetector for KeywordFees {
    fn is_bank_fee(&self, text: &str) -> bool {
        self.indicators.iter().any(|i| text.contains(i.as_str()))
            && !self.exclusions.iter().any(|e| text.contains(e.as_str()))
    }
}
