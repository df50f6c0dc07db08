use crate::account::AccountPath;
use crate::transaction::normalize;

/// What a rule gets to look at.
#[derive(Clone, Copy, Debug)]
pub struct Subject<'a> {
    /// Normalised payee and explanation.
    pub text: &'a str,
    pub txn_type: &'a str,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Predicate {
    /// Any keyword occurring as a substring of the text.
    Keywords(Vec<String>),
    /// Exact transaction type code.
    TxnType(String),
    Any(Vec<Predicate>),
}

impl Predicate {
    pub fn keywords<I, S>(keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Predicate::Keywords(
            keywords
                .into_iter()
                .map(|k| normalize(k.as_ref()))
                .filter(|k| !k.is_empty())
                .collect(),
        )
    }

    pub fn matches(&self, subject: &Subject<'_>) -> bool {
        match self {
            Predicate::Keywords(keywords) => keywords.iter().any(|k| subject.text.contains(k.as_str())),
            Predicate::TxnType(code) => subject.txn_type.trim() == code,
            Predicate::Any(predicates) => predicates.iter().any(|p| p.matches(subject)),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Rule {
    name: String,
    predicate: Predicate,
    target: AccountPath,
}

impl Rule {
    pub fn new(name: &str, predicate: Predicate, target: AccountPath) -> Self {
        Rule {
            name: name.to_string(),
            predicate,
            target,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn target(&self) -> &AccountPath {
        &self.target
    }

    pub fn matches(&self, subject: &Subject<'_>) -> bool {
        self.predicate.matches(subject)
    }
}

/// Ordered rules, the first match wins.
///
/// Insertion order is priority: a rule pushed later never shadows one
/// pushed earlier, whatever their keywords have in common.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RuleSet {
    rules: Vec<Rule>,
}

impl RuleSet {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn push(&mut self, rule: Rule) {
        self.rules.push(rule);
    }

    pub fn first_match(&self, subject: &Subject<'_>) -> Option<&Rule> {
        self.rules.iter().find(|rule| rule.matches(subject))
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Rule> {
        self.rules.iter()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

/// Builds a [`RuleSet`] from `name => "Target:Account" : predicate` lines,
/// in priority order.
#[macro_export]
macro_rules! rule_set {
    ($($name:literal => $target:literal : $predicate:expr),* $(,)?) => {{
        let mut rules = $crate::classify::rules::RuleSet::new();
        $(
            rules.push($crate::classify::rules::Rule::new(
                $name,
                $predicate,
                $crate::account::AccountPath::parse($target)?,
            ));
        )*
        rules
    }};
}
