use crate::statement::Statement;
use pest::Parser;

#[derive(Parser)]
#[grammar = "ledger.pest"]
pub struct LedgerParser;

/// Recognises a single ledger line.
///
/// Lines matching neither a posting nor an open directive yield `None`,
/// comments and everything else a ledger file may carry are expected here.
pub fn parse_line(line: &str) -> Option<Statement<'_>> {
    let mut pairs = match LedgerParser::parse(Rule::line, line) {
        Ok(pairs) => pairs,
        Err(_) => return None,
    };
    let pair = pairs.next()?;
    match Statement::try_from(pair) {
        Ok(statement) => Some(statement),
        Err(e) => {
            log::debug!("skipping line `{}': {}", line, e);
            None
        }
    }
}

/// Iterates every recognised statement of `input`, paired with its 1-based line number.
pub fn statements(input: &str) -> impl Iterator<Item = (usize, Statement<'_>)> {
    input
        .lines()
        .enumerate()
        .filter_map(|(idx, line)| parse_line(line).map(|s| (idx + 1, s)))
}
