mod lexer;
mod expr;
mod parse;

use std::collections::HashMap;
use crate::Error;

pub use expr::{Expr, UnaryOperator, BinaryOperator};
pub use parse::{MathParser, parse_math};


/// Source of character stats for math macros.
///
/// Values come back as the host stores them; the evaluator decides whether
/// they are numbers.
pub trait StatLookup {
    /// The raw value of stat `key`, if the character has it.
    fn stat(&self, key: &str) -> Option<String>;
}

/// Stat names are matched exactly first, then ignoring case.
impl StatLookup for HashMap<String, String> {
    fn stat(&self, key: &str) -> Option<String> {
        self.get(key)
            .or_else(|| self.iter().find(|(name, _)| name.eq_ignore_ascii_case(key)).map(|(_, value)| value))
            .cloned()
    }
}

/// Lookup for callers without a character: every stat is unknown.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoStats;

impl StatLookup for NoStats {
    fn stat(&self, _key: &str) -> Option<String> {
        None
    }
}


/// Parses and evaluates a math macro body in one go.
///
/// # Errors
/// [`Error::ParserError`] for malformed input, [`Error::UnknownStat`] for
/// stats the lookup cannot turn into numbers.
///
/// # Examples
/// ```
/// use std::collections::HashMap;
/// use bracket_dice::{evaluate_math, NoStats};
///
/// let stats = HashMap::from([("STR".to_string(), "4".to_string())]);
/// assert_eq!(evaluate_math("({str} + 1) * 2", &stats), Ok(10));
/// assert_eq!(evaluate_math("10 / 3", &NoStats), Ok(3));
/// assert!(evaluate_math("str", &NoStats).is_err());
/// ```
pub fn evaluate_math(input: &str, stats: &dyn StatLookup) -> Result<i32, Error> {
    parse_math(input)?.evaluate(stats)
}
