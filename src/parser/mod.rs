pub(crate) mod error;
mod tokenizer;
mod lexer;
mod parse;

#[cfg(test)]
pub(crate) mod str_test_strategies;

pub use error::ParserError;
pub use tokenizer::{PatternSet, PatternSetBuilder, Token};
pub use parse::parse_dice;
