use crate::parser::ParserError;


/// Errors raised while building, rolling or evaluating an expression.
///
/// Every variant is local to the expression that raised it: the engine logs it
/// and carries on with the next bracketed expression of the message.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
    /// The roll configuration cannot be rolled (e.g. a fixed value outside the die faces).
    #[error("Invalid roll: {0}")]
    InvalidRoll(String),

    /// A die count, die size or keep/drop count of zero.
    #[error("Zero value not allowed")]
    ZeroValue,

    /// An exploding die kept qualifying past the configured chain length.
    #[error("Too many explosions, chain stopped after {0} extra dice")]
    TooManyExplosions(usize),

    /// A repeat shorthand asked for more rolls than allowed.
    #[error("Too many repeated rolls: {requested} requested, at most {limit} allowed")]
    TooManyRepeats {
        /// Rolls asked for by the shorthand.
        requested: u32,
        /// Configured maximum.
        limit: u16
    },

    /// A math expression referenced a stat the lookup could not resolve to a number.
    #[error("Unknown stat: {0}")]
    UnknownStat(String),

    /// A table macro body does not follow the table grammar.
    #[error("Invalid table: {0}")]
    InvalidTable(String),

    /// A verbosity name that is not one of the rendering levels.
    #[error("Unknown verbosity: {0}")]
    UnknownVerbosity(String),

    /// The expression text could not be parsed.
    #[error("Parser error - {0}")]
    ParserError(#[from] ParserError)
}
