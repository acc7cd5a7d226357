/// Errors raised while reading dice notation, math bodies or macro arguments.
///
/// Errors found at a known place in the input are wrapped in
/// [`ParserError::AtPosition`] with the byte offset; [`ParserError::err`]
/// and [`ParserError::pos`] take the pair apart again.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ParserError {
    /// Another error, with the byte offset it was found at.
    #[error("At position {0} - {1}")]
    AtPosition(usize, Box<ParserError>),

    /// No rule of the grammar matches the character.
    #[error("Unexpected character: {0}")]
    Token(char),

    /// A number too large for its field.
    #[error("Invalid number: {0}")]
    Number(#[from] std::num::ParseIntError),

    /// A die count, die size or keep/drop count of zero.
    #[error("Zero is not a valid count or size")]
    ZeroValue,

    /// A fixed roll outside `1..=sides`.
    #[error("Fixed roll {value} is not a face of a d{sides}")]
    FixedRoll { value: u16, sides: u16 },

    /// A dice part that cannot be built, such as more fixed rolls than dice.
    #[error("Invalid dice part: {0}")]
    InvalidPart(String),

    /// Blank input.
    #[error("Nothing to parse")]
    Empty,

    /// A `(` of a math body without its `)`.
    #[error("Parenthesis was not closed")]
    UnclosedParenthesis,

    /// A math token that cannot start an operand.
    #[error("Unexpected prefix: {0}")]
    UnexpectedPrefix(String),

    /// A math token that cannot follow an operand.
    #[error("Unexpected infix: {0}")]
    UnexpectedInfix(String),
}

impl ParserError {
    /// The error without its position.
    pub fn err(&self) -> &Self {
        match self {
            ParserError::AtPosition(_, err) => err.err(),
            other => other
        }
    }

    /// The byte offset, if one was attached.
    pub fn pos(&self) -> Option<&usize> {
        match self {
            ParserError::AtPosition(position, _) => Some(position),
            _ => None
        }
    }

    /// Attaches `position`, unless the error already has one.
    pub fn at_pos(self, position: usize) -> Self {
        match self {
            ParserError::AtPosition(_, _) => self,
            other => ParserError::AtPosition(position, Box::new(other))
        }
    }

    /// Moves an attached position `offset` bytes further, for errors found in
    /// a slice of the original input.
    pub(crate) fn shifted(self, offset: usize) -> Self {
        match self {
            ParserError::AtPosition(position, err) => ParserError::AtPosition(position + offset, err),
            other => other
        }
    }
}

pub type Result<T> = std::result::Result<T, ParserError>;
