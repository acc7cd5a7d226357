use once_cell::sync::Lazy;
use crate::parser::error::*;
use crate::parser::{PatternSet, Token};


#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Kind {
    Whitespace,
    Number,
    BracedStat,
    Stat,
    Plus,
    Minus,
    Multiply,
    Divide,
    LeftParenthesis,
    RightParenthesis
}

static MATH_PATTERNS: Lazy<PatternSet<Kind>> = Lazy::new(|| {
    PatternSet::builder()
        .skip(Kind::Whitespace, r"\s+")
        .rule(Kind::Number, r"\d+")
        .rule(Kind::BracedStat, r"\{\s*([^{}]*?)\s*\}")
        .rule(Kind::Stat, r"[A-Za-z_][\w.]*")
        .rule(Kind::Plus, r"\+")
        .rule(Kind::Minus, r"-")
        .rule(Kind::Multiply, r"\*")
        .rule(Kind::Divide, r"/")
        .rule(Kind::LeftParenthesis, r"\(")
        .rule(Kind::RightParenthesis, r"\)")
        .build()
        .expect("Failed to compile math token patterns")
});


#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum MathToken<'t> {
    Number(i32),
    Stat(&'t str),
    Plus,
    Minus,
    Multiply,
    Divide,
    LeftParenthesis,
    RightParenthesis,
    Eof,
}


#[derive(Debug)]
pub(crate) struct Lexer<'t> {
    tokens: Vec<Token<'t, Kind>>,
    index: usize,
    end: usize,
    pub position: usize,
}

impl<'t> Lexer<'t> {
    pub fn new(input: &'t str) -> Result<Self> {
        let tokens = MATH_PATTERNS.tokenize(input)?;
        Ok(Self { tokens, index: 0, end: input.len(), position: 0 })
    }

    pub fn next_token(&mut self) -> Result<MathToken<'t>> {
        let Some(token) = self.tokens.get(self.index) else {
            self.position = self.end;
            return Ok(MathToken::Eof);
        };

        self.index += 1;
        self.position = token.start;

        let math_token = match token.key {
            Kind::Number => MathToken::Number(token.text.parse()?),
            Kind::BracedStat => MathToken::Stat(token.group(1).unwrap_or_default()),
            Kind::Stat => MathToken::Stat(token.text),
            Kind::Plus => MathToken::Plus,
            Kind::Minus => MathToken::Minus,
            Kind::Multiply => MathToken::Multiply,
            Kind::Divide => MathToken::Divide,
            Kind::LeftParenthesis => MathToken::LeftParenthesis,
            Kind::RightParenthesis => MathToken::RightParenthesis,
            Kind::Whitespace => return self.next_token()
        };

        Ok(math_token)
    }
}
