use crate::parser::error::*;
use crate::math::lexer::{Lexer, MathToken};
use crate::math::Expr;


#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Precedence {
    Lowest = 1,
    Sum = 2,
    Product = 3,
    Prefix = 4,
}

impl Precedence {
    fn of_token(token: &MathToken) -> Self {
        match token {
            MathToken::Plus | MathToken::Minus => Precedence::Sum,
            MathToken::Multiply | MathToken::Divide => Precedence::Product,
            _ => Precedence::Lowest
        }
    }
}


/// A Pratt parser for math macro bodies: integers, stats, `+ - * /` and
/// parentheses.
#[derive(Debug)]
pub struct MathParser<'t> {
    lexer: Lexer<'t>,
    current: MathToken<'t>,
    peek: MathToken<'t>
}

impl<'t> MathParser<'t> {
    /// Creates a parser for `input`.
    ///
    /// # Errors
    /// [`ParserError::Empty`] for blank input, or the first tokenizing error.
    ///
    /// # Examples
    /// ```
    /// use bracket_dice::{MathParser, ParserError};
    ///
    /// assert!(MathParser::new("{str} + 2").is_ok());
    ///
    /// let err = MathParser::new("  ").unwrap_err();
    /// assert!(matches!(err.err(), ParserError::Empty));
    /// ```
    pub fn new(input: &'t str) -> Result<Self> {
        let mut lexer = Lexer::new(input)?;
        let current = lexer.next_token().map_err(|err| err.at_pos(lexer.position))?;

        if current == MathToken::Eof {
            return Err(ParserError::Empty);
        }

        let peek = lexer.next_token().map_err(|err| err.at_pos(lexer.position))?;
        Ok(Self { lexer, current, peek })
    }

    /// Parses the whole input into an [`Expr`].
    ///
    /// # Errors
    /// Any syntax error, wrapped in [`ParserError::AtPosition`].
    ///
    /// # Examples
    /// ```
    /// use bracket_dice::{MathParser, ParserError};
    ///
    /// let expr = MathParser::new("1 + 2 * lvl").unwrap().parse().unwrap();
    /// assert_eq!(expr.to_string(), "(1 + (2 * {lvl}))");
    ///
    /// let err = MathParser::new("1 +").unwrap().parse().unwrap_err();
    /// assert!(matches!(err.err(), ParserError::UnexpectedPrefix(_)));
    /// ```
    pub fn parse(&mut self) -> Result<Expr> {
        let expr = self.parse_tokens(Precedence::Lowest)
            .map_err(|err| err.at_pos(self.lexer.position))?;

        if self.peek != MathToken::Eof {
            let token = format!("{:?}", self.peek);
            return Err(ParserError::UnexpectedInfix(token).at_pos(self.lexer.position));
        }

        Ok(expr)
    }

    fn next_token(&mut self) -> Result<()> {
        self.current = self.peek;
        self.peek = self.lexer.next_token()?;

        Ok(())
    }

    fn parse_tokens(&mut self, precedence: Precedence) -> Result<Expr> {
        let mut expr = self.parse_prefix()?;

        while self.peek != MathToken::Eof && precedence < self.peek_precedence() {
            self.next_token()?;
            expr = self.parse_infix(expr)?;
        }

        Ok(expr)
    }

    fn parse_prefix(&mut self) -> Result<Expr> {
        match self.current {
            MathToken::Number(v) => Ok(v.into()),

            MathToken::Stat(name) => Ok(name.into()),

            MathToken::Minus => {
                self.next_token()?;
                let operand = self.parse_tokens(Precedence::Prefix)?;
                Ok(Expr::neg(operand))
            },

            MathToken::Plus => {
                self.next_token()?;
                let operand = self.parse_tokens(Precedence::Prefix)?;
                Ok(Expr::pos(operand))
            },

            MathToken::LeftParenthesis => {
                self.next_token()?;
                let expr = self.parse_tokens(Precedence::Lowest)?;

                if self.peek != MathToken::RightParenthesis {
                    return Err(ParserError::UnclosedParenthesis);
                }

                self.next_token()?;
                Ok(expr)
            },

            other => Err(ParserError::UnexpectedPrefix(format!("{other:?}")))
        }
    }

    fn parse_infix(&mut self, left: Expr) -> Result<Expr> {
        let op = self.current;

        match op {
            MathToken::Plus | MathToken::Minus | MathToken::Multiply | MathToken::Divide => {
                self.next_token()?;
                let right = self.parse_tokens(Precedence::of_token(&op))?;

                match op {
                    MathToken::Plus => Ok(Expr::add(left, right)),
                    MathToken::Minus => Ok(Expr::sub(left, right)),
                    MathToken::Multiply => Ok(Expr::mul(left, right)),
                    _ => Ok(Expr::div(left, right))
                }
            },
            other => Err(ParserError::UnexpectedInfix(format!("{other:?}")))
        }
    }

    fn peek_precedence(&self) -> Precedence {
        Precedence::of_token(&self.peek)
    }
}


/// Parses a math macro body into an [`Expr`].
///
/// # Errors
/// Same as [`MathParser::new`] and [`MathParser::parse`].
pub fn parse_math(input: &str) -> Result<Expr> {
    let mut parser = MathParser::new(input)?;
    parser.parse()
}


#[cfg(test)]
mod test {
    use proptest::prelude::*;
    use super::*;
    use crate::NoStats;

    fn value(input: &str) -> i32 {
        parse_math(input).unwrap().evaluate(&NoStats).unwrap()
    }

    proptest! {
        #[test]
        fn test_precedence_consistency(
            a in -100i32..=100,
            b in -100i32..=100,
            c in -100i32..=100
        ) {
            prop_assert_eq!(value(&format!("{a} + {b} * {c}")), a + b * c);
            prop_assert_eq!(value(&format!("{a} * {b} + {c}")), a * b + c);
            prop_assert_eq!(value(&format!("({a} + {b}) * {c}")), (a + b) * c);
        }

        #[test]
        fn test_left_associativity(a in 1i32..=100, b in 1i32..=100, c in 1i32..=100) {
            prop_assert_eq!(value(&format!("{a} - {b} - {c}")), a - b - c);
            prop_assert_eq!(value(&format!("{a} / {b} / {c}")), a / b / c);
        }

        #[test]
        fn test_edge_case_white_space(input in "[ \\t\\n]+") {
            prop_assert!(matches!(MathParser::new(&input), Err(ParserError::Empty)));
        }
    }

    #[test]
    fn test_unary() {
        assert_eq!(value("-3 * 2"), -6);
        assert_eq!(value("--3"), 3);
        assert_eq!(value("+(4 - 6)"), -2);
    }

    #[test]
    fn test_division_by_zero() {
        assert_eq!(value("7 / 0"), 0);
        assert_eq!(value("7 / (2 - 2) + 1"), 1);
    }

    #[test]
    fn test_stat_references() {
        let expr = parse_math("{str mod} * 2 + lvl").unwrap();
        assert_eq!(expr.stats(), vec!["str mod", "lvl"]);
    }

    #[test]
    fn test_unclosed_parenthesis() {
        let err = parse_math("(1 + 2").unwrap_err();
        assert_eq!(err.err(), &ParserError::UnclosedParenthesis);
    }

    #[test]
    fn test_trailing_tokens() {
        let err = parse_math("1 2").unwrap_err();
        assert!(matches!(err.err(), ParserError::UnexpectedInfix(_)));
        assert_eq!(err.pos(), Some(&2));
    }

    #[test]
    fn test_invalid_character_position() {
        let err = parse_math("1 + #").unwrap_err();
        assert_eq!(err.err(), &ParserError::Token('#'));
        assert_eq!(err.pos(), Some(&4));
    }
}
