use std::num::ParseIntError;
use std::str::FromStr;
use crate::parser::error::*;
use crate::parser::lexer::{tokenize, DiceToken};
use crate::parser::tokenizer::Token;
use crate::{Dice, DicePart, DiceTest, DropKeep, Error, ExplodeSpec, Manipulation, Sign, TestType, Threshold};


#[derive(Debug, Default)]
struct PartDraft {
    start: usize,
    count: u16,
    sides: u16,
    fixed_rolls: Vec<u16>,
    sign: Option<Sign>,
    modifier: Option<i32>,
    manipulations: Vec<Manipulation>,
    test: Option<DiceTest>,
    description: String
}

impl PartDraft {
    fn at(start: usize) -> Self {
        Self { start, ..Self::default() }
    }

    /// A die with nothing written after it yet.
    fn is_open(&self) -> bool {
        self.count > 0
            && self.modifier.is_none()
            && self.test.is_none()
            && self.description.is_empty()
    }

    fn describe(&mut self, text: &str, glued: bool) {
        if !glued && !self.description.is_empty() {
            self.description.push(' ');
        }
        self.description.push_str(text.trim());
    }

    fn build(self) -> Result<DicePart> {
        let start = self.start;

        let mut builder = DicePart::builder()
            .dice(self.count, self.sides)
            .fixed_rolls(self.fixed_rolls)
            .modifier(self.modifier.unwrap_or_default())
            .description(&self.description);

        if let Some(sign) = self.sign {
            builder = builder.sign(sign);
        }

        if let Some(test) = self.test {
            builder = builder.test(test);
        }

        self.manipulations.into_iter()
            .fold(builder, |builder, manipulation| builder.manipulation(manipulation))
            .build()
            .map_err(|err| match err {
                Error::ZeroValue => ParserError::ZeroValue,
                other => ParserError::InvalidPart(other.to_string())
            }.at_pos(start))
    }
}


#[derive(Debug, Default)]
struct DiceParser {
    parts: Vec<PartDraft>,
    offset: usize,
    word_end: Option<usize>,
    glue_next: bool
}

impl DiceParser {
    fn current(&mut self, start: usize) -> &mut PartDraft {
        if self.parts.is_empty() {
            self.parts.push(PartDraft::at(start));
        }

        let last = self.parts.len() - 1;
        &mut self.parts[last]
    }

    fn open_part(&mut self) -> Option<&mut PartDraft> {
        self.parts.last_mut().filter(|part| part.is_open())
    }

    fn push(&mut self, token: &Token<DiceToken>, next: Option<&Token<DiceToken>>) -> Result<()> {
        let position = self.offset + token.start;
        let glued = std::mem::take(&mut self.glue_next);
        let word_end = self.word_end.take();

        match token.key {
            DiceToken::Dice => self.push_dice(token, position)?,
            DiceToken::Explode => self.push_explode(token, position)?,
            DiceToken::DropKeep => self.push_drop_keep(token, position)?,
            DiceToken::Threshold => self.push_threshold(token, position)?,
            DiceToken::Test | DiceToken::Target => self.push_test(token, position),
            DiceToken::Modifier => self.push_modifier(token, position)?,

            DiceToken::Sign => {
                let sign_end = token.start + token.text.len();
                let joins_words = word_end == Some(token.start)
                    && next.is_some_and(|next| next.key == DiceToken::Word && next.start == sign_end);

                if joins_words {
                    self.current(position).describe(token.text, true);
                    self.glue_next = true;
                } else {
                    let mut part = PartDraft::at(position);
                    part.sign = Sign::from_symbol(token.text);
                    self.parts.push(part);
                }
            },

            DiceToken::Word => {
                self.current(position).describe(token.text, glued);
                self.word_end = Some(token.start + token.text.len());
            },

            DiceToken::Whitespace => {}
        }

        Ok(())
    }

    fn push_dice(&mut self, token: &Token<DiceToken>, position: usize) -> Result<()> {
        let count = match token.non_empty(2) {
            Some(count) => number::<u16>(count, position)?,
            None => 1
        };
        let sides = number::<u16>(token.group(3).unwrap_or_default(), position)?;

        if count == 0 || sides == 0 {
            return Err(ParserError::ZeroValue.at_pos(position));
        }

        let fixed_rolls = match token.group(4) {
            Some(list) => list.split(',')
                .map(|value| number::<u16>(value, position))
                .collect::<Result<Vec<_>>>()?,
            None => Vec::new()
        };

        if let Some(value) = fixed_rolls.iter().copied().find(|value| *value == 0 || *value > sides) {
            return Err(ParserError::FixedRoll { value, sides }.at_pos(position));
        }

        if fixed_rolls.len() > count as usize {
            let message = format!("{} fixed rolls for {count} dice", fixed_rolls.len());
            return Err(ParserError::InvalidPart(message).at_pos(position));
        }

        self.parts.push(PartDraft {
            start: position,
            count,
            sides,
            fixed_rolls,
            sign: token.group(1).and_then(Sign::from_symbol),
            ..PartDraft::default()
        });

        Ok(())
    }

    fn push_manipulation(&mut self, token: &Token<DiceToken>, position: usize, manipulation: Manipulation) {
        match self.open_part() {
            Some(part) => part.manipulations.push(manipulation),
            None => self.current(position).describe(token.text, false)
        }
    }

    fn push_explode(&mut self, token: &Token<DiceToken>, position: usize) -> Result<()> {
        let spec = match (token.group(1).and_then(TestType::from_symbol), token.group(2)) {
            (Some(kind), Some(value)) => ExplodeSpec::on(kind, number::<i32>(value, position)?),
            _ => ExplodeSpec::max_face()
        };

        self.push_manipulation(token, position, spec.into());
        Ok(())
    }

    fn push_drop_keep(&mut self, token: &Token<DiceToken>, position: usize) -> Result<()> {
        if self.open_part().is_none() {
            self.current(position).describe(token.text, false);
            return Ok(());
        }

        let keep = token.group(1).is_some_and(|kind| kind.eq_ignore_ascii_case("k"));
        let highest = token.group(2).is_some_and(|end| end.eq_ignore_ascii_case("h"));
        let n = match token.non_empty(3) {
            Some(n) => number::<u16>(n, position)?,
            None => 1
        };

        let rule = DropKeep::from_notation(keep, highest, n)
            .map_err(|_| ParserError::ZeroValue.at_pos(position))?;

        self.push_manipulation(token, position, rule.into());
        Ok(())
    }

    fn push_threshold(&mut self, token: &Token<DiceToken>, position: usize) -> Result<()> {
        let n = number::<u16>(token.group(2).unwrap_or_default(), position)?;
        let threshold = match token.group(1) {
            Some(kind) if kind.eq_ignore_ascii_case("max") => Threshold::Ceiling(n),
            _ => Threshold::Floor(n)
        };

        self.push_manipulation(token, position, threshold.into());
        Ok(())
    }

    fn push_test(&mut self, token: &Token<DiceToken>, position: usize) {
        let (word, target) = (token.group(1).unwrap_or_default(), token.group(2).unwrap_or_default());
        let part = self.current(position);

        if part.test.is_some() {
            part.describe(token.text, false);
            return;
        }

        part.test = Some(match token.key {
            DiceToken::Target => DiceTest::target(word, target),
            _ => DiceTest::parse(word, target)
        });
    }

    fn push_modifier(&mut self, token: &Token<DiceToken>, position: usize) -> Result<()> {
        let sign = token.group(1).and_then(Sign::from_symbol);
        let value = number::<i32>(token.group(2).unwrap_or_default(), position)?;
        let modifier = sign.unwrap_or(Sign::Plus).apply(value);

        match self.open_part() {
            Some(part) => part.modifier = Some(modifier),
            None => self.parts.push(PartDraft {
                start: position,
                sign,
                modifier: Some(modifier),
                ..PartDraft::default()
            })
        }

        Ok(())
    }
}


fn number<T: FromStr<Err = ParseIntError>>(text: &str, position: usize) -> Result<T> {
    text.trim()
        .parse::<T>()
        .map_err(|err| ParserError::from(err).at_pos(position))
}

fn unwrap_brackets(input: &str) -> (&str, usize) {
    let leading = input.len() - input.trim_start().len();
    let trimmed = input.trim();

    match trimmed.strip_prefix('[').and_then(|rest| rest.strip_suffix(']')) {
        Some(inner) => (inner, leading + 1),
        None => (trimmed, leading)
    }
}


/// Parses one roll expression into a [`Dice`] group.
///
/// One pair of outer brackets is optional (`[1d20+5]` and `1d20+5` are the
/// same roll). Each die starts a new part; a modifier, manipulation or test
/// joins the part before it while it still accepts one, and anything else is
/// read as description text.
///
/// # Errors
/// - [`ParserError::Empty`] when there is nothing to roll.
/// - [`ParserError::Token`] for characters no dice token accepts, such as an
///   unfilled `{placeholder}`.
/// - [`ParserError::ZeroValue`] for zero dice, zero sides or a zero keep/drop count.
/// - [`ParserError::FixedRoll`] for a fixed roll that is not a face of its die.
/// - [`ParserError::Number`] for numbers that do not fit.
///
/// All but [`ParserError::Empty`] are wrapped in [`ParserError::AtPosition`]
/// with the byte offset in `input`.
///
/// # Examples
/// ```
/// use bracket_dice::{parse_dice, ParserError, TestType};
///
/// let dice = parse_dice("[4d6kh3+2 str vs 12]").unwrap();
/// let part = &dice.parts()[0];
/// assert_eq!((part.count(), part.sides(), part.modifier()), (4, 6, 2));
/// assert_eq!(part.description(), "str");
/// assert_eq!(dice.test().kind(), TestType::GreaterThanOrEqual);
///
/// let err = parse_dice("[1d6 + 0d4]").unwrap_err();
/// assert_eq!(err.err(), &ParserError::ZeroValue);
/// assert_eq!(err.pos(), Some(&5));
/// ```
pub fn parse_dice(input: &str) -> Result<Dice> {
    let (inner, offset) = unwrap_brackets(input);

    if inner.trim().is_empty() {
        return Err(ParserError::Empty);
    }

    let tokens = tokenize(inner).map_err(|err| err.shifted(offset))?;
    let mut parser = DiceParser { offset, ..DiceParser::default() };

    for (index, token) in tokens.iter().enumerate() {
        parser.push(token, tokens.get(index + 1))?;
    }

    let parts = parser.parts.into_iter()
        .map(PartDraft::build)
        .filter(|part| match part {
            Ok(part) => !part.is_empty() || !part.test().is_empty() || !part.description().is_empty(),
            Err(_) => true
        })
        .collect::<Result<Vec<_>>>()?;

    if parts.is_empty() {
        return Err(ParserError::Empty);
    }

    Ok(Dice::new(parts))
}
