use once_cell::sync::Lazy;
use crate::parser::error::*;
use crate::parser::tokenizer::{PatternSet, Token};


#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum DiceToken {
    Whitespace,
    /// sign, count, sides, fixed rolls
    Dice,
    /// comparison, value
    Explode,
    /// `k`/`d`, `h`/`l`, n
    DropKeep,
    /// `min`/`max`, n
    Threshold,
    /// comparison, target
    Test,
    /// alias, target
    Target,
    /// sign, value
    Modifier,
    Sign,
    Word,
}

const TARGET: &str = r"\|\|\s*\d+\s*\|\||\d+";

static DICE_PATTERNS: Lazy<PatternSet<DiceToken>> = Lazy::new(|| {
    PatternSet::builder()
        .skip(DiceToken::Whitespace, r"\s+")
        .rule(DiceToken::Dice, r"([+-])?\s*(\d*)[dD](\d+)(?:\(\s*(\d+(?:\s*,\s*\d+)*)\s*\))?")
        .rule(DiceToken::Explode, r"!(?:\s*(>=|<=|>|<|=)\s*(\d+))?")
        .rule(DiceToken::DropKeep, r"(?i)([kd])([hl])(\d*)\b")
        .rule(DiceToken::Threshold, r"(?i)(min|max)(\d+)")
        .rule(DiceToken::Test, &format!(r"(?i)(>=|<=|==?|>|<|gteq|gte|gt|lteq|lte|lt|eq)\s*({TARGET})"))
        .rule(DiceToken::Target, &format!(r"(?i)(vs|ac|dc)\s*=?\s*({TARGET})"))
        .rule(DiceToken::Word, r"\d+[^\s\d+\-\[\]{}|<>=!(),][^\s+\-\[\]{}|<>=!]*")
        .rule(DiceToken::Modifier, r"([+-])?\s*(\d+)")
        .rule(DiceToken::Sign, r"[+-]")
        .rule(DiceToken::Word, r"[^\s\d+\-\[\]{}|<>=!][^\s+\-\[\]{}|<>=!]*")
        .build()
        .expect("Failed to compile dice token patterns")
});


/// Splits the inside of one roll expression into dice tokens.
pub(crate) fn tokenize(input: &str) -> Result<Vec<Token<'_, DiceToken>>> {
    DICE_PATTERNS.tokenize(input)
}


#[cfg(test)]
mod test {
    use proptest::prelude::*;
    use super::*;
    use crate::parser::str_test_strategies::*;

    fn keys(input: &str) -> Vec<DiceToken> {
        tokenize(input).unwrap().into_iter().map(|token| token.key).collect()
    }

    proptest! {
        #[test]
        fn test_simple_dice(count in 1u16..=1000, sides in 1u16..=1000) {
            let input = format!("{count}d{sides}");
            let tokens = tokenize(&input).unwrap();

            prop_assert_eq!(tokens.len(), 1);
            prop_assert_eq!(tokens[0].key, DiceToken::Dice);
            let expected_count = count.to_string();
            let expected_sides = sides.to_string();
            prop_assert_eq!(tokens[0].group(2), Some(expected_count.as_str()));
            prop_assert_eq!(tokens[0].group(3), Some(expected_sides.as_str()));
        }

        #[test]
        fn test_dice_with_drop_keep(modifier in "(kh|kl|dh|dl)", n in prop::option::of(1u16..=9)) {
            let n = n.map(|n| n.to_string()).unwrap_or_default();
            let input = format!("4d6{modifier}{n}");

            prop_assert_eq!(keys(&input), vec![DiceToken::Dice, DiceToken::DropKeep]);
        }

        #[test]
        fn test_words_are_never_numbers(word in "[a-zA-Z][a-zA-Z0-9]{0,8}") {
            let tokens = tokenize(&word).unwrap();
            prop_assert!(tokens.iter().all(|token| token.key != DiceToken::Modifier || token.start > 0));
        }

        #[test]
        fn test_generated_expressions(expr in dice_expression_strategy()) {
            prop_assert!(tokenize(&expr).is_ok(), "{expr}");
        }
    }

    #[test]
    fn test_full_expression() {
        assert_eq!(
            keys("1d20+5 atk vs 15"),
            vec![DiceToken::Dice, DiceToken::Modifier, DiceToken::Word, DiceToken::Target]
        );
    }

    #[test]
    fn test_fixed_rolls() {
        let tokens = tokenize("2d6(3, 4)").unwrap();
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].group(4), Some("3, 4"));
    }

    #[test]
    fn test_tests_and_targets() {
        assert_eq!(keys(">=15"), vec![DiceToken::Test]);
        assert_eq!(keys("gte ||15||"), vec![DiceToken::Test]);
        assert_eq!(keys("dc=15"), vec![DiceToken::Target]);
        assert_eq!(keys("AC 12"), vec![DiceToken::Target]);
    }

    #[test]
    fn test_manipulations() {
        assert_eq!(keys("1d10!"), vec![DiceToken::Dice, DiceToken::Explode]);
        assert_eq!(keys("1d10!>=9"), vec![DiceToken::Dice, DiceToken::Explode]);
        assert_eq!(keys("4d6min2kh3"), vec![DiceToken::Dice, DiceToken::Threshold, DiceToken::DropKeep]);
    }

    #[test]
    fn test_description_words() {
        assert_eq!(keys("dmg"), vec![DiceToken::Word]);
        assert_eq!(keys("dhampir"), vec![DiceToken::Word]);
        assert_eq!(keys("fire-bolt"), vec![DiceToken::Word, DiceToken::Sign, DiceToken::Word]);
    }

    #[test]
    fn test_words_may_start_with_digits() {
        assert_eq!(keys("1d6 fire 20ft"), vec![DiceToken::Dice, DiceToken::Word, DiceToken::Word]);
        assert_eq!(keys("1d6 20"), vec![DiceToken::Dice, DiceToken::Modifier]);
        assert_eq!(keys("1d6+2nd"), vec![DiceToken::Dice, DiceToken::Modifier, DiceToken::Word]);
    }

    #[test]
    fn test_unfilled_placeholder_is_malformed() {
        let err = tokenize("1d8+{0}").unwrap_err();
        assert_eq!(err.err(), &ParserError::Token('{'));
        assert_eq!(err.pos(), Some(&4));
    }
}
