use regex::Regex;
use crate::parser::error::*;


#[derive(Debug, Clone)]
struct Rule<K> {
    key: K,
    regex: Regex,
    skip: bool
}


/// An ordered set of named matching rules used to split text into [`Token`]s.
///
/// At every cursor position the rules are tried in the order they were added
/// and the first one that matches wins, whatever the length of the other
/// candidates. Overlapping rules are therefore resolved by priority, so the
/// order has to stay fixed between calls.
///
/// # Examples
/// ```
/// use bracket_dice::PatternSet;
///
/// #[derive(Debug, Clone, Copy, PartialEq)]
/// enum Kind { Space, Number, Word }
///
/// let patterns = PatternSet::builder()
///     .skip(Kind::Space, r"\s+")
///     .rule(Kind::Number, r"(\d+)")
///     .rule(Kind::Word, r"[a-z]+")
///     .build()
///     .unwrap();
///
/// let tokens = patterns.tokenize("roll 20 times").unwrap();
/// let kinds: Vec<Kind> = tokens.iter().map(|t| t.key).collect();
/// assert_eq!(kinds, vec![Kind::Word, Kind::Number, Kind::Word]);
/// assert_eq!(tokens[1].group(1), Some("20"));
/// ```
#[derive(Debug, Clone)]
pub struct PatternSet<K> {
    rules: Vec<Rule<K>>
}

impl<K: Copy> PatternSet<K> {
    /// Starts an empty [`PatternSetBuilder`].
    pub fn builder() -> PatternSetBuilder<K> {
        PatternSetBuilder { rules: Vec::new() }
    }

    /// Splits `input` into tokens.
    ///
    /// # Errors
    /// Returns [`ParserError::Token`] wrapped in [`ParserError::AtPosition`]
    /// (byte offset) for the first character no rule matches.
    pub fn tokenize<'t>(&self, input: &'t str) -> Result<Vec<Token<'t, K>>> {
        let mut tokens = Vec::new();
        let mut position = 0;

        while position < input.len() {
            let rest = &input[position..];

            let matched = self.rules.iter().find_map(|rule| {
                let captures = rule.regex.captures(rest)?;
                let whole = captures.get(0)?;

                if whole.is_empty() {
                    return None;
                }

                let groups = captures.iter()
                    .skip(1)
                    .map(|group| group.map(|m| m.as_str()))
                    .collect();

                Some((rule, whole.as_str(), groups))
            });

            let Some((rule, text, groups)) = matched else {
                let ch = rest.chars().next().unwrap_or_default();
                return Err(ParserError::Token(ch).at_pos(position));
            };

            if !rule.skip {
                tokens.push(Token { key: rule.key, text, start: position, groups });
            }

            position += text.len();
        }

        Ok(tokens)
    }
}


/// Collects rules for a [`PatternSet`], keeping their insertion order.
#[derive(Debug, Clone)]
pub struct PatternSetBuilder<K> {
    rules: Vec<(K, String, bool)>
}

impl<K: Copy> PatternSetBuilder<K> {
    /// Adds a rule whose matches become tokens.
    pub fn rule(mut self, key: K, pattern: &str) -> Self {
        self.rules.push((key, pattern.into(), false));
        self
    }

    /// Adds a rule whose matches are consumed silently (whitespace and the like).
    pub fn skip(mut self, key: K, pattern: &str) -> Self {
        self.rules.push((key, pattern.into(), true));
        self
    }

    /// Compiles every rule, anchored at the cursor.
    ///
    /// # Errors
    /// Returns the [`regex::Error`] of the first pattern that does not compile.
    pub fn build(self) -> std::result::Result<PatternSet<K>, regex::Error> {
        let rules = self.rules.into_iter()
            .map(|(key, pattern, skip)| {
                let regex = Regex::new(&format!("^(?:{pattern})"))?;
                Ok(Rule { key, regex, skip })
            })
            .collect::<std::result::Result<Vec<_>, regex::Error>>()?;

        Ok(PatternSet { rules })
    }
}


/// One match produced by [`PatternSet::tokenize`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token<'t, K> {
    /// Key of the rule that matched.
    pub key: K,
    /// Full matched text.
    pub text: &'t str,
    /// Byte offset of the match in the input.
    pub start: usize,
    groups: Vec<Option<&'t str>>
}

impl<'t, K> Token<'t, K> {
    /// Capture group `index` (starting at 1), if it took part in the match.
    pub fn group(&self, index: usize) -> Option<&'t str> {
        index.checked_sub(1)
            .and_then(|i| self.groups.get(i).copied())
            .flatten()
    }

    /// Capture group `index`, treating an empty capture as absent.
    pub fn non_empty(&self, index: usize) -> Option<&'t str> {
        self.group(index).filter(|text| !text.is_empty())
    }
}


#[cfg(test)]
mod test {
    use proptest::prelude::*;
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Kind {
        Space,
        Quoted,
        Word,
        Number
    }

    fn patterns() -> PatternSet<Kind> {
        PatternSet::builder()
            .skip(Kind::Space, r"\s+")
            .rule(Kind::Quoted, r#""([^"]*)""#)
            .rule(Kind::Number, r"\d+")
            .rule(Kind::Word, r#"[^\s"]+"#)
            .build()
            .unwrap()
    }

    #[test]
    fn test_priority_beats_length() {
        let patterns = PatternSet::builder()
            .rule(Kind::Number, r"\d")
            .rule(Kind::Word, r"\d+")
            .build()
            .unwrap();

        let tokens = patterns.tokenize("42").unwrap();
        assert_eq!(tokens.len(), 2);
        assert!(tokens.iter().all(|t| t.key == Kind::Number));
    }

    #[test]
    fn test_quoted_before_bare_word() {
        let tokens = patterns().tokenize(r#"hit "the orc" 3"#).unwrap();

        assert_eq!(tokens[0].key, Kind::Word);
        assert_eq!(tokens[1].key, Kind::Quoted);
        assert_eq!(tokens[1].group(1), Some("the orc"));
        assert_eq!(tokens[1].start, 4);
        assert_eq!(tokens[2].key, Kind::Number);
    }

    #[test]
    fn test_unmatched_character() {
        let patterns = PatternSet::builder()
            .rule(Kind::Number, r"\d+")
            .build()
            .unwrap();

        let err = patterns.tokenize("12x").unwrap_err();
        assert_eq!(err.pos(), Some(&2));
        assert_eq!(err.err(), &ParserError::Token('x'));
    }

    #[test]
    fn test_invalid_pattern() {
        let result = PatternSet::builder().rule(Kind::Word, "(").build();
        assert!(result.is_err());
    }

    #[test]
    fn test_group_bounds() {
        let tokens = patterns().tokenize("word").unwrap();
        assert_eq!(tokens[0].group(0), None);
        assert_eq!(tokens[0].group(5), None);
    }

    proptest! {
        #[test]
        fn test_tokens_cover_input(words in prop::collection::vec("[a-z0-9]{1,6}", 1..8)) {
            let input = words.join("  ");
            let tokens = patterns().tokenize(&input).unwrap();

            let rebuilt: Vec<&str> = tokens.iter().map(|t| t.text).collect();
            prop_assert_eq!(rebuilt.concat(), words.concat());

            for token in &tokens {
                prop_assert_eq!(&input[token.start..token.start + token.text.len()], token.text);
            }
        }
    }
}
