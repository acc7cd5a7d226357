use std::borrow::Cow;
use std::collections::HashSet;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use tracing::warn;
use crate::PatternSet;


/// `{key}`, `{key:default}`, `{marker key:default}`; `key` is an index, a
/// name or `...`.
static PLACEHOLDER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\{(?:([^{}:]*?\s+))?(\d+|\.\.\.|[A-Za-z_][\w-]*)(?::([^{}]*))?\}")
        .expect("Failed to compile placeholder regex")
});

static SIGN_PAIR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\+\s*[+-]|-\s*\+").expect("Failed to compile sign pair regex")
});

/// Keys that name themselves in front of their value when no marker is given.
const SELF_MARKED_KEYS: [&str; 3] = ["ac", "dc", "vs"];


#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ArgKind {
    Whitespace,
    NamedQuoted,
    Named,
    Quoted,
    Bare
}

static ARG_PATTERNS: Lazy<PatternSet<ArgKind>> = Lazy::new(|| {
    PatternSet::builder()
        .skip(ArgKind::Whitespace, r"\s+")
        .rule(ArgKind::NamedQuoted, r#"([A-Za-z_][\w-]*)\s*=\s*"([^"]*)""#)
        .rule(ArgKind::Named, r#"([A-Za-z_][\w-]*)\s*=\s*([^\s"]+)"#)
        .rule(ArgKind::Quoted, r#""([^"]*)""#)
        .rule(ArgKind::Bare, r#"[^\s"]+|""#)
        .build()
        .expect("Failed to compile argument patterns")
});


/// A `key=value` argument, kept with the text it was typed as.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamedArg {
    /// Key as typed.
    pub key: String,
    /// Value with the quotes removed.
    pub value: String,
    /// The whole `key=value` text, quotes included.
    pub raw: String
}


/// The arguments of one macro call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MacroArgs {
    positional: Vec<String>,
    named: Vec<NamedArg>
}

impl MacroArgs {
    /// Arguments already split, mostly for building them by hand.
    pub fn new(positional: Vec<String>, named: Vec<NamedArg>) -> Self {
        Self { positional, named }
    }

    /// Splits the text after a macro name into arguments: `key=value`,
    /// `key="quoted value"`, `"quoted positional"` and bare words.
    ///
    /// # Examples
    /// ```
    /// use bracket_dice::MacroArgs;
    ///
    /// let args = MacroArgs::parse(r#"5 dc=15 "two words" name="Big Bad" +2"#);
    /// assert_eq!(args.positional(), &["5", "two words", "+2"]);
    /// assert_eq!(args.get("DC"), Some("15"));
    /// assert_eq!(args.named()[1].raw, r#"name="Big Bad""#);
    /// ```
    pub fn parse(text: &str) -> Self {
        let tokens = match ARG_PATTERNS.tokenize(text) {
            Ok(tokens) => tokens,
            Err(err) => {
                warn!(text, %err, "unreadable macro arguments, passing them as one");
                return Self::new(vec![text.trim().into()], Vec::new());
            }
        };

        let mut args = Self::default();

        for token in tokens {
            match token.key {
                ArgKind::NamedQuoted | ArgKind::Named => args.named.push(NamedArg {
                    key: token.group(1).unwrap_or_default().into(),
                    value: token.group(2).unwrap_or_default().into(),
                    raw: token.text.into()
                }),
                ArgKind::Quoted => args.positional.push(token.group(1).unwrap_or_default().into()),
                ArgKind::Bare => args.positional.push(token.text.into()),
                ArgKind::Whitespace => {}
            }
        }

        args
    }

    /// Positional arguments in call order.
    pub fn positional(&self) -> &[String] {
        &self.positional
    }

    /// Named arguments in call order.
    pub fn named(&self) -> &[NamedArg] {
        &self.named
    }

    /// Value of the first named argument called `key`, ignoring case.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.named.iter()
            .find(|arg| arg.key.eq_ignore_ascii_case(key))
            .map(|arg| arg.value.as_str())
    }

    /// No argument of either kind.
    pub fn is_empty(&self) -> bool {
        self.positional.is_empty() && self.named.is_empty()
    }
}


struct Substitution<'s> {
    stack: &'s [MacroArgs],
    keep_unmatched_names: bool,
    consumed: usize,
    consulted: HashSet<String>
}

impl Substitution<'_> {
    fn placeholder(&mut self, captures: &Captures) -> String {
        let marker = captures.get(1).map(|m| m.as_str());
        let key = captures.get(2).map(|m| m.as_str()).unwrap_or_default();
        let default = captures.get(3).map(|m| m.as_str());

        if key == "..." {
            return captures[0].to_string();
        }

        if let Ok(index) = key.parse::<usize>() {
            self.consumed = self.consumed.max(index + 1);
            let value = self.stack.first()
                .and_then(|args| args.positional.get(index))
                .map(String::as_str)
                .filter(|value| !value.is_empty());

            return with_marker(marker, value.or(default).unwrap_or_default());
        }

        let key = key.to_lowercase();
        let value = self.stack.iter()
            .find_map(|args| args.get(&key))
            .filter(|value| !value.is_empty());

        self.consulted.insert(key.clone());

        if self.keep_unmatched_names && value.is_none() && default.is_none() {
            return captures[0].to_string();
        }

        let value = value.or(default).unwrap_or_default();
        match marker {
            None if !value.is_empty() && SELF_MARKED_KEYS.contains(&key.as_str()) => format!("{key}{value}"),
            _ => with_marker(marker, value)
        }
    }

    fn remaining(&self, captures: &Captures) -> String {
        if captures.get(2).map(|m| m.as_str()) != Some("...") {
            return captures[0].to_string();
        }

        let remaining = self.stack.first()
            .map(|args| args.positional.iter().skip(self.consumed).cloned().collect::<Vec<_>>().join(" "))
            .filter(|value| !value.is_empty());

        let default = captures.get(3).map(|m| m.as_str());
        with_marker(captures.get(1).map(|m| m.as_str()), remaining.as_deref().or(default).unwrap_or_default())
    }

    fn run(mut self, body: &str, include_unused: bool) -> String {
        let inner = unwrap_brackets(body);

        if self.stack.is_empty() {
            return format!("[{}]", inner.trim());
        }

        let filled = PLACEHOLDER.replace_all(inner, |captures: &Captures| self.placeholder(captures)).into_owned();
        let filled = PLACEHOLDER.replace_all(&filled, |captures: &Captures| self.remaining(captures)).into_owned();
        let mut text = filled;

        if include_unused {
            for arg in self.stack.iter().flat_map(|args| args.named.iter()) {
                if !self.consulted.contains(&arg.key.to_lowercase()) {
                    text.push(' ');
                    text.push_str(&arg.raw);
                }
            }
        }

        format!("[{}]", normalize_signs(&text).trim())
    }
}

fn with_marker(marker: Option<&str>, value: &str) -> String {
    if value.is_empty() {
        return String::new();
    }

    format!("{}{value}", marker.unwrap_or_default())
}

fn unwrap_brackets(body: &str) -> &str {
    let trimmed = body.trim();

    trimmed.strip_prefix('[')
        .and_then(|rest| rest.strip_suffix(']'))
        .unwrap_or(trimmed)
}

/// Collapses `+ +` to `+`, and `+ -` or `- +` to `-`, until none is left.
pub(crate) fn normalize_signs(text: &str) -> String {
    let mut text = text.to_string();

    loop {
        let replaced = SIGN_PAIR.replace_all(&text, |captures: &Captures| {
            if captures[0].contains('-') { "-" } else { "+" }
        });

        match replaced {
            Cow::Borrowed(_) => return text,
            Cow::Owned(next) => text = next
        }
    }
}


/// Fills the placeholders of a flattened macro body.
///
/// `stack` holds the argument sets of the macro calls that led to `body`,
/// outermost first. Indexed placeholders (`{0}`) read the outermost call's
/// positional arguments; named ones (`{dc}`) take the first match anywhere in
/// the stack. An empty value falls back to the `:default`, then to nothing;
/// the marker (`{vs 0}`) is only written in front of a non-empty value.
/// `{...}` receives the positional arguments past the highest index used.
///
/// With `include_unused`, named arguments no placeholder asked for are
/// appended as typed, before signs are normalized. The result is always one bracketed expression; with an
/// empty stack the body is only wrapped.
///
/// # Examples
/// ```
/// use bracket_dice::{apply_args, MacroArgs};
///
/// let args = [MacroArgs::parse("7")];
/// assert_eq!(apply_args("{0:5}", &args, true), "[7]");
/// assert_eq!(apply_args("{0:5}", &[MacroArgs::default()], true), "[5]");
/// assert_eq!(apply_args("{0:5}", &[], true), "[{0:5}]");
///
/// let args = [MacroArgs::parse("-2 dc=15 sneak")];
/// assert_eq!(apply_args("1d20+{0} {dc} {...}", &args, true), "[1d20-2 dc15 sneak]");
/// ```
pub fn apply_args(body: &str, stack: &[MacroArgs], include_unused: bool) -> String {
    Substitution { stack, keep_unmatched_names: false, consumed: 0, consulted: HashSet::new() }
        .run(body, include_unused)
}

/// [`apply_args`] for math bodies: named placeholders with neither an argument
/// nor a default stay in place, for the stat lookup to resolve.
pub fn apply_math_args(body: &str, stack: &[MacroArgs]) -> String {
    Substitution { stack, keep_unmatched_names: true, consumed: 0, consulted: HashSet::new() }
        .run(body, false)
}
