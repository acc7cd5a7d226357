use std::cmp::Reverse;
use std::fmt::Display;
use once_cell::sync::Lazy;
use regex::Regex;
use crate::{DropKeep, MacroBase, MacroScope, MacroTiers};


static SHORTHAND: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^\s*(?:(\d+)\s*#|(\d*)\s*k([hl])\s*(\d*)\s*#)")
        .expect("Failed to compile shorthand regex")
});

static FLAT_NUMBER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*\d+(?:[^\ddD]|$)").expect("Failed to compile flat number regex")
});


/// A prefix asking for a macro or roll to be rolled differently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Shorthand {
    /// `N#`: roll the expression N times.
    Repeat(u32),
    /// `NkhM#` / `NklM#`: roll the primary die N times and keep M of them.
    /// A bare `+` is `2kh1#` (advantage) and a bare `-` is `2kl1#`.
    Keep {
        /// Dice rolled, `N`.
        rolls: u32,
        /// Keep the highest dice rather than the lowest.
        highest: bool,
        /// Dice kept, `M`.
        keep: u32
    }
}

impl Shorthand {
    /// `2kh1#`, written as a bare `+`.
    pub fn advantage() -> Self {
        Shorthand::Keep { rolls: 2, highest: true, keep: 1 }
    }

    /// `2kl1#`, written as a bare `-`.
    pub fn disadvantage() -> Self {
        Shorthand::Keep { rolls: 2, highest: false, keep: 1 }
    }

    /// The keep rule of a [`Shorthand::Keep`].
    ///
    /// A count of kept dice past `u16::MAX` keeps every die anyway, so it is
    /// capped there.
    pub fn rule(&self) -> Option<DropKeep> {
        match *self {
            Shorthand::Repeat(_) => None,
            Shorthand::Keep { highest, keep, .. } => {
                let keep = u16::try_from(keep).unwrap_or(u16::MAX);
                Some(if highest { DropKeep::kh(keep) } else { DropKeep::kl(keep) })
            }
        }
    }

    /// Splits a leading shorthand off `text`.
    ///
    /// Counts are kept as written; one too large for a `u32` becomes
    /// `u32::MAX`, so the engine still rejects it instead of rolling a default.
    ///
    /// # Examples
    /// ```
    /// use bracket_dice::Shorthand;
    ///
    /// assert_eq!(Shorthand::extract("3# atk"), (Some(Shorthand::Repeat(3)), " atk"));
    /// assert_eq!(Shorthand::extract("kl#1d20"), (Some(Shorthand::disadvantage()), "1d20"));
    /// assert_eq!(Shorthand::extract("+ atk"), (Some(Shorthand::advantage()), " atk"));
    /// assert_eq!(Shorthand::extract("-5 bless"), (None, "-5 bless"));
    /// assert_eq!(Shorthand::extract("1d20"), (None, "1d20"));
    /// ```
    pub fn extract(text: &str) -> (Option<Self>, &str) {
        if let Some(captures) = SHORTHAND.captures(text) {
            let whole = captures.get(0).map(|m| m.end()).unwrap_or_default();
            let number = |index: usize, default: u32| captures.get(index)
                .map(|m| m.as_str())
                .filter(|text| !text.is_empty())
                .map_or(default, |text| text.parse::<u32>().unwrap_or(u32::MAX));

            let shorthand = match captures.get(1) {
                Some(_) => Shorthand::Repeat(number(1, 1)),
                None => Shorthand::Keep {
                    rolls: number(2, 2),
                    highest: captures.get(3).is_some_and(|m| m.as_str().eq_ignore_ascii_case("h")),
                    keep: number(4, 1)
                }
            };

            return (Some(shorthand), &text[whole..]);
        }

        let trimmed = text.trim_start();
        let sign = trimmed.chars().next().filter(|ch| *ch == '+' || *ch == '-');

        match sign {
            Some(sign) if !FLAT_NUMBER.is_match(&trimmed[1..]) => {
                let shorthand = if sign == '+' { Shorthand::advantage() } else { Shorthand::disadvantage() };
                (Some(shorthand), &trimmed[1..])
            },
            _ => (None, text)
        }
    }
}

impl Default for Shorthand {
    fn default() -> Self {
        Shorthand::Repeat(1)
    }
}

impl Display for Shorthand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Shorthand::Repeat(n) => write!(f, "{n}#"),
            Shorthand::Keep { rolls, highest, keep } =>
                write!(f, "{rolls}k{}{keep}#", if *highest { "h" } else { "l" })
        }
    }
}


/// A macro picked by [`resolve`], with where it was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedMacro<'a> {
    /// Index of the tier it came from.
    pub tier: usize,
    /// Owner of that tier.
    pub scope: MacroScope,
    /// The macro itself.
    pub definition: &'a MacroBase
}


/// What [`resolve`] read out of a macro call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution<'a> {
    /// The shorthand written in front, if any.
    pub shorthand: Option<Shorthand>,
    /// The macro called, `None` for plain dice.
    pub found: Option<ResolvedMacro<'a>>,
    /// Text after the macro name, or the whole remainder when nothing was found.
    pub arguments: String
}


/// Strips `prefix` from the front of `text`, comparing characters without case.
///
/// The remainder is sliced from `text` itself, so it keeps its casing even
/// when lowercasing would change byte lengths.
///
/// # Examples
/// ```
/// use bracket_dice::strip_prefix_ignore_case;
///
/// assert_eq!(strip_prefix_ignore_case("FireBall 3", "fireball"), Some(" 3"));
/// assert_eq!(strip_prefix_ignore_case("fire", "fireball"), None);
/// ```
pub fn strip_prefix_ignore_case<'t>(text: &'t str, prefix: &str) -> Option<&'t str> {
    let mut chars = text.char_indices();

    for expected in prefix.chars() {
        let (_, actual) = chars.next()?;
        if !actual.to_lowercase().eq(expected.to_lowercase()) {
            return None;
        }
    }

    match chars.next() {
        Some((index, _)) => Some(&text[index..]),
        None => Some("")
    }
}


/// Finds the macro called by `input`.
///
/// One pair of outer brackets and a leading [`Shorthand`] are stripped first.
/// Every macro of every tier whose name starts the remaining text is a
/// candidate; the longest name wins, then the earliest tier, then the earliest
/// position in that tier. Finding nothing is not an error: `found` is `None`
/// and `arguments` holds the remaining text.
///
/// # Examples
/// ```
/// use bracket_dice::{resolve, MacroBase, MacroScope, MacroTiers, Shorthand};
///
/// let tiers = MacroTiers::default()
///     .with_tier(MacroScope::Character, vec![MacroBase::new("atk", "1d20+7")])
///     .with_tier(MacroScope::Global, vec![
///         MacroBase::new("atk", "1d20"),
///         MacroBase::new("atk power", "1d20+9"),
///     ]);
///
/// let resolution = resolve(&tiers, "[2# ATK Power dc=15]");
/// assert_eq!(resolution.shorthand, Some(Shorthand::Repeat(2)));
/// assert_eq!(resolution.found.unwrap().definition.body(), "1d20+9");
/// assert_eq!(resolution.arguments, "dc=15");
///
/// assert_eq!(resolve(&tiers, "atk").found.unwrap().tier, 0);
/// assert!(resolve(&tiers, "1d20").found.is_none());
/// ```
pub fn resolve<'a>(tiers: &'a MacroTiers, input: &str) -> Resolution<'a> {
    let text = unwrap_brackets(input);
    let (shorthand, rest) = Shorthand::extract(text);
    let rest = rest.trim_start();

    let best = tiers.tiers().iter()
        .enumerate()
        .flat_map(|(tier_index, tier)| {
            tier.macros.iter().enumerate().filter_map(move |(position, definition)| {
                if definition.name().is_empty() {
                    return None;
                }

                let arguments = strip_prefix_ignore_case(rest, definition.name())?;
                let length = definition.name().chars().count();
                let found = ResolvedMacro { tier: tier_index, scope: tier.scope, definition };

                Some(((Reverse(length), tier_index, position), found, arguments))
            })
        })
        .min_by_key(|(rank, _, _)| *rank);

    match best {
        Some((_, found, arguments)) => Resolution {
            shorthand,
            found: Some(found),
            arguments: arguments.trim().into()
        },
        None => Resolution { shorthand, found: None, arguments: rest.trim().into() }
    }
}

fn unwrap_brackets(input: &str) -> &str {
    let trimmed = input.trim();

    trimmed.strip_prefix('[')
        .and_then(|rest| rest.strip_suffix(']'))
        .unwrap_or(trimmed)
}
