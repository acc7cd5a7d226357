use std::fmt::Display;
use once_cell::sync::Lazy;
use regex::Regex;
use crate::macros::RollTable;


/// Shown in place of a missing category; never stored.
pub const UNCATEGORIZED: &str = "Uncategorized";

static URL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:<(https?://[^\s<>]+)>|\[(https?://[^\s\[\]]+)\]|(https?://\S+))$")
        .expect("Failed to compile url regex")
});

static BASIC_DICE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\d*d\d+").expect("Failed to compile basic dice regex")
});

static ARITHMETIC: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:[\d\s+\-*/()]|\{[^{}]*\})+$").expect("Failed to compile arithmetic regex")
});


/// What a macro body holds, decided from its text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub enum MacroKind {
    /// A roll expression, possibly calling other macros.
    #[default]
    Dice,
    /// A comma separated list of entries.
    Items,
    /// Integer arithmetic over stats.
    Math,
    /// Rows picked by a die roll.
    Table,
    /// A link to a table kept elsewhere.
    TableUrl
}

impl MacroKind {
    /// Classifies `body`, trying the kinds from the most specific one down:
    /// a wrapped url, a table, an item list without dice, arithmetic with at
    /// least one operator, and finally dice.
    ///
    /// # Examples
    /// ```
    /// use bracket_dice::MacroKind;
    ///
    /// assert_eq!(MacroKind::sniff("<https://example.com/loot>"), MacroKind::TableUrl);
    /// assert_eq!(MacroKind::sniff("1 goblin\n2 orc\n3 troll"), MacroKind::Table);
    /// assert_eq!(MacroKind::sniff("rope, torch, rations"), MacroKind::Items);
    /// assert_eq!(MacroKind::sniff("({str} + 2) * 2"), MacroKind::Math);
    /// assert_eq!(MacroKind::sniff("1d20+{0:5} atk"), MacroKind::Dice);
    /// ```
    pub fn sniff(body: &str) -> Self {
        let body = body.trim();

        if URL.is_match(body) {
            MacroKind::TableUrl
        } else if RollTable::is_table(body) {
            MacroKind::Table
        } else if is_item_list(body) {
            MacroKind::Items
        } else if ARITHMETIC.is_match(body) && body.contains(['+', '-', '*', '/']) {
            MacroKind::Math
        } else {
            MacroKind::Dice
        }
    }
}

impl Display for MacroKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            MacroKind::Dice => "dice",
            MacroKind::Items => "items",
            MacroKind::Math => "math",
            MacroKind::Table => "table",
            MacroKind::TableUrl => "tableUrl"
        };

        write!(f, "{name}")
    }
}

fn is_item_list(body: &str) -> bool {
    if body.contains('\n') || BASIC_DICE.is_match(body) {
        return false;
    }

    let entries: Vec<&str> = body.split(',').map(str::trim).collect();
    entries.len() >= 2 && entries.iter().all(|entry| !entry.is_empty())
}

/// The url of a [`MacroKind::TableUrl`] body, without its wrapping.
pub(crate) fn table_url(body: &str) -> Option<&str> {
    let captures = URL.captures(body.trim())?;
    (1..=3).find_map(|group| captures.get(group)).map(|m| m.as_str())
}


/// The flat shape a macro is stored as by its owner.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MacroRecord {
    /// Macro name, as typed by its owner.
    pub name: String,
    /// `None` for uncategorized macros.
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub category: Option<String>,
    /// Macro body, classified again when loaded.
    pub body: String
}


/// A named, categorized macro definition.
///
/// The [`MacroKind`] is worked out whenever the body is set, so it always
/// agrees with the body.
///
/// # Examples
/// ```
/// use bracket_dice::{MacroBase, MacroKind};
///
/// let mut heal = MacroBase::new("Heal", "1d8+{0:2}").with_category("  ");
/// assert_eq!(heal.kind(), MacroKind::Dice);
/// assert_eq!(heal.category(), None);
/// assert_eq!(heal.category_or_default(), "Uncategorized");
///
/// heal.set_body("2 + {con}");
/// assert_eq!(heal.kind(), MacroKind::Math);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(from = "MacroRecord", into = "MacroRecord"))]
pub struct MacroBase {
    name: String,
    category: Option<String>,
    body: String,
    kind: MacroKind
}

impl MacroBase {
    /// A macro without a category. The name and body are trimmed.
    pub fn new(name: &str, body: &str) -> Self {
        Self {
            name: name.trim().into(),
            category: None,
            body: body.trim().into(),
            kind: MacroKind::sniff(body)
        }
    }

    /// Sets the category; blank and placeholder names mean "no category".
    pub fn with_category(mut self, category: &str) -> Self {
        self.set_category(Some(category));
        self
    }

    /// Name the macro is called by.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The category, `None` when uncategorized.
    pub fn category(&self) -> Option<&str> {
        self.category.as_deref()
    }

    /// The category, or [`UNCATEGORIZED`] without one.
    pub fn category_or_default(&self) -> &str {
        self.category().unwrap_or(UNCATEGORIZED)
    }

    /// The trimmed body.
    pub fn body(&self) -> &str {
        &self.body
    }

    /// Classification of the body.
    pub fn kind(&self) -> MacroKind {
        self.kind
    }

    /// Sets or clears the category, see [`MacroBase::with_category`].
    pub fn set_category(&mut self, category: Option<&str>) {
        self.category = category.and_then(normalize_category);
    }

    /// Replaces the body and classifies it again.
    pub fn set_body(&mut self, body: &str) {
        self.body = body.trim().into();
        self.kind = MacroKind::sniff(&self.body);
    }

    /// Same macro: name and category ignoring case, body ignoring whitespace runs.
    pub fn matches(&self, other: &MacroBase) -> bool {
        let same_category = match (self.category(), other.category()) {
            (Some(a), Some(b)) => a.eq_ignore_ascii_case(b),
            (None, None) => true,
            _ => false
        };

        self.name.eq_ignore_ascii_case(&other.name)
            && same_category
            && normalize_whitespace(&self.body) == normalize_whitespace(&other.body)
    }

    /// The record this macro is stored as.
    pub fn to_record(&self) -> MacroRecord {
        MacroRecord {
            name: self.name.clone(),
            category: self.category.clone(),
            body: self.body.clone()
        }
    }
}

impl From<MacroRecord> for MacroBase {
    fn from(record: MacroRecord) -> Self {
        let mut base = MacroBase::new(&record.name, &record.body);
        base.set_category(record.category.as_deref());
        base
    }
}

impl From<MacroBase> for MacroRecord {
    fn from(base: MacroBase) -> Self {
        base.to_record()
    }
}

impl Display for MacroBase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({}): {}", self.name, self.category_or_default(), self.body)
    }
}

fn normalize_category(category: &str) -> Option<String> {
    let category = category.trim();
    let placeholder = category.is_empty()
        || category == "-"
        || category.eq_ignore_ascii_case(UNCATEGORIZED)
        || category.eq_ignore_ascii_case("none");

    (!placeholder).then(|| category.to_string())
}

fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}


/// Who owns a tier of macros.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MacroScope {
    /// Macros of the user calling them.
    #[default]
    User,
    /// Macros of the active character.
    Character,
    /// Macros shared by the game or server.
    Game,
    /// Macros available to everyone.
    Global
}


/// One priority level of visible macros.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MacroTier {
    /// Owner of the macros.
    pub scope: MacroScope,
    /// Macros of the tier, in definition order.
    pub macros: Vec<MacroBase>
}

impl MacroTier {
    /// A tier owned by `scope`.
    pub fn new(scope: MacroScope, macros: Vec<MacroBase>) -> Self {
        Self { scope, macros }
    }
}


/// Every tier visible to one invocation, highest priority first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MacroTiers {
    tiers: Vec<MacroTier>
}

impl MacroTiers {
    /// Tiers in priority order, highest first.
    pub fn new(tiers: Vec<MacroTier>) -> Self {
        Self { tiers }
    }

    /// Appends a tier below the existing ones.
    pub fn with_tier(mut self, scope: MacroScope, macros: Vec<MacroBase>) -> Self {
        self.tiers.push(MacroTier::new(scope, macros));
        self
    }

    /// Every tier, highest priority first.
    pub fn tiers(&self) -> &[MacroTier] {
        &self.tiers
    }

    /// The tier at `index`, as reported by [`crate::ResolvedMacro::tier`].
    pub fn get(&self, index: usize) -> Option<&MacroTier> {
        self.tiers.get(index)
    }

    /// No tier holds a macro.
    pub fn is_empty(&self) -> bool {
        self.tiers.iter().all(|tier| tier.macros.is_empty())
    }
}


#[cfg(test)]
mod test {
    use proptest::prelude::*;
    use super::*;

    proptest! {
        #[test]
        fn test_kind_follows_body(first in "[a-z]{1,8}", second in "[a-z]{1,8}", sides in 2u16..=100) {
            let mut base = MacroBase::new("m", &format!("{first}, {second}"));
            prop_assert_eq!(base.kind(), MacroKind::Items);

            base.set_body(&format!("1d{sides} {first}"));
            prop_assert_eq!(base.kind(), MacroKind::Dice);
            prop_assert_eq!(base.kind(), MacroKind::sniff(base.body()));
        }

        #[test]
        fn test_placeholder_categories_are_dropped(category in "(|  |-|none|NONE|uncategorized|Uncategorized)") {
            let base = MacroBase::new("m", "1d6").with_category(&category);
            prop_assert_eq!(base.category(), None);
            prop_assert_eq!(base.category_or_default(), UNCATEGORIZED);
        }
    }

    #[test]
    fn test_sniff_priority() {
        assert_eq!(MacroKind::sniff("https://example.com/table"), MacroKind::TableUrl);
        assert_eq!(MacroKind::sniff("[https://example.com/table]"), MacroKind::TableUrl);
        assert_eq!(MacroKind::sniff("1d4\n1-2 copper\n3 silver\n4 gold"), MacroKind::Table);
        assert_eq!(MacroKind::sniff("1d6 fire, 1d6 cold"), MacroKind::Dice);
        assert_eq!(MacroKind::sniff("{0} + 3"), MacroKind::Math);
        assert_eq!(MacroKind::sniff("12"), MacroKind::Dice);
        assert_eq!(MacroKind::sniff("{0}"), MacroKind::Dice);
        assert_eq!(MacroKind::sniff("atk"), MacroKind::Dice);
        assert_eq!(MacroKind::sniff(""), MacroKind::Dice);
    }

    #[test]
    fn test_table_url() {
        assert_eq!(table_url("<https://example.com/a>"), Some("https://example.com/a"));
        assert_eq!(table_url("https://example.com/b"), Some("https://example.com/b"));
        assert_eq!(table_url("1d6"), None);
    }

    #[test]
    fn test_matches() {
        let a = MacroBase::new("Fireball", "8d6  fire\tdmg").with_category("Spells");
        let b = MacroBase::new("fireball", "8d6 fire dmg").with_category("spells");
        let c = MacroBase::new("fireball", "8D6 fire dmg").with_category("spells");
        let d = MacroBase::new("fireball", "8d6 fire dmg");

        assert!(a.matches(&b));
        assert!(!a.matches(&c));
        assert!(!a.matches(&d));
    }

    #[test]
    fn test_record_roundtrip() {
        let base = MacroBase::new("loot", "copper, silver, gold").with_category("Treasure");
        let record = base.to_record();

        assert_eq!(record.category.as_deref(), Some("Treasure"));
        assert_eq!(MacroBase::from(record), base);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_serde_shape() {
        let base = MacroBase::new("atk", "1d20+5").with_category("none");
        let json = serde_json::to_value(&base).unwrap();

        assert_eq!(json, serde_json::json!({ "name": "atk", "body": "1d20+5" }));

        let back: MacroBase = serde_json::from_value(serde_json::json!({
            "name": "loot",
            "category": "",
            "body": "rope, torch"
        })).unwrap();
        assert_eq!(back.kind(), MacroKind::Items);
        assert_eq!(back.category(), None);
    }

    #[test]
    fn test_tiers() {
        let tiers = MacroTiers::default()
            .with_tier(MacroScope::Character, vec![MacroBase::new("atk", "1d20+7")])
            .with_tier(MacroScope::Global, Vec::new());

        assert_eq!(tiers.tiers().len(), 2);
        assert_eq!(tiers.get(0).map(|tier| tier.scope), Some(MacroScope::Character));
        assert!(!tiers.is_empty());
        assert!(MacroTiers::default().is_empty());
    }
}
