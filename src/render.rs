use std::fmt::Display;
use std::str::FromStr;
use crate::{DiceRoll, DieRoll, Error, Grade, RolledPart, TableRoll};


/// How much of a roll is shown.
///
/// | level | dice | description | grade icon | markdown |
/// |---|---|---|---|---|
/// | `Full` | yes | yes | next to the total | yes |
/// | `Short` | no | yes | next to the total | yes |
/// | `ExtraShort` | no | no | next to the total | yes |
/// | `Minimal` | no | no | instead of the total | yes |
/// | `Compact` | yes | yes | next to the total | no |
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum Verbosity {
    /// Dice, description and test.
    #[default]
    Full,
    /// Description and test, no dice.
    Short,
    /// The total and its grade.
    ExtraShort,
    /// The grade icon alone, or the total for ungraded rolls.
    Minimal,
    /// Like `Full`, without the markdown.
    Compact
}

impl Verbosity {
    fn shows_dice(self) -> bool {
        matches!(self, Verbosity::Full | Verbosity::Compact)
    }

    fn shows_description(self) -> bool {
        matches!(self, Verbosity::Full | Verbosity::Short | Verbosity::Compact)
    }

    fn markdown(self) -> bool {
        self != Verbosity::Compact
    }

    fn arrow(self) -> &'static str {
        if self.markdown() { "⟵" } else { "<-" }
    }
}

impl FromStr for Verbosity {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('_', "-").as_str() {
            "full" => Ok(Verbosity::Full),
            "short" => Ok(Verbosity::Short),
            "extra-short" | "extrashort" => Ok(Verbosity::ExtraShort),
            "minimal" => Ok(Verbosity::Minimal),
            "compact" => Ok(Verbosity::Compact),
            _ => Err(Error::UnknownVerbosity(s.to_string()))
        }
    }
}

impl Display for Verbosity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Verbosity::Full => "full",
            Verbosity::Short => "short",
            Verbosity::ExtraShort => "extra-short",
            Verbosity::Minimal => "minimal",
            Verbosity::Compact => "compact"
        };

        write!(f, "{name}")
    }
}


/// Renders a finished roll as one line of chat text.
///
/// A hidden test target is shown as `??` and the grade icon is put behind a
/// spoiler, so the roller sees the total without learning the outcome.
///
/// # Examples
/// ```
/// use bracket_dice::{parse_dice, render_roll, EngineConfig, QueuedSource, Verbosity};
///
/// let dice = parse_dice("1d20+5 atk vs 15").unwrap();
/// let roll = dice.roll(&mut QueuedSource::new([12]), &EngineConfig::default()).unwrap();
///
/// assert_eq!(render_roll(&roll, Verbosity::Full), "✅ **17** atk ⟵ 1d20+5 [12] vs 15");
/// assert_eq!(render_roll(&roll, Verbosity::Short), "✅ **17** atk vs 15");
/// assert_eq!(render_roll(&roll, Verbosity::Minimal), "✅");
/// assert_eq!(render_roll(&roll, Verbosity::Compact), "✅ 17 atk <- 1d20+5 [12] vs 15");
/// ```
pub fn render_roll(roll: &DiceRoll, verbosity: Verbosity) -> String {
    let hidden = roll.dice().has_secret();
    let icon = grade_icon(roll.grade(), hidden, verbosity);
    let total = bold(&roll.total().to_string(), verbosity);

    if verbosity == Verbosity::Minimal {
        return icon.unwrap_or(total);
    }

    let mut pieces: Vec<String> = icon.into_iter().collect();
    pieces.push(total);

    if verbosity.shows_description() {
        pieces.push(roll.dice().description());
    }

    if verbosity.shows_dice() {
        pieces.push(verbosity.arrow().into());
        pieces.extend(roll.parts().iter().map(|part| render_part(part, verbosity)));
    }

    let test = roll.dice().test();
    if !test.is_empty() {
        pieces.push(match hidden {
            true => test.display_with("??"),
            false => test.to_string()
        });
    }

    join(pieces)
}

fn grade_icon(grade: Grade, hidden: bool, verbosity: Verbosity) -> Option<String> {
    let icon = grade.icon()?;

    Some(match (hidden, verbosity.markdown()) {
        (false, _) => icon.to_string(),
        (true, true) => format!("||{icon}||"),
        (true, false) => "??".to_string()
    })
}

fn render_part(rolled: &RolledPart, verbosity: Verbosity) -> String {
    let notation = rolled.part().notation();

    if !rolled.part().has_die() {
        return notation;
    }

    let faces: Vec<String> = rolled.dice().iter().map(|die| render_die(die, verbosity)).collect();
    format!("{notation} [{}]", faces.join(", "))
}

fn render_die(die: &DieRoll, verbosity: Verbosity) -> String {
    let mut face = match (die.rolled == die.value, verbosity.markdown()) {
        (true, _) => die.value.to_string(),
        (false, true) => format!("{}→{}", die.rolled, die.value),
        (false, false) => format!("{}->{}", die.rolled, die.value)
    };

    if die.exploded {
        face.push('!');
    }

    match (die.kept, verbosity.markdown()) {
        (true, _) => face,
        (false, true) => format!("~~{face}~~"),
        (false, false) => format!("({face})")
    }
}


/// Renders the value of a math macro.
pub fn render_math(expression: &str, value: i32, verbosity: Verbosity) -> String {
    let value = bold(&value.to_string(), verbosity);

    match verbosity.shows_dice() {
        true => join(vec![value, verbosity.arrow().into(), expression.trim().into()]),
        false => value
    }
}

/// Renders the row a table roll landed on.
pub fn render_table(roll: &TableRoll, verbosity: Verbosity) -> String {
    let text = roll.text().unwrap_or("no result").to_string();

    if verbosity == Verbosity::Minimal {
        return text;
    }

    let mut pieces = vec![bold(&roll.roll().total().to_string(), verbosity), text];

    if verbosity.shows_dice() {
        pieces.push(verbosity.arrow().into());
        pieces.extend(roll.roll().parts().iter().map(|part| render_part(part, verbosity)));
    }

    join(pieces)
}

/// Renders an item list macro, one entry per line in markdown.
pub fn render_items(body: &str, verbosity: Verbosity) -> String {
    let entries: Vec<&str> = body.split(',').map(str::trim).filter(|entry| !entry.is_empty()).collect();

    match verbosity {
        Verbosity::Full | Verbosity::Short => entries.iter()
            .map(|entry| format!("- {entry}"))
            .collect::<Vec<_>>()
            .join("\n"),
        _ => entries.join(", ")
    }
}

/// Renders a table url; markdown output suppresses the link preview.
pub fn render_url(url: &str, verbosity: Verbosity) -> String {
    match verbosity.markdown() {
        true => format!("<{url}>"),
        false => url.to_string()
    }
}

fn bold(text: &str, verbosity: Verbosity) -> String {
    match verbosity.markdown() {
        true => format!("**{text}**"),
        false => text.to_string()
    }
}

fn join(pieces: Vec<String>) -> String {
    pieces.into_iter()
        .filter(|piece| !piece.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}


#[cfg(test)]
mod test {
    use proptest::prelude::*;
    use super::*;
    use crate::{parse_dice, EngineConfig, QueuedSource, RngSource, RollTable};
    use crate::roll_test_strategies::dice_strategy;

    fn roll(notation: &str, faces: &[u16]) -> DiceRoll {
        parse_dice(notation).unwrap()
            .roll(&mut QueuedSource::new(faces.iter().copied()), &EngineConfig::default())
            .unwrap()
    }

    fn verbosity_strategy() -> impl Strategy<Value = Verbosity> {
        prop_oneof![
            Just(Verbosity::Full),
            Just(Verbosity::Short),
            Just(Verbosity::ExtraShort),
            Just(Verbosity::Minimal),
            Just(Verbosity::Compact),
        ]
    }

    proptest! {
        #[test]
        fn test_verbosity_name_roundtrip(verbosity in verbosity_strategy()) {
            prop_assert_eq!(verbosity.to_string().parse::<Verbosity>(), Ok(verbosity));
        }

        #[test]
        fn test_total_is_shown(dice in dice_strategy(), seed: u64, verbosity in verbosity_strategy()) {
            let roll = dice.roll(&mut RngSource::seeded(seed), &EngineConfig::default()).unwrap();
            let text = render_roll(&roll, verbosity);

            prop_assume!(verbosity != Verbosity::Minimal || roll.grade() == Grade::Unknown);
            prop_assert!(text.contains(&roll.total().to_string()), "{text}");
        }

        #[test]
        fn test_compact_is_plain(dice in dice_strategy(), seed: u64) {
            let roll = dice.roll(&mut RngSource::seeded(seed), &EngineConfig::default()).unwrap();
            let text = render_roll(&roll, Verbosity::Compact);

            prop_assert!(!text.contains("**"));
            prop_assert!(!text.contains("~~"));
            prop_assert!(!text.contains("||"));
        }
    }

    #[test]
    fn test_levels() {
        let roll = roll("4d6kh3 str", &[2, 5, 1, 6]);

        assert_eq!(render_roll(&roll, Verbosity::Full), "**13** str ⟵ 4d6kh3 [2, 5, ~~1~~, 6]");
        assert_eq!(render_roll(&roll, Verbosity::Short), "**13** str");
        assert_eq!(render_roll(&roll, Verbosity::ExtraShort), "**13**");
        assert_eq!(render_roll(&roll, Verbosity::Minimal), "**13**");
        assert_eq!(render_roll(&roll, Verbosity::Compact), "13 str <- 4d6kh3 [2, 5, (1), 6]");
    }

    #[test]
    fn test_explosions_and_thresholds() {
        let roll = roll("2d6! min3", &[6, 2, 1]);
        assert_eq!(render_roll(&roll, Verbosity::Full), "**12** ⟵ 2d6!min3 [6, 2→3, 1→3!]");
    }

    #[test]
    fn test_flat_parts() {
        let roll = roll("1d8+2 fire +3 bless", &[4]);
        assert_eq!(render_roll(&roll, Verbosity::Full), "**9** fire bless ⟵ 1d8+2 [4] +3");
    }

    #[test]
    fn test_hidden_target() {
        let roll = roll("1d20+2 vs ||15||", &[14]);

        assert_eq!(render_roll(&roll, Verbosity::Full), "||✅|| **16** ⟵ 1d20+2 [14] vs ??");
        assert_eq!(render_roll(&roll, Verbosity::Compact), "?? 16 <- 1d20+2 [14] vs ??");
        assert_eq!(render_roll(&roll, Verbosity::Minimal), "||✅||");
    }

    #[test]
    fn test_critical() {
        let roll = roll("1d20+1 >= 30", &[20]);
        assert_eq!(render_roll(&roll, Verbosity::ExtraShort), "⚡ **21** >= 30");
    }

    #[test]
    fn test_other_kinds() {
        assert_eq!(render_math("{str} + 2", 6, Verbosity::Full), "**6** ⟵ {str} + 2");
        assert_eq!(render_math("{str} + 2", 6, Verbosity::Short), "**6**");
        assert_eq!(render_items("rope, torch", Verbosity::Full), "- rope\n- torch");
        assert_eq!(render_items("rope, torch", Verbosity::Compact), "rope, torch");
        assert_eq!(render_url("https://example.com/t", Verbosity::Short), "<https://example.com/t>");

        let table = RollTable::parse("1d4\n1-2 copper\n3-4 silver").unwrap();
        let result = table.roll(&mut QueuedSource::new([3]), &EngineConfig::default()).unwrap();
        assert_eq!(render_table(&result, Verbosity::Short), "**3** silver");
        assert_eq!(render_table(&result, Verbosity::Minimal), "silver");
    }

    #[test]
    fn test_unknown_verbosity() {
        assert_eq!("ExtraShort".parse::<Verbosity>(), Ok(Verbosity::ExtraShort));
        assert_eq!("loud".parse::<Verbosity>(), Err(Error::UnknownVerbosity("loud".into())));
    }
}
