use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, warn};
use crate::macros::table_url;
use crate::render::{render_items, render_math, render_table, render_url};
use crate::{
    apply_args, apply_math_args, evaluate_math, parse_dice, render_roll,
    Dice, DropKeep, EngineConfig, Error, Expansion, Flattener, Grade, MacroKind, MacroTiers,
    NoStats, RngSource, RollSource, RollTable, Shorthand, StatLookup
};


static EXPRESSION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\[[^\[\]]*\]").expect("Failed to compile expression regex")
});


/// One rolled and rendered expression.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct RollOutput {
    /// The expression as rolled, after macro expansion and argument substitution.
    pub source_text: String,
    /// Output for the chat, rendered at the configured verbosity.
    pub rendered_text: String,
    /// `None` for outputs without a number, such as item lists.
    pub total: Option<i32>,
    /// [`Grade::Unknown`] for outputs that are not dice rolls.
    pub grade: Grade,
    /// The test target is hidden from the roller.
    pub has_secret: bool
}

impl RollOutput {
    fn text(source_text: &str, rendered_text: String) -> Self {
        Self {
            source_text: source_text.into(),
            rendered_text,
            total: None,
            grade: Grade::Unknown,
            has_secret: false
        }
    }
}


/// Rolls the expressions found in chat text.
///
/// The engine reads macros and stats through borrowed lookups and owns the
/// [`RollSource`] its dice come from.
///
/// # Examples
/// ```
/// use bracket_dice::{Engine, MacroBase, MacroScope, MacroTiers, QueuedSource};
///
/// let tiers = MacroTiers::default()
///     .with_tier(MacroScope::User, vec![MacroBase::new("heal", "1d8+{0:2}")]);
///
/// let mut engine = Engine::new(&tiers, QueuedSource::new([3, 6]));
/// let outputs = engine.evaluate("I cast [heal 5] and then [heal]");
///
/// assert_eq!(outputs[0].source_text, "[1d8+5]");
/// assert_eq!(outputs[0].total, Some(8));
/// assert_eq!(outputs[1].source_text, "[1d8+2]");
/// assert_eq!(outputs[1].total, Some(8));
/// ```
pub struct Engine<'a, S: RollSource> {
    tiers: &'a MacroTiers,
    stats: &'a dyn StatLookup,
    source: S,
    config: EngineConfig
}

impl<'a, S: RollSource> Engine<'a, S> {
    /// An engine with the default configuration and no stats.
    pub fn new(tiers: &'a MacroTiers, source: S) -> Self {
        Self {
            tiers,
            stats: &NoStats,
            source,
            config: EngineConfig::default()
        }
    }

    /// Sets the stats math macros read.
    pub fn with_stats(mut self, stats: &'a dyn StatLookup) -> Self {
        self.stats = stats;
        self
    }

    /// Replaces the default [`EngineConfig`].
    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// The configuration in use.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Rolls every `[...]` group of `input`, or the whole input when it has
    /// none.
    ///
    /// An expression that fails is logged and left out; the others are still
    /// rolled.
    pub fn evaluate(&mut self, input: &str) -> Vec<RollOutput> {
        let mut expressions: Vec<&str> = EXPRESSION.find_iter(input).map(|m| m.as_str()).collect();

        if expressions.is_empty() && !input.trim().is_empty() {
            expressions.push(input.trim());
        }

        let mut outputs = Vec::new();

        for expression in expressions {
            match self.evaluate_expression(expression) {
                Ok(rolled) => outputs.extend(rolled),
                Err(err) => warn!(expression, %err, "expression skipped")
            }
        }

        outputs
    }

    /// Rolls a single expression, macros and shorthands included.
    ///
    /// # Errors
    /// The first error met by any of the expansions: a parse error, a roll
    /// error, an unknown stat, a malformed table, or a shorthand asking for
    /// too many repeats.
    pub fn evaluate_expression(&mut self, expression: &str) -> Result<Vec<RollOutput>, Error> {
        let expansions = Flattener::new(self.tiers, &self.config).flatten(expression);
        debug!(expression, expansions = expansions.len(), "flattened");

        let mut outputs = Vec::new();
        for expansion in &expansions {
            outputs.extend(self.evaluate_expansion(expansion)?);
        }

        Ok(outputs)
    }

    fn evaluate_expansion(&mut self, expansion: &Expansion) -> Result<Vec<RollOutput>, Error> {
        let verbosity = self.config.verbosity;

        match expansion.kind {
            MacroKind::Dice => {
                let text = apply_args(&expansion.body, &expansion.args, self.config.include_unused_args);
                let dice = parse_dice(&text)?;

                match expansion.shorthand.unwrap_or_default() {
                    Shorthand::Repeat(times) => (0..self.repeats(times)?)
                        .map(|_| self.roll_dice(&text, &dice))
                        .collect(),
                    Shorthand::Keep { rolls, highest, keep } => {
                        let rule = DropKeep::from_notation(true, highest, u16::try_from(keep).unwrap_or(u16::MAX))?;
                        let dice = dice.with_keep(self.repeats(rolls)?, rule)?;
                        Ok(vec![self.roll_dice(&text, &dice)?])
                    }
                }
            },
            MacroKind::Math => {
                let text = apply_math_args(&expansion.body, &expansion.args);
                let inner = text.trim_start_matches('[').trim_end_matches(']');
                let value = evaluate_math(inner, self.stats)?;

                Ok(vec![RollOutput {
                    total: Some(value),
                    ..RollOutput::text(&text, render_math(inner, value, verbosity))
                }])
            },
            MacroKind::Table => {
                let table = RollTable::parse(&expansion.body)?;
                let times = match expansion.shorthand {
                    Some(Shorthand::Repeat(times)) => self.repeats(times)?,
                    _ => 1
                };

                (0..times)
                    .map(|_| -> Result<RollOutput, Error> {
                        let result = table.roll(&mut self.source, &self.config)?;
                        Ok(RollOutput {
                            total: Some(result.roll().total()),
                            ..RollOutput::text(&expansion.body, render_table(&result, verbosity))
                        })
                    })
                    .collect()
            },
            MacroKind::Items => Ok(vec![RollOutput::text(&expansion.body, render_items(&expansion.body, verbosity))]),
            MacroKind::TableUrl => {
                let url = table_url(&expansion.body).unwrap_or(&expansion.body);
                Ok(vec![RollOutput::text(&expansion.body, render_url(url, verbosity))])
            }
        }
    }

    /// Checks a shorthand count against [`EngineConfig::max_repeat`].
    fn repeats(&self, times: u32) -> Result<u16, Error> {
        let limit = self.config.max_repeat;

        match times {
            0 => Err(Error::ZeroValue),
            times => u16::try_from(times)
                .ok()
                .filter(|times| *times <= limit)
                .ok_or(Error::TooManyRepeats { requested: times, limit })
        }
    }

    fn roll_dice(&mut self, text: &str, dice: &Dice) -> Result<RollOutput, Error> {
        let roll = dice.roll(&mut self.source, &self.config)?;

        Ok(RollOutput {
            source_text: text.into(),
            rendered_text: render_roll(&roll, self.config.verbosity),
            total: Some(roll.total()),
            grade: roll.grade(),
            has_secret: dice.has_secret()
        })
    }
}


/// Rolls the expressions of `input` with the default configuration and the
/// thread-local random generator.
///
/// # Examples
/// ```
/// use bracket_dice::{evaluate, MacroTiers};
///
/// let outputs = evaluate("[2#1d6] and [1d20+3 vs 10]", &MacroTiers::default());
///
/// assert_eq!(outputs.len(), 3);
/// assert!(outputs.iter().all(|output| output.total.is_some()));
/// ```
pub fn evaluate(input: &str, tiers: &MacroTiers) -> Vec<RollOutput> {
    Engine::new(tiers, RngSource::thread()).evaluate(input)
}


#[cfg(test)]
mod test {
    use std::collections::HashMap;
    use proptest::prelude::*;
    use super::*;
    use crate::{MacroBase, MacroScope, QueuedSource, Verbosity};

    fn tiers() -> MacroTiers {
        MacroTiers::default()
            .with_tier(MacroScope::Character, vec![
                MacroBase::new("heal", "1d8+{0:2}"),
                MacroBase::new("atk", "1d20+{mod:5} atk {vs ac}"),
                MacroBase::new("hp", "{con} * 2 + {0:1}"),
            ])
            .with_tier(MacroScope::Global, vec![
                MacroBase::new("loot", "1d4\n1-2 copper\n3-4 silver"),
                MacroBase::new("pack", "rope, torch, rations"),
                MacroBase::new("wild", "<https://example.com/wild-magic>"),
            ])
    }

    fn queued<'a>(tiers: &'a MacroTiers, faces: &[u16]) -> Engine<'a, QueuedSource> {
        Engine::new(tiers, QueuedSource::new(faces.iter().copied()))
    }

    proptest! {
        #[test]
        fn test_repeat_without_macros(seed: u64) {
            let tiers = MacroTiers::default();
            let mut engine = Engine::new(&tiers, RngSource::seeded(seed));
            let outputs = engine.evaluate("2#1d6");

            prop_assert_eq!(outputs.len(), 2);
            for output in outputs {
                let total = output.total.unwrap();
                prop_assert!((1..=6).contains(&total));
            }
        }
    }

    #[test]
    fn test_heal() {
        let tiers = tiers();
        let mut engine = queued(&tiers, &[3, 3]);

        let outputs = engine.evaluate("[heal 5] [heal]");
        let texts: Vec<&str> = outputs.iter().map(|output| output.source_text.as_str()).collect();

        assert_eq!(texts, vec!["[1d8+5]", "[1d8+2]"]);
        assert_eq!(outputs[0].total, Some(8));
        assert_eq!(outputs[1].total, Some(5));
    }

    #[test]
    fn test_named_arguments_and_target() {
        let tiers = tiers();
        let mut engine = queued(&tiers, &[10]);

        let output = &engine.evaluate("[atk ac=14 mod=3]")[0];
        assert_eq!(output.source_text, "[1d20+3 atk vs 14]");
        assert_eq!(output.grade, Grade::Failure);
        assert_eq!(output.total, Some(13));
    }

    #[test]
    fn test_advantage() {
        let tiers = tiers();
        let mut engine = queued(&tiers, &[5, 17]);

        let outputs = engine.evaluate("[+1d20+2]");
        assert_eq!(outputs.len(), 1);
        assert_eq!(outputs[0].total, Some(19));

        let mut engine = queued(&tiers, &[5, 17]);
        assert_eq!(engine.evaluate("[-atk]")[0].total, Some(10));
    }

    #[test]
    fn test_failures_are_isolated() {
        let tiers = tiers();
        let mut engine = queued(&tiers, &[4]);

        let outputs = engine.evaluate("[1d0] [1d6] [hp]");
        assert_eq!(outputs.len(), 1);
        assert_eq!(outputs[0].total, Some(4));

        assert!(matches!(engine.evaluate_expression("[1d0]"), Err(Error::ParserError(_))));
        assert_eq!(engine.evaluate_expression("[hp]"), Err(Error::UnknownStat("con".into())));
        assert_eq!(
            engine.evaluate_expression("[50#1d6]"),
            Err(Error::TooManyRepeats { requested: 50, limit: 20 })
        );
    }

    #[test]
    fn test_math_with_stats() {
        let tiers = tiers();
        let stats = HashMap::from([("CON".to_string(), "3".to_string())]);
        let mut engine = Engine::new(&tiers, QueuedSource::new([])).with_stats(&stats);

        let output = &engine.evaluate("[hp]")[0];
        assert_eq!(output.total, Some(7));
        assert_eq!(output.rendered_text, "**7** ⟵ {con} * 2 + 1");
    }

    #[test]
    fn test_other_kinds() {
        let tiers = tiers();
        let mut engine = queued(&tiers, &[3, 1])
            .with_config(EngineConfig::default().with_verbosity(Verbosity::Short));

        let outputs = engine.evaluate("[2#loot] [pack] [wild]");
        let rendered: Vec<&str> = outputs.iter().map(|output| output.rendered_text.as_str()).collect();

        assert_eq!(rendered, vec![
            "**3** silver",
            "**1** copper",
            "- rope\n- torch\n- rations",
            "<https://example.com/wild-magic>",
        ]);
        assert_eq!(outputs[2].total, None);
    }

    #[test]
    fn test_hidden_target() {
        let tiers = MacroTiers::default();
        let mut engine = queued(&tiers, &[12]);

        let output = &engine.evaluate("1d20 vs ||10||")[0];
        assert!(output.has_secret);
        assert_eq!(output.grade, Grade::Success);
        assert!(!output.rendered_text.contains("10"));
    }

    #[test]
    fn test_large_numbers_saturate() {
        let tiers = MacroTiers::default();
        let mut engine = queued(&tiers, &[3, 2]);

        let outputs = engine.evaluate("[1d6+2147483647] [1d4]");
        assert_eq!(outputs.len(), 2);
        assert_eq!(outputs[0].total, Some(i32::MAX));
        assert_eq!(outputs[1].total, Some(2));

        let outputs = engine.evaluate("[2000000000 + 2000000000]");
        assert_eq!(outputs[0].total, Some(i32::MAX));
    }

    #[test]
    fn test_huge_pool_saturates() {
        let tiers = MacroTiers::default();
        let mut engine = queued(&tiers, &vec![65535; 65535]);

        let outputs = engine.evaluate("[65535d65535] [1d4]");
        assert_eq!(outputs.len(), 2);
        assert_eq!(outputs[0].total, Some(i32::MAX));
        assert!((1..=4).contains(&outputs[1].total.unwrap()));
    }

    #[test]
    fn test_large_shorthand_counts_are_rejected() {
        let tiers = tiers();
        let mut engine = queued(&tiers, &[]);

        assert_eq!(
            engine.evaluate_expression("[70000#1d6]"),
            Err(Error::TooManyRepeats { requested: 70_000, limit: 20 })
        );
        assert_eq!(
            engine.evaluate_expression("[99999kh1# 1d20]"),
            Err(Error::TooManyRepeats { requested: 99_999, limit: 20 })
        );
        assert_eq!(
            engine.evaluate_expression("[0kh1# 1d20]"),
            Err(Error::ZeroValue)
        );
        assert!(engine.evaluate("[99999kh1# 1d20]").is_empty());
    }

    #[test]
    fn test_blank_input() {
        let tiers = MacroTiers::default();
        assert!(evaluate("   ", &tiers).is_empty());
        assert!(evaluate("[]", &tiers).is_empty());
    }
}
