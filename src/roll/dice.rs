use std::fmt::Display;
use crate::roll::dice_test::EMPTY_TEST;
use crate::{DicePart, DiceTest, DropKeep, EngineConfig, Error, Grade, RollSource, RolledPart};


/// One bracketed roll expression: an ordered group of [`DicePart`]s.
///
/// # Examples
/// ```
/// use bracket_dice::{parse_dice, QueuedSource, EngineConfig, Grade};
///
/// let dice = parse_dice("[1d20+5 atk vs 15]").unwrap();
/// assert_eq!(dice.primary().unwrap().sides(), 20);
/// assert_eq!(dice.test().value(), Some(15));
///
/// let roll = dice.roll(&mut QueuedSource::new([12]), &EngineConfig::default()).unwrap();
/// assert_eq!(roll.total(), 17);
/// assert_eq!(roll.grade(), Grade::Success);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Dice {
    parts: Vec<DicePart>
}

impl Dice {
    /// A group of parts, rolled and summed together.
    pub fn new(parts: Vec<DicePart>) -> Self {
        Self { parts }
    }

    /// Parts in the order written.
    pub fn parts(&self) -> &[DicePart] {
        &self.parts
    }

    /// The first part that rolls dice.
    pub fn primary(&self) -> Option<&DicePart> {
        self.parts.iter().find(|part| part.has_die())
    }

    /// The first non-empty test of the group, or the empty test.
    pub fn test(&self) -> &DiceTest {
        self.parts.iter()
            .map(DicePart::test)
            .find(|test| !test.is_empty())
            .unwrap_or(&EMPTY_TEST)
    }

    /// Whether the test target must stay hidden from the roller.
    pub fn has_secret(&self) -> bool {
        self.test().hidden()
    }

    /// Smallest total of the group, explosions aside.
    pub fn min(&self) -> i32 {
        self.parts.iter().map(DicePart::min).fold(0, i32::saturating_add)
    }

    /// Largest total of the group, explosions aside.
    pub fn max(&self) -> i32 {
        self.parts.iter().map(DicePart::max).fold(0, i32::saturating_add)
    }

    /// Joined descriptions of every part.
    pub fn description(&self) -> String {
        self.parts.iter()
            .map(DicePart::description)
            .filter(|text| !text.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Rolls every part once.
    ///
    /// # Errors
    /// Propagates the first part error, see [`DicePart::roll`].
    pub fn roll<S: RollSource + ?Sized>(&self, source: &mut S, config: &EngineConfig) -> Result<DiceRoll, Error> {
        let parts = self.parts.iter()
            .map(|part| part.roll(source, config))
            .collect::<Result<Vec<_>, Error>>()?;

        Ok(DiceRoll { dice: self.clone(), parts })
    }

    /// A copy whose primary part rolls `rolls` dice and keeps per `rule` first.
    ///
    /// # Errors
    /// Returns [`Error::InvalidRoll`] when there is no die to apply it to, and
    /// [`Error::ZeroValue`] for zero rolls.
    pub fn with_keep(&self, rolls: u16, rule: DropKeep) -> Result<Self, Error> {
        if rolls == 0 || rule.n() == 0 {
            return Err(Error::ZeroValue);
        }

        let index = self.parts.iter()
            .position(DicePart::has_die)
            .ok_or_else(|| Error::InvalidRoll(format!("No die to apply {rolls}{rule} to")))?;

        let mut parts = self.parts.clone();
        parts[index] = parts[index].with_keep(rolls, rule);
        Ok(Self { parts })
    }
}

impl Display for Dice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let parts: Vec<String> = self.parts.iter().map(DicePart::to_string).collect();
        write!(f, "{}", parts.join(" "))
    }
}

impl From<DicePart> for Dice {
    fn from(value: DicePart) -> Self {
        Self::new(vec![value])
    }
}


/// The record of one roll of a [`Dice`] group.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct DiceRoll {
    dice: Dice,
    parts: Vec<RolledPart>
}

impl DiceRoll {
    /// The group that was rolled.
    pub fn dice(&self) -> &Dice {
        &self.dice
    }

    /// One record per part, in order.
    pub fn parts(&self) -> &[RolledPart] {
        &self.parts
    }

    /// The roll of [`Dice::primary`].
    pub fn primary(&self) -> Option<&RolledPart> {
        self.parts.iter().find(|rolled| rolled.part().has_die())
    }

    /// Sum of the part totals, saturating at the `i32` bounds.
    pub fn total(&self) -> i32 {
        self.parts.iter().map(RolledPart::total).fold(0, i32::saturating_add)
    }

    /// Result of [`Dice::test`] against the total; `None` without a test.
    pub fn test_result(&self) -> Option<bool> {
        self.dice.test().test(self.total())
    }

    /// See [`Grade::of`].
    pub fn grade(&self) -> Grade {
        Grade::of(self)
    }
}
