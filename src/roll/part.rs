use std::fmt::Display;
use crate::{DiceTest, DropKeep, EngineConfig, Error, Manipulation, RollSource, Threshold};


/// Sign written in front of a dice part.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Sign {
    /// `+`
    Plus,
    /// `-`
    Minus
}

impl Sign {
    /// Reads `+` or `-`, surrounding whitespace allowed.
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        match symbol.trim() {
            "+" => Some(Sign::Plus),
            "-" => Some(Sign::Minus),
            _ => None
        }
    }

    /// `value` with the sign applied, saturating.
    pub fn apply(self, value: i32) -> i32 {
        match self {
            Sign::Plus => value,
            Sign::Minus => value.saturating_neg()
        }
    }
}

impl Display for Sign {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Sign::Plus => write!(f, "+"),
            Sign::Minus => write!(f, "-")
        }
    }
}


/// One die of a rolled pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DieRoll {
    /// Face after thresholds.
    pub value: u16,
    /// Face as rolled.
    pub rolled: u16,
    /// Whether the die counts toward the total.
    pub kept: bool,
    /// Whether the die was added by an explosion.
    pub exploded: bool
}

impl DieRoll {
    /// A kept die showing `face`.
    pub fn new(face: u16) -> Self {
        Self { value: face, rolled: face, kept: true, exploded: false }
    }

    /// A kept die added by an explosion.
    pub fn exploded(face: u16) -> Self {
        Self { exploded: true, ..Self::new(face) }
    }
}


/// The atomic unit of a roll expression: `NdS` with its manipulations, a flat
/// modifier, an optional test and free description text.
///
/// A part without a die (`count == 0`) is a plain modifier such as `+3 bless`.
/// The part itself never changes once built; [`DicePart::roll`] returns a new
/// [`RolledPart`] record every time.
///
/// # Examples
/// ```
/// use bracket_dice::{DicePart, DropKeep, QueuedSource, EngineConfig};
///
/// let part = DicePart::builder()
///     .dice(4, 6)
///     .manipulation(DropKeep::kh(3))
///     .description("strength")
///     .build()
///     .unwrap();
///
/// assert_eq!(part.to_string(), "4d6kh3 strength");
/// assert_eq!(part.min(), 3);
/// assert_eq!(part.max(), 18);
///
/// let mut source = QueuedSource::new([2, 5, 1, 6]);
/// let rolled = part.roll(&mut source, &EngineConfig::default()).unwrap();
/// assert_eq!(rolled.total(), 13);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "DicePartCore", into = "DicePartCore"))]
pub struct DicePart {
    count: u16,
    sides: u16,
    fixed_rolls: Vec<u16>,
    sign: Option<Sign>,
    modifier: i32,
    manipulations: Vec<Manipulation>,
    test: DiceTest,
    description: String
}

impl DicePart {
    /// Creates a new [`DicePartBuilder`], the explicit-argument way to build a part.
    pub fn builder() -> DicePartBuilder {
        DicePartBuilder::default()
    }

    /// Number of dice, zero for a plain modifier.
    pub fn count(&self) -> u16 {
        self.count
    }

    /// Faces per die.
    pub fn sides(&self) -> u16 {
        self.sides
    }

    /// Faces used before any random roll.
    pub fn fixed_rolls(&self) -> &[u16] {
        &self.fixed_rolls
    }

    /// Sign written in front of the dice, if any.
    pub fn sign(&self) -> Option<Sign> {
        self.sign
    }

    /// Flat modifier, with its own sign.
    pub fn modifier(&self) -> i32 {
        self.modifier
    }

    /// Manipulations in the order they run.
    pub fn manipulations(&self) -> &[Manipulation] {
        &self.manipulations
    }

    /// The test, possibly empty.
    pub fn test(&self) -> &DiceTest {
        &self.test
    }

    /// Free text after the notation.
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Whether the part rolls at least one die.
    pub fn has_die(&self) -> bool {
        self.count > 0 && self.sides > 0
    }

    /// No dice and no modifier.
    pub fn is_empty(&self) -> bool {
        self.count == 0 && self.sides == 0 && self.modifier == 0
    }

    /// Smallest total the part can produce, explosions aside.
    pub fn min(&self) -> i32 {
        self.bounds().0
    }

    /// Largest total the part can produce, explosions aside.
    pub fn max(&self) -> i32 {
        self.bounds().1
    }

    fn bounds(&self) -> (i32, i32) {
        if !self.has_die() {
            return (self.modifier, self.modifier);
        }

        let mut kept = self.count;
        let (mut low, mut high) = (1u16, self.sides);

        for manipulation in &self.manipulations {
            match manipulation {
                Manipulation::DropKeep(rule) => kept = rule.kept_after(kept),
                Manipulation::Threshold(threshold) => {
                    low = threshold.clamp(low);
                    high = threshold.clamp(high);
                },
                Manipulation::Explode(_) => {}
            }
        }

        let min = (kept as i32).saturating_mul(low as i32);
        let max = (kept as i32).saturating_mul(high as i32);

        match self.sign {
            Some(Sign::Minus) => (self.modifier.saturating_sub(max), self.modifier.saturating_sub(min)),
            _ => (self.modifier.saturating_add(min), self.modifier.saturating_add(max))
        }
    }

    /// Rolls the part: fixed rolls first, random faces for the rest, then
    /// every manipulation in order.
    ///
    /// # Errors
    /// Returns [`Error::TooManyExplosions`] when an explosion chain outgrows
    /// [`EngineConfig::max_explosions`].
    pub fn roll<S: RollSource + ?Sized>(&self, source: &mut S, config: &EngineConfig) -> Result<RolledPart, Error> {
        let mut dice: Vec<DieRoll> = Vec::new();

        if self.has_die() {
            let random = (self.count as usize).saturating_sub(self.fixed_rolls.len());
            dice.extend(self.fixed_rolls.iter().copied().map(DieRoll::new));
            dice.extend((0..random).map(|_| DieRoll::new(source.roll(self.sides))));
        }

        for manipulation in &self.manipulations {
            match manipulation {
                Manipulation::DropKeep(rule) => rule.apply(&mut dice),
                Manipulation::Threshold(threshold) => threshold.apply(&mut dice),
                Manipulation::Explode(spec) => {
                    let faces: Vec<u16> = dice.iter()
                        .filter(|die| die.kept)
                        .map(|die| die.value)
                        .collect();

                    let extra = spec.explode(self.sides, &faces, source, config.max_explosions)?;
                    dice.extend(extra.into_iter().map(DieRoll::exploded));
                }
            }
        }

        Ok(RolledPart::new(self.clone(), dice))
    }

    /// A copy rolling `rolls` dice with `rule` applied before any other
    /// manipulation, as the `+`, `-` and `NkhM#` shorthands ask for.
    pub(crate) fn with_keep(&self, rolls: u16, rule: DropKeep) -> Self {
        let mut part = self.clone();
        part.count = rolls;
        part.manipulations.insert(0, rule.into());
        part
    }

    /// The flat record the part is persisted as.
    pub fn to_core(&self) -> DicePartCore {
        DicePartCore {
            count: self.count,
            sides: self.sides,
            fixed_rolls: self.fixed_rolls.clone(),
            sign: self.sign,
            modifier: self.modifier,
            manipulations: self.manipulations.clone(),
            test: self.test.clone(),
            description: self.description.clone()
        }
    }

    /// Rebuilds a part from its persisted record.
    ///
    /// # Errors
    /// Same validation as [`DicePartBuilder::build`].
    pub fn from_core(core: DicePartCore) -> Result<Self, Error> {
        DicePartBuilder { part: DicePart {
            count: core.count,
            sides: core.sides,
            fixed_rolls: core.fixed_rolls,
            sign: core.sign,
            modifier: core.modifier,
            manipulations: core.manipulations,
            test: core.test,
            description: core.description
        }}.build()
    }
}

impl Display for DicePart {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut text = self.notation();

        if !self.description.is_empty() {
            push_word(&mut text, &self.description);
        }

        if !self.test.is_empty() {
            push_word(&mut text, &self.test.to_string());
        }

        write!(f, "{text}")
    }
}

impl DicePart {
    /// Sign, dice, manipulations and modifier, without description or test.
    pub(crate) fn notation(&self) -> String {
        let mut text = String::new();

        if self.has_die() {
            if let Some(sign) = self.sign {
                text.push_str(&sign.to_string());
            }

            text.push_str(&format!("{}d{}", self.count, self.sides));

            if !self.fixed_rolls.is_empty() {
                let fixed: Vec<String> = self.fixed_rolls.iter().map(u16::to_string).collect();
                text.push_str(&format!("({})", fixed.join(",")));
            }

            for manipulation in &self.manipulations {
                text.push_str(&manipulation.to_string());
            }

            if self.modifier != 0 {
                text.push_str(&format!("{:+}", self.modifier));
            }
        } else if self.modifier != 0 {
            match self.sign {
                Some(_) => text.push_str(&format!("{:+}", self.modifier)),
                None => text.push_str(&self.modifier.to_string())
            }
        } else if let Some(sign) = self.sign {
            text.push_str(&sign.to_string());
        }

        text
    }
}

fn push_word(text: &mut String, word: &str) {
    if !text.is_empty() {
        text.push(' ');
    }
    text.push_str(word);
}


/// Builder for [`DicePart`].
#[derive(Debug, Clone, Default)]
pub struct DicePartBuilder {
    part: DicePart
}

impl DicePartBuilder {
    /// Sets `count` dice of `sides` faces.
    pub fn dice(mut self, count: u16, sides: u16) -> Self {
        self.part.count = count;
        self.part.sides = sides;
        self
    }

    /// Predetermined faces, used before any random roll.
    pub fn fixed_rolls<I: IntoIterator<Item = u16>>(mut self, rolls: I) -> Self {
        self.part.fixed_rolls = rolls.into_iter().collect();
        self
    }

    /// Sign in front of the dice.
    pub fn sign(mut self, sign: Sign) -> Self {
        self.part.sign = Some(sign);
        self
    }

    /// Flat modifier, carrying its own sign.
    pub fn modifier(mut self, modifier: i32) -> Self {
        self.part.modifier = modifier;
        self
    }

    /// Appends a manipulation; they run in the order added.
    pub fn manipulation<M: Into<Manipulation>>(mut self, manipulation: M) -> Self {
        self.part.manipulations.push(manipulation.into());
        self
    }

    /// Shorthand for [`DicePartBuilder::manipulation`] with a threshold.
    pub fn threshold(self, threshold: Threshold) -> Self {
        self.manipulation(threshold)
    }

    /// Test the part is checked against.
    pub fn test(mut self, test: DiceTest) -> Self {
        self.part.test = test;
        self
    }

    /// Free text, trimmed.
    pub fn description(mut self, description: &str) -> Self {
        self.part.description = description.trim().into();
        self
    }

    /// Validates and returns the part.
    ///
    /// # Errors
    /// - [`Error::ZeroValue`] for dice with zero sides or a zero keep/drop count.
    /// - [`Error::InvalidRoll`] for fixed rolls outside `1..=sides`, or fixed
    ///   rolls on a part without dice.
    pub fn build(self) -> Result<DicePart, Error> {
        let part = self.part;

        if part.count > 0 && part.sides == 0 {
            return Err(Error::ZeroValue);
        }

        if part.manipulations.iter().any(|m| matches!(m, Manipulation::DropKeep(rule) if rule.n() == 0)) {
            return Err(Error::ZeroValue);
        }

        if !part.fixed_rolls.is_empty() && !part.has_die() {
            return Err(Error::InvalidRoll("Fixed rolls need dice to replace".into()));
        }

        if let Some(face) = part.fixed_rolls.iter().find(|face| **face == 0 || **face > part.sides) {
            return Err(Error::InvalidRoll(format!("{face} is not a face of a d{}", part.sides)));
        }

        Ok(part)
    }
}


/// The persisted shape of a [`DicePart`]: every defining field, nothing computed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DicePartCore {
    /// See [`DicePart::count`].
    pub count: u16,
    /// See [`DicePart::sides`].
    pub sides: u16,
    /// See [`DicePart::fixed_rolls`].
    #[cfg_attr(feature = "serde", serde(default))]
    pub fixed_rolls: Vec<u16>,
    /// See [`DicePart::sign`].
    #[cfg_attr(feature = "serde", serde(default))]
    pub sign: Option<Sign>,
    /// See [`DicePart::modifier`].
    #[cfg_attr(feature = "serde", serde(default))]
    pub modifier: i32,
    /// See [`DicePart::manipulations`].
    #[cfg_attr(feature = "serde", serde(default))]
    pub manipulations: Vec<Manipulation>,
    /// See [`DicePart::test`].
    #[cfg_attr(feature = "serde", serde(default))]
    pub test: DiceTest,
    /// See [`DicePart::description`].
    #[cfg_attr(feature = "serde", serde(default))]
    pub description: String
}


impl TryFrom<DicePartCore> for DicePart {
    type Error = Error;

    fn try_from(core: DicePartCore) -> Result<Self, Self::Error> {
        Self::from_core(core)
    }
}

impl From<DicePart> for DicePartCore {
    fn from(part: DicePart) -> Self {
        part.to_core()
    }
}


/// The record of one roll of a [`DicePart`].
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct RolledPart {
    part: DicePart,
    dice: Vec<DieRoll>,
    total: i32
}

impl RolledPart {
    fn new(part: DicePart, dice: Vec<DieRoll>) -> Self {
        let sum = dice.iter()
            .filter(|die| die.kept)
            .fold(0i32, |sum, die| sum.saturating_add(die.value as i32));

        let total = part.sign.unwrap_or(Sign::Plus).apply(sum).saturating_add(part.modifier);
        Self { part, dice, total }
    }

    /// The part that was rolled.
    pub fn part(&self) -> &DicePart {
        &self.part
    }

    /// Every die rolled, dropped and exploded ones included, in roll order.
    pub fn dice(&self) -> &[DieRoll] {
        &self.dice
    }

    /// Faces that count toward the total.
    pub fn kept(&self) -> impl Iterator<Item = u16> + '_ {
        self.dice.iter().filter(|die| die.kept).map(|die| die.value)
    }

    /// Kept faces with the sign applied, plus the modifier.
    pub fn total(&self) -> i32 {
        self.total
    }
}
