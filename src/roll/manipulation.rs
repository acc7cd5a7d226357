use std::fmt::Display;
use crate::roll::DieRoll;
use crate::{Error, ExplodeSpec};


/// Keeps or drops a number of the highest or lowest dice of a pool,
/// as in `4d6kh3` or `2d20dl1`.
///
/// Only dice still kept when the rule runs take part. Among equal faces the
/// die rolled first is selected first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DropKeep {
    /// Keeps `n` dice, the highest if `highest` is `true`, else the lowest.
    Keep {
        highest: bool,
        n: u16
    },

    /// Drops `n` dice, the highest if `highest` is `true`, else the lowest.
    Drop {
        highest: bool,
        n: u16
    }
}

impl DropKeep {
    /// Keep the `n` highest dice.
    pub fn kh(n: u16) -> Self {
        DropKeep::Keep { highest: true, n }
    }

    /// Keep the `n` lowest dice.
    pub fn kl(n: u16) -> Self {
        DropKeep::Keep { highest: false, n }
    }

    /// Drop the `n` highest dice.
    pub fn dh(n: u16) -> Self {
        DropKeep::Drop { highest: true, n }
    }

    /// Drop the `n` lowest dice.
    pub fn dl(n: u16) -> Self {
        DropKeep::Drop { highest: false, n }
    }

    /// Builds a rule from its notation letters (`k`/`d` and `h`/`l`).
    ///
    /// # Errors
    /// Returns [`Error::ZeroValue`] when `n` is zero.
    pub fn from_notation(keep: bool, highest: bool, n: u16) -> Result<Self, Error> {
        if n == 0 {
            return Err(Error::ZeroValue);
        }

        Ok(if keep { DropKeep::Keep { highest, n } } else { DropKeep::Drop { highest, n } })
    }

    /// How many dice the rule keeps or drops.
    pub fn n(&self) -> u16 {
        match self {
            DropKeep::Keep { n, .. } | DropKeep::Drop { n, .. } => *n
        }
    }

    /// Number of dice still kept after this rule when `kept` were kept before.
    pub fn kept_after(&self, kept: u16) -> u16 {
        match *self {
            DropKeep::Keep { n, .. } => kept.min(n),
            DropKeep::Drop { n, .. } => kept.saturating_sub(n)
        }
    }

    /// Marks the dice the rule removes as not kept. Dice already dropped are ignored.
    pub fn apply(&self, dice: &mut [DieRoll]) {
        let (highest, n) = match *self {
            DropKeep::Keep { highest, n } | DropKeep::Drop { highest, n } => (highest, n as usize)
        };

        let mut indexed: Vec<(usize, u16)> = dice.iter()
            .enumerate()
            .filter(|(_, die)| die.kept)
            .map(|(i, die)| (i, die.value))
            .collect();

        if highest {
            indexed.sort_by(|a, b| b.1.cmp(&a.1));
        } else {
            indexed.sort_by(|a, b| a.1.cmp(&b.1));
        }

        let (selected, rest) = indexed.split_at(n.min(indexed.len()));
        let dropped = match self {
            DropKeep::Keep { .. } => rest,
            DropKeep::Drop { .. } => selected
        };

        for (i, _) in dropped {
            dice[*i].kept = false;
        }
    }
}

impl Display for DropKeep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let (letter, highest, n) = match self {
            DropKeep::Keep { highest, n } => ("k", highest, n),
            DropKeep::Drop { highest, n } => ("d", highest, n)
        };

        write!(f, "{}{}{}", letter, if *highest { "h" } else { "l" }, n)
    }
}


/// Clamps die faces: `min3` raises every face below 3 to 3, `max5` lowers
/// every face above 5 to 5.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Threshold {
    /// `minN`
    Floor(u16),
    /// `maxN`
    Ceiling(u16)
}

impl Threshold {
    /// The face after clamping.
    pub fn clamp(&self, face: u16) -> u16 {
        match *self {
            Threshold::Floor(floor) => face.max(floor),
            Threshold::Ceiling(ceiling) => face.min(ceiling)
        }
    }

    /// Applies to every die of the pool, kept or not.
    pub fn apply(&self, dice: &mut [DieRoll]) {
        for die in dice {
            die.value = self.clamp(die.value);
        }
    }
}

impl Display for Threshold {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Threshold::Floor(n) => write!(f, "min{n}"),
            Threshold::Ceiling(n) => write!(f, "max{n}")
        }
    }
}


/// A post-roll transform of a dice pool, applied in the order written.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Manipulation {
    /// `kh`, `kl`, `dh` or `dl`.
    DropKeep(DropKeep),
    /// `!`, extra dice on qualifying faces.
    Explode(ExplodeSpec),
    /// `min`/`max` face clamping.
    Threshold(Threshold)
}

impl From<DropKeep> for Manipulation {
    fn from(value: DropKeep) -> Self {
        Self::DropKeep(value)
    }
}

impl From<ExplodeSpec> for Manipulation {
    fn from(value: ExplodeSpec) -> Self {
        Self::Explode(value)
    }
}

impl From<Threshold> for Manipulation {
    fn from(value: Threshold) -> Self {
        Self::Threshold(value)
    }
}

impl Display for Manipulation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Manipulation::DropKeep(rule) => write!(f, "{rule}"),
            Manipulation::Explode(spec) => write!(f, "{spec}"),
            Manipulation::Threshold(threshold) => write!(f, "{threshold}")
        }
    }
}
