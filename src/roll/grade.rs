use std::fmt::Display;
use crate::DiceRoll;


/// Qualitative outcome of a finished roll.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Grade {
    /// No test and no natural result worth calling out.
    #[default]
    Unknown,
    /// A natural 1 on a lone d20.
    CriticalFailure,
    /// The test failed.
    Failure,
    /// The test passed.
    Success,
    /// A natural 20 on a lone d20.
    CriticalSuccess
}

impl Grade {
    /// Grades a roll.
    ///
    /// A single kept d20 as primary die grades a natural 20 as a critical
    /// success and a natural 1 as a critical failure. Anything else follows
    /// the test, or stays [`Grade::Unknown`] without one.
    pub fn of(roll: &DiceRoll) -> Self {
        if let Some(natural) = natural_d20(roll) {
            match natural {
                20 => return Grade::CriticalSuccess,
                1 => return Grade::CriticalFailure,
                _ => {}
            }
        }

        match roll.test_result() {
            Some(true) => Grade::Success,
            Some(false) => Grade::Failure,
            None => Grade::Unknown
        }
    }

    /// Icon shown next to (or instead of) the total.
    pub fn icon(&self) -> Option<&'static str> {
        match self {
            Grade::Unknown => None,
            Grade::CriticalFailure => Some("💀"),
            Grade::Failure => Some("❌"),
            Grade::Success => Some("✅"),
            Grade::CriticalSuccess => Some("⚡")
        }
    }

    /// Success, critical or not.
    pub fn is_success(&self) -> bool {
        matches!(self, Grade::Success | Grade::CriticalSuccess)
    }
}

impl Display for Grade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Grade::Unknown => "unknown",
            Grade::CriticalFailure => "critical failure",
            Grade::Failure => "failure",
            Grade::Success => "success",
            Grade::CriticalSuccess => "critical success"
        };

        write!(f, "{name}")
    }
}

fn natural_d20(roll: &DiceRoll) -> Option<u16> {
    let primary = roll.primary()?;

    if primary.part().sides() != 20 {
        return None;
    }

    let mut kept = primary.kept();
    match (kept.next(), kept.next()) {
        (Some(face), None) => Some(face),
        _ => None
    }
}
