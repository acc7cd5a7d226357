use std::fmt::Display;
use crate::{Error, RollSource, TestType};


/// When a die explodes: on its maximum face, or on an explicit comparison.
///
/// Every qualifying die earns one extra roll, and an extra roll that
/// qualifies earns another one, so a chain keeps going until a roll misses.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ExplodeSpec {
    kind: TestType,
    value: i32,
    alias: String
}

impl ExplodeSpec {
    /// Explodes on the highest face of the die (`!`).
    pub fn max_face() -> Self {
        Self { kind: TestType::None, value: 0, alias: "!".into() }
    }

    /// Explodes whenever `face <kind> value` holds (`!>=9`).
    pub fn on(kind: TestType, value: i32) -> Self {
        let alias = format!("!{kind}{value}");
        Self { kind, value, alias }
    }

    /// The comparison, [`TestType::None`] for the maximum face.
    pub fn kind(&self) -> TestType {
        self.kind
    }

    /// Value compared against; unused for the maximum face.
    pub fn value(&self) -> i32 {
        self.value
    }

    /// The notation, such as `!` or `!>=9`.
    pub fn alias(&self) -> &str {
        &self.alias
    }

    /// Whether `face` rolled on a `die_size` die earns an extra roll.
    pub fn should_explode(&self, face: u16, die_size: u16) -> bool {
        match self.kind {
            TestType::None => face == die_size,
            kind => kind.compare(face as i32, self.value).unwrap_or(false)
        }
    }

    /// Rolls the extra dice earned by `existing`, in the order they are rolled.
    ///
    /// A new value that does not qualify settles one pending explosion; a value
    /// that qualifies leaves the pending count untouched, so the chain goes on.
    ///
    /// # Errors
    /// Returns [`Error::TooManyExplosions`] once `limit` extra dice have been
    /// rolled and explosions are still pending.
    ///
    /// # Examples
    /// ```
    /// use bracket_dice::{ExplodeSpec, QueuedSource};
    ///
    /// let mut source = QueuedSource::new([6, 6, 2]);
    /// let extra = ExplodeSpec::max_face().explode(6, &[6, 3], &mut source, 100).unwrap();
    /// assert_eq!(extra, vec![6, 6, 2]);
    /// ```
    pub fn explode<S: RollSource + ?Sized>(
        &self,
        die_size: u16,
        existing: &[u16],
        source: &mut S,
        limit: usize
    ) -> Result<Vec<u16>, Error> {
        let mut pending = existing.iter()
            .filter(|face| self.should_explode(**face, die_size))
            .count();

        let mut rolled = Vec::new();

        while pending > 0 {
            if rolled.len() >= limit {
                return Err(Error::TooManyExplosions(limit));
            }

            let face = source.roll(die_size);
            rolled.push(face);

            if !self.should_explode(face, die_size) {
                pending -= 1;
            }
        }

        Ok(rolled)
    }
}

impl Display for ExplodeSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.alias)
    }
}
