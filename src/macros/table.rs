use once_cell::sync::Lazy;
use regex::Regex;
use crate::{parse_dice, Dice, DicePart, DiceRoll, EngineConfig, Error, RollSource};


static ROW: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d+)(?:\s*-\s*(\d+))?\s*[.:)]?\s+(\S.*)$").expect("Failed to compile table row regex")
});


/// One row of a [`RollTable`], covering the totals `low..=high`.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TableRow {
    /// Lowest total of the row.
    pub low: i32,
    /// Highest total of the row, equal to `low` for single numbers.
    pub high: i32,
    /// Row text.
    pub text: String
}

impl TableRow {
    /// Whether `total` falls in `low..=high`.
    pub fn contains(&self, total: i32) -> bool {
        (self.low..=self.high).contains(&total)
    }
}


/// A table macro: an optional dice line followed by numbered rows.
///
/// ```text
/// 1d6
/// 1-2. Goblin
/// 3-5. Orc
/// 6. Troll
/// ```
///
/// Without a dice line the table rolls one die as large as its highest row.
///
/// # Examples
/// ```
/// use bracket_dice::{RollTable, QueuedSource, EngineConfig};
///
/// let table = RollTable::parse("1 copper\n2-3 silver\n4 gold").unwrap();
/// assert_eq!(table.dice().to_string(), "1d4");
///
/// let result = table.roll(&mut QueuedSource::new([3]), &EngineConfig::default()).unwrap();
/// assert_eq!(result.text(), Some("silver"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RollTable {
    dice: Dice,
    rows: Vec<TableRow>
}

impl RollTable {
    /// Reads a table body.
    ///
    /// # Errors
    /// [`Error::InvalidTable`] when fewer than two rows are found, a line is
    /// neither a row nor the leading dice line, or a range runs backwards.
    pub fn parse(body: &str) -> Result<Self, Error> {
        let mut lines = body.lines().map(str::trim).filter(|line| !line.is_empty()).peekable();

        let dice = match lines.peek() {
            Some(first) if !ROW.is_match(first) => {
                let dice = parse_dice(first)
                    .ok()
                    .filter(|dice| dice.primary().is_some())
                    .ok_or_else(|| Error::InvalidTable(format!("'{first}' is neither dice nor a row")))?;
                lines.next();
                Some(dice)
            },
            _ => None
        };

        let rows = lines
            .map(|line| {
                let captures = ROW.captures(line)
                    .ok_or_else(|| Error::InvalidTable(format!("'{line}' is not a row")))?;

                let bound = |index: usize| captures.get(index).map(|m| m.as_str().parse::<i32>());
                let low = bound(1).unwrap_or(Ok(0)).map_err(|err| Error::InvalidTable(err.to_string()))?;
                let high = bound(2).unwrap_or(Ok(low)).map_err(|err| Error::InvalidTable(err.to_string()))?;

                if high < low {
                    return Err(Error::InvalidTable(format!("range {low}-{high} runs backwards")));
                }

                let text = captures.get(3).map(|m| m.as_str().trim()).unwrap_or_default();
                Ok(TableRow { low, high, text: text.into() })
            })
            .collect::<Result<Vec<_>, Error>>()?;

        if rows.len() < 2 {
            return Err(Error::InvalidTable(format!("{} rows, a table needs at least 2", rows.len())));
        }

        let dice = match dice {
            Some(dice) => dice,
            None => {
                let sides = rows.iter().map(|row| row.high).max().unwrap_or(1).clamp(1, u16::MAX as i32) as u16;
                DicePart::builder().dice(1, sides).build()?.into()
            }
        };

        Ok(Self { dice, rows })
    }

    /// Whether `body` reads as a table.
    pub fn is_table(body: &str) -> bool {
        body.lines().filter(|line| !line.trim().is_empty()).count() >= 2 && Self::parse(body).is_ok()
    }

    /// Dice rolled to pick a row.
    pub fn dice(&self) -> &Dice {
        &self.dice
    }

    /// Rows in the order written.
    pub fn rows(&self) -> &[TableRow] {
        &self.rows
    }

    /// The first row covering `total`.
    pub fn row(&self, total: i32) -> Option<&TableRow> {
        self.rows.iter().find(|row| row.contains(total))
    }

    /// Rolls the table dice and looks up the row.
    ///
    /// # Errors
    /// Same as [`Dice::roll`].
    pub fn roll<S: RollSource + ?Sized>(&self, source: &mut S, config: &EngineConfig) -> Result<TableRoll, Error> {
        let roll = self.dice.roll(source, config)?;
        let row = self.row(roll.total()).cloned();
        Ok(TableRoll { roll, row })
    }
}


/// The outcome of one [`RollTable::roll`].
#[derive(Debug, Clone, PartialEq)]
pub struct TableRoll {
    roll: DiceRoll,
    row: Option<TableRow>
}

impl TableRoll {
    /// The dice roll.
    pub fn roll(&self) -> &DiceRoll {
        &self.roll
    }

    /// The row picked, if any.
    pub fn row(&self) -> Option<&TableRow> {
        self.row.as_ref()
    }

    /// Text of the matching row; `None` when the total falls outside every row.
    pub fn text(&self) -> Option<&str> {
        self.row.as_ref().map(|row| row.text.as_str())
    }
}
