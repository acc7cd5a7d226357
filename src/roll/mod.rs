mod explode;
mod manipulation;
mod part;
mod dice;
mod grade;

pub use dice_test::{DiceTest, TestType};
pub use explode::ExplodeSpec;
pub use manipulation::{DropKeep, Threshold, Manipulation};
pub use part::{DicePart, DicePartBuilder, DicePartCore, RolledPart, DieRoll, Sign};
pub use dice::{Dice, DiceRoll};
pub use grade::Grade;
