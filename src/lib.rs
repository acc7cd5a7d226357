//! Dice notation and macro expansion for tabletop chat.
//!
//! Chat text is scanned for `[...]` expressions; each one is resolved against
//! tiers of named macros, flattened, filled with its call arguments, rolled
//! and rendered:
//!
//! ```
//! use bracket_dice::{Engine, MacroBase, MacroScope, MacroTiers, RngSource};
//!
//! let tiers = MacroTiers::default().with_tier(MacroScope::Character, vec![
//!     MacroBase::new("atk", "1d20+{mod:5} atk {vs ac}"),
//!     MacroBase::new("dmg", "2d6+3 slashing"),
//! ]);
//!
//! let mut engine = Engine::new(&tiers, RngSource::seeded(42));
//! let outputs = engine.evaluate("I swing: [atk ac=15][dmg]");
//!
//! assert_eq!(outputs.len(), 2);
//! assert_eq!(outputs[0].source_text, "[1d20+5 atk vs 15]");
//! ```
#![warn(missing_docs)]
#![warn(clippy::missing_errors_doc)]


#[cfg(test)]
mod roll_test_strategies;

mod error;
mod config;
mod source;
mod roll;
mod parser;
mod math;
mod macros;
mod render;
mod engine;

pub use error::Error;
pub use config::EngineConfig;
pub use source::{RollSource, RngSource, QueuedSource};
pub use roll::{
    DiceTest, TestType, ExplodeSpec,
    DropKeep, Threshold, Manipulation,
    DicePart, DicePartBuilder, DicePartCore, RolledPart, DieRoll, Sign,
    Dice, DiceRoll, Grade
};
pub use parser::{ParserError, PatternSet, PatternSetBuilder, Token, parse_dice};
pub use math::{
    Expr, UnaryOperator, BinaryOperator, MathParser,
    StatLookup, NoStats,
    parse_math, evaluate_math
};
pub use macros::{
    MacroBase, MacroKind, MacroRecord, MacroScope, MacroTier, MacroTiers, UNCATEGORIZED,
    RollTable, TableRow, TableRoll,
    Shorthand, Resolution, ResolvedMacro, resolve, strip_prefix_ignore_case,
    MacroArgs, NamedArg, apply_args, apply_math_args,
    Expansion, Flattener
};
pub use render::{Verbosity, render_roll, render_math, render_table, render_items, render_url};
pub use engine::{Engine, RollOutput, evaluate};
