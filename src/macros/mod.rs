mod model;
mod table;
mod resolve;
mod args;
mod flatten;

pub use model::{MacroBase, MacroKind, MacroRecord, MacroScope, MacroTier, MacroTiers, UNCATEGORIZED};
pub(crate) use model::table_url;
pub use table::{RollTable, TableRow, TableRoll};
pub use resolve::{resolve, strip_prefix_ignore_case, Resolution, ResolvedMacro, Shorthand};
pub use args::{apply_args, apply_math_args, MacroArgs, NamedArg};
pub use flatten::{Expansion, Flattener};
