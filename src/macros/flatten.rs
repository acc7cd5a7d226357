use std::collections::HashSet;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, warn};
use crate::{resolve, EngineConfig, MacroArgs, MacroKind, MacroTiers, Shorthand};


static GROUP_BREAK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\]\s*\[").expect("Failed to compile group break regex")
});


/// One expression left after every macro call has been replaced by its body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Expansion {
    /// The text to evaluate, placeholders still in place.
    pub body: String,
    /// Arguments of the calls that led here, outermost first.
    pub args: Vec<MacroArgs>,
    /// Kind of the body, decided when the macro was defined.
    pub kind: MacroKind,
    /// The shorthand written on this expression, or on the nearest call above it.
    pub shorthand: Option<Shorthand>
}


#[derive(Default)]
struct Walk {
    visited: HashSet<(usize, String)>,
    expansions: usize
}


/// Expands macro calls into the expressions they stand for.
///
/// # Examples
/// ```
/// use bracket_dice::{EngineConfig, Flattener, MacroBase, MacroScope, MacroTiers};
///
/// let tiers = MacroTiers::default().with_tier(MacroScope::User, vec![
///     MacroBase::new("heal", "1d8+{0:2}"),
///     MacroBase::new("combo", "[heal][heal 4]"),
/// ]);
///
/// let expansions = Flattener::new(&tiers, &EngineConfig::default()).flatten("[combo 5]");
/// assert_eq!(expansions.len(), 2);
/// assert_eq!(expansions[0].body, "1d8+{0:2}");
/// assert_eq!(expansions[1].args[0].positional(), &["5"]);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Flattener<'a> {
    tiers: &'a MacroTiers,
    max_depth: usize,
    max_expansions: usize
}

impl<'a> Flattener<'a> {
    /// A flattener bounded by the depth and expansion limits of `config`.
    pub fn new(tiers: &'a MacroTiers, config: &EngineConfig) -> Self {
        Self {
            tiers,
            max_depth: config.max_flatten_depth,
            max_expansions: config.max_expansions
        }
    }

    /// Flattens `text`, one [`Expansion`] per expression it ends up as.
    ///
    /// Text calling no macro comes back as a single expansion holding it
    /// verbatim. A macro reached again through its own body, or a branch
    /// nested or expanded past the configured limits, is logged and
    /// contributes nothing.
    pub fn flatten(&self, text: &str) -> Vec<Expansion> {
        let mut walk = Walk::default();
        let mut expansions = Vec::new();

        self.walk(text, &[], None, 0, &mut walk, &mut expansions);
        expansions
    }

    fn walk(
        &self,
        text: &str,
        stack: &[MacroArgs],
        inherited: Option<Shorthand>,
        depth: usize,
        walk: &mut Walk,
        expansions: &mut Vec<Expansion>
    ) {
        if let Some(groups) = split_groups(text) {
            for group in groups {
                self.walk(&format!("[{group}]"), stack, inherited, depth, walk, expansions);
            }
            return;
        }

        let resolution = resolve(self.tiers, text);
        let shorthand = resolution.shorthand.or(inherited);

        let Some(found) = resolution.found else {
            let body = match resolution.shorthand {
                Some(_) => format!("[{}]", resolution.arguments),
                None => text.to_string()
            };

            expansions.push(Expansion { body, args: stack.to_vec(), kind: MacroKind::Dice, shorthand });
            return;
        };

        let definition = found.definition;
        let key = (found.tier, definition.name().to_lowercase());

        if walk.visited.contains(&key) {
            warn!(name = definition.name(), tier = found.tier, "macro calls itself, skipping");
            return;
        }
        if depth >= self.max_depth {
            warn!(name = definition.name(), depth, "macro nesting too deep, skipping");
            return;
        }
        if walk.expansions >= self.max_expansions {
            warn!(name = definition.name(), limit = self.max_expansions, "too many macro expansions, skipping");
            return;
        }
        walk.expansions += 1;

        debug!(name = definition.name(), kind = %definition.kind(), depth, "expanding macro");

        let mut stack = stack.to_vec();
        stack.push(MacroArgs::parse(&resolution.arguments));

        if definition.kind() != MacroKind::Dice {
            expansions.push(Expansion {
                body: definition.body().into(),
                args: stack,
                kind: definition.kind(),
                shorthand
            });
            return;
        }

        walk.visited.insert(key.clone());
        self.walk(definition.body(), &stack, shorthand, depth + 1, walk, expansions);
        walk.visited.remove(&key);
    }
}

/// The groups of `[a][b]`-style text, or `None` when there is only one.
fn split_groups(text: &str) -> Option<Vec<&str>> {
    let inner = text.trim().strip_prefix('[')?.strip_suffix(']')?;

    if !GROUP_BREAK.is_match(inner) {
        return None;
    }

    Some(GROUP_BREAK.split(inner).collect())
}
