use crate::render::Verbosity;


/// Limits and presentation settings for one [`crate::Engine`].
///
/// Hosts usually build it with the `with_*` methods, or deserialize it from
/// their own configuration file when the `serde` feature is enabled:
///
/// ```
/// use bracket_dice::{EngineConfig, Verbosity};
///
/// let config = EngineConfig::default()
///     .with_max_explosions(20)
///     .with_verbosity(Verbosity::Short);
///
/// assert_eq!(config.max_explosions, 20);
/// assert_eq!(config.max_repeat, 20);
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct EngineConfig {
    /// Extra dice an explosion chain may add before failing with
    /// [`crate::Error::TooManyExplosions`].
    pub max_explosions: usize,
    /// Nesting depth at which macro flattening gives up on a branch.
    pub max_flatten_depth: usize,
    /// Expansions a single expression may produce.
    pub max_expansions: usize,
    /// Upper bound for the `N#` repeat shorthand.
    pub max_repeat: u16,
    /// How rolls are rendered.
    pub verbosity: Verbosity,
    /// Append named macro arguments that no placeholder consumed.
    pub include_unused_args: bool
}

impl EngineConfig {
    /// Sets [`EngineConfig::max_explosions`].
    pub fn with_max_explosions(mut self, max_explosions: usize) -> Self {
        self.max_explosions = max_explosions;
        self
    }

    /// Sets [`EngineConfig::max_flatten_depth`].
    pub fn with_max_flatten_depth(mut self, max_flatten_depth: usize) -> Self {
        self.max_flatten_depth = max_flatten_depth;
        self
    }

    /// Sets [`EngineConfig::max_expansions`].
    pub fn with_max_expansions(mut self, max_expansions: usize) -> Self {
        self.max_expansions = max_expansions;
        self
    }

    /// Sets [`EngineConfig::max_repeat`].
    pub fn with_max_repeat(mut self, max_repeat: u16) -> Self {
        self.max_repeat = max_repeat;
        self
    }

    /// Sets [`EngineConfig::verbosity`].
    pub fn with_verbosity(mut self, verbosity: Verbosity) -> Self {
        self.verbosity = verbosity;
        self
    }

    /// Sets [`EngineConfig::include_unused_args`].
    pub fn with_unused_args(mut self, include: bool) -> Self {
        self.include_unused_args = include;
        self
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_explosions: 100,
            max_flatten_depth: 32,
            max_expansions: 64,
            max_repeat: 20,
            verbosity: Verbosity::Full,
            include_unused_args: true
        }
    }
}


#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_builder_methods() {
        let config = EngineConfig::default()
            .with_max_explosions(5)
            .with_max_flatten_depth(4)
            .with_max_expansions(8)
            .with_max_repeat(3)
            .with_verbosity(Verbosity::Minimal)
            .with_unused_args(false);

        assert_eq!(config.max_explosions, 5);
        assert_eq!(config.max_flatten_depth, 4);
        assert_eq!(config.max_expansions, 8);
        assert_eq!(config.max_repeat, 3);
        assert_eq!(config.verbosity, Verbosity::Minimal);
        assert!(!config.include_unused_args);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_partial_config_uses_defaults() {
        let config: EngineConfig = serde_json::from_str(r#"{ "max_repeat": 4, "verbosity": "short" }"#).unwrap();

        assert_eq!(config.max_repeat, 4);
        assert_eq!(config.verbosity, Verbosity::Short);
        assert_eq!(config.max_explosions, EngineConfig::default().max_explosions);
    }
}
