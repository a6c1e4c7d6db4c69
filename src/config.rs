//! Minifier Configuration

/// The three switches of the minifier. `Default` gives the runner's
/// settings: locals renamed, globals and constant expressions untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MinifyConfig {
    /// Give local variables, parameters and loop variables short names.
    pub rename_locals: bool,
    /// Give the globals a chunk assigns to short names. Other chunks that
    /// read those globals will no longer find them.
    pub rename_globals: bool,
    /// Replace constant arithmetic with its value.
    pub fold_constants: bool,
}

impl Default for MinifyConfig {
    fn default() -> Self {
        MinifyConfig { rename_locals: true,
                       rename_globals: false,
                       fold_constants: false }
    }
}

impl MinifyConfig {
    /// Only strip comments and whitespace.
    pub fn whitespace_only() -> Self {
        MinifyConfig { rename_locals: false,
                       rename_globals: false,
                       fold_constants: false }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn runner_defaults() {
        let cfg = MinifyConfig::default();
        assert!(cfg.rename_locals);
        assert!(!cfg.rename_globals);
        assert!(!cfg.fold_constants);
        assert_ne!(cfg, MinifyConfig::whitespace_only());
    }
}
