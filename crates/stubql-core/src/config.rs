use serde::Deserialize;

/// Environment variable that switches verbose diagnostics on.
pub const VERBOSE_ENV: &str = "STUBQL_VERBOSE";

///
/// RegistryConfig
///
/// Initial settings for a `Registry`. Every field has a default, so a
/// partial document deserializes.
///

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct RegistryConfig {
    /// Log unmatched queries through the diagnostics sink.
    pub verbose: bool,
}

impl RegistryConfig {
    /// Defaults, overridden by `STUBQL_VERBOSE` when set.
    #[must_use]
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(raw) = std::env::var(VERBOSE_ENV) {
            config.verbose = parse_flag(&raw);
        }

        config
    }
}

fn parse_flag(raw: &str) -> bool {
    matches!(
        raw.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
