//! Environment variable source: PATHSTAMP__ prefix with __ separator

use config::builder::DefaultState;
use config::ConfigBuilder;
use config::ConfigError;
use config::Environment;

/// Prefix shared by every configuration environment variable.
pub const ENV_PREFIX: &str = "PATHSTAMP";

/// Environment source for pathstamp settings.
///
/// `PATHSTAMP__PIPELINE__DRY_RUN=true` sets `pipeline.dry_run`.
pub fn source() -> Environment {
    Environment::with_prefix(ENV_PREFIX)
        .separator("__")
        .try_parsing(true)
}

/// Add environment variable overlay to builder.
pub fn add_to_builder(
    builder: ConfigBuilder<DefaultState>,
) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    Ok(builder.add_source(source()))
}
