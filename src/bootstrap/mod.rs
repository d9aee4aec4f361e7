//! Bootstrap Extraction
//!
//! Reads the loader configuration and the module-initialization call out of a
//! bootstrap script without executing it. The script is scanned and only the
//! two top-level loader calls are parsed; their arguments become plain values
//! threaded through the rest of the pipeline.

pub mod parser;
pub mod scanner;
pub mod token;
pub mod value;

use crate::error::ExtractionError;
use crate::paths::PathTable;
use parser::{LoaderCall, Parser};
use serde::Serialize;
use tracing::{debug, warn};
pub use value::{ConfigObject, ConfigValue, RawSource};

/// Key of the path table inside the loader configuration.
pub const PATHS_KEY: &str = "paths";

/// Argument of the config-declaration call, with its path table split out.
#[derive(Debug, Clone, PartialEq)]
pub struct BootstrapConfig {
    object: ConfigObject,
    paths: PathTable,
}

impl BootstrapConfig {
    /// Build from the object literal passed to the config call.
    pub fn from_object(object: ConfigObject) -> Result<Self, ExtractionError> {
        let paths = match object.get(PATHS_KEY) {
            Some(ConfigValue::Object(table)) => PathTable::from_object(table)?,
            Some(ConfigValue::Undefined) | None => PathTable::new(),
            Some(_) => return Err(ExtractionError::InvalidPathTable),
        };
        Ok(Self { object, paths })
    }

    pub fn paths(&self) -> &PathTable {
        &self.paths
    }

    /// Same configuration with its path table replaced.
    pub fn with_paths(&self, paths: PathTable) -> Self {
        Self {
            object: self.object.clone(),
            paths,
        }
    }

    /// Full configuration object with the current path table in place.
    ///
    /// The table keeps the position of the original `paths` key, or is appended
    /// when the source declared none.
    pub fn to_object(&self) -> ConfigObject {
        let mut object = self.object.clone();
        object.insert(PATHS_KEY, ConfigValue::Object(self.paths.to_object()));
        object
    }

    pub fn get_path(&self, path: &[String]) -> Option<&ConfigValue> {
        self.object.get_path(path)
    }
}

/// Arguments of the module-initialization call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InitCall {
    pub dependencies: Vec<String>,
    pub callback: RawSource,
    /// Error callback, the optional third argument
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errback: Option<RawSource>,
}

impl InitCall {
    fn from_args(args: Vec<ConfigValue>) -> Result<Self, ExtractionError> {
        let invalid = |reason: String| ExtractionError::InvalidArguments {
            call: "require",
            reason,
        };
        if !(2..=3).contains(&args.len()) {
            return Err(invalid(format!(
                "expected dependencies, a callback and an optional errback, got {} argument(s)",
                args.len()
            )));
        }
        let mut args = args.into_iter();
        let (Some(first), Some(second)) = (args.next(), args.next()) else {
            return Err(invalid("missing arguments".to_string()));
        };
        let dependencies = match first {
            ConfigValue::Array(items) => items
                .into_iter()
                .map(|item| match item {
                    ConfigValue::String(name) => Ok(name),
                    other => Err(invalid(format!(
                        "dependency list holds {}, expected strings",
                        other.kind_name()
                    ))),
                })
                .collect::<Result<Vec<_>, _>>()?,
            other => {
                return Err(invalid(format!(
                    "first argument is {}, expected an array",
                    other.kind_name()
                )));
            }
        };
        let callback = match second {
            ConfigValue::Function(source) => source,
            other => {
                return Err(invalid(format!(
                    "second argument is {}, expected a function",
                    other.kind_name()
                )));
            }
        };
        let errback = match args.next() {
            None => None,
            Some(ConfigValue::Function(source)) => Some(source),
            Some(other) => {
                return Err(invalid(format!(
                    "third argument is {}, expected a function",
                    other.kind_name()
                )));
            }
        };
        Ok(Self {
            dependencies,
            callback,
            errback,
        })
    }
}

/// Everything extracted from one bootstrap file.
#[derive(Debug, Clone, PartialEq)]
pub struct Bootstrap {
    pub config: BootstrapConfig,
    pub init: InitCall,
}

/// Extract the loader configuration and initialization call from bootstrap source.
///
/// Both calls must be present. When a call appears more than once the last one
/// wins, as it would when the script runs.
pub fn extract(source: &str) -> Result<Bootstrap, ExtractionError> {
    let calls = Parser::new(source)?.loader_calls()?;

    let mut config = None;
    let mut init = None;
    for call in calls {
        match call {
            LoaderCall::Config { args, span } => {
                debug!(start = span.start, end = span.end, "Found config declaration");
                if config.is_some() {
                    warn!("Bootstrap declares require.config more than once; using the last");
                }
                config = Some(config_from_args(args)?);
            }
            LoaderCall::Init { args, span } => {
                debug!(start = span.start, end = span.end, "Found module initialization");
                if init.is_some() {
                    warn!("Bootstrap calls require more than once; using the last");
                }
                init = Some(InitCall::from_args(args)?);
            }
        }
    }

    Ok(Bootstrap {
        config: config.ok_or(ExtractionError::MissingCall("require.config"))?,
        init: init.ok_or(ExtractionError::MissingCall("require"))?,
    })
}

fn config_from_args(args: Vec<ConfigValue>) -> Result<BootstrapConfig, ExtractionError> {
    let invalid = |reason: String| ExtractionError::InvalidArguments {
        call: "require.config",
        reason,
    };
    let [argument]: [ConfigValue; 1] = args.try_into().map_err(|args: Vec<_>| {
        invalid(format!(
            "expected one configuration object, got {} argument(s)",
            args.len()
        ))
    })?;
    match argument {
        ConfigValue::Object(object) => BootstrapConfig::from_object(object),
        other => Err(invalid(format!(
            "argument is {}, expected an object",
            other.kind_name()
        ))),
    }
}
