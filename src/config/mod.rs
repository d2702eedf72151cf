//! Experiment configuration
//!
//! YAML files are merged section by section ([`load_config`]), checked with
//! [`validate_config`], and turned into output locations by [`RunPaths`].

mod cli;
mod loader;
mod paths;
mod schema;
mod validate;

pub use cli::{
    parse_args, Cli, Command, EvaluateArgs, InfoArgs, SplitName, TrainArgs, ValidateArgs,
};
pub use loader::{load_config, resolve_config, ConfigOverrides};
pub use paths::{Phase, RunPaths};
pub use schema::IqaConfig;
pub(crate) use schema::deserialize_bool_lenient;
pub use validate::{validate_config, validate_paths, ValidationError};
