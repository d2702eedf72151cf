//! Validate command implementation

use crate::cli::logging::log;
use crate::cli::LogLevel;
use crate::config::{load_config, validate_config, validate_paths, ConfigOverrides, ValidateArgs};
use crate::data::Database;
use crate::Result;

pub fn run_validate(args: ValidateArgs, level: LogLevel) -> Result<()> {
    log(
        level,
        LogLevel::Normal,
        &format!("Validating config: {}", args.config.display()),
    );

    let config = load_config(&args.config, &ConfigOverrides::default())?;
    validate_config(&config)?;
    log(level, LogLevel::Normal, "✓ Configuration is valid");

    if args.data {
        validate_paths(&config)?;
        let kind = config.model_kind()?;
        let database = Database::load(&config.data_index)?;
        database.validate(kind.is_full_reference())?;
        log(
            level,
            LogLevel::Normal,
            &format!(
                "✓ Database '{}' is valid ({} images, {} references)",
                database.name,
                database.samples.len(),
                database.references().len()
            ),
        );
    }
    Ok(())
}
