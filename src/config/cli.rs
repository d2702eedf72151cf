//! Command-line types

use super::loader::ConfigOverrides;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// iqa-train: WaDIQaM training and evaluation
#[derive(Parser, Debug, Clone, PartialEq)]
#[command(name = "iqa-train")]
#[command(version)]
#[command(about = "Train and evaluate WaDIQaM image quality assessment networks")]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Train a model and test the best checkpoint
    Train(TrainArgs),

    /// Evaluate a saved model on one split
    Evaluate(EvaluateArgs),

    /// Validate a configuration file without training
    Validate(ValidateArgs),

    /// Display the resolved configuration and database summary
    Info(InfoArgs),
}

/// Arguments for the train command
#[derive(Parser, Debug, Clone, PartialEq)]
pub struct TrainArgs {
    /// Path to YAML configuration file
    #[arg(value_name = "CONFIG")]
    pub config: PathBuf,

    /// Experiment id; selects the split and offsets the seed
    #[arg(long, default_value_t = 0)]
    pub exp_id: u64,

    /// Override the database
    #[arg(short, long)]
    pub database: Option<String>,

    /// Override the model
    #[arg(short, long)]
    pub model: Option<String>,

    /// Override number of epochs
    #[arg(short, long)]
    pub epochs: Option<usize>,

    /// Override learning rate
    #[arg(short, long)]
    pub lr: Option<f32>,

    /// Override output directory
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,
}

impl TrainArgs {
    pub fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            database: self.database.clone(),
            model: self.model.clone(),
            n_epochs: self.epochs,
            learning_rate: self.lr,
            output_dir: self.output_dir.clone(),
        }
    }
}

/// Split to evaluate
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SplitName {
    Val,
    #[default]
    Test,
}

/// Arguments for the evaluate command
#[derive(Parser, Debug, Clone, PartialEq)]
pub struct EvaluateArgs {
    /// Path to YAML configuration file
    #[arg(value_name = "CONFIG")]
    pub config: PathBuf,

    /// Full model file (`.full`) or parameter snapshot
    #[arg(short, long)]
    pub checkpoint: PathBuf,

    /// Experiment id the model was trained with
    #[arg(long, default_value_t = 0)]
    pub exp_id: u64,

    /// Split to evaluate
    #[arg(short, long, value_enum, default_value_t = SplitName::Test)]
    pub split: SplitName,

    /// Override the database
    #[arg(short, long)]
    pub database: Option<String>,

    /// Override the model
    #[arg(short, long)]
    pub model: Option<String>,
}

impl EvaluateArgs {
    pub fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            database: self.database.clone(),
            model: self.model.clone(),
            ..Default::default()
        }
    }
}

/// Arguments for the validate command
#[derive(Parser, Debug, Clone, PartialEq)]
pub struct ValidateArgs {
    /// Path to YAML configuration file
    #[arg(value_name = "CONFIG")]
    pub config: PathBuf,

    /// Also load and check the database index
    #[arg(long)]
    pub data: bool,
}

/// Arguments for the info command
#[derive(Parser, Debug, Clone, PartialEq)]
pub struct InfoArgs {
    /// Path to YAML configuration file
    #[arg(value_name = "CONFIG")]
    pub config: PathBuf,

    /// Experiment id used for the split summary
    #[arg(long, default_value_t = 0)]
    pub exp_id: u64,
}

/// Parse command line arguments
pub fn parse_args() -> Cli {
    Cli::parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_train() {
        let cli = Cli::try_parse_from([
            "iqa-train", "train", "config.yaml", "--exp-id", "3", "--database", "TID2013", "-e",
            "10", "--lr", "0.01",
        ])
        .unwrap();
        let Command::Train(args) = cli.command else { panic!("expected train") };
        assert_eq!(args.exp_id, 3);
        let overrides = args.overrides();
        assert_eq!(overrides.database.as_deref(), Some("TID2013"));
        assert_eq!(overrides.n_epochs, Some(10));
        assert_eq!(overrides.learning_rate, Some(0.01));
        assert!(overrides.model.is_none());
    }

    #[test]
    fn test_parse_evaluate_defaults_to_test_split() {
        let cli = Cli::try_parse_from([
            "iqa-train", "evaluate", "c.yaml", "--checkpoint", "m.full",
        ])
        .unwrap();
        let Command::Evaluate(args) = cli.command else { panic!("expected evaluate") };
        assert_eq!(args.split, SplitName::Test);
        assert_eq!(args.checkpoint, PathBuf::from("m.full"));
    }

    #[test]
    fn test_parse_evaluate_val_split() {
        let cli = Cli::try_parse_from([
            "iqa-train", "evaluate", "c.yaml", "-c", "m.full", "--split", "val",
        ])
        .unwrap();
        let Command::Evaluate(args) = cli.command else { panic!("expected evaluate") };
        assert_eq!(args.split, SplitName::Val);
    }

    #[test]
    fn test_global_flags() {
        let cli = Cli::try_parse_from(["iqa-train", "validate", "c.yaml", "-v"]).unwrap();
        assert!(cli.verbose);
        assert!(!cli.quiet);
    }

    #[test]
    fn test_evaluate_requires_checkpoint() {
        assert!(Cli::try_parse_from(["iqa-train", "evaluate", "c.yaml"]).is_err());
    }
}
