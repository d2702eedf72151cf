//! End-to-end experiment runs driven by an [`IqaConfig`]

use super::trainer::{IqaTrainer, SplitLoaders, TrainOutcome, TrainerConfig};
use crate::config::{validate_config, validate_paths, IqaConfig, Phase, RunPaths, SplitName};
use crate::data::{split_database, Database, DataLoader, DatasetSplits, SplitConfig};
use crate::eval::{evaluate_split, SplitEvaluation};
use crate::io::{load_model_as, ModelFormat, STATE_DICT_ARCHITECTURE};
use crate::model::{IqaModel, WaDIQaM};
use crate::optim::Adam;
use crate::tracking::PhaseLoggers;
use crate::{Error, Result};
use std::path::Path;

/// Load, validate and split the database of an experiment
pub fn prepare_data(config: &IqaConfig, exp_id: u64) -> Result<(Database, DatasetSplits)> {
    validate_config(config)?;
    validate_paths(config)?;
    let kind = config.model_kind()?;

    let database = Database::load(&config.data_index)?;
    database.validate(kind.is_full_reference())?;

    let split = SplitConfig::for_experiment(
        config.train_ratio,
        config.test_ratio,
        config.seed,
        exp_id,
    );
    let splits = split_database(&database, &split)?;
    Ok((database, splits))
}

/// Train a freshly initialized network and test its best checkpoint
pub fn run_experiment(config: &IqaConfig, exp_id: u64) -> Result<TrainOutcome> {
    log::info!("EXP_ID: {exp_id}");
    log::info!("database: {}", config.database);
    log::info!("model: {}", config.model);

    let (database, splits) = prepare_data(config, exp_id)?;
    log::info!(
        "split: {} train, {} val, {} test images",
        splits.train.len(),
        splits.val.len(),
        splits.test.len()
    );

    let model = WaDIQaM::new(config.network(database.feature_dim, exp_id)?)?;
    log::info!("{} with {} parameters", config.model, model.num_parameters());

    let paths = RunPaths::new(&config.output_dir, &config.database, &config.model, exp_id);
    let test_during_training = config.test_during_training && !splits.test.is_empty();
    let mut loaders = SplitLoaders::new(
        splits,
        database.feature_dim,
        config.batch_size,
        config.experiment_seed(exp_id),
    );

    let optimizer = Adam::with_weight_decay(config.learning_rate, config.weight_decay);
    let trainer_config = TrainerConfig::new(exp_id, config.n_epochs)
        .with_test_during_training(test_during_training);
    let mut trainer = IqaTrainer::new(model, Box::new(optimizer), trainer_config, paths.clone());

    if config.enable_tensorboard {
        let test_dir = test_during_training.then(|| paths.log_dir(Phase::Test));
        let loggers = PhaseLoggers::create(
            &paths.log_dir(Phase::Train),
            &paths.log_dir(Phase::Val),
            test_dir.as_deref(),
        )?;
        trainer = trainer.with_loggers(loggers);
    }

    trainer.run(&mut loaders)
}

/// Rebuild a model from a full model file or a parameter snapshot
///
/// Snapshots carry no architecture, so the network is built from `config`.
pub fn load_checkpoint(
    config: &IqaConfig,
    feature_dim: usize,
    exp_id: u64,
    path: &Path,
) -> Result<WaDIQaM> {
    let format = ModelFormat::from_path(path).unwrap_or_default();
    let saved = load_model_as(path, format)?;

    let mut model = if saved.metadata.architecture == STATE_DICT_ARCHITECTURE {
        WaDIQaM::new(config.network(feature_dim, exp_id)?)?
    } else {
        WaDIQaM::from_metadata(&saved.metadata)?
    };
    if model.config().feature_dim != feature_dim {
        return Err(Error::shape(
            "model feature dimension",
            vec![feature_dim],
            vec![model.config().feature_dim],
        ));
    }
    model.load_state_dict(&saved.parameters)?;
    Ok(model)
}

/// Evaluate a saved model on one split of an experiment
pub fn evaluate_checkpoint(
    config: &IqaConfig,
    exp_id: u64,
    checkpoint: &Path,
    split: SplitName,
) -> Result<SplitEvaluation> {
    let (database, splits) = prepare_data(config, exp_id)?;
    let samples = match split {
        SplitName::Val => splits.val,
        SplitName::Test if splits.test.is_empty() => {
            return Err(Error::Data(format!(
                "experiment has no test split (test_ratio={})",
                config.test_ratio
            )));
        }
        SplitName::Test => splits.test,
    };

    let mut model = load_checkpoint(config, database.feature_dim, exp_id, checkpoint)?;
    model.set_requires_grad(false);
    model.eval();

    let mut loader = DataLoader::new(samples, database.feature_dim, 1);
    evaluate_split(&model, &mut loader)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::synthetic_database;
    use tempfile::TempDir;

    fn config(dir: &TempDir, model: &str) -> IqaConfig {
        let index = dir.path().join("synthetic.json");
        synthetic_database(8, 3, 3, 4, 2).save(&index).unwrap();
        let yaml = format!(
            "database: synthetic\nmodel: {model}\ndata_index: {}\noutput_dir: {}\n\
             n_epochs: 7\nbatch_size: 4\nlearning_rate: 0.01\nhidden_dim: 8\n\
             train_ratio: 0.5\ntest_ratio: 0.25\nenable_tensorboard: true\n",
            index.display(),
            dir.path().display()
        );
        serde_yaml::from_str(&yaml).unwrap()
    }

    #[test]
    fn test_run_experiment_writes_logs() {
        let dir = TempDir::new().unwrap();
        let config = config(&dir, "WaDIQaM-NR");
        let outcome = run_experiment(&config, 1).unwrap();

        assert_eq!(outcome.epochs.len(), 7);
        assert!(outcome.test.is_some());
        let paths = RunPaths::new(dir.path(), "synthetic", "WaDIQaM-NR", 1);
        assert!(paths.log_dir(Phase::Train).join("scalars.jsonl").exists());
        assert!(paths.log_dir(Phase::Val).join("scalars.jsonl").exists());
        assert!(!paths.log_dir(Phase::Test).exists());
    }

    #[test]
    fn test_full_reference_experiment() {
        let dir = TempDir::new().unwrap();
        let config = config(&dir, "WaDIQaM-FR");
        let outcome = run_experiment(&config, 0).unwrap();
        assert!(outcome.best.is_some());
    }

    #[test]
    fn test_invalid_config_is_rejected_before_training() {
        let dir = TempDir::new().unwrap();
        let mut config = config(&dir, "WaDIQaM-NR");
        config.batch_size = 0;
        assert!(matches!(run_experiment(&config, 0), Err(Error::Validation(_))));
    }

    #[test]
    fn test_evaluate_checkpoint_matches_final_test() {
        let dir = TempDir::new().unwrap();
        let config = config(&dir, "WaDIQaM-NR");
        let outcome = run_experiment(&config, 0).unwrap();
        let paths = RunPaths::new(dir.path(), "synthetic", "WaDIQaM-NR", 0);

        let from_full =
            evaluate_checkpoint(&config, 0, &paths.full_model(), SplitName::Test).unwrap();
        let from_snapshot =
            evaluate_checkpoint(&config, 0, &paths.snapshot(), SplitName::Test).unwrap();
        let final_test = outcome.test.unwrap();
        assert_eq!(from_full.q, final_test.q);
        assert_eq!(from_snapshot.q, final_test.q);
    }

    #[test]
    fn test_evaluate_missing_test_split() {
        let dir = TempDir::new().unwrap();
        let mut config = config(&dir, "WaDIQaM-NR");
        config.test_ratio = 0.0;
        let result =
            evaluate_checkpoint(&config, 0, Path::new("missing.full"), SplitName::Test);
        assert!(matches!(result, Err(Error::Data(_))));
    }
}
