//! Configuration validation

use super::schema::IqaConfig;
use crate::model::ModelKind;

/// Validation error type
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("Database index does not exist: {0}")]
    DataIndexNotFound(String),

    #[error("Invalid learning rate: {0} (must be > 0.0 and <= 1.0)")]
    InvalidLearningRate(f32),

    #[error("Invalid batch size: {0} (must be > 0)")]
    InvalidBatchSize(usize),

    #[error("Invalid epochs: {0} (must be > 0)")]
    InvalidEpochs(usize),

    #[error("Invalid {name}: {value} (must be in [0.0, 1.0])")]
    InvalidRatio { name: &'static str, value: f64 },

    #[error("Split ratios sum to {0} (train_ratio + test_ratio must be <= 1.0)")]
    RatiosExceedOne(f64),

    #[error("Invalid weight decay: {0} (must be >= 0.0)")]
    InvalidWeightDecay(f32),

    #[error("Invalid hidden dimension: {0} (must be > 0)")]
    InvalidHiddenDim(usize),

    #[error("Unknown model: {0} (must be one of: WaDIQaM-NR, WaDIQaM-FR)")]
    UnknownModel(String),
}

/// Validate the numeric ranges and names of a configuration
pub fn validate_config(config: &IqaConfig) -> Result<(), ValidationError> {
    if config.model.parse::<ModelKind>().is_err() {
        return Err(ValidationError::UnknownModel(config.model.clone()));
    }

    if config.learning_rate.is_nan() || config.learning_rate <= 0.0 || config.learning_rate > 1.0 {
        return Err(ValidationError::InvalidLearningRate(config.learning_rate));
    }

    if config.batch_size == 0 {
        return Err(ValidationError::InvalidBatchSize(config.batch_size));
    }

    if config.n_epochs == 0 {
        return Err(ValidationError::InvalidEpochs(config.n_epochs));
    }

    for (name, value) in [("train_ratio", config.train_ratio), ("test_ratio", config.test_ratio)] {
        if !(0.0..=1.0).contains(&value) {
            return Err(ValidationError::InvalidRatio { name, value });
        }
    }
    let total = config.train_ratio + config.test_ratio;
    if total > 1.0 + 1e-9 {
        return Err(ValidationError::RatiosExceedOne(total));
    }

    if config.weight_decay.is_nan() || config.weight_decay < 0.0 {
        return Err(ValidationError::InvalidWeightDecay(config.weight_decay));
    }

    if config.hidden_dim == 0 {
        return Err(ValidationError::InvalidHiddenDim(config.hidden_dim));
    }

    Ok(())
}

/// Check that the files a run reads exist
pub fn validate_paths(config: &IqaConfig) -> Result<(), ValidationError> {
    if !config.data_index.exists() {
        return Err(ValidationError::DataIndexNotFound(config.data_index.display().to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn config() -> IqaConfig {
        serde_yaml::from_str("database: LIVE\nmodel: WaDIQaM-FR\ndata_index: live.json\n")
            .unwrap()
    }

    #[test]
    fn test_valid_config() {
        assert_eq!(validate_config(&config()), Ok(()));
    }

    #[test]
    fn test_unknown_model() {
        let mut c = config();
        c.model = "CNNIQA".to_string();
        assert_eq!(validate_config(&c), Err(ValidationError::UnknownModel("CNNIQA".to_string())));
    }

    #[test]
    fn test_learning_rate_bounds() {
        let mut c = config();
        c.learning_rate = 0.0;
        assert!(matches!(validate_config(&c), Err(ValidationError::InvalidLearningRate(_))));
        c.learning_rate = 1.0;
        assert!(validate_config(&c).is_ok());
        c.learning_rate = 1.5;
        assert!(matches!(validate_config(&c), Err(ValidationError::InvalidLearningRate(_))));
    }

    #[test]
    fn test_zero_batch_size_and_epochs() {
        let mut c = config();
        c.batch_size = 0;
        assert_eq!(validate_config(&c), Err(ValidationError::InvalidBatchSize(0)));
        let mut c = config();
        c.n_epochs = 0;
        assert_eq!(validate_config(&c), Err(ValidationError::InvalidEpochs(0)));
    }

    #[test]
    fn test_ratios() {
        let mut c = config();
        c.test_ratio = -0.1;
        assert!(matches!(
            validate_config(&c),
            Err(ValidationError::InvalidRatio { name: "test_ratio", .. })
        ));

        let mut c = config();
        c.train_ratio = 0.8;
        c.test_ratio = 0.3;
        assert!(matches!(validate_config(&c), Err(ValidationError::RatiosExceedOne(_))));

        c.test_ratio = 0.2;
        assert!(validate_config(&c).is_ok());
    }

    #[test]
    fn test_negative_weight_decay() {
        let mut c = config();
        c.weight_decay = -1e-4;
        assert!(matches!(validate_config(&c), Err(ValidationError::InvalidWeightDecay(_))));
    }

    #[test]
    fn test_missing_data_index() {
        let mut c = config();
        c.data_index = "/nonexistent/index.json".into();
        assert!(matches!(validate_paths(&c), Err(ValidationError::DataIndexNotFound(_))));
    }

    proptest! {
        #[test]
        fn prop_in_range_ratios_are_accepted(train in 0.0f64..=1.0, frac in 0.0f64..=1.0) {
            let mut c = config();
            c.train_ratio = train;
            c.test_ratio = (1.0 - train) * frac;
            prop_assert!(validate_config(&c).is_ok());
        }

        #[test]
        fn prop_positive_lr_up_to_one_is_accepted(lr in 1e-8f32..=1.0) {
            let mut c = config();
            c.learning_rate = lr;
            prop_assert!(validate_config(&c).is_ok());
        }
    }
}
