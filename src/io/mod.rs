//! Model persistence and run artifacts
//!
//! - [`save_model`] / [`load_model`]: named parameters plus metadata in JSON or YAML
//! - [`save_state_dict`] / [`load_state_dict`]: bare parameter snapshots
//! - [`save_full_model`] / [`load_full_model`]: self-describing model files
//! - [`TestRecord`] and [`ResultsReport`]: per-run result files

mod checkpoint;
mod format;
mod load;
mod model;
mod record;
mod save;

pub use checkpoint::{
    full_model_path, load_full_model, load_state_dict, save_full_model, save_state_dict,
    FULL_MODEL_EXTENSION, STATE_DICT_ARCHITECTURE,
};
pub use format::{ModelFormat, SaveConfig};
pub use load::{load_model, load_model_as};
pub use model::{Model, ModelMetadata, ModelState, ParameterInfo};
pub use record::{ResultsReport, TestRecord};
pub use save::save_model;
