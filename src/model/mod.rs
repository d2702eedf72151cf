//! IQA network and the model abstraction

mod layers;
mod traits;
mod wadiqam;

pub use layers::{Linear, Mlp};
pub use traits::{IqaModel, ModelOutput};
pub use wadiqam::{Aggregation, ModelKind, WaDIQaM, WaDIQaMConfig, WEIGHT_EPS};
