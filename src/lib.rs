//! # iqa-train
//!
//! Training and evaluation of WaDIQaM image quality assessment networks.
//!
//! The crate contains:
//! - A small reverse-mode autograd engine ([`autograd`])
//! - Adam with L2 weight decay ([`optim`])
//! - IQA database loading, reference-disjoint splitting and batching ([`data`])
//! - No-reference and full-reference WaDIQaM networks ([`model`])
//! - SROCC / KROCC / PLCC / RMSE / outlier-ratio evaluation ([`eval`])
//! - The epoch loop with best-checkpoint selection ([`train`])
//! - Snapshot persistence ([`io`]) and scalar curves ([`tracking`])
//! - YAML configuration ([`config`]) and the CLI ([`cli`])

pub mod autograd;
pub mod cli;
pub mod config;
pub mod data;
pub mod error;
pub mod eval;
pub mod io;
pub mod model;
pub mod optim;
pub mod tracking;
pub mod train;

pub use autograd::Tensor;
pub use error::{Error, Result};
