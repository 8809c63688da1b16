pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

pub use crate::config::validator::{build_run_config, validate};
pub use crate::config::{RawConfig, RunConfig};
pub use crate::core::etl::{run, EtlEngine};
pub use crate::core::pipeline::ShufflePipeline;
pub use crate::core::resolver::resolve;
pub use crate::domain::model::{ColumnSpec, RunSummary};
pub use crate::utils::error::{EtlError, Result};
