pub mod augment;
pub mod cli;
pub mod config;
pub mod dataset;
pub mod describe;
pub mod error;
pub mod filename;
pub mod identity;
pub mod matrix;
pub mod planner;
pub mod record;
pub mod utils;

pub use config::Opts;
pub use dataset::{Dataset, DatasetStats};
pub use error::{Error, Result};
pub use identity::Identity;
pub use planner::{GenerationPlanner, GenerationReport, PlannerState};
pub use record::{ImageRecord, Visuals};
