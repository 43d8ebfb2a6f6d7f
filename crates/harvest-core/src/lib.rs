pub mod actions;
pub mod advice;
pub mod checklist;
pub mod config;
pub mod daily_log;
pub mod dates;
pub mod error;
pub mod export;
pub mod forecast;
pub mod io;
pub mod paths;
pub mod records;
pub mod stats;
pub mod store;
pub mod tasks;
pub mod types;
pub mod workers;

pub use error::{HarvestError, Result};
