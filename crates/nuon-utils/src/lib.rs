//! Utilities consumed by the nuon loader: a bounded-queue rotating file
//! logger behind the `log` facade, and small filesystem helpers.

mod fs;
mod logger;

pub use fs::file_exists;
pub use logger::{LoggerConfig, RotateLogger};
