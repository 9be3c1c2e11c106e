//! cellseal-core: shared configuration schema and error types

pub mod config;
pub mod error;

pub use config::CellsealConfig;
pub use error::{CellsealError, CellsealResult};
