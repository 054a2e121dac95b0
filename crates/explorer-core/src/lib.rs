//! Explorer core: settings, error type, shared selection store.

pub mod config;
pub mod error;
pub mod selection;

pub use config::{DataPaths, ServerConfig, Settings};
pub use error::{Error, Result};
pub use selection::{GenerationResult, Selection, SelectionStore};
