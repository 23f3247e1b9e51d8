//! Utility modules for beamgraph
//!
//! - Structured logging setup and configuration
//! - The ordered set used for every accumulated dependency set
//! - Package-relative path helpers

pub mod logging;
pub mod ordered_set;
pub mod paths;

pub use logging::{init_logging, LoggingConfig};
pub use ordered_set::OrderedSet;
