//! Global `tracing` subscriber with a filter that settings can replace
//! after startup.

mod logger;
pub use logger::*;

pub use tracing::{debug, error, info, trace, warn};
