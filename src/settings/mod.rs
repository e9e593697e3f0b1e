//! Settings are loaded from a TOML file; `bin/session_demo.rs` shows the
//! full startup sequence.

mod cli;
pub use clap::Parser;
pub use cli::*;

mod settings;
pub use settings::*;
