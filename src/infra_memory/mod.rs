mod identity_repo_memory;
mod kv_store_memory;

pub use identity_repo_memory::*;
pub use kv_store_memory::*;
