// store

mod kv_store;

pub use kv_store::*;

// repo

mod identity_repo;

pub use identity_repo::*;

// codec

mod token_codec;

pub use token_codec::*;
