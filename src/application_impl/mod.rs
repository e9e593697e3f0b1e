mod jwt_codec;
mod session_service_impl;

pub use jwt_codec::*;
pub use session_service_impl::*;
