//! HTTP Handlers

mod auth;
mod chapter;
mod novel;
mod ping;

pub use auth::*;
pub use chapter::*;
pub use novel::*;
pub use ping::*;
