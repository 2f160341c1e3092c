//! Command handlers

mod config;
#[cfg(feature = "api")]
mod serve;

pub use config::handle_config;
#[cfg(feature = "api")]
pub use serve::handle_serve;
