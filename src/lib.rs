pub mod config;
pub mod model;
pub mod predict;
#[cfg(feature = "server")]
pub mod server;
