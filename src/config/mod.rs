// Re-exports so we can "use crate::config::*".
#[allow(clippy::module_inception)]
pub mod config;
pub mod logging;
pub mod session;

pub use config::*;
pub use logging::*;
pub use session::*;
