pub mod base;
pub mod memory_store;
pub mod no_store;

// Re-export the primary session items so code outside can do
// "use crate::session::{SessionStore, create_session_store};"
pub use base::{create_session_store, extract_token, SessionStore, SessionToken};
