//! Session conversational memory

pub mod cache;
pub mod session;

pub use cache::{CacheStore, MemoryCache};
pub use session::{CONTEXT_TTL_SECONDS, MAX_HISTORY_MESSAGES, SessionContextManager};
