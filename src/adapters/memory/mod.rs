//! In-memory backend for offline use and tests.

mod in_memory_backend;

pub use in_memory_backend::{BackendCall, InMemoryBackend, RecordedCall, OPEN_SESSION_MESSAGE};
