//! The run's single source of truth and its persistence boundary.

pub mod phase;
pub mod state;
pub mod storage;
pub mod store;

pub use phase::Phase;
pub use state::{GameState, SessionUpdate, INITIAL_ITEMS, INITIAL_WAVE};
pub use storage::{FileStorage, MemoryStorage, SaveStorage};
pub use store::{SessionStore, SESSION_KEY};
