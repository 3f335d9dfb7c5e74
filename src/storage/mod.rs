mod session_store;

pub use session_store::{
    default_data_dir, JsonSessionStore, MemorySessionStore, Result, SessionStore, StorageError,
};
