pub mod history;
pub mod sqlite_store;
pub mod store;

pub use history::HistoryStore;
pub use sqlite_store::SqliteHistoryStorage;
pub use store::{InMemoryHistoryStorage, JsonFileHistoryStorage};
