pub mod manager;
pub mod memory;
pub mod models;
pub mod postgres;
pub mod stores;

pub use manager::{DatabaseError, DatabaseManager};
pub use memory::MemoryBackend;
pub use postgres::PgBackend;
pub use stores::{ApplicationStore, ContentStore, HealthCheck, PostStore, ProfileStore};
