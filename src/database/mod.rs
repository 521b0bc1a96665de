pub mod manager;
pub mod memory;
pub mod models;
pub mod pagination;
pub mod postgres;
pub mod repository;

pub use manager::{DatabaseError, DatabaseManager};
pub use memory::MemoryStore;
pub use pagination::{Page, PageQuery, PageRequest};
pub use postgres::PgStore;
pub use repository::{ProjectStore, UserStore};
