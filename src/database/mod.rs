pub mod manager;
pub mod memory;
pub mod models;
pub mod pagination;
pub mod postgres;
pub mod store;

pub use manager::{DatabaseError, DatabaseManager};
pub use memory::MemoryStore;
pub use pagination::{PageRequest, Pagination};
pub use postgres::PgStore;
pub use store::{Datastore, MovieFilter, MoviePage, MovieStats, MovieStore, UserStore};
