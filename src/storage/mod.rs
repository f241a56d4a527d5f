pub mod models;
pub mod pool;
pub mod postgres;

pub use models::LocationRecord;
pub use pool::{DatabasePool, StoreConnection, StoreConnector};
pub use postgres::PostgresConnector;
