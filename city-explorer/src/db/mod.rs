pub mod backends;
mod connection;
mod record;
pub mod repository;
pub(crate) mod schema;
pub mod traits;

pub use backends::libsql::LibSqlBackend;
pub use connection::Database;
pub use record::StoredRecord;
pub use traits::*;
