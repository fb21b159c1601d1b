pub mod connection;
pub mod introspect;

pub use connection::MySqlConnection;
pub use introspect::introspect_database;
