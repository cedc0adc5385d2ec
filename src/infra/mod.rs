//! Infrastructure: SQLite connection and schema.

pub mod db;

pub(crate) use db::get_connection;
pub use db::{
    create_tables, drop_all, init_test_db, initialize_schema, open_db, DbConfig, DbLocation,
    DbPool,
};
