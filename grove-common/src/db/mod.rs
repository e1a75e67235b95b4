//! Database access shared by Grove services

pub mod init;

pub use init::{create_tables, init_database};
