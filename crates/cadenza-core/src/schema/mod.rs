//! SQLite persistence for the track catalog.

pub mod db;
pub mod migrations;

pub use db::Database;
