//! HTTP service for creating, reading, partially updating and deleting
//! course offerings stored in SQLite.

pub mod config;
pub mod db;
pub mod server;
pub mod types;
