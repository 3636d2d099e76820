//! Database repositories for data access layer
//!
//! Video records are reached through the [`VideoRepository`] trait. The
//! PostgreSQL implementation is used when a database is configured; the
//! in-memory one backs tests and database-less local runs.

pub mod db;

pub use db::{InMemoryVideoRepository, PgVideoRepository, VideoRepository};
