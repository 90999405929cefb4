//! Repository Layer
//!
//! Data access abstractions and their SQLite implementations.

mod traits;
mod db;
mod issue;
mod board_repo;
mod seed;


pub use traits::Repository;
pub use db::{open_database, open_in_memory, SharedConnection};
pub use issue::{IssueRepository, IssuePositioningOperations};
pub use board_repo::BoardRepository;
pub use seed::seed_demo;
