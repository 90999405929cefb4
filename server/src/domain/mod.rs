//! Domain Layer
//!
//! Contains all domain entities and core abstractions.
//! This layer has NO database or HTTP dependencies (only serde for serialization).

mod entity;
mod issue;
mod board;
pub mod ordering;

pub use entity::{Entity, DomainError, DomainResult};
pub use issue::{Issue, IssueType, IssueFilter, ParentRef, NewIssue};
pub use board::{Board, BoardWithIssues, ColumnConfig, Lane, NewBoard};
