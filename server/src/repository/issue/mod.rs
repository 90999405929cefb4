//! Issue Repository Module
//!
//! - issue_repo: CRUD operations and filtered listing
//! - issue_positioning: neighbour-based moves and column resequencing

mod issue_repo;
mod issue_positioning;

pub use issue_repo::IssueRepository;
pub use issue_positioning::IssuePositioningOperations;

pub(crate) use issue_repo::{attach_parents, row_to_issue, ISSUE_COLUMNS};
