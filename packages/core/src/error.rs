use thiserror::Error;

use crate::types::ProjectId;

/// Errors raised by domain operations that validate their input.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CoreError {
    #[error("project {0} appears more than once in the ranking")]
    DuplicateRanking(ProjectId),

    #[error("project {0} has not been seen by this judge")]
    RankingNotSeen(ProjectId),

    #[error("project {0} has already been judged")]
    AlreadyJudged(ProjectId),

    #[error("judge has no project assigned")]
    NoCurrentProject,

    #[error("invalid group {group}: event has {num_groups} groups")]
    InvalidGroup { group: i32, num_groups: i32 },
}
