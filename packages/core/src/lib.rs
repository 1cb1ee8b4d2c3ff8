pub mod clock;
pub mod crowd_bt;
pub mod error;
pub mod matrix;
pub mod options;
pub mod ranking;
pub mod selection;
pub mod skip_reason;
pub mod types;

pub use clock::{Clock, ClockState, SharedClock};
pub use error::CoreError;
pub use matrix::ComparisonMatrix;
pub use options::{MainGroupOptions, Options, SwitchingMode};
pub use skip_reason::SkipReason;
pub use types::{Flag, Judge, JudgeId, JudgedProject, Project, ProjectId};
