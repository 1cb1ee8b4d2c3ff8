use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Why a judge left their current project without completing it.
///
/// Every reason except `Break` is persisted as a flag. Every reason except
/// `Busy` permanently removes the project from that judge's candidate pool.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "kebab-case")]
pub enum SkipReason {
    /// Someone else is currently at the table.
    Busy,
    /// Nobody was at the table.
    Absent,
    /// The team could not show a working demo.
    CannotDemo,
    /// The project is outside the judge's expertise.
    TooComplex,
    /// The project content was inappropriate.
    Offensive,
    /// The judge is stepping away; no flag is recorded.
    Break,
}

impl SkipReason {
    pub const ALL: &'static [SkipReason] = &[
        Self::Busy,
        Self::Absent,
        Self::CannotDemo,
        Self::TooComplex,
        Self::Offensive,
        Self::Break,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Busy => "busy",
            Self::Absent => "absent",
            Self::CannotDemo => "cannot-demo",
            Self::TooComplex => "too-complex",
            Self::Offensive => "offensive",
            Self::Break => "break",
        }
    }

    /// Returns true if a flag with this reason removes the project from the judge's pool.
    pub fn is_hard(&self) -> bool {
        !matches!(self, Self::Busy)
    }

    /// Returns true if skipping with this reason inserts a flag.
    pub fn records_flag(&self) -> bool {
        !matches!(self, Self::Break)
    }
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error when parsing an unknown skip reason.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseSkipReasonError {
    invalid: String,
}

impl fmt::Display for ParseSkipReasonError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Invalid skip reason '{}'. Valid values: {}",
            self.invalid,
            SkipReason::ALL
                .iter()
                .map(|r| r.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        )
    }
}

impl std::error::Error for ParseSkipReasonError {}

impl FromStr for SkipReason {
    type Err = ParseSkipReasonError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|r| r.as_str() == s)
            .ok_or_else(|| ParseSkipReasonError {
                invalid: s.to_string(),
            })
    }
}
