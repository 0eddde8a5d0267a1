//! Core types for list reconciliation

use crate::error::{ApplyError, FetchError};
use serde::{Deserialize, Serialize};
use std::fmt;

/// An opaque account identifier in the remote graph
pub type Identifier = i64;

/// Identifier of the managed list
pub type ListId = i64;

/// Identifiers in the order the gateway delivered them (duplicates included)
pub type IdentifierSet = Vec<Identifier>;

/// Status reported by a batch apply call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplyStatus {
    pub code: u16,
}

impl ApplyStatus {
    /// The only status treated as success
    pub const OK: Self = Self { code: 200 };

    pub fn new(code: u16) -> Self {
        Self { code }
    }

    pub fn is_success(&self) -> bool {
        *self == Self::OK
    }
}

impl fmt::Display for ApplyStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code)
    }
}

/// Which side of the diff an apply call corrects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    /// Reference-set members missing from the list
    Add,
    /// List members no longer in the reference set
    Remove,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Add => "add",
            Self::Remove => "remove",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of one directional apply step
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApplyOutcome {
    /// Nothing to apply, no call issued
    Skipped,
    /// Batch accepted by the gateway
    Applied { count: usize },
    /// Batch call failed or was rejected
    Failed { count: usize, error: ApplyError },
    /// Dry run: the batch was computed but not sent
    DryRun { count: usize },
}

impl ApplyOutcome {
    /// Number of identifiers sent to the gateway
    pub fn attempted(&self) -> usize {
        match self {
            Self::Applied { count } | Self::Failed { count, .. } => *count,
            Self::Skipped | Self::DryRun { .. } => 0,
        }
    }

    /// Number of identifiers the gateway accepted
    pub fn succeeded(&self) -> usize {
        match self {
            Self::Applied { count } => *count,
            _ => 0,
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }

    pub fn error(&self) -> Option<&ApplyError> {
        match self {
            Self::Failed { error, .. } => Some(error),
            _ => None,
        }
    }
}

/// Result of a full reconciliation cycle
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleResult {
    /// A fetch failed; no mutation was attempted
    Aborted(FetchError),
    /// Both directions were processed (each may have failed on its own)
    Completed {
        additions: ApplyOutcome,
        removals: ApplyOutcome,
    },
}

impl CycleResult {
    pub fn is_aborted(&self) -> bool {
        matches!(self, Self::Aborted(_))
    }

    /// Completed with no failed direction
    pub fn is_success(&self) -> bool {
        match self {
            Self::Aborted(_) => false,
            Self::Completed {
                additions,
                removals,
            } => !additions.is_failure() && !removals.is_failure(),
        }
    }

    /// Completed, but at least one direction failed
    pub fn is_partial_failure(&self) -> bool {
        !self.is_aborted() && !self.is_success()
    }

    pub fn fetch_error(&self) -> Option<&FetchError> {
        match self {
            Self::Aborted(e) => Some(e),
            Self::Completed { .. } => None,
        }
    }

    pub fn additions(&self) -> Option<&ApplyOutcome> {
        match self {
            Self::Completed { additions, .. } => Some(additions),
            Self::Aborted(_) => None,
        }
    }

    pub fn removals(&self) -> Option<&ApplyOutcome> {
        match self {
            Self::Completed { removals, .. } => Some(removals),
            Self::Aborted(_) => None,
        }
    }

    pub fn additions_attempted(&self) -> usize {
        self.additions().map_or(0, ApplyOutcome::attempted)
    }

    pub fn additions_succeeded(&self) -> usize {
        self.additions().map_or(0, ApplyOutcome::succeeded)
    }

    pub fn removals_attempted(&self) -> usize {
        self.removals().map_or(0, ApplyOutcome::attempted)
    }

    pub fn removals_succeeded(&self) -> usize {
        self.removals().map_or(0, ApplyOutcome::succeeded)
    }

    /// Errors from the failed apply directions
    pub fn apply_errors(&self) -> Vec<&ApplyError> {
        self.additions()
            .into_iter()
            .chain(self.removals())
            .filter_map(ApplyOutcome::error)
            .collect()
    }

    /// Number of failed operations (a fetch abort counts as one)
    pub fn failures(&self) -> usize {
        match self {
            Self::Aborted(_) => 1,
            Self::Completed { .. } => self.apply_errors().len(),
        }
    }
}

/// Options for a reconciliation cycle
#[derive(Debug, Clone, Default)]
pub struct ReconcileOptions {
    /// Compute the diff but issue no apply calls
    pub dry_run: bool,
}
