//! Entity lifecycle status and its transition table

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Lifecycle status shared by every audited entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Status {
    /// Visible and usable
    #[default]
    Active,
    /// Created but not yet activated (e.g. awaiting e-mail confirmation)
    NotActive,
    /// Suspended by a moderator
    Blocked,
    /// Soft-deleted
    Deleted,
    /// Waiting for a moderation decision
    UnderModeration,
    /// Rejected by a moderator
    ModerationDeclined,
    /// Work in progress, not published
    Draft,
}

impl Status {
    /// Every status, in declaration order
    pub const ALL: [Status; 7] = [
        Status::Active,
        Status::NotActive,
        Status::Blocked,
        Status::Deleted,
        Status::UnderModeration,
        Status::ModerationDeclined,
        Status::Draft,
    ];

    /// Stored and serialized form
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Active => "ACTIVE",
            Self::NotActive => "NOT_ACTIVE",
            Self::Blocked => "BLOCKED",
            Self::Deleted => "DELETED",
            Self::UnderModeration => "UNDER_MODERATION",
            Self::ModerationDeclined => "MODERATION_DECLINED",
            Self::Draft => "DRAFT",
        }
    }

    /// Statuses reachable from this one in a single step
    pub const fn successors(self) -> &'static [Status] {
        use Status::*;

        match self {
            Active => &[NotActive, Blocked, Deleted, UnderModeration, Draft],
            NotActive => &[Active, Blocked, Deleted],
            Blocked => &[Active, Deleted],
            Deleted => &[],
            UnderModeration => &[Active, ModerationDeclined, Blocked, Deleted, Draft],
            ModerationDeclined => &[Active, UnderModeration, Draft, Blocked, Deleted],
            Draft => &[Active, UnderModeration, Deleted],
        }
    }

    /// Whether `self -> target` is a legal transition
    pub fn can_transition_to(self, target: Status) -> bool {
        self.successors().contains(&target)
    }

    /// Validate `self -> target`, returning the new status
    ///
    /// # Errors
    ///
    /// [`Error::IllegalTransition`] when the pair is not in the table.
    pub fn transition_to(self, target: Status) -> Result<Status> {
        if self.can_transition_to(target) {
            Ok(target)
        } else {
            Err(Error::IllegalTransition {
                from: self,
                to: target,
            })
        }
    }

    /// Whether rows in this status are returned by ordinary lookups
    pub const fn is_visible(self) -> bool {
        !matches!(self, Self::Deleted | Self::Blocked)
    }

    /// Whether no transition leaves this status
    pub const fn is_terminal(self) -> bool {
        self.successors().is_empty()
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Status {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| Error::InvalidArgument(format!("unknown status '{s}'")))
    }
}

impl From<Status> for sea_query::Value {
    fn from(status: Status) -> Self {
        status.as_str().into()
    }
}
