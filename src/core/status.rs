use crate::error::{Result, TicketError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Ticket lifecycle status
///
/// ```text
/// New ──┬──> Closed
///       └──> Resolved
/// Open ─┬──> Closed
///       └──> Resolved
/// ```
///
/// There is no way back from `Closed` or `Resolved`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    #[default]
    New,
    Open,
    Closed,
    Resolved,
}

impl Status {
    pub const ALL: [Self; 4] = [Self::New, Self::Open, Self::Closed, Self::Resolved];

    /// Stable numeric code, as stored by the original schema
    #[must_use]
    pub const fn code(self) -> u8 {
        match self {
            Self::New => 1,
            Self::Open => 2,
            Self::Closed => 3,
            Self::Resolved => 4,
        }
    }

    #[must_use]
    pub const fn from_code(code: u8) -> Option<Self> {
        match code {
            1 => Some(Self::New),
            2 => Some(Self::Open),
            3 => Some(Self::Closed),
            4 => Some(Self::Resolved),
            _ => None,
        }
    }

    /// Comments may only be added while a ticket is still being worked on
    #[must_use]
    pub const fn accepts_comments(self) -> bool {
        matches!(self, Self::New | Self::Open)
    }

    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Closed | Self::Resolved)
    }

    /// Whether moving from `self` to `target` is allowed under `policy`
    #[must_use]
    pub const fn can_transition_to(self, target: Self, policy: LifecyclePolicy) -> bool {
        if self.code() == target.code() {
            return true;
        }
        match policy {
            LifecyclePolicy::Strict => {
                matches!(
                    (self, target),
                    (Self::New | Self::Open, Self::Closed | Self::Resolved)
                )
            },
            // Closing or resolving is accepted from any status.
            LifecyclePolicy::Permissive => target.is_terminal(),
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::New => "New",
            Self::Open => "Open",
            Self::Closed => "Closed",
            Self::Resolved => "Resolved",
        };
        f.write_str(label)
    }
}

impl FromStr for Status {
    type Err = TicketError;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if let Some(status) = s.parse::<u8>().ok().and_then(Self::from_code) {
            return Ok(status);
        }
        match s.to_lowercase().as_str() {
            "new" => Ok(Self::New),
            "open" => Ok(Self::Open),
            "closed" => Ok(Self::Closed),
            "resolved" => Ok(Self::Resolved),
            _ => Err(TicketError::invalid_field(
                "status",
                format!("Select a valid choice. {s} is not one of the available choices."),
            )),
        }
    }
}

/// How strictly status changes are checked
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LifecyclePolicy {
    /// Only New/Open may move to Closed/Resolved
    #[default]
    Strict,
    /// Closed/Resolved may be applied from any status
    Permissive,
}

/// Star rating given by a ticket's creator
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u8")]
pub struct Rating(u8);

impl Rating {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 5;
    pub const DEFAULT: Self = Self(Self::MAX);

    pub fn new(stars: i64) -> Result<Self> {
        if (i64::from(Self::MIN)..=i64::from(Self::MAX)).contains(&stars) {
            // Range checked above.
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            Ok(Self(stars as u8))
        } else {
            Err(TicketError::invalid_field(
                "rating_stars",
                format!(
                    "Select a valid choice. {stars} is not one of the available choices."
                ),
            ))
        }
    }

    #[must_use]
    pub const fn get(self) -> u8 {
        self.0
    }

    /// Star indices for display, `0..stars`
    pub fn stars(self) -> std::ops::Range<u8> {
        0..self.0
    }
}

impl TryFrom<i64> for Rating {
    type Error = TicketError;

    fn try_from(value: i64) -> Result<Self> {
        Self::new(value)
    }
}

impl From<Rating> for u8 {
    fn from(rating: Rating) -> Self {
        rating.0
    }
}

impl fmt::Display for Rating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
