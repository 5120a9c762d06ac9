//! Data domain definitions for the dashboard views
//!
//! Each domain is backed by its own slice and fetched independently.

use std::fmt;

/// One of the independently loaded analysis views
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Domain {
    Dashboard,
    Trends,
    Users,
    Tags,
    Questions,
}

impl Domain {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Dashboard => "dashboard",
            Self::Trends => "trends",
            Self::Users => "users",
            Self::Tags => "tags",
            Self::Questions => "questions",
        }
    }

    /// Message stored when a fetch fails without any more specific text
    pub fn fallback_message(&self) -> &'static str {
        match self {
            Self::Dashboard => "Failed to load dashboard data",
            Self::Trends => "Failed to load trend data",
            Self::Users => "Failed to load user data",
            Self::Tags => "Failed to load tag data",
            Self::Questions => "Failed to load question list",
        }
    }

    /// Returns all domains in display order
    pub fn all() -> [Self; 5] {
        [
            Self::Dashboard,
            Self::Trends,
            Self::Users,
            Self::Tags,
            Self::Questions,
        ]
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
