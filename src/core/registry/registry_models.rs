// Registry domain models - content records, reports and audit events.
//
// Pure domain types. Identities are plain u64 principal ids so the core
// stays independent of whatever hosting layer authenticates the caller.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Principal id of whoever invokes an operation.
pub type Identity = u64;

/// The empty identity. Never a valid moderator address.
pub const ZERO_IDENTITY: Identity = 0;

/// Number of distinct reports that escalates active content to review.
pub const REPORT_THRESHOLD: u32 = 3;

/// Moderation state of a piece of content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ContentStatus {
    Active,
    UnderReview,
    Flagged,
    Removed,
}

impl ContentStatus {
    /// Stable textual form, used for storage.
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentStatus::Active => "Active",
            ContentStatus::UnderReview => "UnderReview",
            ContentStatus::Flagged => "Flagged",
            ContentStatus::Removed => "Removed",
        }
    }

    /// Whether content in this status is waiting on a moderator.
    pub fn needs_moderation(&self) -> bool {
        matches!(self, ContentStatus::UnderReview | ContentStatus::Flagged)
    }
}

impl fmt::Display for ContentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContentStatus::Active => write!(f, "Active"),
            ContentStatus::UnderReview => write!(f, "Under Review"),
            ContentStatus::Flagged => write!(f, "Flagged"),
            ContentStatus::Removed => write!(f, "Removed"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseStatusError(pub String);

impl fmt::Display for ParseStatusError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown content status: {}", self.0)
    }
}

impl std::error::Error for ParseStatusError {}

impl FromStr for ContentStatus {
    type Err = ParseStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .trim()
            .chars()
            .filter(|c| !matches!(c, '_' | '-' | ' '))
            .collect::<String>()
            .to_lowercase();

        match normalized.as_str() {
            "active" => Ok(ContentStatus::Active),
            "underreview" => Ok(ContentStatus::UnderReview),
            "flagged" => Ok(ContentStatus::Flagged),
            "removed" => Ok(ContentStatus::Removed),
            _ => Err(ParseStatusError(s.to_string())),
        }
    }
}

/// A registered reference to off-system data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Content {
    pub id: u64,
    pub author: Identity,
    /// Opaque reference, e.g. an IPFS CID.
    pub content_hash: String,
    pub timestamp: DateTime<Utc>,
    /// Cleared once the content is removed; removal is terminal.
    pub is_active: bool,
    pub report_count: u32,
    pub status: ContentStatus,
}

impl Content {
    /// A freshly submitted, active record.
    pub fn new(id: u64, author: Identity, content_hash: String, timestamp: DateTime<Utc>) -> Self {
        Self {
            id,
            author,
            content_hash,
            timestamp,
            is_active: true,
            report_count: 0,
            status: ContentStatus::Active,
        }
    }
}

/// A complaint filed by one identity against one piece of content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    pub id: u64,
    pub content_id: u64,
    pub reporter: Identity,
    pub reason: String,
    pub timestamp: DateTime<Utc>,
    /// Carried for compatibility; nothing sets it.
    pub is_processed: bool,
}

/// Audit notifications published for every successful state change.
///
/// Variant names, field names and field order are consumed by indexers and
/// must not change. Fields go over the wire in camelCase (`contentId`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all_fields = "camelCase")]
pub enum RegistryEvent {
    ContentSubmitted {
        content_id: u64,
        author: Identity,
        content_hash: String,
    },
    ContentReported {
        content_id: u64,
        reporter: Identity,
        reason: String,
    },
    ContentModerated {
        content_id: u64,
        new_status: ContentStatus,
        moderator: Identity,
    },
    ModeratorAdded {
        moderator: Identity,
    },
    ModeratorRemoved {
        moderator: Identity,
    },
}

impl RegistryEvent {
    pub fn name(&self) -> &'static str {
        match self {
            RegistryEvent::ContentSubmitted { .. } => "ContentSubmitted",
            RegistryEvent::ContentReported { .. } => "ContentReported",
            RegistryEvent::ContentModerated { .. } => "ContentModerated",
            RegistryEvent::ModeratorAdded { .. } => "ModeratorAdded",
            RegistryEvent::ModeratorRemoved { .. } => "ModeratorRemoved",
        }
    }
}
