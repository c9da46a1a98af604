//! Roadmap node model
//!
//! A roadmap is an ordered forest of [`RoadmapNode`]s. Nodes own their
//! children by value, so a subtree can never appear in two places.
//!
//! Every field has an explicit default so that snapshots written by older
//! versions of the wiki (or hand-edited exports) load with predictable values
//! instead of holes.

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize};

#[cfg(feature = "ts-rs")]
use ts_rs::TS;

/// Date format used for `startDate` / `endDate`
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Default palette offered by the wiki for color-coding
pub const DEFAULT_CATEGORIES: &[&str] = &[
    "Technology",
    "Market",
    "Product",
    "Team",
    "Finance",
    "Operations",
];

/// Milestone status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "ts-rs", derive(TS))]
#[serde(rename_all = "kebab-case")]
pub enum Status {
    #[default]
    Planned,
    InProgress,
    Completed,
    AtRisk,
}

impl Status {
    pub const ALL: [Status; 4] = [
        Status::Planned,
        Status::InProgress,
        Status::Completed,
        Status::AtRisk,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Status::Planned => "planned",
            Status::InProgress => "in-progress",
            Status::Completed => "completed",
            Status::AtRisk => "at-risk",
        }
    }

    /// Human label ("in progress", "at risk")
    pub fn label(self) -> String {
        self.as_str().replace('-', " ")
    }

    /// Next status in display order, wrapping around
    pub fn next(self) -> Self {
        match self {
            Status::Planned => Status::InProgress,
            Status::InProgress => Status::Completed,
            Status::Completed => Status::AtRisk,
            Status::AtRisk => Status::Planned,
        }
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Status {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace([' ', '_'], "-").as_str() {
            "planned" => Ok(Status::Planned),
            "in-progress" => Ok(Status::InProgress),
            "completed" => Ok(Status::Completed),
            "at-risk" => Ok(Status::AtRisk),
            other => Err(format!(
                "unknown status '{}' (expected planned, in-progress, completed, at-risk)",
                other
            )),
        }
    }
}

/// Unknown, missing or non-string statuses load as `planned`
fn lenient_status<'de, D>(deserializer: D) -> Result<Status, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = serde_json::Value::deserialize(deserializer)?;
    Ok(raw.as_str().and_then(|s| s.parse().ok()).unwrap_or_default())
}

/// `null` lists load as empty
pub(crate) fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

fn fresh_id_default() -> String {
    new_node_id()
}

/// One milestone or initiative in the roadmap
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts-rs", derive(TS))]
#[serde(rename_all = "camelCase")]
pub struct RoadmapNode {
    /// Unique across the whole tree; nodes missing one get a fresh id on load
    #[serde(default = "fresh_id_default")]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    /// ISO `YYYY-MM-DD`
    #[serde(default)]
    pub start_date: String,
    /// ISO `YYYY-MM-DD`, not required to follow `start_date`
    #[serde(default)]
    pub end_date: String,
    #[serde(default, deserialize_with = "lenient_status")]
    pub status: Status,
    #[serde(default)]
    pub category: String,
    #[serde(default, deserialize_with = "null_as_empty", skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<RoadmapNode>,
    #[serde(default, deserialize_with = "null_as_empty", skip_serializing_if = "Vec::is_empty")]
    pub details: Vec<String>,
}

impl RoadmapNode {
    /// Build a leaf node
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        start_date: impl Into<String>,
        end_date: impl Into<String>,
        category: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: String::new(),
            start_date: start_date.into(),
            end_date: end_date.into(),
            status: Status::Planned,
            category: category.into(),
            children: Vec::new(),
            details: Vec::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_status(mut self, status: Status) -> Self {
        self.status = status;
        self
    }

    pub fn with_children(mut self, children: Vec<RoadmapNode>) -> Self {
        self.children = children;
        self
    }

    pub fn with_details(mut self, details: Vec<String>) -> Self {
        self.details = details;
        self
    }

    pub fn start(&self) -> Option<NaiveDate> {
        parse_date(&self.start_date)
    }

    pub fn end(&self) -> Option<NaiveDate> {
        parse_date(&self.end_date)
    }

    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }

    /// Both dates parse and the start comes after the end
    pub fn is_inverted(&self) -> bool {
        matches!((self.start(), self.end()), (Some(s), Some(e)) if s > e)
    }

    /// Shallow merge: only the fields present in `patch` change
    pub fn merged(&self, patch: &NodePatch) -> Self {
        let mut node = self.clone();
        if let Some(title) = &patch.title {
            node.title = title.clone();
        }
        if let Some(description) = &patch.description {
            node.description = description.clone();
        }
        if let Some(start) = &patch.start_date {
            node.start_date = start.clone();
        }
        if let Some(end) = &patch.end_date {
            node.end_date = end.clone();
        }
        if let Some(status) = patch.status {
            node.status = status;
        }
        if let Some(category) = &patch.category {
            node.category = category.clone();
        }
        if let Some(children) = &patch.children {
            node.children = children.clone();
        }
        if let Some(details) = &patch.details {
            node.details = details.clone();
        }
        node
    }
}

/// Partial set of node fields for `update`. The id is never patchable.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NodePatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub status: Option<Status>,
    pub category: Option<String>,
    pub children: Option<Vec<RoadmapNode>>,
    pub details: Option<Vec<String>>,
}

impl NodePatch {
    pub fn title(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Parse an ISO calendar date
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), DATE_FORMAT).ok()
}

pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Generate a fresh node id: `node-<unix millis>-<8 hex>`
///
/// The random suffix keeps ids distinct when several nodes are created within
/// the same millisecond.
pub fn new_node_id() -> String {
    let millis = chrono::Utc::now().timestamp_millis();
    let suffix = uuid::Uuid::new_v4().simple().to_string();
    format!("node-{}-{}", millis, &suffix[..8])
}

/// Values for a node about to be created; unset fields take the defaults
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NodeDraft {
    pub title: String,
    pub description: String,
    pub status: Option<Status>,
    pub category: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub details: Vec<String>,
}

impl NodeDraft {
    /// Materialize the draft with a caller-supplied id.
    ///
    /// Dates default to `today` and `today + duration_days`; the category
    /// falls back to `fallback_category` (the parent's, for children).
    pub fn into_node(
        self,
        id: String,
        today: NaiveDate,
        duration_days: i64,
        fallback_title: &str,
        fallback_category: &str,
    ) -> RoadmapNode {
        let title = if self.title.trim().is_empty() {
            fallback_title.to_string()
        } else {
            self.title
        };
        let category = self
            .category
            .filter(|c| !c.trim().is_empty())
            .unwrap_or_else(|| fallback_category.to_string());

        RoadmapNode {
            id,
            title,
            description: self.description,
            start_date: self.start_date.unwrap_or_else(|| format_date(today)),
            end_date: self
                .end_date
                .unwrap_or_else(|| format_date(today + Duration::days(duration_days))),
            status: self.status.unwrap_or_default(),
            category,
            children: Vec::new(),
            details: self.details,
        }
    }
}

/// Default root created by "Add Item"
pub fn new_root_node(id: String, today: NaiveDate, duration_days: i64) -> RoadmapNode {
    let mut node = NodeDraft::default().into_node(id, today, duration_days, "New Initiative", "Product");
    node.description = "Click to edit this item".to_string();
    node
}
