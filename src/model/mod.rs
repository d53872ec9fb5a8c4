use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One `<item>` from the status feed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedEntry {
    pub title: String,
    pub published_raw: String,
    pub published_at: Option<DateTime<Utc>>,
    pub maintenance_end_at: Option<DateTime<Utc>>,
    pub description: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Bucket {
    Ongoing,
    Scheduled,
    Unclassified,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedLine {
    pub title: Option<String>,
    /// Inline HTML limited to the sanitizer allow-list.
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineMatch {
    Matched { title: String, message: String },
    Unmatched { message: String },
}

impl From<LineMatch> for ParsedLine {
    fn from(value: LineMatch) -> Self {
        match value {
            LineMatch::Matched { title, message } => ParsedLine {
                title: Some(title),
                message,
            },
            LineMatch::Unmatched { message } => ParsedLine {
                title: None,
                message,
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Tone {
    Success,
    Negative,
    Warning,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionIcon {
    Warning,
    Calendar,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AlertOut {
    pub title: String,
    pub published: String,
    pub lines: Vec<ParsedLine>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SectionOut {
    pub heading: String,
    pub empty_text: String,
    pub tone: Tone,
    pub icon: SectionIcon,
    pub current: usize,
    pub alerts: Vec<AlertOut>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusOut {
    pub ongoing: SectionOut,
    pub scheduled: SectionOut,
    pub refreshed_at: Option<String>,
    pub last_error: Option<String>,
}
