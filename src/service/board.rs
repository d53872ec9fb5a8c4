use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::{broadcast, RwLock};
use tracing::debug;

use crate::{
    config::{AppConfig, DisplayConfig},
    model::{AlertOut, FeedEntry, SectionIcon, SectionOut, StatusOut, Tone},
    ops::events::EventsHub,
    service::classify::classify,
    util::{html::SanitizePolicy, lines::classify_lines},
};

/// Alerts of one section plus the index the display is showing.
#[derive(Debug, Clone, Default)]
pub struct Carousel {
    alerts: Vec<AlertOut>,
    current: usize,
}

impl Carousel {
    pub fn replace(&mut self, alerts: Vec<AlertOut>) {
        self.alerts = alerts;
        if self.current >= self.alerts.len() {
            self.current = 0;
        }
    }

    pub fn clear(&mut self) {
        self.alerts.clear();
        self.current = 0;
    }

    /// Returns `false` when there is nothing to rotate through.
    pub fn advance(&mut self) -> bool {
        if self.alerts.len() < 2 {
            return false;
        }
        self.current = (self.current + 1) % self.alerts.len();
        true
    }

    pub fn current(&self) -> usize {
        self.current
    }

    pub fn len(&self) -> usize {
        self.alerts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.alerts.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefreshSummary {
    pub ongoing: usize,
    pub scheduled: usize,
}

#[derive(Debug)]
pub struct Board {
    policy: SanitizePolicy,
    preview_limit: usize,
    display: DisplayConfig,
    ongoing: Carousel,
    scheduled: Carousel,
    refreshed_at: Option<DateTime<Utc>>,
    last_error: Option<String>,
}

impl Board {
    pub fn new(policy: SanitizePolicy, preview_limit: usize, display: DisplayConfig) -> Self {
        Self {
            policy,
            preview_limit,
            display,
            ongoing: Carousel::default(),
            scheduled: Carousel::default(),
            refreshed_at: None,
            last_error: None,
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(
            config.sanitizer.policy(),
            config.feed.preview_limit,
            config.display.clone(),
        )
    }

    pub fn apply_entries(&mut self, entries: &[FeedEntry], now: DateTime<Utc>) -> RefreshSummary {
        let mut classified = classify(entries, now);
        classified.truncate(self.preview_limit);

        let ongoing = self.render_all(&classified.ongoing);
        let scheduled = self.render_all(&classified.scheduled);
        self.ongoing.replace(ongoing);
        self.scheduled.replace(scheduled);
        self.refreshed_at = Some(now);
        self.last_error = None;

        RefreshSummary {
            ongoing: self.ongoing.len(),
            scheduled: self.scheduled.len(),
        }
    }

    /// Any fetch or parse failure shows as "no incidents".
    pub fn apply_failure(&mut self, reason: &str) {
        self.ongoing.clear();
        self.scheduled.clear();
        self.last_error = Some(reason.to_string());
    }

    pub fn rotate(&mut self) -> bool {
        let ongoing = self.ongoing.advance();
        let scheduled = self.scheduled.advance();
        ongoing || scheduled
    }

    pub fn render(&self, entry: &FeedEntry) -> AlertOut {
        let lines = self.policy.sanitize_and_split(&entry.description);
        AlertOut {
            title: entry.title.clone(),
            published: entry.published_raw.clone(),
            lines: classify_lines(&lines),
        }
    }

    fn render_all(&self, entries: &[FeedEntry]) -> Vec<AlertOut> {
        entries.iter().map(|entry| self.render(entry)).collect()
    }

    pub fn snapshot(&self) -> StatusOut {
        StatusOut {
            ongoing: SectionOut {
                heading: self.display.ongoing_heading.clone(),
                empty_text: self.display.ongoing_empty_text.clone(),
                tone: if self.ongoing.is_empty() {
                    Tone::Success
                } else {
                    Tone::Negative
                },
                icon: SectionIcon::Warning,
                current: self.ongoing.current(),
                alerts: self.ongoing.alerts.clone(),
            },
            scheduled: SectionOut {
                heading: self.display.scheduled_heading.clone(),
                empty_text: self.display.scheduled_empty_text.clone(),
                tone: if self.scheduled.is_empty() {
                    Tone::Success
                } else {
                    Tone::Warning
                },
                icon: SectionIcon::Calendar,
                current: self.scheduled.current(),
                alerts: self.scheduled.alerts.clone(),
            },
            refreshed_at: self.refreshed_at.map(|dt| dt.to_rfc3339()),
            last_error: self.last_error.clone(),
        }
    }
}

/// Shared board that publishes a fresh snapshot after every change.
#[derive(Clone)]
pub struct BoardHandle {
    board: Arc<RwLock<Board>>,
    events: EventsHub,
}

impl BoardHandle {
    pub fn new(board: Board, events: EventsHub) -> Self {
        Self {
            board: Arc::new(RwLock::new(board)),
            events,
        }
    }

    /// Subscribe before reading, so a change published in between is
    /// delivered on the receiver instead of being lost.
    pub async fn watch(&self) -> (StatusOut, broadcast::Receiver<StatusOut>) {
        let rx = self.events.subscribe();
        let status = self.board.read().await.snapshot();
        (status, rx)
    }

    pub async fn snapshot(&self) -> StatusOut {
        self.board.read().await.snapshot()
    }

    pub async fn apply_entries(&self, entries: &[FeedEntry], now: DateTime<Utc>) -> RefreshSummary {
        let (summary, status) = {
            let mut board = self.board.write().await;
            let summary = board.apply_entries(entries, now);
            (summary, board.snapshot())
        };
        self.events.publish(status);
        summary
    }

    pub async fn apply_failure(&self, err: &(dyn std::error::Error + Send + Sync)) {
        let status = {
            let mut board = self.board.write().await;
            board.apply_failure(&err.to_string());
            board.snapshot()
        };
        self.events.publish(status);
    }

    pub async fn rotate(&self) -> bool {
        let status = {
            let mut board = self.board.write().await;
            if !board.rotate() {
                return false;
            }
            board.snapshot()
        };
        debug!(
            ongoing = status.ongoing.current,
            scheduled = status.scheduled.current,
            "carousel advanced"
        );
        self.events.publish(status);
        true
    }
}
