pub mod parse;

use std::time::Duration;

use chrono::Utc;
use reqwest::Client;
use tokio::{
    sync::mpsc,
    task::JoinHandle,
    time::{interval, MissedTickBehavior},
};
use tracing::{debug, info, warn};

use crate::{
    config::FeedConfig,
    error::{AppError, AppResult},
    model::FeedEntry,
    service::board::BoardHandle,
};

pub use parse::parse_feed;

#[derive(Debug, thiserror::Error)]
pub enum FeedError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("unexpected status code: {0}")]
    HttpStatus(u16),
    #[error("xml parse error: {0}")]
    Xml(#[from] roxmltree::Error),
}

/// Asks the running fetcher for an immediate refresh.
#[derive(Clone)]
pub struct RefreshTrigger {
    sender: mpsc::Sender<()>,
}

impl RefreshTrigger {
    pub fn request(&self) -> AppResult<()> {
        match self.sender.try_send(()) {
            // a refresh is already queued
            Ok(()) | Err(mpsc::error::TrySendError::Full(())) => Ok(()),
            Err(mpsc::error::TrySendError::Closed(())) => {
                Err(AppError::Unavailable("feed fetcher is not running".into()))
            }
        }
    }
}

pub fn refresh_channel() -> (RefreshTrigger, mpsc::Receiver<()>) {
    let (sender, receiver) = mpsc::channel(1);
    (RefreshTrigger { sender }, receiver)
}

pub fn spawn(
    board: BoardHandle,
    config: FeedConfig,
    refresh_rx: mpsc::Receiver<()>,
) -> anyhow::Result<JoinHandle<()>> {
    let fetcher = Fetcher::new(board, config)?;
    Ok(tokio::spawn(fetcher.run(refresh_rx)))
}

struct Fetcher {
    board: BoardHandle,
    client: Client,
    config: FeedConfig,
}

impl Fetcher {
    fn new(board: BoardHandle, mut config: FeedConfig) -> anyhow::Result<Self> {
        if config.refresh_interval_secs == 0 {
            config.refresh_interval_secs = 600;
        }
        if config.request_timeout_secs == 0 {
            config.request_timeout_secs = 15;
        }

        let client = Client::builder()
            .user_agent("driftstatus/0.1")
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;

        Ok(Self {
            board,
            client,
            config,
        })
    }

    async fn run(self, mut refresh_rx: mpsc::Receiver<()>) {
        let mut ticker = interval(Duration::from_secs(self.config.refresh_interval_secs));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            // the first tick completes immediately
            tokio::select! {
                _ = ticker.tick() => {}
                Some(()) = refresh_rx.recv() => {
                    debug!("manual refresh requested");
                    ticker.reset();
                }
            }
            self.refresh_once().await;
        }
    }

    async fn refresh_once(&self) {
        match fetch_entries(&self.client, &self.config.url).await {
            Ok(entries) => {
                let summary = self.board.apply_entries(&entries, Utc::now()).await;
                info!(
                    url = %self.config.url,
                    items = entries.len(),
                    ongoing = summary.ongoing,
                    scheduled = summary.scheduled,
                    "feed refreshed"
                );
            }
            Err(err) => {
                warn!(url = %self.config.url, error = %err, "feed refresh failed");
                self.board.apply_failure(&err).await;
            }
        }
    }
}

pub async fn fetch_feed(client: &Client, url: &str) -> Result<String, FeedError> {
    let response = client.get(url).send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(FeedError::HttpStatus(status.as_u16()));
    }
    Ok(response.text().await?)
}

pub async fn fetch_entries(client: &Client, url: &str) -> Result<Vec<FeedEntry>, FeedError> {
    let body = fetch_feed(client, url).await?;
    parse_feed(&body)
}
