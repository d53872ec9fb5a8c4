use std::time::Duration;

use tokio::{
    task::JoinHandle,
    time::{interval, MissedTickBehavior},
};

use crate::service::board::BoardHandle;

pub fn spawn(board: BoardHandle, rotation_secs: u64) -> JoinHandle<()> {
    let period = Duration::from_secs(if rotation_secs == 0 { 30 } else { rotation_secs });
    tokio::spawn(async move {
        let mut ticker = interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        ticker.tick().await; // skip the immediate tick

        loop {
            ticker.tick().await;
            board.rotate().await;
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration as ChronoDuration, Utc};

    use crate::{
        config::AppConfig,
        model::FeedEntry,
        ops::events::EventsHub,
        service::board::Board,
    };

    #[tokio::test(start_paused = true)]
    async fn rotates_on_each_period() {
        let now = Utc::now();
        let entry = |title: &str| FeedEntry {
            title: title.to_string(),
            published_raw: String::new(),
            published_at: Some(now - ChronoDuration::hours(1)),
            maintenance_end_at: Some(now + ChronoDuration::hours(1)),
            description: String::new(),
        };
        let handle = BoardHandle::new(Board::from_config(&AppConfig::default()), EventsHub::new(8));
        handle.apply_entries(&[entry("a"), entry("b"), entry("c")], now).await;

        let task = spawn(handle.clone(), 30);
        tokio::time::sleep(Duration::from_secs(65)).await;
        assert_eq!(handle.snapshot().await.ongoing.current, 2);

        task.abort();
    }
}
