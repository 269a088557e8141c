//! Periodic rate update pushed to every registered chat.

use std::sync::Arc;
use std::time::Duration;

use log::{debug, error, info};
use tokio_util::sync::CancellationToken;

use crate::bot::Messenger;
use crate::catalogue::Catalogue;
use crate::rate::{Rate, RateGenerator};
use crate::registry::UserRegistry;

pub const DEFAULT_MIN_INTERVAL: Duration = Duration::from_secs(10 * 60);
pub const DEFAULT_MAX_INTERVAL: Duration = Duration::from_secs(60 * 60);

pub fn broadcast_text(pair: &str, rate: &Rate) -> String {
    format!(
        "The {} rate is {} and it is going {}.",
        pair, rate.value, rate.direction
    )
}

/// Outcome of one broadcast cycle.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct BroadcastReport {
    pub delivered: usize,
    /// Registry ids that could not be reached.
    pub failed: Vec<String>,
}

pub struct Broadcaster {
    registry: Arc<UserRegistry>,
    catalogue: Arc<Catalogue>,
    rates: RateGenerator,
    messenger: Arc<dyn Messenger>,
    min_interval: Duration,
    max_interval: Duration,
    on_start: bool,
}

impl Broadcaster {
    pub fn new(
        registry: Arc<UserRegistry>,
        catalogue: Arc<Catalogue>,
        rates: RateGenerator,
        messenger: Arc<dyn Messenger>,
    ) -> Self {
        Broadcaster {
            registry,
            catalogue,
            rates,
            messenger,
            min_interval: DEFAULT_MIN_INTERVAL,
            max_interval: DEFAULT_MAX_INTERVAL,
            on_start: false,
        }
    }

    /// Delay between cycles is drawn uniformly from `[min, max)`.
    pub fn with_interval(mut self, min: Duration, max: Duration) -> Self {
        self.min_interval = min;
        self.max_interval = max;
        self
    }

    /// Run one cycle immediately instead of waiting for the first delay.
    pub fn with_initial_broadcast(mut self, on_start: bool) -> Self {
        self.on_start = on_start;
        self
    }

    /// Sleeps a random delay, broadcasts, repeats. Returns once `cancel` fires.
    pub async fn run(&self, cancel: CancellationToken) {
        info!(
            "[broadcast] started, interval {}s..{}s",
            self.min_interval.as_secs(),
            self.max_interval.as_secs()
        );

        if self.on_start && !cancel.is_cancelled() {
            self.broadcast_once().await;
        }

        loop {
            let delay = self.rates.delay(self.min_interval, self.max_interval);
            debug!("[broadcast] next cycle in {}s", delay.as_secs());
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = tokio::time::sleep(delay) => {
                    self.broadcast_once().await;
                }
            }
        }

        info!("[broadcast] stopped");
    }

    /// Sends one freshly generated update to every registered chat.
    ///
    /// Failed deliveries are logged and skipped, never retried.
    pub async fn broadcast_once(&self) -> BroadcastReport {
        let mut report = BroadcastReport::default();

        let users = match self.registry.list_all().await {
            Ok(users) => users,
            Err(e) => {
                error!("[broadcast] skipping cycle: {}", e);
                return report;
            }
        };
        let Some(pair) = self.rates.pick_pair(&self.catalogue) else {
            return report;
        };
        let text = broadcast_text(pair, &self.rates.generate());
        info!("[broadcast] sending {:?} to {} chats", text, users.len());

        for (id, _) in users {
            let chat_id = match id.parse::<i64>() {
                Ok(chat_id) => chat_id,
                Err(_) => {
                    error!("[broadcast] invalid chat id {:?} in registry", id);
                    report.failed.push(id);
                    continue;
                }
            };
            match self.messenger.send_text(chat_id, &text).await {
                Ok(()) => report.delivered += 1,
                Err(e) => {
                    error!("[broadcast] failed to deliver to chat {}: {}", chat_id, e);
                    report.failed.push(id);
                }
            }
        }

        info!(
            "[broadcast] cycle done, {} delivered, {} failed",
            report.delivered,
            report.failed.len()
        );
        report
    }
}

impl std::fmt::Debug for Broadcaster {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Broadcaster")
            .field("min_interval", &self.min_interval)
            .field("max_interval", &self.max_interval)
            .field("on_start", &self.on_start)
            .finish_non_exhaustive()
    }
}
