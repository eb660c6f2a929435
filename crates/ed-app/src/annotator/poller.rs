//! Repeating `GET job` task that runs while jobs are pending.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::annotator::SessionEvent;
use crate::annotator::client::JobClient;

/// `tokio::time::interval` rejects a zero period.
const MIN_PERIOD: Duration = Duration::from_millis(1);

struct Running {
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

#[derive(Default)]
pub struct Poller {
    running: Option<Running>,
}

impl Poller {
    /// Start polling every `period`, first request one period from now. No-op while running.
    pub fn start(
        &mut self,
        client: Arc<dyn JobClient>,
        period: Duration,
        events: UnboundedSender<SessionEvent>,
    ) {
        if self.is_running() {
            return;
        }

        let period = period.max(MIN_PERIOD);
        let cancel = CancellationToken::new();
        let handle = tokio::spawn(poll_loop(client, period, events, cancel.clone()));
        log::debug!("Polling for results every {:?}", period);

        self.running = Some(Running { cancel, handle });
    }

    /// Stop ticking. A `GET job` already in flight still completes and delivers its
    /// results, since the server hands each result out only once. No-op when stopped.
    pub fn stop(&mut self) {
        if let Some(running) = self.running.take() {
            running.cancel.cancel();
            log::debug!("Polling stopped");
        }
    }

    pub fn is_running(&self) -> bool {
        self.running
            .as_ref()
            .is_some_and(|running| !running.handle.is_finished())
    }
}

impl Drop for Poller {
    fn drop(&mut self) {
        self.stop();
    }
}

async fn poll_loop(
    client: Arc<dyn JobClient>,
    period: Duration,
    events: UnboundedSender<SessionEvent>,
    cancel: CancellationToken,
) {
    let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            _ = ticker.tick() => {}
        }

        match client.fetch_results().await {
            Ok(results) => {
                if events.send(SessionEvent::Polled(results)).is_err() {
                    // Nobody is listening any more.
                    break;
                }
            }
            Err(e) => log::warn!("Polling for results failed, retrying in {:?}: {}", period, e),
        }
    }
}
