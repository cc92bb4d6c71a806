use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{interval, sleep, MissedTickBehavior};
use crate::event::{AppEvent, EventSender, EventSenderExt};

/// Single-shot debounce timer with cancel-and-restart semantics: every
/// `reset` call discards the previous pending fire, so within one window
/// only the last caller's event is delivered.
pub struct DebounceTimer {
    duration: Duration,
    tx: EventSender,
    handle: Option<JoinHandle<()>>,
}

impl DebounceTimer {
    pub fn new(duration: Duration, tx: EventSender) -> Self {
        DebounceTimer { duration, tx, handle: None }
    }

    pub fn reset(&mut self, event: AppEvent) {
        self.cancel();
        let tx = self.tx.clone();
        let duration = self.duration;
        self.handle = Some(tokio::spawn(async move {
            sleep(duration).await;
            tx.send_or_warn(event);
        }));
    }

    pub fn cancel(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }

    pub fn is_scheduled(&self) -> bool {
        self.handle.as_ref().map(|h| !h.is_finished()).unwrap_or(false)
    }
}

impl Drop for DebounceTimer {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// Repeating poll timer. The first tick fires one full period after start.
pub struct PollTimer {
    handle: Option<JoinHandle<()>>,
}

impl PollTimer {
    pub fn start(period: Duration, tx: EventSender, event: AppEvent) -> Self {
        let handle = tokio::spawn(async move {
            let mut tick = interval(period);
            tick.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // interval's first tick completes immediately
            tick.tick().await;
            loop {
                tick.tick().await;
                tx.send_or_warn(event.clone());
            }
        });
        PollTimer { handle: Some(handle) }
    }

    pub fn cancel(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}

impl Drop for PollTimer {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::SyncRequest;
    use tokio::sync::broadcast;
    use tokio::time::advance;

    fn drain(rx: &mut broadcast::Receiver<AppEvent>) -> Vec<AppEvent> {
        let mut out = vec![];
        while let Ok(e) = rx.try_recv() {
            out.push(e);
        }
        out
    }

    #[tokio::test(start_paused = true)]
    async fn rapid_resets_coalesce_to_one_event() {
        let (tx, mut rx) = broadcast::channel(16);
        let mut timer = DebounceTimer::new(Duration::from_millis(100), tx);

        for _ in 0..5 {
            timer.reset(AppEvent::Sync(SyncRequest::PresetName { force: false }));
            advance(Duration::from_millis(10)).await;
        }
        assert!(drain(&mut rx).is_empty());

        advance(Duration::from_millis(150)).await;
        // let the spawned task run
        tokio::task::yield_now().await;

        let events = drain(&mut rx);
        assert_eq!(events.len(), 1);
        assert!(matches!(events[0],
            AppEvent::Sync(SyncRequest::PresetName { force: false })));
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_suppresses_pending_fire() {
        let (tx, mut rx) = broadcast::channel(16);
        let mut timer = DebounceTimer::new(Duration::from_millis(100), tx);

        timer.reset(AppEvent::Sync(SyncRequest::Effects));
        timer.cancel();
        advance(Duration::from_millis(200)).await;
        tokio::task::yield_now().await;

        assert!(drain(&mut rx).is_empty());
        assert!(!timer.is_scheduled());
    }

    #[tokio::test(start_paused = true)]
    async fn poll_timer_fires_repeatedly() {
        let (tx, mut rx) = broadcast::channel(16);
        let mut poll = PollTimer::start(
            Duration::from_secs(5), tx, AppEvent::Sync(SyncRequest::Poll));
        tokio::task::yield_now().await;

        advance(Duration::from_secs(6)).await;
        tokio::task::yield_now().await;
        assert_eq!(drain(&mut rx).len(), 1);

        // missed ticks are delayed, not bunched up
        advance(Duration::from_secs(6)).await;
        tokio::task::yield_now().await;
        assert_eq!(drain(&mut rx).len(), 1);

        poll.cancel();
        advance(Duration::from_secs(10)).await;
        tokio::task::yield_now().await;
        assert!(drain(&mut rx).is_empty());
    }
}
