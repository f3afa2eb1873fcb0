use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior, interval_at};

use crate::state::AppState;

/// Run the failed-delivery sweep every `period`, first one `period` after start.
pub fn spawn_sweep_worker(state: AppState, period: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        tracing::info!(period_secs = period.as_secs(), "webhook sweep worker started");
        loop {
            ticker.tick().await;
            if let Err(e) = state.sweep_usecase().execute(None).await {
                tracing::error!(error = ?e, "webhook sweep failed");
            }
        }
    })
}
