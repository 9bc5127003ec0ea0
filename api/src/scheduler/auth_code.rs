use std::{sync::Arc, time::Duration};

use tokio::{
	task::JoinHandle,
	time::{self, MissedTickBehavior},
};

use crate::{prelude::*, service::AuthCodeStore};

/// Spawns the task that sweeps the auth-code store at a fixed interval. The
/// task runs until the returned handle is aborted.
pub fn spawn_auth_code_sweeper(
	store: Arc<dyn AuthCodeStore>,
	interval: Duration,
) -> JoinHandle<()> {
	tokio::spawn(async move {
		let mut ticker = time::interval(interval);
		ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
		// The first tick completes immediately, when there is nothing to sweep
		ticker.tick().await;

		loop {
			ticker.tick().await;
			sweep_auth_codes(store.as_ref()).await;
		}
	})
}

/// Runs a single sweep of the auth-code store
#[instrument(skip(store))]
pub async fn sweep_auth_codes(store: &dyn AuthCodeStore) {
	match store.sweep().await {
		Ok(0) => trace!("No expired auth codes to sweep"),
		Ok(swept) => {
			info!(
				monotonic_counter.auth_code.swept = swept as u64,
				"Swept {} expired auth codes", swept
			);
		}
		Err(err) => error!("Unable to sweep expired auth codes: {}", err),
	}
}
