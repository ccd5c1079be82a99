//! Periodic refresh of a driver's active rides.
//!
//! The active-rides dashboard re-fetches on a fixed interval while it is on
//! screen. `ActiveRidesPoller` does that on a tokio task and publishes the
//! latest list on a `watch` channel. A failed fetch publishes an empty list.

use std::sync::Arc;
use std::time::Duration;

use log::warn;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::service::DriverService;
use crate::transport::Transport;
use crate::types::{Reply, Trip};

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Handle to a running poll loop. Dropping it stops the loop.
#[derive(Debug)]
pub struct ActiveRidesPoller {
    rides: watch::Receiver<Vec<Trip>>,
    task: JoinHandle<()>,
}

impl ActiveRidesPoller {
    /// Fetch immediately, then every `interval`, until stopped. A zero
    /// interval falls back to `DEFAULT_POLL_INTERVAL`.
    pub fn spawn<T>(service: Arc<DriverService<T>>, driver_id: u64, interval: Duration) -> Self
    where
        T: Transport + 'static,
    {
        let interval = if interval.is_zero() {
            warn!("zero poll interval for driver {driver_id}, using {DEFAULT_POLL_INTERVAL:?}");
            DEFAULT_POLL_INTERVAL
        } else {
            interval
        };
        let (tx, rides) = watch::channel(Vec::new());
        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                let trips = fetch(&service, driver_id).await;
                if tx.send(trips).is_err() {
                    break;
                }
            }
        });
        Self { rides, task }
    }

    /// Receiver that observes every published list.
    pub fn subscribe(&self) -> watch::Receiver<Vec<Trip>> {
        self.rides.clone()
    }

    /// The most recently published list.
    pub fn latest(&self) -> Vec<Trip> {
        self.rides.borrow().clone()
    }

    /// Stop polling. An in-flight fetch is cancelled.
    pub fn stop(self) {
        self.task.abort();
    }

    pub fn is_running(&self) -> bool {
        !self.task.is_finished()
    }
}

impl Drop for ActiveRidesPoller {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn fetch<T: Transport>(service: &DriverService<T>, driver_id: u64) -> Vec<Trip> {
    match service.list_active_rides(driver_id).await {
        Ok(Reply::Accepted(listing)) => listing.data,
        Ok(Reply::Rejected { status, message }) => {
            warn!(
                "active rides rejected for driver {driver_id}: {status} {}",
                message.unwrap_or_default()
            );
            Vec::new()
        }
        Err(err) => {
            warn!("active rides fetch failed for driver {driver_id}: {err}");
            Vec::new()
        }
    }
}
