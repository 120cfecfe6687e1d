use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use chrono::{DateTime, Utc};
use tokio::sync::watch;
use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::models::Profile;
use crate::snapshot::load_snapshot_file;

/// An immutable view of the whole profile collection. Consumers recompute
/// from scratch on every revision.
#[derive(Debug, Clone, PartialEq)]
pub struct ProfileSnapshot {
    pub revision: u64,
    pub profiles: Arc<[Profile]>,
    pub received_at: DateTime<Utc>,
}

impl ProfileSnapshot {
    pub fn empty() -> Self {
        Self {
            revision: 0,
            profiles: Arc::from(Vec::new()),
            received_at: Utc::now(),
        }
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }
}

pub struct SnapshotPublisher {
    sender: watch::Sender<Arc<ProfileSnapshot>>,
}

impl Default for SnapshotPublisher {
    fn default() -> Self {
        Self::new()
    }
}

impl SnapshotPublisher {
    pub fn new() -> Self {
        let (sender, _) = watch::channel(Arc::new(ProfileSnapshot::empty()));
        Self { sender }
    }

    pub fn subscribe(&self) -> watch::Receiver<Arc<ProfileSnapshot>> {
        self.sender.subscribe()
    }

    pub fn current(&self) -> Arc<ProfileSnapshot> {
        Arc::clone(&self.sender.borrow())
    }

    pub fn publish(&self, profiles: Vec<Profile>) -> u64 {
        let mut revision = 0;
        self.sender.send_modify(|current| {
            revision = current.revision + 1;
            *current = Arc::new(ProfileSnapshot {
                revision,
                profiles: Arc::from(profiles),
                received_at: Utc::now(),
            });
        });
        assert!(revision > 0, "Snapshot revision must advance");
        info!("Published profile snapshot revision {revision}");
        revision
    }

    /// Publishes only when the collection differs from the current snapshot.
    pub fn publish_if_changed(&self, profiles: Vec<Profile>) -> Option<u64> {
        let current = self.current();
        if current.revision > 0 && current.profiles[..] == profiles[..] {
            debug!(
                "Profile snapshot unchanged at revision {}",
                current.revision
            );
            return None;
        }
        Some(self.publish(profiles))
    }
}

/// Re-reads a JSON snapshot file on an interval and publishes changes.
pub struct SnapshotPoller {
    path: PathBuf,
    interval: Duration,
    publisher: Arc<SnapshotPublisher>,
}

impl SnapshotPoller {
    pub fn new(path: PathBuf, interval: Duration, publisher: Arc<SnapshotPublisher>) -> Self {
        assert!(
            interval >= Duration::from_millis(100),
            "Poll interval below 100ms is too aggressive"
        );
        Self {
            path,
            interval,
            publisher,
        }
    }

    pub async fn tick(&self) -> Result<Option<u64>> {
        let profiles = load_snapshot_file(&self.path).await?;
        Ok(self.publisher.publish_if_changed(profiles))
    }

    pub async fn run(self, mut shutdown: watch::Receiver<bool>) -> Result<()> {
        info!("Watching profile snapshot {}", self.path.display());
        loop {
            tokio::select! {
                changed = shutdown.changed() => {
                    match changed {
                        Ok(_) => {
                            if *shutdown.borrow() {
                                info!("Snapshot poller shutdown signal received");
                                break;
                            }
                        }
                        Err(_) => {
                            warn!("Shutdown channel closed unexpectedly. Exiting snapshot poller");
                            break;
                        }
                    }
                }
                _ = sleep(self.interval) => {
                    // A half-written file is common while the exporter runs;
                    // keep serving the last good snapshot.
                    if let Err(err) = self.tick().await {
                        warn!("Profile snapshot refresh failed: {err:#}");
                    }
                }
            }
        }
        Ok(())
    }
}
