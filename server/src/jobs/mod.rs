//! Background Jobs
//!
//! In-process fire-and-forget dispatcher. Requests enqueue work on an
//! unbounded channel and return immediately; a single worker task drains
//! the queue. No ordering or completion guarantee is observed by callers.

pub mod webfinger;

use std::time::Duration;

use anyhow::Result;
use sqlx::PgPool;
use tokio::sync::mpsc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::config::Config;

/// A unit of background work.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Job {
    /// Resolve a remote handle via webfinger and store the person.
    Webfinger {
        /// Handle to resolve, e.g. `eve@remote.example`.
        handle: String,
        /// Person who asked for the lookup (for tracing only).
        requested_by: Uuid,
    },
}

/// Handle for enqueuing background jobs.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    tx: mpsc::UnboundedSender<Job>,
}

impl Dispatcher {
    /// Create a dispatcher and the receiver its worker drains.
    #[must_use]
    pub fn new() -> (Self, mpsc::UnboundedReceiver<Job>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    /// Enqueue a webfinger lookup. Returns immediately.
    ///
    /// A send failure means the worker is gone; the lookup is dropped and
    /// logged, never surfaced to the caller.
    pub fn enqueue_webfinger(&self, handle: &str, requested_by: Uuid) {
        let job = Job::Webfinger {
            handle: handle.to_lowercase(),
            requested_by,
        };
        if let Err(e) = self.tx.send(job) {
            warn!(handle = %handle, error = %e, "Lookup worker unavailable, job dropped");
        }
    }
}

/// Spawn the worker task that drains the job queue.
pub fn spawn_worker(
    mut rx: mpsc::UnboundedReceiver<Job>,
    pool: PgPool,
    config: &Config,
) -> Result<()> {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(config.webfinger_timeout_secs))
        .user_agent(concat!("arbor-server/", env!("CARGO_PKG_VERSION")))
        .build()?;
    let local_domain = config.local_domain.clone();

    tokio::spawn(async move {
        while let Some(job) = rx.recv().await {
            match job {
                Job::Webfinger {
                    handle,
                    requested_by,
                } => {
                    match webfinger::resolve(&client, &pool, &local_domain, &handle).await {
                        Ok(person) => {
                            info!(
                                handle = %handle,
                                person_id = %person.id,
                                requested_by = %requested_by,
                                "Remote person resolved"
                            );
                        }
                        Err(e) => {
                            warn!(
                                handle = %handle,
                                requested_by = %requested_by,
                                error = %e,
                                "Webfinger lookup failed"
                            );
                        }
                    }
                }
            }
        }
        info!("Lookup worker stopped");
    });

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_enqueue_delivers_to_worker() {
        let (dispatcher, mut rx) = Dispatcher::new();
        let requester = Uuid::now_v7();

        dispatcher.enqueue_webfinger("Eve@Remote.example", requester);

        let job = rx.recv().await.expect("Job not delivered");
        assert_eq!(
            job,
            Job::Webfinger {
                handle: "eve@remote.example".into(),
                requested_by: requester,
            }
        );
    }

    #[test]
    fn test_enqueue_after_worker_gone_does_not_panic() {
        let (dispatcher, rx) = Dispatcher::new();
        drop(rx);

        dispatcher.enqueue_webfinger("eve@remote.example", Uuid::now_v7());
    }
}
