//! Background autosave for an open RFC.
//!
//! The session publishes every new aggregate snapshot on a watch channel.
//! A spawned task persists the latest snapshot on a fixed interval and
//! reports its progress as an [`AutosaveStatus`]. A failed save is logged
//! and simply retried on the next tick.

use crate::error::AppError;
use crate::models::RfcAggregate;
use crate::services::store::{save_with_summary, RfcStore};
use chrono::Utc;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time;

/// Observable state of the autosave loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AutosaveStatus {
    /// The last save succeeded (or nothing has needed saving yet).
    Saved,
    /// A save is in progress.
    Saving,
    /// The last save failed; it will be retried.
    Error,
}

impl std::fmt::Display for AutosaveStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AutosaveStatus::Saved => write!(f, "saved"),
            AutosaveStatus::Saving => write!(f, "saving"),
            AutosaveStatus::Error => write!(f, "error"),
        }
    }
}

/// Commands that can be sent to the autosave loop.
#[derive(Debug)]
pub enum AutosaveCommand {
    /// Save the latest snapshot immediately and report the outcome.
    SaveNow(oneshot::Sender<Result<(), AppError>>),

    /// Stop the loop. No writes happen afterwards.
    Stop,
}

/// Handle to a running autosave loop.
///
/// Dropping the handle aborts the loop.
#[derive(Debug)]
pub struct AutosaveHandle {
    command_tx: mpsc::Sender<AutosaveCommand>,
    status_rx: watch::Receiver<AutosaveStatus>,
    task: Option<JoinHandle<()>>,
}

impl AutosaveHandle {
    /// Start the autosave loop.
    ///
    /// Must be called from within a tokio runtime. The first save happens
    /// one full interval after start.
    pub fn start_background(
        store: Arc<dyn RfcStore>,
        snapshots: watch::Receiver<RfcAggregate>,
        interval_secs: u64,
    ) -> Self {
        let (command_tx, mut command_rx) = mpsc::channel::<AutosaveCommand>(8);
        let (status_tx, status_rx) = watch::channel(AutosaveStatus::Saved);
        // A zero interval would panic in tokio::time::interval
        let period = Duration::from_secs(interval_secs.max(1));

        let task = tokio::spawn(async move {
            let rfc_id = snapshots.borrow().id.clone();
            log::debug!("[autosave] Started for RFC {} every {:?}", rfc_id, period);

            let mut interval = time::interval(period);
            // The first tick completes immediately; the snapshot was just loaded
            interval.tick().await;

            loop {
                tokio::select! {
                    _ = interval.tick() => {
                        // Failures are reported through the status channel
                        let _ = persist(store.as_ref(), &snapshots, &status_tx).await;
                    }
                    cmd = command_rx.recv() => {
                        match cmd {
                            Some(AutosaveCommand::SaveNow(reply)) => {
                                let result = persist(store.as_ref(), &snapshots, &status_tx).await;
                                let _ = reply.send(result);
                            }
                            Some(AutosaveCommand::Stop) | None => break,
                        }
                    }
                }
            }

            log::debug!("[autosave] Stopped for RFC {}", rfc_id);
        });

        Self {
            command_tx,
            status_rx,
            task: Some(task),
        }
    }

    /// Current autosave status.
    pub fn status(&self) -> AutosaveStatus {
        *self.status_rx.borrow()
    }

    /// Receiver that observes every status change.
    pub fn subscribe(&self) -> watch::Receiver<AutosaveStatus> {
        self.status_rx.clone()
    }

    /// Save the latest snapshot now, without waiting for the next tick.
    pub async fn save_now(&self) -> Result<(), AppError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.command_tx
            .send(AutosaveCommand::SaveNow(reply_tx))
            .await
            .map_err(|_| AppError::internal("Autosave not running"))?;

        reply_rx
            .await
            .map_err(|_| AppError::internal("Autosave stopped before saving"))?
    }

    /// Stop the loop and wait for it to finish.
    pub async fn stop(mut self) -> Result<(), AppError> {
        // The loop may already be gone; joining below still applies
        let _ = self.command_tx.send(AutosaveCommand::Stop).await;

        if let Some(task) = self.task.take() {
            task.await
                .map_err(|e| AppError::internal(format!("Autosave task failed: {}", e)))?;
        }
        Ok(())
    }
}

impl Drop for AutosaveHandle {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

/// Write the latest snapshot with a fresh modification time.
async fn persist(
    store: &dyn RfcStore,
    snapshots: &watch::Receiver<RfcAggregate>,
    status: &watch::Sender<AutosaveStatus>,
) -> Result<(), AppError> {
    let mut rfc = snapshots.borrow().clone();
    rfc.updated_at = Utc::now();

    status.send_replace(AutosaveStatus::Saving);
    match save_with_summary(store, &rfc).await {
        Ok(()) => {
            log::debug!("[autosave] Saved RFC {}", rfc.id);
            status.send_replace(AutosaveStatus::Saved);
            Ok(())
        }
        Err(e) => {
            log::warn!("[autosave] Failed to save RFC {}: {}", rfc.id, e);
            status.send_replace(AutosaveStatus::Error);
            Err(e)
        }
    }
}
