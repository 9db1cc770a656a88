//! The queue service actor and its handle.

use thiserror::Error;
use tokio::sync::{broadcast, mpsc, oneshot};

use crate::core::config::QueueConfig;
use crate::core::error::RejectReason;
use crate::core::media::MediaItem;
use crate::sync::{
    AdvanceOutcome, AppliedDelta, DeltaFrame, QueueAuthority, QueueSnapshot, SyncPlan,
};

/// Capacity of the command channel.
const COMMAND_BUFFER: usize = 64;

/// Capacity of the applied-delta broadcast channel. A subscriber lagging
/// past this many deltas sees `RecvError::Lagged` and should reconcile.
const BROADCAST_BUFFER: usize = 128;

/// Errors from the service layer.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The service task has stopped and can no longer process commands.
    #[error("queue service is closed")]
    Closed,

    /// The authority rejected the proposed delta.
    #[error("rejected delta: {0}")]
    Rejected(#[from] RejectReason),
}

enum QueueCommand {
    Propose {
        frame: DeltaFrame,
        reply: oneshot::Sender<Result<AppliedDelta, RejectReason>>,
    },
    Advance {
        reply: oneshot::Sender<AdvanceOutcome>,
    },
    Reconcile {
        client_version: u64,
        reply: oneshot::Sender<SyncPlan>,
    },
    Diff {
        client_version: u64,
        reply: oneshot::Sender<i64>,
    },
    CurrentItem {
        reply: oneshot::Sender<Option<MediaItem>>,
    },
    Snapshot {
        reply: oneshot::Sender<QueueSnapshot>,
    },
}

/// Cloneable async handle to a running [`QueueService`].
#[derive(Debug, Clone)]
pub struct QueueHandle {
    commands: mpsc::Sender<QueueCommand>,
    applied: broadcast::Sender<AppliedDelta>,
}

impl QueueHandle {
    /// Propose a delta frame and wait for the verdict.
    pub async fn propose(&self, frame: DeltaFrame) -> Result<AppliedDelta, ServiceError> {
        let (reply, rx) = oneshot::channel();
        self.send(QueueCommand::Propose { frame, reply }).await?;
        rx.await.map_err(|_| ServiceError::Closed)?.map_err(ServiceError::from)
    }

    /// Proceed to the next item.
    pub async fn advance(&self) -> Result<AdvanceOutcome, ServiceError> {
        let (reply, rx) = oneshot::channel();
        self.send(QueueCommand::Advance { reply }).await?;
        rx.await.map_err(|_| ServiceError::Closed)
    }

    /// Compute a sync plan for an observer at `client_version`.
    pub async fn reconcile(&self, client_version: u64) -> Result<SyncPlan, ServiceError> {
        let (reply, rx) = oneshot::channel();
        self.send(QueueCommand::Reconcile {
            client_version,
            reply,
        })
        .await?;
        rx.await.map_err(|_| ServiceError::Closed)
    }

    /// Advisory version distance for an observer.
    pub async fn diff(&self, client_version: u64) -> Result<i64, ServiceError> {
        let (reply, rx) = oneshot::channel();
        self.send(QueueCommand::Diff {
            client_version,
            reply,
        })
        .await?;
        rx.await.map_err(|_| ServiceError::Closed)
    }

    /// The active item, if any.
    pub async fn current_item(&self) -> Result<Option<MediaItem>, ServiceError> {
        let (reply, rx) = oneshot::channel();
        self.send(QueueCommand::CurrentItem { reply }).await?;
        rx.await.map_err(|_| ServiceError::Closed)
    }

    /// Full copy of the list plus version.
    pub async fn snapshot(&self) -> Result<QueueSnapshot, ServiceError> {
        let (reply, rx) = oneshot::channel();
        self.send(QueueCommand::Snapshot { reply }).await?;
        rx.await.map_err(|_| ServiceError::Closed)
    }

    /// Subscribe to every applied delta, in version order.
    ///
    /// Delivery is best-effort: a receiver that lags past the channel
    /// capacity must reconcile instead of replaying what it missed.
    pub fn subscribe(&self) -> broadcast::Receiver<AppliedDelta> {
        self.applied.subscribe()
    }
}

impl QueueHandle {
    async fn send(&self, command: QueueCommand) -> Result<(), ServiceError> {
        self.commands
            .send(command)
            .await
            .map_err(|_| ServiceError::Closed)
    }
}

/// The single-writer task owning a queue authority.
#[derive(Debug)]
pub struct QueueService {
    authority: QueueAuthority,
    commands: mpsc::Receiver<QueueCommand>,
    applied: broadcast::Sender<AppliedDelta>,
}

impl QueueService {
    /// Spawn the service on the current tokio runtime and return its handle.
    pub fn spawn(config: QueueConfig) -> QueueHandle {
        let (handle, service) = Self::channel(config);
        tokio::spawn(service.run());
        handle
    }

    /// Create a service and its handle without spawning, for callers that
    /// drive the task themselves.
    pub fn channel(config: QueueConfig) -> (QueueHandle, QueueService) {
        let (commands_tx, commands_rx) = mpsc::channel(COMMAND_BUFFER);
        let (applied_tx, _) = broadcast::channel(BROADCAST_BUFFER);

        let handle = QueueHandle {
            commands: commands_tx,
            applied: applied_tx.clone(),
        };
        let service = QueueService {
            authority: QueueAuthority::new(config),
            commands: commands_rx,
            applied: applied_tx,
        };
        (handle, service)
    }

    /// Drive commands until every handle has been dropped.
    pub async fn run(mut self) {
        while let Some(command) = self.commands.recv().await {
            self.handle_command(command);
        }
        log::debug!("queue service stopped");
    }

    fn handle_command(&mut self, command: QueueCommand) {
        match command {
            QueueCommand::Propose { frame, reply } => {
                let result = self.authority.propose(&frame);
                if let Ok(applied) = &result {
                    self.publish(applied.clone());
                }
                let _ = reply.send(result);
            }
            QueueCommand::Advance { reply } => {
                let outcome = self.authority.advance();
                if let AdvanceOutcome::Advanced(applied) = &outcome {
                    self.publish(applied.clone());
                }
                let _ = reply.send(outcome);
            }
            QueueCommand::Reconcile {
                client_version,
                reply,
            } => {
                let _ = reply.send(self.authority.reconcile(client_version));
            }
            QueueCommand::Diff {
                client_version,
                reply,
            } => {
                let _ = reply.send(self.authority.diff(client_version));
            }
            QueueCommand::CurrentItem { reply } => {
                let _ = reply.send(self.authority.current_item().cloned());
            }
            QueueCommand::Snapshot { reply } => {
                let _ = reply.send(self.authority.snapshot());
            }
        }
    }

    // Best-effort fan-out; sending fails only when nobody is subscribed.
    fn publish(&self, applied: AppliedDelta) {
        let _ = self.applied.send(applied);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sync::Delta;

    fn append_frame(url: &str) -> DeltaFrame {
        Delta::Append {
            media: MediaItem::new(url),
        }
        .to_frame()
    }

    #[tokio::test]
    async fn test_propose_through_service() {
        let handle = QueueService::spawn(QueueConfig::default());

        let applied = handle.propose(append_frame("a")).await.unwrap();
        assert_eq!(applied.version, 1);

        let applied = handle.propose(append_frame("b")).await.unwrap();
        assert_eq!(applied.version, 2);

        assert_eq!(handle.current_item().await.unwrap().unwrap().url, "a");
        assert_eq!(handle.diff(0).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_rejection_travels_back() {
        let handle = QueueService::spawn(QueueConfig::default());

        let result = handle.propose(DeltaFrame::new(42)).await;
        assert!(matches!(
            result,
            Err(ServiceError::Rejected(RejectReason::UnknownActionCode(42)))
        ));
    }

    #[tokio::test]
    async fn test_subscribers_see_applied_deltas_in_order() {
        let handle = QueueService::spawn(QueueConfig::default());
        let mut observer = handle.subscribe();

        handle.propose(append_frame("a")).await.unwrap();
        handle.propose(append_frame("b")).await.unwrap();
        handle.advance().await.unwrap();

        let first = observer.recv().await.unwrap();
        assert_eq!(first.version, 1);
        let second = observer.recv().await.unwrap();
        assert_eq!(second.version, 2);
        let third = observer.recv().await.unwrap();
        assert_eq!(third.version, 3);
        assert_eq!(third.delta, Delta::DeleteAt { index: 0 });
    }

    #[tokio::test]
    async fn test_advance_outcomes_through_service() {
        let handle = QueueService::spawn(QueueConfig::default());

        assert_eq!(handle.advance().await.unwrap(), AdvanceOutcome::Empty);

        handle.propose(append_frame("a")).await.unwrap();
        assert_eq!(
            handle.advance().await.unwrap(),
            AdvanceOutcome::StillCurrent(MediaItem::new("a"))
        );
    }

    #[tokio::test]
    async fn test_reconcile_through_service() {
        let handle = QueueService::spawn(QueueConfig::default());
        handle.propose(append_frame("a")).await.unwrap();

        match handle.reconcile(0).await.unwrap() {
            SyncPlan::Replay(deltas) => assert_eq!(deltas.len(), 1),
            SyncPlan::Snapshot(_) => panic!("retained history must replay"),
        }

        let snapshot = handle.snapshot().await.unwrap();
        assert_eq!(snapshot.version, 1);
        assert_eq!(snapshot.items.len(), 1);
    }

    #[tokio::test]
    async fn test_closed_service_reports_closed() {
        let (handle, service) = QueueService::channel(QueueConfig::default());
        drop(service);

        let result = handle.propose(append_frame("a")).await;
        assert!(matches!(result, Err(ServiceError::Closed)));
    }
}
