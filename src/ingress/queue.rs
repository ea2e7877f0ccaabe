use crate::forms::InboundMessage;
use crate::services::InboundPipeline;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{mpsc, oneshot, Semaphore};
use tokio::task::JoinHandle;

/// Producer side, cloned into every HTTP worker.
#[derive(Clone)]
pub struct IngressQueue {
    tx: mpsc::Sender<InboundMessage>,
}

impl IngressQueue {
    /// Never waits. A full queue hands the message to a task that waits for room.
    pub fn enqueue(&self, message: InboundMessage) -> bool {
        match self.tx.try_send(message) {
            Ok(()) => true,
            Err(TrySendError::Full(message)) => {
                tracing::warn!("Ingress queue full, deferring message");
                let tx = self.tx.clone();
                tokio::spawn(async move {
                    if tx.send(message).await.is_err() {
                        tracing::error!("Ingress queue closed before deferred message was queued");
                    }
                });
                true
            }
            Err(TrySendError::Closed(message)) => {
                tracing::error!(
                    wa_message_id = %message.wa_message_id,
                    "Ingress queue closed, message dropped"
                );
                false
            }
        }
    }
}

/// Consumer side. Owns the dispatcher task.
pub struct IngressWorker {
    shutdown_tx: Option<oneshot::Sender<()>>,
    handle: JoinHandle<()>,
}

impl IngressWorker {
    /// Stops intake, drains buffered messages and waits for in-flight ones, at most `grace`.
    pub async fn shutdown(mut self, grace: Duration) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        match tokio::time::timeout(grace, &mut self.handle).await {
            Ok(Ok(())) => tracing::info!("Ingress queue drained"),
            Ok(Err(err)) => tracing::error!("Ingress dispatcher failed: {}", err),
            Err(_) => {
                tracing::warn!("Ingress drain exceeded {:?}, abandoning remaining work", grace);
                self.handle.abort();
            }
        }
    }
}

pub fn start(
    pipeline: InboundPipeline,
    capacity: usize,
    workers: usize,
) -> (IngressQueue, IngressWorker) {
    let (tx, rx) = mpsc::channel(capacity.max(1));
    let (shutdown_tx, shutdown_rx) = oneshot::channel();
    let handle = tokio::spawn(dispatch(pipeline, rx, shutdown_rx, workers.max(1)));

    (
        IngressQueue { tx },
        IngressWorker {
            shutdown_tx: Some(shutdown_tx),
            handle,
        },
    )
}

async fn dispatch(
    pipeline: InboundPipeline,
    mut rx: mpsc::Receiver<InboundMessage>,
    mut shutdown_rx: oneshot::Receiver<()>,
    workers: usize,
) {
    let slots = Arc::new(Semaphore::new(workers));
    let mut closing = false;

    loop {
        let message = if closing {
            rx.recv().await
        } else {
            tokio::select! {
                message = rx.recv() => message,
                _ = &mut shutdown_rx => {
                    tracing::info!("Ingress shutting down, draining queue");
                    rx.close();
                    closing = true;
                    continue;
                }
            }
        };
        let Some(message) = message else { break };

        let Ok(permit) = slots.clone().acquire_owned().await else {
            break;
        };
        let pipeline = pipeline.clone();
        // a panicking job only loses its own message; the permit is released on unwind
        tokio::spawn(async move {
            let _permit = permit;
            pipeline.process(message).await;
        });
    }

    let _ = slots.acquire_many(workers as u32).await;
}
