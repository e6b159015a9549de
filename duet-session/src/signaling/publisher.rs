use duet_core::{Document, DocumentPath, DocumentStore, StoreError};
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, error};

/// Completion signal of one publish. Dropping it does not cancel the write.
pub struct PublishReceipt {
    rx: oneshot::Receiver<Result<(), StoreError>>,
}

impl PublishReceipt {
    pub async fn wait(self) -> Result<(), StoreError> {
        self.rx
            .await
            .unwrap_or_else(|_| Err(StoreError::Other("publisher stopped".to_owned())))
    }
}

struct PublishRequest {
    path: DocumentPath,
    document: Document,
    what: String,
    done: oneshot::Sender<Result<(), StoreError>>,
}

/// Writes documents one at a time in submission order, off the caller's
/// task. Outstanding writes are still flushed after the owner drops it.
pub(crate) struct Publisher {
    tx: mpsc::UnboundedSender<PublishRequest>,
}

impl Publisher {
    pub(crate) fn spawn(store: Arc<dyn DocumentStore>) -> Self {
        let (tx, mut rx) = mpsc::unbounded_channel::<PublishRequest>();

        tokio::spawn(async move {
            while let Some(request) = rx.recv().await {
                let result = store.set(&request.path, request.document).await;
                match &result {
                    Ok(()) => debug!("Published {} to {}", request.what, request.path),
                    Err(e) => error!("Failed to publish {} to {}: {}", request.what, request.path, e),
                }
                let _ = request.done.send(result);
            }
        });

        Self { tx }
    }

    pub(crate) fn publish(
        &self,
        path: DocumentPath,
        document: Document,
        what: impl Into<String>,
    ) -> PublishReceipt {
        let (done, rx) = oneshot::channel();
        let request = PublishRequest {
            path,
            document,
            what: what.into(),
            done,
        };

        if let Err(e) = self.tx.send(request) {
            error!("Publisher stopped, dropping write to {}", e.0.path);
        }
        PublishReceipt { rx }
    }
}
