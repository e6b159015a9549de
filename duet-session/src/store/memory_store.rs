use async_trait::async_trait;
use dashmap::DashMap;
use duet_core::{
    CollectionListener, CollectionPath, CollectionSnapshot, Document, DocumentListener,
    DocumentPath, DocumentSnapshot, DocumentStore, StoreError, SubscriptionHandle,
};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

enum Watch {
    Document(DocumentPath),
    Collection(CollectionPath),
}

impl Watch {
    fn covers(&self, path: &DocumentPath) -> bool {
        match self {
            Watch::Document(watched) => watched == path,
            Watch::Collection(collection) => collection.contains(path),
        }
    }
}

enum Delivery {
    Changed,
    Failed(StoreError),
}

struct Subscription {
    watch: Watch,
    tx: mpsc::UnboundedSender<Delivery>,
    task: JoinHandle<()>,
}

struct StoreInner {
    documents: DashMap<DocumentPath, Document>,
    subscriptions: DashMap<u64, Subscription>,
    next_id: AtomicU64,
    online: AtomicBool,
}

impl StoreInner {
    fn document_snapshot(&self, path: &DocumentPath) -> DocumentSnapshot {
        DocumentSnapshot {
            path: path.clone(),
            data: self.documents.get(path).map(|doc| doc.value().clone()),
        }
    }

    fn collection_snapshot(&self, path: &CollectionPath) -> CollectionSnapshot {
        let documents = self
            .documents
            .iter()
            .filter(|entry| path.contains(entry.key()))
            .map(|entry| (entry.key().clone(), entry.value().clone()))
            .collect();

        CollectionSnapshot {
            path: path.clone(),
            documents,
        }
    }
}

/// In-process [`DocumentStore`].
///
/// Each subscription gets its own delivery task, so listeners run
/// concurrently with writers while snapshots of one subscription stay
/// ordered. A snapshot is read when it is delivered, so bursts of writes
/// may be coalesced. Cloning shares the same documents.
#[derive(Clone)]
pub struct MemoryStore {
    inner: Arc<StoreInner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(StoreInner {
                documents: DashMap::new(),
                subscriptions: DashMap::new(),
                next_id: AtomicU64::new(1),
                online: AtomicBool::new(true),
            }),
        }
    }

    /// Simulates losing or regaining the network path. Going offline fails
    /// reads and writes and reports the error to every listener; coming back
    /// redelivers current snapshots.
    pub fn set_online(&self, online: bool) {
        let was_online = self.inner.online.swap(online, Ordering::SeqCst);
        if was_online == online {
            return;
        }

        debug!("MemoryStore going {}", if online { "online" } else { "offline" });
        for entry in self.inner.subscriptions.iter() {
            let delivery = if online {
                Delivery::Changed
            } else {
                Delivery::Failed(StoreError::Unavailable)
            };
            let _ = entry.tx.send(delivery);
        }
    }

    pub fn is_online(&self) -> bool {
        self.inner.online.load(Ordering::SeqCst)
    }

    /// Redelivers the current snapshot of `path` to everyone watching it,
    /// as a real store may do after a reconnect.
    pub fn replay(&self, path: &DocumentPath) {
        self.notify(path);
    }

    pub fn document(&self, path: &DocumentPath) -> Option<Document> {
        self.inner.documents.get(path).map(|doc| doc.value().clone())
    }

    pub fn collection(&self, path: &CollectionPath) -> Vec<(DocumentPath, Document)> {
        self.inner.collection_snapshot(path).documents
    }

    pub fn subscription_count(&self) -> usize {
        self.inner.subscriptions.len()
    }

    fn notify(&self, path: &DocumentPath) {
        for entry in self.inner.subscriptions.iter() {
            if entry.watch.covers(path) {
                let _ = entry.tx.send(Delivery::Changed);
            }
        }
    }

    fn register<S, R>(
        &self,
        watch: Watch,
        read: R,
        listener: Arc<dyn Fn(Result<S, StoreError>) + Send + Sync>,
    ) -> SubscriptionHandle
    where
        S: Send + 'static,
        R: Fn(&StoreInner) -> S + Send + 'static,
    {
        let id = self.inner.next_id.fetch_add(1, Ordering::SeqCst);
        let (tx, mut rx) = mpsc::unbounded_channel();
        let weak: Weak<StoreInner> = Arc::downgrade(&self.inner);

        let task = tokio::spawn(async move {
            while let Some(delivery) = rx.recv().await {
                let snapshot = match delivery {
                    Delivery::Changed => {
                        let Some(inner) = weak.upgrade() else {
                            break;
                        };
                        Ok(read(inner.as_ref()))
                    }
                    Delivery::Failed(e) => Err(e),
                };
                listener(snapshot);
            }
        });

        let initial = if self.is_online() {
            Delivery::Changed
        } else {
            Delivery::Failed(StoreError::Unavailable)
        };
        let _ = tx.send(initial);

        self.inner
            .subscriptions
            .insert(id, Subscription { watch, tx, task });
        SubscriptionHandle::new(id)
    }

    fn ensure_online(&self) -> Result<(), StoreError> {
        if self.is_online() {
            Ok(())
        } else {
            Err(StoreError::Unavailable)
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn enable_network(&self) -> Result<(), StoreError> {
        self.ensure_online()
    }

    async fn get(&self, path: &DocumentPath) -> Result<Option<Document>, StoreError> {
        self.ensure_online()?;
        Ok(self.document(path))
    }

    async fn set(&self, path: &DocumentPath, document: Document) -> Result<(), StoreError> {
        self.ensure_online()?;
        if path.parent().is_none() {
            return Err(StoreError::InvalidPath(path.to_string()));
        }

        self.inner.documents.insert(path.clone(), document);
        self.notify(path);
        Ok(())
    }

    fn subscribe(&self, path: &DocumentPath, listener: DocumentListener) -> SubscriptionHandle {
        let watched = path.clone();
        self.register(
            Watch::Document(path.clone()),
            move |inner: &StoreInner| inner.document_snapshot(&watched),
            listener,
        )
    }

    fn subscribe_collection(
        &self,
        path: &CollectionPath,
        listener: CollectionListener,
    ) -> SubscriptionHandle {
        let watched = path.clone();
        self.register(
            Watch::Collection(path.clone()),
            move |inner: &StoreInner| inner.collection_snapshot(&watched),
            listener,
        )
    }

    fn unsubscribe(&self, handle: SubscriptionHandle) {
        match self.inner.subscriptions.remove(&handle.id()) {
            Some((_, subscription)) => subscription.task.abort(),
            None => warn!("Unsubscribe of unknown subscription {}", handle.id()),
        }
    }
}
