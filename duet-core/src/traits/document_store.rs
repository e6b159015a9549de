use crate::error::StoreError;
use crate::model::{CollectionPath, Document, DocumentPath};
use async_trait::async_trait;
use std::sync::Arc;

/// Point-in-time read of one document. `data` is `None` when it does not exist.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentSnapshot {
    pub path: DocumentPath,
    pub data: Option<Document>,
}

impl DocumentSnapshot {
    pub fn exists(&self) -> bool {
        self.data.is_some()
    }
}

/// Point-in-time read of a collection. Enumeration order is unspecified.
#[derive(Debug, Clone, PartialEq)]
pub struct CollectionSnapshot {
    pub path: CollectionPath,
    pub documents: Vec<(DocumentPath, Document)>,
}

impl CollectionSnapshot {
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

pub type DocumentListener = Arc<dyn Fn(Result<DocumentSnapshot, StoreError>) + Send + Sync>;
pub type CollectionListener = Arc<dyn Fn(Result<CollectionSnapshot, StoreError>) + Send + Sync>;

#[derive(Debug, PartialEq, Eq, Hash)]
pub struct SubscriptionHandle(u64);

impl SubscriptionHandle {
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn id(&self) -> u64 {
        self.0
    }
}

/// Remote document store shared by both participants.
///
/// Listeners are invoked on the store's own delivery context, concurrently
/// with the caller, every time the watched data changes. Snapshots of one
/// document are delivered in order; nothing else is guaranteed, and the same
/// snapshot may be delivered more than once.
#[async_trait]
pub trait DocumentStore: Send + Sync + 'static {
    async fn enable_network(&self) -> Result<(), StoreError>;

    async fn get(&self, path: &DocumentPath) -> Result<Option<Document>, StoreError>;

    async fn set(&self, path: &DocumentPath, document: Document) -> Result<(), StoreError>;

    /// Subscription errors are delivered to the listener; the store keeps
    /// retrying on its own.
    fn subscribe(&self, path: &DocumentPath, listener: DocumentListener) -> SubscriptionHandle;

    fn subscribe_collection(
        &self,
        path: &CollectionPath,
        listener: CollectionListener,
    ) -> SubscriptionHandle;

    fn unsubscribe(&self, handle: SubscriptionHandle);
}
