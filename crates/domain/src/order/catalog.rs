//! Read-only access to the service catalogue.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use common::ServiceId;

/// Looks up display titles of the services customers can order.
#[async_trait]
pub trait ServiceCatalog: Send + Sync {
    /// Returns the title of a service, or None if it is unknown.
    async fn service_title(&self, id: ServiceId) -> Option<String>;
}

/// In-memory service catalogue.
#[derive(Debug, Clone, Default)]
pub struct InMemoryServiceCatalog {
    titles: Arc<RwLock<HashMap<ServiceId, String>>>,
}

impl InMemoryServiceCatalog {
    /// Creates an empty catalogue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or renames a service.
    pub fn insert(&self, id: ServiceId, title: impl Into<String>) {
        self.titles.write().unwrap().insert(id, title.into());
    }

    /// Builder form of [`insert`](Self::insert).
    pub fn with_service(self, id: ServiceId, title: impl Into<String>) -> Self {
        self.insert(id, title);
        self
    }
}

#[async_trait]
impl ServiceCatalog for InMemoryServiceCatalog {
    async fn service_title(&self, id: ServiceId) -> Option<String> {
        self.titles.read().unwrap().get(&id).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_lookup_known_and_unknown() {
        let catalog = InMemoryServiceCatalog::new().with_service(ServiceId::new(3), "Web Design");

        assert_eq!(
            catalog.service_title(ServiceId::new(3)).await.as_deref(),
            Some("Web Design")
        );
        assert_eq!(catalog.service_title(ServiceId::new(4)).await, None);
    }
}
