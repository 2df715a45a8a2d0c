use shared::datasource::ConnectionSettings;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Connection settings shared by every request; replaceable at runtime
#[derive(Debug, Clone, Default)]
pub struct SettingsStore {
    inner: Arc<RwLock<ConnectionSettings>>,
}

impl SettingsStore {
    pub fn new(initial: ConnectionSettings) -> Self {
        Self { inner: Arc::new(RwLock::new(initial)) }
    }

    pub async fn current(&self) -> ConnectionSettings {
        self.inner.read().await.clone()
    }

    pub async fn replace(&self, settings: ConnectionSettings) {
        *self.inner.write().await = settings;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_clones_share_settings() {
        let store = SettingsStore::default();
        let other = store.clone();
        other
            .replace(ConnectionSettings {
                url: "http://db:8000".to_string(),
                ..Default::default()
            })
            .await;
        assert_eq!(store.current().await.url, "http://db:8000");
    }

    #[test]
    fn test_default_store_is_unconfigured() {
        let store = SettingsStore::default();
        let current = tokio_test::block_on(store.current());
        assert!(!current.is_configured());
    }
}
