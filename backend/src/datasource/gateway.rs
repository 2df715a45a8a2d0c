use shared::datasource::{with_connection, CollectionNames, Connector, ConnectionSettings, SourceFuture};
use shared::Result;

use crate::settings::SettingsStore;

/// Opens one handle per unit of work from the current connection settings
pub struct Gateway<C: Connector> {
    connector: C,
    settings: SettingsStore,
    collections: CollectionNames,
}

impl<C: Connector> Gateway<C> {
    pub fn new(connector: C, settings: SettingsStore, collections: CollectionNames) -> Self {
        Self { connector, settings, collections }
    }

    pub fn settings(&self) -> &SettingsStore {
        &self.settings
    }

    pub fn collections(&self) -> &CollectionNames {
        &self.collections
    }

    pub async fn run<T, F>(&self, work: F) -> Result<T>
    where
        F: FnOnce(&C::Source) -> SourceFuture<'_, T>,
    {
        let settings = self.settings.current().await;
        with_connection(&self.connector, &settings, work).await
    }

    /// Same as [`Gateway::run`] against explicit settings instead of the stored ones
    pub async fn run_with<T, F>(&self, settings: &ConnectionSettings, work: F) -> Result<T>
    where
        F: FnOnce(&C::Source) -> SourceFuture<'_, T>,
    {
        with_connection(&self.connector, settings, work).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::datasource::DataSource;
    use shared::SharedError;
    use testing::{InMemoryConnector, InMemoryStore};

    fn settings(password: &str) -> ConnectionSettings {
        ConnectionSettings {
            url: "memory://local".to_string(),
            namespace: "cards".to_string(),
            database: "test".to_string(),
            username: "root".to_string(),
            password: password.to_string(),
        }
    }

    #[tokio::test]
    async fn test_run_reads_current_settings() {
        let store = InMemoryStore::new();
        store.insert_rows("RecordedUser", vec![testing::fixtures::player_row("a", "A")]).await;
        let connector = InMemoryConnector::new(store).with_credentials("root", "secret");
        let gateway = Gateway::new(connector.clone(), SettingsStore::new(settings("wrong")), CollectionNames::default());

        let err = gateway
            .run(|db| Box::pin(async move { db.count("RecordedUser").await }))
            .await
            .unwrap_err();
        assert!(matches!(err, SharedError::DataSourceUnavailable(_)));

        gateway.settings().replace(settings("secret")).await;
        let players = gateway
            .run(|db| Box::pin(async move { db.count("RecordedUser").await }))
            .await
            .unwrap();
        assert_eq!(players, 1);
        assert_eq!(connector.open_count(), 1);
        assert_eq!(connector.close_count(), 1);
    }

    #[tokio::test]
    async fn test_run_with_ignores_stored_settings() {
        let connector = InMemoryConnector::new(InMemoryStore::new()).with_credentials("root", "secret");
        let gateway = Gateway::new(connector, SettingsStore::new(settings("wrong")), CollectionNames::default());

        let version = gateway
            .run_with(&settings("secret"), |db| Box::pin(async move { db.version().await }))
            .await
            .unwrap();
        assert_eq!(version, "surrealdb-memory");
    }
}
