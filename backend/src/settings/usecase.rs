use log::{info, warn};
use shared::datasource::{ConnectionSettings, Connector, DataSource};
use shared::{ConnectionTestResponse, Result};
use validator::Validate;

use crate::datasource::Gateway;

pub struct SettingsUseCase<'a, C: Connector> {
    pub gateway: &'a Gateway<C>,
}

impl<'a, C: Connector> SettingsUseCase<'a, C> {
    pub fn new(gateway: &'a Gateway<C>) -> Self {
        Self { gateway }
    }

    /// Current settings with the password masked
    pub async fn get(&self) -> ConnectionSettings {
        self.gateway.settings().current().await.redacted()
    }

    pub async fn replace(&self, settings: ConnectionSettings) -> Result<ConnectionSettings> {
        let current = self.gateway.settings().current().await;
        let settings = settings.with_password_from(&current);
        settings.validate()?;

        info!(
            "Replacing connection settings: {} ns={} db={} user={}",
            settings.url, settings.namespace, settings.database, settings.username
        );
        self.gateway.settings().replace(settings.clone()).await;
        Ok(settings.redacted())
    }

    /// Opens a handle with `settings`, lists tables and reads the version.
    /// Never fails: problems are reported in the response.
    pub async fn test(&self, settings: ConnectionSettings) -> ConnectionTestResponse {
        let current = self.gateway.settings().current().await;
        let settings = settings.with_password_from(&current);
        if let Err(e) = settings.validate() {
            return ConnectionTestResponse::failed(format!("Invalid connection settings: {}", e));
        }

        let outcome = self
            .gateway
            .run_with(&settings, |db| {
                Box::pin(async move {
                    db.tables().await?;
                    db.version().await
                })
            })
            .await;

        match outcome {
            Ok(version) => {
                info!("Connection test to {} succeeded ({})", settings.url, version);
                ConnectionTestResponse::connected(version)
            }
            Err(e) => {
                warn!("Connection test to {} failed: {}", settings.url, e);
                ConnectionTestResponse::failed(e.to_string())
            }
        }
    }
}
