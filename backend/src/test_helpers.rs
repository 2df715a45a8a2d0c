//! Wiring shared by handler tests

use actix_web::web;
use shared::datasource::{CollectionNames, ConnectionSettings};
use testing::{InMemoryConnector, InMemoryStore};

use crate::datasource::Gateway;
use crate::settings::SettingsStore;

pub fn memory_settings() -> ConnectionSettings {
    ConnectionSettings {
        url: "memory://local".to_string(),
        namespace: "cards".to_string(),
        database: "test".to_string(),
        username: "root".to_string(),
        password: "root".to_string(),
    }
}

pub fn gateway(store: &InMemoryStore) -> Gateway<InMemoryConnector> {
    Gateway::new(
        InMemoryConnector::new(store.clone()),
        SettingsStore::new(memory_settings()),
        CollectionNames::default(),
    )
}

pub fn gateway_data(store: &InMemoryStore) -> web::Data<Gateway<InMemoryConnector>> {
    web::Data::new(gateway(store))
}
