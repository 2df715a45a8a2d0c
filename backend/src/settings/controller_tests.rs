#[cfg(test)]
mod settings_controller_tests {
    use crate::datasource::Gateway;
    use crate::settings::controller::*;
    use crate::settings::SettingsStore;
    use crate::test_helpers::memory_settings;
    use actix_web::{http::StatusCode, test, web, App};
    use serde_json::{json, Value};
    use shared::datasource::CollectionNames;
    use testing::{InMemoryConnector, InMemoryStore};

    fn secured_gateway(store: &InMemoryStore) -> web::Data<Gateway<InMemoryConnector>> {
        let connector = InMemoryConnector::new(store.clone()).with_credentials("root", "root");
        web::Data::new(Gateway::new(
            connector,
            SettingsStore::new(memory_settings()),
            CollectionNames::default(),
        ))
    }

    macro_rules! settings_app {
        ($gateway:expr) => {
            test::init_service(
                App::new()
                    .app_data($gateway)
                    .route(
                        "/api/settings/connection",
                        web::get().to(get_settings_handler_impl::<InMemoryConnector>),
                    )
                    .route(
                        "/api/settings/connection",
                        web::put().to(replace_settings_handler_impl::<InMemoryConnector>),
                    )
                    .route(
                        "/api/settings/connection/test",
                        web::post().to(test_connection_handler_impl::<InMemoryConnector>),
                    ),
            )
            .await
        };
    }

    macro_rules! send {
        ($app:expr, $req:expr) => {{
            let resp = test::call_service(&$app, $req.to_request()).await;
            let status = resp.status();
            let body = test::read_body(resp).await;
            (status, serde_json::from_slice::<Value>(&body).unwrap_or(Value::Null))
        }};
    }

    #[actix_web::test]
    async fn test_get_masks_password() {
        let store = InMemoryStore::new();
        let app = settings_app!(secured_gateway(&store));

        let (status, json) = send!(app, test::TestRequest::get().uri("/api/settings/connection"));
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["url"], "memory://local");
        assert_eq!(json["username"], "root");
        assert_eq!(json["password"], "********");
    }

    #[actix_web::test]
    async fn test_replace_rejects_empty_fields() {
        let store = InMemoryStore::new();
        let gateway = secured_gateway(&store);
        let app = settings_app!(gateway.clone());

        let (status, json) = send!(
            app,
            test::TestRequest::put().uri("/api/settings/connection").set_json(json!({
                "url": "http://db.internal:8000",
                "namespace": "",
                "database": "prod",
                "username": "root",
                "password": "root"
            }))
        );
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"], "VALIDATION_ERROR");
        assert_eq!(gateway.settings().current().await, memory_settings());
    }

    #[actix_web::test]
    async fn test_replace_keeps_password_when_echoed_masked() {
        let store = InMemoryStore::new();
        let gateway = secured_gateway(&store);
        let app = settings_app!(gateway.clone());

        let (status, json) = send!(
            app,
            test::TestRequest::put().uri("/api/settings/connection").set_json(json!({
                "url": "memory://replica",
                "namespace": "cards",
                "database": "archive",
                "username": "root",
                "password": "********"
            }))
        );
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["database"], "archive");
        assert_eq!(json["password"], "********");

        let stored = gateway.settings().current().await;
        assert_eq!(stored.url, "memory://replica");
        assert_eq!(stored.password, "root");
    }

    #[actix_web::test]
    async fn test_connection_test_reports_version() {
        let store = InMemoryStore::new();
        store.set_version("surrealdb-1.4.2").await;
        let app = settings_app!(secured_gateway(&store));

        let (status, json) = send!(
            app,
            test::TestRequest::post()
                .uri("/api/settings/connection/test")
                .set_json(memory_settings())
        );
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["success"], true);
        assert_eq!(json["version"], "surrealdb-1.4.2");
    }

    #[actix_web::test]
    async fn test_connection_test_failures_are_200() {
        let store = InMemoryStore::new();
        let gateway = secured_gateway(&store);
        let app = settings_app!(gateway.clone());

        let mut wrong = memory_settings();
        wrong.password = "nope".to_string();
        let (status, json) = send!(
            app,
            test::TestRequest::post().uri("/api/settings/connection/test").set_json(&wrong)
        );
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["success"], false);
        assert!(json["message"].as_str().unwrap_or_default().contains("invalid credentials"));
        assert!(json.get("version").is_none());

        let mut invalid = memory_settings();
        invalid.url = "not a url".to_string();
        let (_, json) = send!(
            app,
            test::TestRequest::post().uri("/api/settings/connection/test").set_json(&invalid)
        );
        assert_eq!(json["success"], false);
        assert!(json["message"]
            .as_str()
            .unwrap_or_default()
            .starts_with("Invalid connection settings"));

        // testing never touches the stored settings
        assert_eq!(gateway.settings().current().await, memory_settings());
    }
}
