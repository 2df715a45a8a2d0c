#[cfg(test)]
mod query_controller_tests {
    use crate::query::controller::*;
    use crate::query::history::QueryHistory;
    use crate::test_helpers::gateway_data;
    use actix_web::{http::StatusCode, test, web, App};
    use serde_json::{json, Value};
    use testing::{InMemoryConnector, InMemoryStore};

    macro_rules! query_app {
        ($store:expr, $history:expr) => {
            test::init_service(
                App::new()
                    .app_data(gateway_data($store))
                    .app_data($history.clone())
                    .route("/api/query", web::post().to(execute_query_handler_impl::<InMemoryConnector>))
                    .service(web::scope("/api/query").service(query_history_handler).service(clear_history_handler)),
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
    async fn test_execute_then_read_history() {
        let store = InMemoryStore::new();
        store.script("INFO FOR DB", json!({ "tables": { "deck": "DEFINE TABLE deck" } })).await;
        let history = web::Data::new(QueryHistory::new());
        let app = query_app!(&store, history);

        let (status, json) = send!(
            app,
            test::TestRequest::post().uri("/api/query").set_json(json!({ "query": "INFO FOR DB" }))
        );
        assert_eq!(status, StatusCode::OK);
        assert!(json["result"]["tables"]["deck"].is_string());
        assert!(json["elapsed_ms"].is_u64());

        let (status, json) = send!(app, test::TestRequest::get().uri("/api/query/history"));
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json[0]["query"], "INFO FOR DB");
        assert!(json[0]["timestamp"].as_i64().unwrap_or_default() > 0);

        let (status, _) = send!(app, test::TestRequest::delete().uri("/api/query/history"));
        assert_eq!(status, StatusCode::OK);
        assert!(history.recent().await.is_empty());
    }

    #[actix_web::test]
    async fn test_rejected_statement_is_400() {
        let store = InMemoryStore::new();
        let history = web::Data::new(QueryHistory::new());
        let app = query_app!(&store, history);

        let (status, json) = send!(
            app,
            test::TestRequest::post().uri("/api/query").set_json(json!({ "query": "SELEC oops" }))
        );
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"], "QUERY_ERROR");
        assert!(history.recent().await.is_empty());
    }

    #[actix_web::test]
    async fn test_unreachable_database_is_503() {
        let store = InMemoryStore::new();
        store.refuse_connections(true).await;
        let history = web::Data::new(QueryHistory::new());
        let app = query_app!(&store, history);

        let (status, json) = send!(
            app,
            test::TestRequest::post().uri("/api/query").set_json(json!({ "query": "SELECT * FROM deck" }))
        );
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(json["error"], "DATA_SOURCE_UNAVAILABLE");
    }
}
