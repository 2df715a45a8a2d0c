use actix_web::{get, HttpResponse};
use utoipa::OpenApi;
use crate::error::ApiError;

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::health::health_check,
        crate::health::detailed_health_check,
        crate::statistics::controller::dashboard_handler,
        crate::statistics::controller::active_players_handler,
        crate::statistics::controller::leaderboard_handler,
        crate::statistics::controller::database_stats_handler,
        crate::statistics::controller::player_stats_handler,
        crate::statistics::controller::player_history_handler,
        crate::players::controller::list_players_handler,
        crate::players::controller::create_player_handler,
        crate::players::controller::get_player_handler,
        crate::players::controller::update_player_handler,
        crate::players::controller::delete_player_handler,
        crate::players::controller::update_stats_handler,
        crate::players::controller::add_achievement_handler,
        crate::players::controller::player_matches_handler,
        crate::users::controller::list_users_handler,
        crate::users::controller::create_user_handler,
        crate::users::controller::update_user_handler,
        crate::users::controller::delete_user_handler,
        crate::tables::controller::list_tables_handler,
        crate::tables::controller::list_records_handler,
        crate::tables::controller::create_record_handler,
        crate::tables::controller::replace_record_handler,
        crate::tables::controller::delete_record_handler,
        crate::query::controller::execute_query_handler,
        crate::query::controller::query_history_handler,
        crate::query::controller::clear_history_handler,
        crate::settings::controller::get_settings_handler,
        crate::settings::controller::replace_settings_handler,
        crate::settings::controller::test_connection_handler,
    ),
    components(schemas(
        crate::health::HealthResponse,
        ApiError,
    )),
    tags(
        (name = "health", description = "Liveness and data source reachability"),
        (name = "statistics", description = "Dashboard aggregates, leaderboard and per-player statistics"),
        (name = "players", description = "Player management"),
        (name = "users", description = "Dashboard user management"),
        (name = "tables", description = "Generic table browser"),
        (name = "query", description = "Raw query console and recent queries"),
        (name = "settings", description = "Database connection settings"),
    ),
    info(
        title = "Card Game Admin API",
        description = "Admin backend for a card-game service backed by SurrealDB.\n\nStatistics are recomputed on every request. Dashboard endpoints never fail: when the database cannot answer they return zeroed numbers and a `warning` field.",
        version = "0.3.0",
        license(
            name = "MIT",
            url = "https://opensource.org/licenses/MIT"
        )
    ),
    servers(
        (url = "http://localhost:50002", description = "Development server"),
    )
)]
pub struct ApiDoc;

#[get("/api-docs/openapi.json")]
pub async fn openapi_json() -> HttpResponse {
    HttpResponse::Ok().json(ApiDoc::openapi())
}
