use actix_web::{get, web, HttpResponse};
use log::info;
use shared::datasource::{record_id, Connector};
use shared::ActivePlayersResponse;

use crate::datasource::{Gateway, SurrealConnector};
use crate::error::ApiError;
use crate::statistics::usecase::StatisticsUseCase;

fn player_id<C: Connector>(gateway: &Gateway<C>, param: &str) -> String {
    record_id(&gateway.collections().players, param)
}

pub async fn dashboard_handler_impl<C: Connector + 'static>(
    gateway: web::Data<Gateway<C>>,
) -> HttpResponse {
    let usecase = StatisticsUseCase::new(gateway.get_ref());
    HttpResponse::Ok().json(usecase.dashboard_snapshot_or_default().await)
}

/// Dashboard snapshot; answers with zeroed numbers and a warning when the
/// data source fails
#[utoipa::path(
    get,
    path = "/api/statistics",
    tag = "statistics",
    responses((status = 200, description = "Aggregate snapshot, possibly degraded"))
)]
#[get("")]
pub async fn dashboard_handler(gateway: web::Data<Gateway<SurrealConnector>>) -> HttpResponse {
    dashboard_handler_impl(gateway).await
}

pub async fn active_players_handler_impl<C: Connector + 'static>(
    gateway: web::Data<Gateway<C>>,
) -> Result<HttpResponse, ApiError> {
    let usecase = StatisticsUseCase::new(gateway.get_ref());
    let active_players = usecase.active_player_count().await?;
    Ok(HttpResponse::Ok().json(ActivePlayersResponse { active_players }))
}

#[utoipa::path(
    get,
    path = "/api/statistics/active-players",
    tag = "statistics",
    responses(
        (status = 200, description = "Players with a match this ISO week"),
        (status = 503, description = "Data source unavailable")
    )
)]
#[get("/active-players")]
pub async fn active_players_handler(
    gateway: web::Data<Gateway<SurrealConnector>>,
) -> Result<HttpResponse, ApiError> {
    active_players_handler_impl(gateway).await
}

pub async fn leaderboard_handler_impl<C: Connector + 'static>(
    gateway: web::Data<Gateway<C>>,
) -> Result<HttpResponse, ApiError> {
    let usecase = StatisticsUseCase::new(gateway.get_ref());
    Ok(HttpResponse::Ok().json(usecase.leaderboard().await?))
}

#[utoipa::path(
    get,
    path = "/api/statistics/leaderboard",
    tag = "statistics",
    responses(
        (status = 200, description = "Players ranked by score"),
        (status = 503, description = "Data source unavailable")
    )
)]
#[get("/leaderboard")]
pub async fn leaderboard_handler(
    gateway: web::Data<Gateway<SurrealConnector>>,
) -> Result<HttpResponse, ApiError> {
    leaderboard_handler_impl(gateway).await
}

pub async fn database_stats_handler_impl<C: Connector + 'static>(
    gateway: web::Data<Gateway<C>>,
) -> HttpResponse {
    let usecase = StatisticsUseCase::new(gateway.get_ref());
    HttpResponse::Ok().json(usecase.database_stats_or_default().await)
}

#[utoipa::path(
    get,
    path = "/api/statistics/database",
    tag = "statistics",
    responses((status = 200, description = "Database overview, possibly degraded"))
)]
#[get("/database")]
pub async fn database_stats_handler(gateway: web::Data<Gateway<SurrealConnector>>) -> HttpResponse {
    database_stats_handler_impl(gateway).await
}

pub async fn player_stats_handler_impl<C: Connector + 'static>(
    path: web::Path<String>,
    gateway: web::Data<Gateway<C>>,
) -> Result<HttpResponse, ApiError> {
    let id = player_id(gateway.get_ref(), &path.into_inner());
    let usecase = StatisticsUseCase::new(gateway.get_ref());
    let stats = usecase.player_stats(&id).await?;
    info!("Stats for {}: {} games, {} wins", id, stats.games, stats.wins);
    Ok(HttpResponse::Ok().json(stats))
}

#[utoipa::path(
    get,
    path = "/api/statistics/players/{id}",
    tag = "statistics",
    params(("id" = String, Path, description = "Player key or full record id")),
    responses(
        (status = 200, description = "Games, wins, losses and activity"),
        (status = 404, description = "Player not found")
    )
)]
#[get("/players/{id}")]
pub async fn player_stats_handler(
    path: web::Path<String>,
    gateway: web::Data<Gateway<SurrealConnector>>,
) -> Result<HttpResponse, ApiError> {
    player_stats_handler_impl(path, gateway).await
}

pub async fn player_history_handler_impl<C: Connector + 'static>(
    path: web::Path<String>,
    gateway: web::Data<Gateway<C>>,
) -> Result<HttpResponse, ApiError> {
    let id = player_id(gateway.get_ref(), &path.into_inner());
    let usecase = StatisticsUseCase::new(gateway.get_ref());
    Ok(HttpResponse::Ok().json(usecase.player_performance_history(&id).await?))
}

#[utoipa::path(
    get,
    path = "/api/statistics/players/{id}/history",
    tag = "statistics",
    params(("id" = String, Path, description = "Player key or full record id")),
    responses(
        (status = 200, description = "Six-month performance chart"),
        (status = 404, description = "Player not found")
    )
)]
#[get("/players/{id}/history")]
pub async fn player_history_handler(
    path: web::Path<String>,
    gateway: web::Data<Gateway<SurrealConnector>>,
) -> Result<HttpResponse, ApiError> {
    player_history_handler_impl(path, gateway).await
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/statistics")
            .service(dashboard_handler)
            .service(active_players_handler)
            .service(leaderboard_handler)
            .service(database_stats_handler)
            .service(player_stats_handler)
            .service(player_history_handler),
    );
}
