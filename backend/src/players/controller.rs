use actix_web::{delete, get, post, put, web, HttpResponse};
use shared::datasource::{record_id, Connector};
use shared::{AddAchievementRequest, CreatePlayerRequest, PageQuery, UpdatePlayerRequest, UpdatePlayerStatsRequest};

use crate::datasource::{Gateway, SurrealConnector};
use crate::error::ApiError;
use crate::players::usecase::PlayersUseCase;

fn player_id<C: Connector>(gateway: &Gateway<C>, param: &str) -> String {
    record_id(&gateway.collections().players, param)
}

pub async fn list_players_handler_impl<C: Connector + 'static>(
    query: web::Query<PageQuery>,
    gateway: web::Data<Gateway<C>>,
) -> Result<HttpResponse, ApiError> {
    let usecase = PlayersUseCase::new(gateway.get_ref());
    Ok(HttpResponse::Ok().json(usecase.list_or_empty(query.into_inner()).await?))
}

/// Paged player list ordered by name; an unreachable database yields an empty page
#[utoipa::path(
    get,
    path = "/api/players",
    tag = "players",
    params(
        ("page" = Option<u32>, Query, description = "1-based page number"),
        ("limit" = Option<u32>, Query, description = "Page size, 1 to 100")
    ),
    responses(
        (status = 200, description = "One page of players with the total count"),
        (status = 400, description = "Invalid pagination parameters")
    )
)]
#[get("")]
pub async fn list_players_handler(
    query: web::Query<PageQuery>,
    gateway: web::Data<Gateway<SurrealConnector>>,
) -> Result<HttpResponse, ApiError> {
    list_players_handler_impl(query, gateway).await
}

pub async fn create_player_handler_impl<C: Connector + 'static>(
    request: web::Json<CreatePlayerRequest>,
    gateway: web::Data<Gateway<C>>,
) -> Result<HttpResponse, ApiError> {
    let usecase = PlayersUseCase::new(gateway.get_ref());
    let player = usecase.create(request.into_inner()).await?;
    Ok(HttpResponse::Created().json(player))
}

#[utoipa::path(
    post,
    path = "/api/players",
    tag = "players",
    responses(
        (status = 201, description = "Player created"),
        (status = 400, description = "Validation failed")
    )
)]
#[post("")]
pub async fn create_player_handler(
    request: web::Json<CreatePlayerRequest>,
    gateway: web::Data<Gateway<SurrealConnector>>,
) -> Result<HttpResponse, ApiError> {
    create_player_handler_impl(request, gateway).await
}

pub async fn get_player_handler_impl<C: Connector + 'static>(
    path: web::Path<String>,
    gateway: web::Data<Gateway<C>>,
) -> Result<HttpResponse, ApiError> {
    let id = player_id(gateway.get_ref(), &path.into_inner());
    let usecase = PlayersUseCase::new(gateway.get_ref());
    Ok(HttpResponse::Ok().json(usecase.get(&id).await?))
}

#[utoipa::path(
    get,
    path = "/api/players/{id}",
    tag = "players",
    params(("id" = String, Path, description = "Player key or full record id")),
    responses(
        (status = 200, description = "The player"),
        (status = 404, description = "Player not found")
    )
)]
#[get("/{id}")]
pub async fn get_player_handler(
    path: web::Path<String>,
    gateway: web::Data<Gateway<SurrealConnector>>,
) -> Result<HttpResponse, ApiError> {
    get_player_handler_impl(path, gateway).await
}

pub async fn update_player_handler_impl<C: Connector + 'static>(
    path: web::Path<String>,
    request: web::Json<UpdatePlayerRequest>,
    gateway: web::Data<Gateway<C>>,
) -> Result<HttpResponse, ApiError> {
    let id = player_id(gateway.get_ref(), &path.into_inner());
    let usecase = PlayersUseCase::new(gateway.get_ref());
    Ok(HttpResponse::Ok().json(usecase.update(&id, request.into_inner()).await?))
}

#[utoipa::path(
    put,
    path = "/api/players/{id}",
    tag = "players",
    params(("id" = String, Path, description = "Player key or full record id")),
    responses(
        (status = 200, description = "Updated player"),
        (status = 400, description = "Validation failed"),
        (status = 404, description = "Player not found")
    )
)]
#[put("/{id}")]
pub async fn update_player_handler(
    path: web::Path<String>,
    request: web::Json<UpdatePlayerRequest>,
    gateway: web::Data<Gateway<SurrealConnector>>,
) -> Result<HttpResponse, ApiError> {
    update_player_handler_impl(path, request, gateway).await
}

pub async fn delete_player_handler_impl<C: Connector + 'static>(
    path: web::Path<String>,
    gateway: web::Data<Gateway<C>>,
) -> Result<HttpResponse, ApiError> {
    let id = player_id(gateway.get_ref(), &path.into_inner());
    let usecase = PlayersUseCase::new(gateway.get_ref());
    Ok(HttpResponse::Ok().json(usecase.delete(&id).await?))
}

#[utoipa::path(
    delete,
    path = "/api/players/{id}",
    tag = "players",
    params(("id" = String, Path, description = "Player key or full record id")),
    responses(
        (status = 200, description = "Player deleted"),
        (status = 404, description = "Player not found")
    )
)]
#[delete("/{id}")]
pub async fn delete_player_handler(
    path: web::Path<String>,
    gateway: web::Data<Gateway<SurrealConnector>>,
) -> Result<HttpResponse, ApiError> {
    delete_player_handler_impl(path, gateway).await
}

pub async fn update_stats_handler_impl<C: Connector + 'static>(
    path: web::Path<String>,
    request: web::Json<UpdatePlayerStatsRequest>,
    gateway: web::Data<Gateway<C>>,
) -> Result<HttpResponse, ApiError> {
    let id = player_id(gateway.get_ref(), &path.into_inner());
    let usecase = PlayersUseCase::new(gateway.get_ref());
    Ok(HttpResponse::Ok().json(usecase.update_stats(&id, request.into_inner()).await?))
}

#[utoipa::path(
    put,
    path = "/api/players/{id}/stats",
    tag = "players",
    params(("id" = String, Path, description = "Player key or full record id")),
    responses(
        (status = 200, description = "Player with merged stats"),
        (status = 400, description = "No counters given"),
        (status = 404, description = "Player not found")
    )
)]
#[put("/{id}/stats")]
pub async fn update_stats_handler(
    path: web::Path<String>,
    request: web::Json<UpdatePlayerStatsRequest>,
    gateway: web::Data<Gateway<SurrealConnector>>,
) -> Result<HttpResponse, ApiError> {
    update_stats_handler_impl(path, request, gateway).await
}

pub async fn add_achievement_handler_impl<C: Connector + 'static>(
    path: web::Path<String>,
    request: web::Json<AddAchievementRequest>,
    gateway: web::Data<Gateway<C>>,
) -> Result<HttpResponse, ApiError> {
    let id = player_id(gateway.get_ref(), &path.into_inner());
    let usecase = PlayersUseCase::new(gateway.get_ref());
    let player = usecase.add_achievement(&id, request.into_inner()).await?;
    Ok(HttpResponse::Created().json(player))
}

#[utoipa::path(
    post,
    path = "/api/players/{id}/achievements",
    tag = "players",
    params(("id" = String, Path, description = "Player key or full record id")),
    responses(
        (status = 201, description = "Achievement appended"),
        (status = 404, description = "Player not found")
    )
)]
#[post("/{id}/achievements")]
pub async fn add_achievement_handler(
    path: web::Path<String>,
    request: web::Json<AddAchievementRequest>,
    gateway: web::Data<Gateway<SurrealConnector>>,
) -> Result<HttpResponse, ApiError> {
    add_achievement_handler_impl(path, request, gateway).await
}

pub async fn player_matches_handler_impl<C: Connector + 'static>(
    path: web::Path<String>,
    gateway: web::Data<Gateway<C>>,
) -> Result<HttpResponse, ApiError> {
    let id = player_id(gateway.get_ref(), &path.into_inner());
    let usecase = PlayersUseCase::new(gateway.get_ref());
    Ok(HttpResponse::Ok().json(usecase.matches(&id).await?))
}

#[utoipa::path(
    get,
    path = "/api/players/{id}/matches",
    tag = "players",
    params(("id" = String, Path, description = "Player key or full record id")),
    responses(
        (status = 200, description = "Matches newest first, with the player's result"),
        (status = 404, description = "Player not found")
    )
)]
#[get("/{id}/matches")]
pub async fn player_matches_handler(
    path: web::Path<String>,
    gateway: web::Data<Gateway<SurrealConnector>>,
) -> Result<HttpResponse, ApiError> {
    player_matches_handler_impl(path, gateway).await
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/players")
            .service(list_players_handler)
            .service(create_player_handler)
            .service(get_player_handler)
            .service(update_player_handler)
            .service(delete_player_handler)
            .service(update_stats_handler)
            .service(add_achievement_handler)
            .service(player_matches_handler),
    );
}
