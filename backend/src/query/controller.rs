use actix_web::{delete, get, post, web, HttpResponse};
use shared::datasource::Connector;
use shared::{DeleteResponse, QueryRequest};

use crate::datasource::{Gateway, SurrealConnector};
use crate::error::ApiError;
use crate::query::history::QueryHistory;
use crate::query::usecase::QueryUseCase;

pub async fn execute_query_handler_impl<C: Connector + 'static>(
    request: web::Json<QueryRequest>,
    gateway: web::Data<Gateway<C>>,
    history: web::Data<QueryHistory>,
) -> Result<HttpResponse, ApiError> {
    let usecase = QueryUseCase::new(gateway.get_ref(), history.get_ref());
    Ok(HttpResponse::Ok().json(usecase.execute(request.into_inner()).await?))
}

/// Runs a raw statement against the connected database
#[utoipa::path(
    post,
    path = "/api/query",
    tag = "query",
    responses(
        (status = 200, description = "Statement result and elapsed time"),
        (status = 400, description = "Empty statement or rejected by the database"),
        (status = 503, description = "Data source unavailable")
    )
)]
#[post("")]
pub async fn execute_query_handler(
    request: web::Json<QueryRequest>,
    gateway: web::Data<Gateway<SurrealConnector>>,
    history: web::Data<QueryHistory>,
) -> Result<HttpResponse, ApiError> {
    execute_query_handler_impl(request, gateway, history).await
}

#[utoipa::path(
    get,
    path = "/api/query/history",
    tag = "query",
    responses((status = 200, description = "Up to ten recent queries, most recent first"))
)]
#[get("/history")]
pub async fn query_history_handler(history: web::Data<QueryHistory>) -> HttpResponse {
    HttpResponse::Ok().json(history.recent().await)
}

#[utoipa::path(
    delete,
    path = "/api/query/history",
    tag = "query",
    responses((status = 200, description = "History cleared"))
)]
#[delete("/history")]
pub async fn clear_history_handler(history: web::Data<QueryHistory>) -> HttpResponse {
    history.clear().await;
    HttpResponse::Ok().json(DeleteResponse { success: true })
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/query")
            .service(execute_query_handler)
            .service(query_history_handler)
            .service(clear_history_handler),
    );
}
