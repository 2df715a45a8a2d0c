use actix_web::{delete, get, post, put, web, HttpResponse};
use serde_json::Value;
use shared::datasource::Connector;
use shared::PageQuery;

use crate::datasource::{Gateway, SurrealConnector};
use crate::error::ApiError;
use crate::tables::usecase::TablesUseCase;

pub async fn list_tables_handler_impl<C: Connector + 'static>(
    gateway: web::Data<Gateway<C>>,
) -> HttpResponse {
    let usecase = TablesUseCase::new(gateway.get_ref());
    HttpResponse::Ok().json(usecase.list_or_empty().await)
}

#[utoipa::path(
    get,
    path = "/api/tables",
    tag = "tables",
    responses((status = 200, description = "Table names, empty when the database is unreachable"))
)]
#[get("")]
pub async fn list_tables_handler(gateway: web::Data<Gateway<SurrealConnector>>) -> HttpResponse {
    list_tables_handler_impl(gateway).await
}

pub async fn list_records_handler_impl<C: Connector + 'static>(
    path: web::Path<String>,
    query: web::Query<PageQuery>,
    gateway: web::Data<Gateway<C>>,
) -> Result<HttpResponse, ApiError> {
    let usecase = TablesUseCase::new(gateway.get_ref());
    let page = usecase.records_or_empty(&path.into_inner(), query.into_inner()).await?;
    Ok(HttpResponse::Ok().json(page))
}

#[utoipa::path(
    get,
    path = "/api/tables/{table}/records",
    tag = "tables",
    params(
        ("table" = String, Path, description = "Table name"),
        ("page" = Option<u32>, Query, description = "1-based page number"),
        ("limit" = Option<u32>, Query, description = "Page size, 1 to 100")
    ),
    responses((status = 200, description = "One page of raw records with the table's total"))
)]
#[get("/{table}/records")]
pub async fn list_records_handler(
    path: web::Path<String>,
    query: web::Query<PageQuery>,
    gateway: web::Data<Gateway<SurrealConnector>>,
) -> Result<HttpResponse, ApiError> {
    list_records_handler_impl(path, query, gateway).await
}

pub async fn create_record_handler_impl<C: Connector + 'static>(
    path: web::Path<String>,
    record: web::Json<Value>,
    gateway: web::Data<Gateway<C>>,
) -> Result<HttpResponse, ApiError> {
    let usecase = TablesUseCase::new(gateway.get_ref());
    let created = usecase.create(&path.into_inner(), record.into_inner()).await?;
    Ok(HttpResponse::Created().json(created))
}

#[utoipa::path(
    post,
    path = "/api/tables/{table}/records",
    tag = "tables",
    params(("table" = String, Path, description = "Table name")),
    responses(
        (status = 201, description = "Record created"),
        (status = 400, description = "Content is not an object or was rejected")
    )
)]
#[post("/{table}/records")]
pub async fn create_record_handler(
    path: web::Path<String>,
    record: web::Json<Value>,
    gateway: web::Data<Gateway<SurrealConnector>>,
) -> Result<HttpResponse, ApiError> {
    create_record_handler_impl(path, record, gateway).await
}

pub async fn replace_record_handler_impl<C: Connector + 'static>(
    path: web::Path<(String, String)>,
    record: web::Json<Value>,
    gateway: web::Data<Gateway<C>>,
) -> Result<HttpResponse, ApiError> {
    let (table, id) = path.into_inner();
    let usecase = TablesUseCase::new(gateway.get_ref());
    Ok(HttpResponse::Ok().json(usecase.replace(&table, &id, record.into_inner()).await?))
}

#[utoipa::path(
    put,
    path = "/api/tables/{table}/records/{id}",
    tag = "tables",
    params(
        ("table" = String, Path, description = "Table name"),
        ("id" = String, Path, description = "Record key or full record id")
    ),
    responses(
        (status = 200, description = "Record content replaced"),
        (status = 400, description = "Id outside the table or content not an object")
    )
)]
#[put("/{table}/records/{id}")]
pub async fn replace_record_handler(
    path: web::Path<(String, String)>,
    record: web::Json<Value>,
    gateway: web::Data<Gateway<SurrealConnector>>,
) -> Result<HttpResponse, ApiError> {
    replace_record_handler_impl(path, record, gateway).await
}

pub async fn delete_record_handler_impl<C: Connector + 'static>(
    path: web::Path<(String, String)>,
    gateway: web::Data<Gateway<C>>,
) -> Result<HttpResponse, ApiError> {
    let (table, id) = path.into_inner();
    let usecase = TablesUseCase::new(gateway.get_ref());
    Ok(HttpResponse::Ok().json(usecase.delete(&table, &id).await?))
}

#[utoipa::path(
    delete,
    path = "/api/tables/{table}/records/{id}",
    tag = "tables",
    params(
        ("table" = String, Path, description = "Table name"),
        ("id" = String, Path, description = "Record key or full record id")
    ),
    responses(
        (status = 200, description = "Record deleted"),
        (status = 404, description = "Record not found")
    )
)]
#[delete("/{table}/records/{id}")]
pub async fn delete_record_handler(
    path: web::Path<(String, String)>,
    gateway: web::Data<Gateway<SurrealConnector>>,
) -> Result<HttpResponse, ApiError> {
    delete_record_handler_impl(path, gateway).await
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/tables")
            .service(list_tables_handler)
            .service(list_records_handler)
            .service(create_record_handler)
            .service(replace_record_handler)
            .service(delete_record_handler),
    );
}
