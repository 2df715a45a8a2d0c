use actix_web::{delete, get, post, put, web, HttpResponse};
use shared::datasource::{record_id, Connector};
use shared::{CreateUserRequest, PageQuery, UpdateUserRequest};

use crate::datasource::{Gateway, SurrealConnector};
use crate::error::ApiError;
use crate::users::usecase::UsersUseCase;

fn user_id<C: Connector>(gateway: &Gateway<C>, param: &str) -> String {
    record_id(&gateway.collections().users, param)
}

pub async fn list_users_handler_impl<C: Connector + 'static>(
    query: web::Query<PageQuery>,
    gateway: web::Data<Gateway<C>>,
) -> Result<HttpResponse, ApiError> {
    let usecase = UsersUseCase::new(gateway.get_ref());
    Ok(HttpResponse::Ok().json(usecase.list_or_empty(query.into_inner()).await?))
}

#[utoipa::path(
    get,
    path = "/api/users",
    tag = "users",
    params(
        ("page" = Option<u32>, Query, description = "1-based page number"),
        ("limit" = Option<u32>, Query, description = "Page size, 1 to 100")
    ),
    responses((status = 200, description = "One page of users, newest first"))
)]
#[get("")]
pub async fn list_users_handler(
    query: web::Query<PageQuery>,
    gateway: web::Data<Gateway<SurrealConnector>>,
) -> Result<HttpResponse, ApiError> {
    list_users_handler_impl(query, gateway).await
}

pub async fn create_user_handler_impl<C: Connector + 'static>(
    request: web::Json<CreateUserRequest>,
    gateway: web::Data<Gateway<C>>,
) -> Result<HttpResponse, ApiError> {
    let usecase = UsersUseCase::new(gateway.get_ref());
    let user = usecase.create(request.into_inner()).await?;
    Ok(HttpResponse::Created().json(user))
}

#[utoipa::path(
    post,
    path = "/api/users",
    tag = "users",
    responses(
        (status = 201, description = "User created"),
        (status = 400, description = "Validation failed")
    )
)]
#[post("")]
pub async fn create_user_handler(
    request: web::Json<CreateUserRequest>,
    gateway: web::Data<Gateway<SurrealConnector>>,
) -> Result<HttpResponse, ApiError> {
    create_user_handler_impl(request, gateway).await
}

pub async fn update_user_handler_impl<C: Connector + 'static>(
    path: web::Path<String>,
    request: web::Json<UpdateUserRequest>,
    gateway: web::Data<Gateway<C>>,
) -> Result<HttpResponse, ApiError> {
    let id = user_id(gateway.get_ref(), &path.into_inner());
    let usecase = UsersUseCase::new(gateway.get_ref());
    Ok(HttpResponse::Ok().json(usecase.update(&id, request.into_inner()).await?))
}

#[utoipa::path(
    put,
    path = "/api/users/{id}",
    tag = "users",
    params(("id" = String, Path, description = "User key or full record id")),
    responses(
        (status = 200, description = "Updated user"),
        (status = 404, description = "User not found")
    )
)]
#[put("/{id}")]
pub async fn update_user_handler(
    path: web::Path<String>,
    request: web::Json<UpdateUserRequest>,
    gateway: web::Data<Gateway<SurrealConnector>>,
) -> Result<HttpResponse, ApiError> {
    update_user_handler_impl(path, request, gateway).await
}

pub async fn delete_user_handler_impl<C: Connector + 'static>(
    path: web::Path<String>,
    gateway: web::Data<Gateway<C>>,
) -> Result<HttpResponse, ApiError> {
    let id = user_id(gateway.get_ref(), &path.into_inner());
    let usecase = UsersUseCase::new(gateway.get_ref());
    Ok(HttpResponse::Ok().json(usecase.delete(&id).await?))
}

#[utoipa::path(
    delete,
    path = "/api/users/{id}",
    tag = "users",
    params(("id" = String, Path, description = "User key or full record id")),
    responses(
        (status = 200, description = "User deleted"),
        (status = 404, description = "User not found")
    )
)]
#[delete("/{id}")]
pub async fn delete_user_handler(
    path: web::Path<String>,
    gateway: web::Data<Gateway<SurrealConnector>>,
) -> Result<HttpResponse, ApiError> {
    delete_user_handler_impl(path, gateway).await
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/users")
            .service(list_users_handler)
            .service(create_user_handler)
            .service(update_user_handler)
            .service(delete_user_handler),
    );
}
