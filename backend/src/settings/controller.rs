use actix_web::{get, post, put, web, HttpResponse};
use shared::datasource::{ConnectionSettings, Connector};

use crate::datasource::{Gateway, SurrealConnector};
use crate::error::ApiError;
use crate::settings::usecase::SettingsUseCase;

pub async fn get_settings_handler_impl<C: Connector + 'static>(
    gateway: web::Data<Gateway<C>>,
) -> Result<HttpResponse, ApiError> {
    let usecase = SettingsUseCase::new(gateway.get_ref());
    Ok(HttpResponse::Ok().json(usecase.get().await))
}

#[utoipa::path(
    get,
    path = "/api/settings/connection",
    tag = "settings",
    responses((status = 200, description = "Connection settings with the password masked"))
)]
#[get("/connection")]
pub async fn get_settings_handler(
    gateway: web::Data<Gateway<SurrealConnector>>,
) -> Result<HttpResponse, ApiError> {
    get_settings_handler_impl(gateway).await
}

pub async fn replace_settings_handler_impl<C: Connector + 'static>(
    settings: web::Json<ConnectionSettings>,
    gateway: web::Data<Gateway<C>>,
) -> Result<HttpResponse, ApiError> {
    let usecase = SettingsUseCase::new(gateway.get_ref());
    let saved = usecase.replace(settings.into_inner()).await?;
    Ok(HttpResponse::Ok().json(saved))
}

#[utoipa::path(
    put,
    path = "/api/settings/connection",
    tag = "settings",
    responses(
        (status = 200, description = "Settings replaced"),
        (status = 400, description = "A field is empty or the URL is invalid")
    )
)]
#[put("/connection")]
pub async fn replace_settings_handler(
    settings: web::Json<ConnectionSettings>,
    gateway: web::Data<Gateway<SurrealConnector>>,
) -> Result<HttpResponse, ApiError> {
    replace_settings_handler_impl(settings, gateway).await
}

pub async fn test_connection_handler_impl<C: Connector + 'static>(
    settings: web::Json<ConnectionSettings>,
    gateway: web::Data<Gateway<C>>,
) -> Result<HttpResponse, ApiError> {
    let usecase = SettingsUseCase::new(gateway.get_ref());
    Ok(HttpResponse::Ok().json(usecase.test(settings.into_inner()).await))
}

#[utoipa::path(
    post,
    path = "/api/settings/connection/test",
    tag = "settings",
    responses((status = 200, description = "Outcome of the connection attempt"))
)]
#[post("/connection/test")]
pub async fn test_connection_handler(
    settings: web::Json<ConnectionSettings>,
    gateway: web::Data<Gateway<SurrealConnector>>,
) -> Result<HttpResponse, ApiError> {
    test_connection_handler_impl(settings, gateway).await
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/settings")
            .service(get_settings_handler)
            .service(replace_settings_handler)
            .service(test_connection_handler),
    );
}
