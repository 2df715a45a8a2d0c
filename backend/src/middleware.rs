use actix_web::{
    dev::{Service, ServiceRequest, ServiceResponse, Transform},
    Error,
};
use actix_web::HttpMessage;
use futures_util::future::{ready, LocalBoxFuture, Ready};
use std::rc::Rc;
use std::task::{Context, Poll};
use std::time::Instant;
use log::{info, warn, error};
use actix_web::http::header::{HeaderName, HeaderValue};
use uuid::Uuid;

use crate::metrics::{record_http_request, Metrics};

pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Correlation id stored in the request extensions
#[derive(Debug, Clone)]
pub struct RequestId(pub String);

/// Access log with a request id and HTTP metrics per matched route
pub struct Logger;

impl<S, B> Transform<S, ServiceRequest> for Logger
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = LoggerMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(LoggerMiddleware {
            service: Rc::new(service),
        }))
    }
}

pub struct LoggerMiddleware<S> {
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for LoggerMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(cx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let svc = self.service.clone();
        let start_time = Instant::now();
        let method = req.method().clone();
        let uri = req.uri().clone();
        let peer_addr = req
            .peer_addr()
            .map(|addr| addr.to_string())
            .unwrap_or_else(|| "unknown".to_string());
        // Route pattern keeps the metric label set bounded
        let endpoint = req.match_pattern().unwrap_or_else(|| "unmatched".to_string());

        // Reuse an incoming id so calls can be traced across services
        let request_id = req
            .headers()
            .get(REQUEST_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .filter(|v| !v.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| Uuid::new_v4().to_string());
        req.extensions_mut().insert(RequestId(request_id.clone()));

        let metrics = Metrics::global();
        if let Some(m) = &metrics {
            m.http.requests_in_flight.inc();
        }

        Box::pin(async move {
            let outcome = svc.call(req).await;
            let duration = start_time.elapsed();
            if let Some(m) = &metrics {
                m.http.requests_in_flight.dec();
            }
            let mut res = outcome?;

            if let Ok(header_value) = HeaderValue::try_from(request_id.as_str()) {
                res.headers_mut().insert(
                    HeaderName::from_static(REQUEST_ID_HEADER),
                    header_value,
                );
            }

            let status_code = res.status().as_u16();
            if let Some(m) = &metrics {
                record_http_request(m, method.as_str(), &endpoint, status_code, duration);
            }

            let line = format!(
                "request_id={} {} {} {} {}ms {}",
                request_id,
                method,
                uri,
                status_code,
                duration.as_millis(),
                peer_addr
            );
            if status_code >= 500 {
                error!("{}", line);
            } else if status_code >= 400 {
                warn!("{}", line);
            } else {
                info!("{}", line);
            }

            Ok(res)
        })
    }
}

/// Browser access for the configured dashboard origins
pub fn cors_middleware(origins: &[String]) -> actix_cors::Cors {
    let mut cors = actix_cors::Cors::default()
        .allowed_methods(vec!["GET", "POST", "PUT", "DELETE", "OPTIONS"])
        .allowed_headers(vec![
            actix_web::http::header::ACCEPT,
            actix_web::http::header::CONTENT_TYPE,
            actix_web::http::header::AUTHORIZATION,
        ])
        .expose_headers(vec![HeaderName::from_static(REQUEST_ID_HEADER)])
        .max_age(3600);

    for origin in origins {
        if origin == "*" {
            cors = cors.allow_any_origin();
        } else {
            cors = cors.allowed_origin(origin);
        }
    }

    cors
}
