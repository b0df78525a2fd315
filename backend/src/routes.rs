use std::time::Instant;

use actix_cors::Cors;
use actix_multipart::Multipart;
use actix_web::http::Method;
use actix_web::{web, HttpMessage, HttpRequest, HttpResponse, Responder, Route};
use futures_util::StreamExt;
use log::{debug, error, info, warn};
use serde::Serialize;
use serde_json::Value;

use crate::config::Limits;
use crate::error::ApiError;
use crate::models::{read_json_body, ErrorBody, HealthStatus, Upload};
use crate::{batch, kinetics, stability};

/// Multipart field carrying the CSV upload.
pub const FILE_FIELD: &str = "file";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Health,
    Analyze,
    Stability,
    UploadCsv,
}

impl Endpoint {
    pub const ALL: [Endpoint; 4] = [
        Endpoint::Health,
        Endpoint::Analyze,
        Endpoint::Stability,
        Endpoint::UploadCsv,
    ];

    pub fn path(self) -> &'static str {
        match self {
            Endpoint::Health => "/api/health",
            Endpoint::Analyze => "/api/analyze",
            Endpoint::Stability => "/api/stability",
            Endpoint::UploadCsv => "/api/upload_csv",
        }
    }

    pub fn method(self) -> Method {
        match self {
            Endpoint::Health => Method::GET,
            Endpoint::Analyze | Endpoint::Stability | Endpoint::UploadCsv => Method::POST,
        }
    }

    fn route(self) -> Route {
        let route = web::route().method(self.method());
        match self {
            Endpoint::Health => route.to(health_check),
            Endpoint::Analyze => route.to(analyze),
            Endpoint::Stability => route.to(stability_check),
            Endpoint::UploadCsv => route.to(upload_csv),
        }
    }
}

/// Registers every [`Endpoint`] along with the body limits.
pub fn configure(limits: Limits) -> impl FnOnce(&mut web::ServiceConfig) {
    move |cfg| {
        cfg.app_data(web::PayloadConfig::new(limits.json_bytes))
            .app_data(web::Data::new(limits));
        for endpoint in Endpoint::ALL {
            cfg.service(web::resource(endpoint.path()).route(endpoint.route()));
        }
    }
}

/// Open CORS policy: any origin, method and header.
pub fn cors() -> Cors {
    Cors::default()
        .allow_any_origin()
        .send_wildcard()
        .allow_any_method()
        .allow_any_header()
        .max_age(3600)
}

pub async fn not_found() -> HttpResponse {
    HttpResponse::NotFound().json(ErrorBody::new("Endpoint not found"))
}

async fn health_check() -> impl Responder {
    HttpResponse::Ok().json(HealthStatus::ok())
}

async fn analyze(req: HttpRequest, body: BodyResult) -> Result<HttpResponse, ApiError> {
    let start_time = Instant::now();
    let result = json_body(&req, body).and_then(|data| kinetics::analyze(data.as_ref()));
    respond(Endpoint::Analyze, start_time, result)
}

async fn stability_check(req: HttpRequest, body: BodyResult) -> Result<HttpResponse, ApiError> {
    let start_time = Instant::now();
    let result = json_body(&req, body).and_then(|data| stability::assess(data.as_ref()));
    respond(Endpoint::Stability, start_time, result)
}

/// Extracted body, kept as a `Result` so payload failures (e.g. over the
/// size limit) reach the client in the JSON error shape.
type BodyResult = Result<web::Bytes, actix_web::Error>;

fn json_body(req: &HttpRequest, body: BodyResult) -> Result<Option<Value>, ApiError> {
    let body = body.map_err(|e| ApiError::BadRequest(format!("Failed to read request body: {}", e)))?;
    Ok(read_json_body(req.content_type(), &body))
}

async fn upload_csv(
    mut payload: Multipart,
    limits: web::Data<Limits>,
) -> Result<HttpResponse, ApiError> {
    let start_time = Instant::now();

    let result = match read_upload(&mut payload, limits.upload_bytes).await {
        Ok(upload) => web::block(move || batch::process_upload(upload))
            .await
            .unwrap_or_else(|e| Err(ApiError::Internal(e.to_string()))),
        Err(e) => Err(e),
    };
    if let Ok(response) = &result {
        info!("CSV batch produced {} results", response.results.len());
    }
    respond(Endpoint::UploadCsv, start_time, result)
}

/// Pulls the `file` field out of a multipart body. A request that is not
/// multipart at all has no file part.
async fn read_upload(payload: &mut Multipart, limit: usize) -> Result<Option<Upload>, ApiError> {
    while let Some(item) = payload.next().await {
        let mut field = match item {
            Ok(field) => field,
            Err(e) => {
                debug!("Unreadable multipart body: {}", e);
                return Ok(None);
            }
        };

        let disposition = field.content_disposition();
        if disposition.get_name() != Some(FILE_FIELD) {
            continue;
        }
        // a part without a filename is a plain form value, not a file
        let Some(filename) = disposition.get_filename().map(str::to_string) else {
            continue;
        };

        let mut content = Vec::new();
        while let Some(chunk) = field.next().await {
            let chunk = chunk
                .map_err(|e| ApiError::BadRequest(format!("Failed to read uploaded file: {}", e)))?;
            if content.len() + chunk.len() > limit {
                return Err(ApiError::BadRequest(format!(
                    "Uploaded file exceeds {} bytes",
                    limit
                )));
            }
            content.extend_from_slice(&chunk);
        }
        return Ok(Some(Upload { filename, content }));
    }
    Ok(None)
}

fn respond<T: Serialize>(
    endpoint: Endpoint,
    start_time: Instant,
    result: Result<T, ApiError>,
) -> Result<HttpResponse, ApiError> {
    let elapsed_ms = start_time.elapsed().as_millis();
    match result {
        Ok(body) => {
            info!("{} handled in {}ms", endpoint.path(), elapsed_ms);
            Ok(HttpResponse::Ok().json(body))
        }
        Err(e) if e.is_client_error() => {
            warn!("{} rejected: {}", endpoint.path(), e);
            Err(e)
        }
        Err(e) => {
            error!("{} failed: {}", endpoint.path(), e);
            Err(e)
        }
    }
}
