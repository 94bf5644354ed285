use actix_web::{HttpResponse, web};
use serde::{Deserialize, Serialize};
use tracing::debug;
use utoipa::ToSchema;

use crate::error::AppError;
use crate::model::employee::Employee;
use crate::repository::AttendanceRepository;
use crate::service::fingerprint::{self, BindError};
use crate::utils::fingerprint_cache::FingerprintCache;

#[derive(Debug, Deserialize, ToSchema)]
pub struct IdentifyRequest {
    #[schema(example = "3f7a9c0e51b2d4a8")]
    pub fingerprint: String,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, ToSchema)]
pub struct EmployeeSummary {
    #[schema(example = 1)]
    pub id: u64,
    #[schema(example = "Claudia Aguilar")]
    pub name: String,
}

impl From<&Employee> for EmployeeSummary {
    fn from(e: &Employee) -> Self {
        Self {
            id: e.id,
            name: e.full_name(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct IdentifyResponse {
    pub known: bool,
    pub employee: Option<EmployeeSummary>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct BindRequest {
    #[schema(example = "3f7a9c0e51b2d4a8")]
    pub fingerprint: String,
    #[schema(example = 1)]
    pub employee_id: u64,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct BindResponse {
    pub message: String,
    pub employee: EmployeeSummary,
}

impl From<BindError> for AppError {
    fn from(err: BindError) -> Self {
        match err {
            BindError::InvalidFingerprint => AppError::BadRequest(err.to_string()),
            BindError::UnknownEmployee => AppError::NotFound(err.to_string()),
            BindError::Storage(e) => AppError::from(e),
        }
    }
}

/// Look up which employee a device belongs to
#[utoipa::path(
    post,
    path = "/fingerprint/identify",
    request_body = IdentifyRequest,
    responses(
        (status = 200, description = "Lookup result", body = IdentifyResponse, example = json!({
            "known": true,
            "employee": { "id": 1, "name": "Claudia Aguilar" }
        })),
        (status = 500, description = "Internal server error")
    ),
    tag = "Fingerprint"
)]
pub async fn identify<R>(
    repo: web::Data<R>,
    cache: web::Data<FingerprintCache>,
    body: web::Json<IdentifyRequest>,
) -> Result<HttpResponse, AppError>
where
    R: AttendanceRepository + 'static,
{
    let employee = fingerprint::identify(repo.get_ref(), cache.get_ref(), &body.fingerprint).await?;
    debug!(known = employee.is_some(), "Fingerprint identify");

    Ok(HttpResponse::Ok().json(IdentifyResponse {
        known: employee.is_some(),
        employee: employee.as_ref().map(EmployeeSummary::from),
    }))
}

/// Remember a device for an employee. A later bind replaces it.
#[utoipa::path(
    post,
    path = "/fingerprint/bind",
    request_body = BindRequest,
    responses(
        (status = 200, description = "Device bound", body = BindResponse, example = json!({
            "message": "Dispositivo vinculado",
            "employee": { "id": 1, "name": "Claudia Aguilar" }
        })),
        (status = 400, description = "Invalid fingerprint", body = Object, example = json!({
            "message": "Identificador de dispositivo inválido"
        })),
        (status = 404, description = "Unknown employee", body = Object, example = json!({
            "message": "Empleado no encontrado"
        })),
        (status = 500, description = "Internal server error")
    ),
    tag = "Fingerprint"
)]
pub async fn bind<R>(
    repo: web::Data<R>,
    cache: web::Data<FingerprintCache>,
    body: web::Json<BindRequest>,
) -> Result<HttpResponse, AppError>
where
    R: AttendanceRepository + 'static,
{
    let employee =
        fingerprint::bind(repo.get_ref(), cache.get_ref(), &body.fingerprint, body.employee_id)
            .await?;

    Ok(HttpResponse::Ok().json(BindResponse {
        message: "Dispositivo vinculado".to_string(),
        employee: EmployeeSummary::from(&employee),
    }))
}
