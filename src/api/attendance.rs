use actix_web::{HttpResponse, web};
use tracing::{debug, error, warn};

use crate::config::Config;
use crate::models::CheckInForm;
use crate::model::{attendance_type::AttendanceType, employee::Employee};
use crate::repository::{AttendanceRepository, RepoResult};
use crate::service::attendance::{
    CheckInError, CheckInRequest, Registered, parse_id, register_punch,
};
use crate::service::fingerprint;
use crate::utils::fingerprint_cache::FingerprintCache;
use crate::views::{self, Flash, FlashLevel};

fn html(body: String) -> HttpResponse {
    HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(body)
}

/// Storage failures on a page still answer with a page.
fn unavailable(e: sqlx::Error, back_to: &str) -> HttpResponse {
    error!(error = %e, "Check-in page storage failure");
    let message = CheckInError::from(e).to_string();
    HttpResponse::InternalServerError()
        .content_type("text/html; charset=utf-8")
        .body(views::error_page(&message, back_to))
}

impl CheckInForm {
    pub fn to_request(&self) -> CheckInRequest {
        CheckInRequest {
            employee_id: parse_id(self.empleado.as_deref()),
            type_id: parse_id(self.tipo_evento.as_deref()),
            note: self.descripcion.clone(),
            fingerprint: self.fingerprint.clone(),
        }
    }
}

fn failure_flash(err: &CheckInError) -> Flash {
    let level = if err.is_warning() {
        FlashLevel::Warning
    } else {
        FlashLevel::Error
    };
    Flash::new(level, err.to_string())
}

fn success_page(registered: &Registered, back_to: &str) -> HttpResponse {
    let flash = Flash::new(FlashLevel::Success, registered.message());
    html(views::check_in_success(
        &registered.employee,
        registered.record.date,
        registered.record.time,
        &flash,
        back_to,
    ))
}

async fn choices<R>(repo: &R) -> RepoResult<(Vec<Employee>, Vec<AttendanceType>)>
where
    R: AttendanceRepository,
{
    Ok((repo.list_employees().await?, repo.list_attendance_types().await?))
}

async fn form_page<R>(repo: &R, flash: Option<Flash>) -> HttpResponse
where
    R: AttendanceRepository,
{
    match choices(repo).await {
        Ok((employees, types)) => html(views::attendance_form(&employees, &types, flash.as_ref())),
        Err(e) => unavailable(e, "/"),
    }
}

async fn kiosk_page<R>(repo: &R, api_prefix: &str, flash: Option<Flash>) -> HttpResponse
where
    R: AttendanceRepository,
{
    match choices(repo).await {
        Ok((employees, types)) => html(views::kiosk_page(
            &employees,
            &types,
            api_prefix,
            flash.as_ref(),
        )),
        Err(e) => unavailable(e, "/qr/checkin"),
    }
}

/// GET /: attendance form
pub async fn show_form<R>(repo: web::Data<R>) -> HttpResponse
where
    R: AttendanceRepository + 'static,
{
    form_page(repo.get_ref(), None).await
}

/// POST /: register a punch from the form
pub async fn submit_form<R>(
    repo: web::Data<R>,
    config: web::Data<Config>,
    form: web::Form<CheckInForm>,
) -> HttpResponse
where
    R: AttendanceRepository + 'static,
{
    let request = form.to_request();
    debug!(employee_id = ?request.employee_id, type_id = ?request.type_id, "Form check-in");

    match register_punch(repo.get_ref(), request, config.now_local()).await {
        Ok(registered) => success_page(&registered, "/"),
        Err(err) => form_page(repo.get_ref(), Some(failure_flash(&err))).await,
    }
}

/// GET /qr/checkin: kiosk page opened from the QR code
pub async fn show_kiosk<R>(
    repo: web::Data<R>,
    config: web::Data<Config>,
) -> HttpResponse
where
    R: AttendanceRepository + 'static,
{
    kiosk_page(repo.get_ref(), &config.api_prefix, None).await
}

/// POST /qr/checkin: register a punch from the kiosk. When no employee is
/// chosen the device binding decides; a successful punch rebinds the device.
pub async fn submit_kiosk<R>(
    repo: web::Data<R>,
    config: web::Data<Config>,
    cache: web::Data<FingerprintCache>,
    form: web::Form<CheckInForm>,
) -> HttpResponse
where
    R: AttendanceRepository + 'static,
{
    let mut request = form.to_request();

    if request.employee_id.is_none() {
        if let Some(fp) = request.fingerprint.as_deref() {
            request.employee_id = match fingerprint::identify(repo.get_ref(), cache.get_ref(), fp).await {
                Ok(employee) => employee.map(|e| e.id),
                Err(e) => return unavailable(e, "/qr/checkin"),
            };
        }
    }

    match register_punch(repo.get_ref(), request, config.now_local()).await {
        Ok(registered) => {
            if let Some(fp) = registered.record.fingerprint.as_deref() {
                if let Err(e) =
                    fingerprint::bind(repo.get_ref(), cache.get_ref(), fp, registered.employee.id).await
                {
                    warn!(error = %e, "Could not bind device after check-in");
                }
            }
            success_page(&registered, "/qr/checkin")
        }
        Err(err) => {
            kiosk_page(repo.get_ref(), &config.api_prefix, Some(failure_flash(&err))).await
        }
    }
}
