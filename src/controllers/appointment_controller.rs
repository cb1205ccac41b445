use actix_web::{http::header, web, HttpResponse, Responder};
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::{
    error::ApiError,
    models::appointment::{Appointment, NewAppointment},
    service::{appointment_service::AppointmentService, slot_service},
    utils::format_fecha_larga,
};

#[derive(Deserialize)]
pub struct ConfirmationQuery {
    id: Option<i64>,
}

#[derive(Deserialize)]
pub struct SlotsQuery {
    year: Option<i32>,
    month: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotsResponse {
    available_dates: Vec<String>,
}

pub async fn index() -> impl Responder {
    HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(include_str!("../../static/index.html"))
}

pub async fn confirmar_cita(
    service: web::Data<AppointmentService>,
    form: web::Form<NewAppointment>,
) -> Result<HttpResponse, ApiError> {
    let form = form.into_inner();
    form.check_required()?;

    let appointment = service.book(form).await?;

    // The confirmation view looks the record up by id; no field echoing.
    Ok(HttpResponse::Found()
        .append_header((
            header::LOCATION,
            format!("/cita-confirmada?id={}", appointment.id),
        ))
        .finish())
}

pub async fn cita_confirmada(
    service: web::Data<AppointmentService>,
    query: web::Query<ConfirmationQuery>,
) -> Result<HttpResponse, ApiError> {
    let id = query
        .id
        .ok_or_else(|| ApiError::Validation("ID de cita no proporcionado.".into()))?;

    let appointment = service.get_by_id(id).await?;

    Ok(HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(render_confirmation(&appointment)))
}

pub async fn available_slots(query: web::Query<SlotsQuery>) -> Result<HttpResponse, ApiError> {
    let missing = || ApiError::Validation("Missing year or month parameter".into());
    let year = query.year.ok_or_else(missing)?;
    let month_name = query.month.as_deref().ok_or_else(missing)?;

    let month = slot_service::month_number(month_name)
        .ok_or_else(|| ApiError::Validation("Invalid month parameter".into()))?;

    let today = Utc::now().date_naive();
    let dates = slot_service::available_dates(year, month, today);

    Ok(HttpResponse::Ok().json(SlotsResponse {
        available_dates: dates
            .iter()
            .map(|d| d.format("%Y-%m-%d").to_string())
            .collect(),
    }))
}

fn render_confirmation(appointment: &Appointment) -> String {
    let values = serde_json::json!({
        "id": appointment.id.to_string(),
        "tramite": appointment.tramite,
        "nombres": appointment.nombres,
        "apellidos": appointment.apellidos,
        "correo_electronico": appointment.correo_electronico,
        "cedula": appointment.cedula,
        "direccion": appointment.direccion,
        "institucion": appointment.institucion,
        "telefono": appointment.telefono,
        "fecha_formateada": format_fecha_larga(&appointment.fecha_cita),
        "confirmation_code": appointment.confirmation_code,
        "qr_image_data_url": appointment.qr_image_data_url,
        "qr_expira": appointment.qr_expires_at.to_rfc3339(),
    });

    let mut html = include_str!("../../templates/confirmation.html").to_string();
    for (key, value) in values.as_object().into_iter().flatten() {
        let placeholder = format!("{{{{{key}}}}}");
        html = html.replace(&placeholder, value.as_str().unwrap_or_default());
    }
    html
}
