use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use crate::error::ApiError;

/// One confirmed booking as persisted in the `appointments` table.
///
/// `fecha_cita` is a calendar date (YYYY-MM-DD, no time-of-day) kept as text,
/// matching what the intake form submits. The credential columns are written
/// inside the creation transaction, so a row visible outside it always has a
/// hash, an image and an expiry.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Appointment {
    pub id: i64,
    pub tramite: String,
    pub nombres: String,
    pub apellidos: String,
    pub correo_electronico: String,
    pub cedula: String,
    pub direccion: String,
    pub institucion: String,
    pub telefono: String,
    pub fecha_cita: String,
    pub confirmation_code: String,
    pub qr_id_hash: String,
    pub qr_image_data_url: String,
    pub qr_expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

/// Intake form payload for `POST /confirmar-cita`. All fields are required.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewAppointment {
    pub tramite: String,
    pub nombres: String,
    pub apellidos: String,
    #[validate(email)]
    pub correo_electronico: String,
    pub cedula: String,
    pub direccion: String,
    pub institucion: String,
    pub telefono: String,
    pub fecha_cita: String,
}

impl NewAppointment {
    /// Rejects blank fields, malformed addresses and malformed dates before
    /// anything touches the store.
    pub fn check_required(&self) -> Result<(), ApiError> {
        let fields = [
            &self.tramite,
            &self.nombres,
            &self.apellidos,
            &self.correo_electronico,
            &self.cedula,
            &self.direccion,
            &self.institucion,
            &self.telefono,
            &self.fecha_cita,
        ];
        if fields.iter().any(|f| f.trim().is_empty()) {
            return Err(ApiError::Validation(
                "Por favor, complete todos los campos requeridos.".into(),
            ));
        }

        self.validate()
            .map_err(|_| ApiError::Validation("Correo electrónico inválido.".into()))?;

        NaiveDate::parse_from_str(&self.fecha_cita, "%Y-%m-%d").map_err(|_| {
            ApiError::Validation("Fecha de cita inválida, use el formato YYYY-MM-DD.".into())
        })?;

        Ok(())
    }
}
