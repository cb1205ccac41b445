use std::sync::Arc;

use chrono::{Duration, Utc};
use sqlx::sqlite::SqlitePool;
use tracing::{error, info, warn};

use crate::{
    config::crypto::CryptoService,
    error::ApiError,
    models::appointment::{Appointment, NewAppointment},
    service::{
        email_service::EmailService,
        qr_service::{QrPayload, QrService, QR_VALIDITY_MINUTES},
    },
};

/// A fresh nonce per attempt makes a second collision vanishingly unlikely;
/// three attempts is already generous.
const HASH_RETRY_LIMIT: u32 = 3;

pub struct AppointmentService {
    pool: SqlitePool,
    crypto: CryptoService,
    qr: QrService,
    email_service: Option<Arc<EmailService>>,
}

impl AppointmentService {
    pub fn new(
        pool: SqlitePool,
        crypto: CryptoService,
        qr: QrService,
        email_service: Option<Arc<EmailService>>,
    ) -> Self {
        Self {
            pool,
            crypto,
            qr,
            email_service,
        }
    }

    pub async fn init_schema(pool: &SqlitePool) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
                CREATE TABLE IF NOT EXISTS appointments (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    tramite TEXT NOT NULL,
                    nombres TEXT NOT NULL,
                    apellidos TEXT NOT NULL,
                    correo_electronico TEXT NOT NULL,
                    cedula TEXT NOT NULL,
                    direccion TEXT NOT NULL,
                    institucion TEXT NOT NULL,
                    telefono TEXT NOT NULL,
                    fecha_cita TEXT NOT NULL,
                    confirmation_code TEXT NOT NULL,
                    qr_id_hash TEXT UNIQUE,
                    qr_image_data_url TEXT NOT NULL,
                    qr_expires_at TEXT NOT NULL,
                    created_at TEXT NOT NULL
                )
            "#,
        )
        .execute(pool)
        .await?;
        Ok(())
    }

    /// Runs the whole booking pipeline in one transaction: insert the pending
    /// row, issue code and credential, attach them, commit. A credential
    /// failure rolls everything back, so no orphan pending record survives.
    /// The confirmation email is dispatched after commit and never blocks the
    /// caller.
    pub async fn book(&self, form: NewAppointment) -> Result<Appointment, ApiError> {
        let code = self.crypto.generate_confirmation_code();
        let now = Utc::now();

        let mut tx = self.pool.begin().await?;

        let inserted = sqlx::query(
            r#"
                INSERT INTO appointments (
                    tramite, nombres, apellidos, correo_electronico, cedula,
                    direccion, institucion, telefono, fecha_cita,
                    confirmation_code, qr_id_hash, qr_image_data_url,
                    qr_expires_at, created_at
                )
                VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, NULL, '', ?, ?)
            "#,
        )
        .bind(&form.tramite)
        .bind(&form.nombres)
        .bind(&form.apellidos)
        .bind(&form.correo_electronico)
        .bind(&form.cedula)
        .bind(&form.direccion)
        .bind(&form.institucion)
        .bind(&form.telefono)
        .bind(&form.fecha_cita)
        .bind(&code)
        .bind(now)
        .bind(now)
        .execute(&mut *tx)
        .await?;
        let id = inserted.last_insert_rowid();

        let mut attached = false;
        for attempt in 1..=HASH_RETRY_LIMIT {
            let hash = self
                .crypto
                .generate_credential_hash(id, &form.correo_electronico);
            let generated_at = Utc::now();
            let expires_at = generated_at + Duration::minutes(QR_VALIDITY_MINUTES);

            let payload = QrPayload {
                cita_id: id,
                qr_hash: hash.clone(),
                email: form.correo_electronico.clone(),
                codigo: code.clone(),
                fecha_cita: form.fecha_cita.clone(),
                tramite: form.tramite.clone(),
                institucion: form.institucion.clone(),
                nombres: form.nombres.clone(),
                apellidos: form.apellidos.clone(),
                generado: generated_at,
                expira: expires_at,
            };
            // On encoding failure the transaction drops here and rolls back.
            let data_url = self.qr.encode(&payload)?;

            let update = sqlx::query(
                "UPDATE appointments SET qr_id_hash = ?, qr_image_data_url = ?, qr_expires_at = ? WHERE id = ?",
            )
            .bind(&hash)
            .bind(&data_url)
            .bind(expires_at)
            .bind(id)
            .execute(&mut *tx)
            .await;

            match update {
                Ok(_) => {
                    attached = true;
                    break;
                }
                Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
                    warn!(record_id = id, attempt, "credential hash collision, regenerating");
                }
                Err(err) => return Err(err.into()),
            }
        }
        if !attached {
            return Err(ApiError::CredentialEncoding(
                "could not assign a unique credential hash".into(),
            ));
        }

        tx.commit().await?;
        info!(record_id = id, "appointment confirmed");

        let appointment = self.get_by_id(id).await?;
        self.dispatch_confirmation(&appointment);
        Ok(appointment)
    }

    pub async fn get_by_id(&self, id: i64) -> Result<Appointment, ApiError> {
        sqlx::query_as::<_, Appointment>("SELECT * FROM appointments WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(ApiError::NotFound)
    }

    /// Fire-and-forget: one detached send per confirmed booking. Failures
    /// land in the log, never in the HTTP response.
    fn dispatch_confirmation(&self, appointment: &Appointment) {
        let Some(mailer) = self.email_service.clone() else {
            warn!(
                record_id = appointment.id,
                "mail credentials not configured, skipping confirmation email"
            );
            return;
        };

        let appointment = appointment.clone();
        actix_web::rt::spawn(async move {
            match mailer.send_confirmation(&appointment).await {
                Ok(()) => info!(
                    record_id = appointment.id,
                    to = %appointment.correo_electronico,
                    "confirmation email sent"
                ),
                Err(err) => error!(
                    record_id = appointment.id,
                    error = %err,
                    "failed to send confirmation email"
                ),
            }
        });
    }
}
