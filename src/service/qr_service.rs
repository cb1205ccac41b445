use std::io::Cursor;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::{DateTime, Utc};
use image::Luma;
use qrcode::{EcLevel, QrCode};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;

/// Validity window of the credential, counted from generation, not from the
/// appointment date.
pub const QR_VALIDITY_MINUTES: i64 = 15;

/// Everything a scanner needs to verify the booking without a lookup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QrPayload {
    pub cita_id: i64,
    pub qr_hash: String,
    pub email: String,
    pub codigo: String,
    pub fecha_cita: String,
    pub tramite: String,
    pub institucion: String,
    pub nombres: String,
    pub apellidos: String,
    pub generado: DateTime<Utc>,
    pub expira: DateTime<Utc>,
}

/// Renders a credential payload as a scannable PNG data URL.
#[derive(Debug, Clone, Default)]
pub struct QrService;

impl QrService {
    /// Serializes the payload as JSON and encodes it at error-correction
    /// level H so the printout survives scan degradation. Any failure here
    /// is fatal to the booking flow.
    pub fn encode(&self, payload: &QrPayload) -> Result<String, ApiError> {
        let content = serde_json::to_string(payload)
            .map_err(|e| ApiError::CredentialEncoding(e.to_string()))?;

        let code = QrCode::with_error_correction_level(content.as_bytes(), EcLevel::H)
            .map_err(|e| ApiError::CredentialEncoding(e.to_string()))?;
        let rendered = code.render::<Luma<u8>>().min_dimensions(250, 250).build();

        let mut png = Vec::new();
        image::DynamicImage::ImageLuma8(rendered)
            .write_to(&mut Cursor::new(&mut png), image::ImageOutputFormat::Png)
            .map_err(|e| ApiError::CredentialEncoding(e.to_string()))?;

        Ok(format!("data:image/png;base64,{}", STANDARD.encode(png)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn sample_payload() -> QrPayload {
        let generado = Utc::now();
        QrPayload {
            cita_id: 7,
            qr_hash: "ab".repeat(32),
            email: "ana.perez@example.com".into(),
            codigo: "123456".into(),
            fecha_cita: "2030-03-10".into(),
            tramite: "Renovación de pasaporte".into(),
            institucion: "Dirección General de Pasaportes".into(),
            nombres: "Ana María".into(),
            apellidos: "Pérez Gómez".into(),
            generado,
            expira: generado + Duration::minutes(QR_VALIDITY_MINUTES),
        }
    }

    #[test]
    fn payload_round_trips_through_json() {
        let payload = sample_payload();
        let encoded = serde_json::to_string(&payload).unwrap();
        let decoded: QrPayload = serde_json::from_str(&encoded).unwrap();
        assert_eq!(decoded, payload);
        assert_eq!(decoded.cita_id, 7);
        assert_eq!(decoded.qr_hash, payload.qr_hash);
        assert_eq!(decoded.email, "ana.perez@example.com");
        assert_eq!(decoded.codigo, "123456");
        assert_eq!(decoded.fecha_cita, "2030-03-10");
    }

    #[test]
    fn encodes_payload_as_png_data_url() {
        let data_url = QrService.encode(&sample_payload()).unwrap();
        let encoded = data_url
            .strip_prefix("data:image/png;base64,")
            .expect("data URL prefix");
        let png = STANDARD.decode(encoded).unwrap();
        assert_eq!(&png[..8], b"\x89PNG\r\n\x1a\n");
    }
}
