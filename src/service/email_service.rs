use std::fs;

use color_eyre::Result;
use lettre::{
    message::header::ContentType, transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use serde_json::Value;

use crate::{models::appointment::Appointment, utils::format_fecha_larga};

const CONFIRMATION_TEMPLATE: &str = "./templates/confirmation_email.html";

pub struct EmailService {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
    from_address: String,
    platform_name: String,
}

impl EmailService {
    pub fn new(
        smtp_host: &str,
        smtp_user: &str,
        smtp_pass: &str,
        platform_name: &str,
    ) -> Result<Self> {
        let creds = Credentials::new(smtp_user.to_string(), smtp_pass.to_string());

        let mailer = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(smtp_host)?
            .credentials(creds)
            .build();

        Ok(Self {
            mailer,
            from_address: smtp_user.to_string(),
            platform_name: platform_name.to_string(),
        })
    }

    pub fn load_template(&self, path: &str) -> Result<String> {
        let template = fs::read_to_string(path)?;
        Ok(template)
    }

    fn render(&self, template: &str, data: &Value) -> String {
        let mut body = template.to_string();
        for (key, value) in data.as_object().into_iter().flatten() {
            let placeholder = format!("{{{{{key}}}}}");
            body = body.replace(&placeholder, value.as_str().unwrap_or_default());
        }
        body
    }

    /// Sends the confirmation message for a fully-populated record. Runs in a
    /// detached task; the booking response never waits on it.
    pub async fn send_confirmation(&self, appointment: &Appointment) -> Result<()> {
        let data = serde_json::json!({
            "nombres": appointment.nombres,
            "apellidos": appointment.apellidos,
            "tramite": appointment.tramite,
            "institucion": appointment.institucion,
            "cedula": appointment.cedula,
            "correo_electronico": appointment.correo_electronico,
            "telefono": appointment.telefono,
            "direccion": appointment.direccion,
            "fecha_formateada": format_fecha_larga(&appointment.fecha_cita),
            "confirmation_code": appointment.confirmation_code,
            "qr_image_data_url": appointment.qr_image_data_url,
            "platform_name": self.platform_name,
        });

        let template = self.load_template(CONFIRMATION_TEMPLATE)?;
        let body = self.render(&template, &data);

        let email = Message::builder()
            .from(self.from_address.parse()?)
            .to(appointment.correo_electronico.parse()?)
            .subject("Confirmación de Cita Puntos GOB")
            .header(ContentType::TEXT_HTML)
            .body(body)?;

        self.mailer.send(email).await?;

        Ok(())
    }
}
