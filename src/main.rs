use std::sync::Arc;

use actix_web::{middleware::Logger, web, App, HttpServer};
use color_eyre::Result;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use citas_gob::{
    config::{config::Config, crypto::CryptoService, routes::routes},
    service::{
        appointment_service::AppointmentService, email_service::EmailService,
        qr_service::QrService,
    },
};

#[actix_web::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env()?;
    let pool = config.db_pool().await?;
    AppointmentService::init_schema(&pool).await?;

    // Mail is best-effort: missing credentials disable dispatch, never abort
    // startup.
    let email_service = match (&config.sender_email, &config.sender_password) {
        (Some(user), Some(pass)) => Some(Arc::new(EmailService::new(
            &config.smtp_host,
            user,
            pass,
            &config.platform_name,
        )?)),
        _ => {
            warn!("SENDER_EMAIL or SENDER_PASSWORD not set; confirmation emails will not be sent");
            None
        }
    };

    let service = web::Data::new(AppointmentService::new(
        pool,
        CryptoService::default(),
        QrService::default(),
        email_service,
    ));

    info!("Citas {} listening on {}:{}", config.platform_name, config.host, config.port);
    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .app_data(service.clone())
            .configure(routes)
    })
    .bind((config.host.clone(), config.port))?
    .run()
    .await?;

    Ok(())
}
