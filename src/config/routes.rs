use crate::controllers::appointment_controller;
use actix_web::web;

pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(appointment_controller::index))
        .route(
            "/confirmar-cita",
            web::post().to(appointment_controller::confirmar_cita),
        )
        .route(
            "/cita-confirmada",
            web::get().to(appointment_controller::cita_confirmada),
        )
        .route(
            "/api/available-slots",
            web::get().to(appointment_controller::available_slots),
        );
}
