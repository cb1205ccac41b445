pub mod appointment_service;
pub mod email_service;
pub mod qr_service;
pub mod slot_service;
