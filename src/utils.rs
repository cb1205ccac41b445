use chrono::{Datelike, NaiveDate};

const MESES: [&str; 12] = [
    "enero",
    "febrero",
    "marzo",
    "abril",
    "mayo",
    "junio",
    "julio",
    "agosto",
    "septiembre",
    "octubre",
    "noviembre",
    "diciembre",
];

/// Formats "2025-03-10" as "10 de marzo de 2025". Falls back to the raw
/// value when the stored date does not parse.
pub fn format_fecha_larga(fecha: &str) -> String {
    match NaiveDate::parse_from_str(fecha, "%Y-%m-%d") {
        Ok(date) => format!(
            "{} de {} de {}",
            date.day(),
            MESES[date.month0() as usize],
            date.year()
        ),
        Err(_) => fecha.to_string(),
    }
}
