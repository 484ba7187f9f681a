//! Display helpers: lab labels and result dates.

use labres_storage::Lab;
use time::macros::format_description;
use time::OffsetDateTime;

/// Shown in place of a lab that is not in the loaded directory.
pub const UNKNOWN_LAB: &str = "Laboratorio desconocido";

/// Shown in place of a timestamp that cannot be represented as a date.
pub const INVALID_DATE: &str = "Fecha inválida";

/// Which lab field a label shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabLabel {
    Name,
    KeyName,
}

/// Label for `lab_id`, or [`UNKNOWN_LAB`] when the directory has no such lab.
pub fn label_for<'a>(lab_id: i64, directory: &'a [Lab], label: LabLabel) -> &'a str {
    match directory.iter().find(|lab| lab.id == lab_id) {
        Some(lab) => match label {
            LabLabel::Name => &lab.name,
            LabLabel::KeyName => &lab.key_name,
        },
        None => UNKNOWN_LAB,
    }
}

/// Short Spanish date (`d/m/yyyy`, no zero padding) for a millisecond
/// timestamp, in UTC.
pub fn format_date(timestamp_ms: i64) -> String {
    let nanos = i128::from(timestamp_ms) * 1_000_000;
    let format = format_description!("[day padding:none]/[month padding:none]/[year]");
    OffsetDateTime::from_unix_timestamp_nanos(nanos)
        .ok()
        .and_then(|dt| dt.format(&format).ok())
        .unwrap_or_else(|| INVALID_DATE.to_string())
}
