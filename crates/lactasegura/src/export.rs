//! On-demand CSV export of the record stores.
//!
//! Column headers match the Spanish-language reports the app has always
//! produced. Fields containing separators, quotes, or line breaks are quoted
//! RFC-4180 style; output is UTF-8.

use std::path::Path;

use tracing::info;

use crate::error::Result;
use crate::model::{BmiRecord, NamedRecord};

/// Default export file name for the IMC history.
pub const IMC_HISTORY_CSV: &str = "historial_imc.csv";

/// Default export file name for the named records.
pub const RECORDS_CSV: &str = "registros_lactasegura.csv";

/// Quote a field if it contains a separator, quote, or line break.
fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

fn csv_row(fields: &[String]) -> String {
    let mut row = fields
        .iter()
        .map(|f| csv_field(f))
        .collect::<Vec<_>>()
        .join(",");
    row.push('\n');
    row
}

/// Export the IMC history to a CSV file.
///
/// # Errors
///
/// Returns an error if the file cannot be written.
pub fn export_imc_history(records: &[BmiRecord], path: impl AsRef<Path>) -> Result<()> {
    let mut body = String::from("Fecha,Peso (kg),Talla (cm),Edad (meses),IMC,Interpretación\n");
    for record in records {
        body.push_str(&csv_row(&[
            record.timestamp.to_rfc3339(),
            record.weight_kg.to_string(),
            record.height_cm.to_string(),
            record.age_months.to_string(),
            record.bmi.to_string(),
            record.interpretation.replace('\n', " "),
        ]));
    }
    std::fs::write(path.as_ref(), body)?;
    info!(
        "exported {} history entries to {}",
        records.len(),
        path.as_ref().display()
    );
    Ok(())
}

/// Export the named records to a CSV file.
///
/// # Errors
///
/// Returns an error if the file cannot be written.
pub fn export_named_records(records: &[NamedRecord], path: impl AsRef<Path>) -> Result<()> {
    let mut body = String::from("ID,Fecha,Nombre,Edad (meses),Peso (kg),Observación\n");
    for record in records {
        body.push_str(&csv_row(&[
            record.id.clone(),
            record.timestamp.to_rfc3339(),
            record.name.clone(),
            record.age_months.to_string(),
            record.weight_kg.to_string(),
            record.observation.clone(),
        ]));
    }
    std::fs::write(path.as_ref(), body)?;
    info!(
        "exported {} records to {}",
        records.len(),
        path.as_ref().display()
    );
    Ok(())
}
