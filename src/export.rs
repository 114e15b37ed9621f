//! Spreadsheet export of the visible signal rows.

use chrono::NaiveDateTime;
use rust_xlsxwriter::{Workbook, XlsxError};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::signals::time::parse_display;
use crate::signals::{HitStatus, SignalRow};

pub const SHEET_NAME: &str = "Signals";

/// Export target price is a fixed +1.6% over the prediction-time price.
const TARGET_MULTIPLIER: f64 = 1.016;

const FILE_STAMP: &str = "%d%m%Y_%H%M";

pub const HEADERS: [&str; 16] = [
    "#",
    "ASSET (Symbol)",
    "ASSET CONTRACT",
    "PREDICTION TIME PRICE (USDT)",
    "TARGET PRICE (USDT)",
    "CURRENT PRICE (USDT)",
    "NOW DIFF (%)",
    "SIGNAL",
    "TARGET DIFF (%)",
    "TP (%)",
    "SL (%)",
    "RRR",
    "Predicted At",
    "Expires At",
    "HIT STATUS",
    "HIT TIME",
];

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("failed to write {path}: {source}")]
    Xlsx {
        path: PathBuf,
        #[source]
        source: XlsxError,
    },
}

/// Sheet contents, ready to be written.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportSheet {
    pub rows: Vec<[String; 16]>,
    pub file_name: String,
}

impl ExportSheet {
    /// Widest cell (or header) per column, plus 2.
    pub fn column_widths(&self) -> Vec<usize> {
        HEADERS
            .iter()
            .enumerate()
            .map(|(col, header)| {
                let widest = self
                    .rows
                    .iter()
                    .map(|r| r[col].chars().count())
                    .max()
                    .unwrap_or(0);
                widest.max(header.chars().count()) + 2
            })
            .collect()
    }
}

fn fixed(v: Option<f64>, places: usize) -> String {
    let v = v.filter(|x| x.is_finite()).unwrap_or(0.0);
    format!("{v:.places$}")
}

fn text_or_na(v: Option<&str>) -> String {
    match v {
        Some(s) if !s.is_empty() => s.to_string(),
        _ => "N/A".to_string(),
    }
}

fn export_row(index: usize, row: &SignalRow) -> [String; 16] {
    let s = &row.signal;
    let current = s
        .current_price
        .as_deref()
        .and_then(|p| p.trim().parse::<f64>().ok());
    let target = s.price_at_prediction.map(|p| p * TARGET_MULTIPLIER);

    [
        (index + 1).to_string(),
        row.asset_label(),
        text_or_na(s.pair_address.as_deref()),
        fixed(s.price_at_prediction, 8),
        fixed(target, 8),
        fixed(current, 8),
        text_or_na(s.now_diff_percent.as_deref()),
        row.signal_label().to_string(),
        text_or_na(s.target_diff_percent.as_deref()),
        fixed(s.tp_percentage, 3),
        fixed(s.sl_percentage, 3),
        fixed(s.risk_reward_ratio, 2),
        row.predicted_at.clone(),
        row.expires_at.clone(),
        match &s.hit_status {
            HitStatus::Missing => "N/A".to_string(),
            status => status.as_str().to_string(),
        },
        text_or_na(s.hit_time.as_deref()),
    ]
}

fn stamp(t: Option<NaiveDateTime>, fallback: &str) -> String {
    t.map(|t| t.format(FILE_STAMP).to_string())
        .unwrap_or_else(|| fallback.to_string())
}

/// `pancake_price_predictions_{earliest predicted}_to_{latest expiry}.xlsx`,
/// using the displayed (zone-local) times.
pub fn file_name(rows: &[SignalRow]) -> String {
    let earliest = rows.iter().filter_map(|r| parse_display(&r.predicted_at)).min();
    let latest = rows.iter().filter_map(|r| parse_display(&r.expires_at)).max();
    format!(
        "pancake_price_predictions_{}_to_{}.xlsx",
        stamp(earliest, "unknown_start"),
        stamp(latest, "unknown_end")
    )
}

pub fn build_export(rows: &[SignalRow]) -> ExportSheet {
    ExportSheet {
        rows: rows.iter().enumerate().map(|(i, r)| export_row(i, r)).collect(),
        file_name: file_name(rows),
    }
}

/// Write `sheet` into `dir`, returning the full path.
pub fn write_xlsx(sheet: &ExportSheet, dir: &Path) -> Result<PathBuf, ExportError> {
    let path = dir.join(&sheet.file_name);
    let err = |source| ExportError::Xlsx {
        path: path.clone(),
        source,
    };

    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(SHEET_NAME).map_err(err)?;

    for (col, header) in HEADERS.iter().enumerate() {
        worksheet.write_string(0, col as u16, *header).map_err(err)?;
    }
    for (i, row) in sheet.rows.iter().enumerate() {
        let r = (i + 1) as u32;
        for (col, cell) in row.iter().enumerate() {
            // serial number is numeric, everything else keeps its formatting
            let written = match (col, cell.parse::<f64>()) {
                (0, Ok(n)) => worksheet.write_number(r, 0, n),
                _ => worksheet.write_string(r, col as u16, cell),
            };
            written.map_err(err)?;
        }
    }
    for (col, width) in sheet.column_widths().into_iter().enumerate() {
        worksheet
            .set_column_width(col as u16, width as f64)
            .map_err(err)?;
    }

    workbook.save(&path).map_err(err)?;
    tracing::info!(path = %path.display(), rows = sheet.rows.len(), "exported signals");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signals::{normalize, HitStatus, Signal, SignalKind, TokenDirectory};
    use chrono_tz::Tz;

    fn rows() -> Vec<SignalRow> {
        let cake = Signal {
            pair_name: "CAKE/USDT".to_string(),
            signal: SignalKind::Buy,
            hit_status: HitStatus::Reached,
            price_at_prediction: Some(2.5),
            current_price: Some("2.61".to_string()),
            tp_percentage: Some(1.5),
            risk_reward_ratio: Some(1.875),
            pair_address: Some("0x0E09FaBB73Bd3Ade0a17ECC321fD13a19e81cE82".to_string()),
            predicted_time: Some("2024.01.15 10:00:00".to_string()),
            expiry_time: Some("2024.01.15 14:00:00".to_string()),
            hit_time: Some("2024.01.15 11:30:00".to_string()),
            ..Default::default()
        };
        let eth = Signal {
            pair_name: "ETH/USDT".to_string(),
            signal: SignalKind::Hold,
            predicted_time: Some("2024.01.14 23:30:00".to_string()),
            expiry_time: Some("garbage".to_string()),
            ..Default::default()
        };
        normalize(vec![cake, eth], &TokenDirectory::builtin(), Tz::UTC)
    }

    #[test]
    fn test_export_row() {
        let sheet = build_export(&rows());
        let r = &sheet.rows[0];
        assert_eq!(r[0], "1");
        assert_eq!(r[1], "PANCAKESWAP (CAKE)");
        assert_eq!(r[2], "0x0E09FaBB73Bd3Ade0a17ECC321fD13a19e81cE82");
        assert_eq!(r[3], "2.50000000");
        assert_eq!(r[4], "2.54000000");
        assert_eq!(r[5], "2.61000000");
        assert_eq!(r[7], "Buy - Reached");
        assert_eq!(r[9], "1.500");
        assert_eq!(r[10], "0.000");
        assert_eq!(r[11], "1.88");
        assert_eq!(r[12], "15.01.2024 09:00:00");

        let eth = &sheet.rows[1];
        assert_eq!(eth[2], "N/A");
        assert_eq!(eth[7], "No Action");
        assert_eq!(eth[13], "Invalid Date");
    }

    #[test]
    fn test_hit_columns_are_upstream_values() {
        let sheet = build_export(&rows());
        // raw upstream time, not the zone-local rendering
        let cake = &sheet.rows[0];
        assert_eq!(cake[14], "Reached");
        assert_eq!(cake[15], "2024.01.15 11:30:00");

        let eth = &sheet.rows[1];
        assert_eq!(eth[14], "N/A");
        assert_eq!(eth[15], "N/A");
    }

    #[test]
    fn test_file_name_range() {
        // earliest predicted across rows, latest valid expiry
        assert_eq!(
            file_name(&rows()),
            "pancake_price_predictions_14012024_2230_to_15012024_1300.xlsx"
        );
    }

    #[test]
    fn test_empty_is_header_only() {
        let sheet = build_export(&[]);
        assert!(sheet.rows.is_empty());
        assert_eq!(
            sheet.file_name,
            "pancake_price_predictions_unknown_start_to_unknown_end.xlsx"
        );
        let widths = sheet.column_widths();
        assert_eq!(widths[0], 3);
        assert_eq!(widths[3], "PREDICTION TIME PRICE (USDT)".len() + 2);
    }

    #[test]
    fn test_write_xlsx() {
        let dir = tempfile::tempdir().unwrap();
        let sheet = build_export(&rows());
        let path = write_xlsx(&sheet, dir.path()).unwrap();
        assert!(path.exists());
        assert!(std::fs::metadata(&path).unwrap().len() > 0);

        let empty = write_xlsx(&build_export(&[]), dir.path()).unwrap();
        assert!(empty.exists());
    }
}
