//! Hourly tide readings.
//!
//! Accepted CSV layouts:
//!
//! ```csv
//! Date,Height_m
//! 2020-05-01 00:00,3.41
//! 2020-05-01 01:00,3.02
//! ```
//!
//! or a bare column of heights, with or without a header row. The height
//! column is the one named `Height_m` or `height`, otherwise the last one.

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::{fs::File, io::Read, path::Path};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TideSeries {
    readings: Vec<f64>,
}

impl TideSeries {
    pub fn new(readings: Vec<f64>) -> Result<Self> {
        if readings.is_empty() {
            bail!("tide series must contain at least one reading");
        }
        if let Some(hour) = readings.iter().position(|val| !val.is_finite()) {
            bail!("tide reading at hour {hour} is not finite");
        }
        Ok(Self { readings })
    }

    pub fn from_file<P: AsRef<Path>>(file: P) -> Result<Self> {
        let file = file.as_ref();
        let reader = File::open(file).with_context(|| format!("failed to open {file:?}"))?;
        Self::from_reader(reader).with_context(|| format!("failed to read tides from {file:?}"))
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let mut col = None;
        let mut readings = Vec::new();
        for (i_row, record) in csv_reader.records().enumerate() {
            let record = record.with_context(|| format!("failed to parse row {i_row}"))?;
            if record.is_empty() {
                continue;
            }

            let i_col = match col {
                Some(i_col) => i_col,
                None => {
                    // First row decides the layout: a non-numeric height cell
                    // marks a header.
                    let i_col = height_column(&record);
                    col = Some(i_col);
                    let cell = record.get(i_col).unwrap_or_default();
                    if cell.parse::<f64>().is_err() {
                        continue;
                    }
                    i_col
                }
            };

            let cell = record
                .get(i_col)
                .with_context(|| format!("row {i_row} has no column {i_col}"))?;
            let height: f64 = cell
                .parse()
                .with_context(|| format!("invalid tide height {cell:?} in row {i_row}"))?;
            readings.push(height);
        }

        Self::new(readings)
    }

    pub fn readings(&self) -> &[f64] {
        &self.readings
    }

    pub fn len(&self) -> usize {
        self.readings.len()
    }

    pub fn get(&self, hour: usize) -> Option<f64> {
        self.readings.get(hour).copied()
    }

    /// Hour and height of the lowest reading (first one on ties).
    pub fn lowest(&self) -> (usize, f64) {
        self.extreme(|new, old| new < old)
    }

    /// Hour and height of the highest reading (first one on ties).
    pub fn highest(&self) -> (usize, f64) {
        self.extreme(|new, old| new > old)
    }

    fn extreme(&self, better: impl Fn(f64, f64) -> bool) -> (usize, f64) {
        let readings = self.readings();
        let mut best = (0, readings[0]);
        for (hour, &val) in readings.iter().enumerate().skip(1) {
            if better(val, best.1) {
                best = (hour, val);
            }
        }
        best
    }

    pub fn log_extremes(&self) {
        let (hour, val) = self.lowest();
        log::info!(
            "lowest tide reaches {val} m on day {} at {} hours",
            hour / 24,
            hour % 24
        );
        let (hour, val) = self.highest();
        log::info!(
            "highest tide reaches {val} m on day {} at {} hours",
            hour / 24,
            hour % 24
        );
    }
}

fn height_column(record: &csv::StringRecord) -> usize {
    record
        .iter()
        .position(|cell| {
            cell.eq_ignore_ascii_case("height_m") || cell.eq_ignore_ascii_case("height")
        })
        .unwrap_or(record.len() - 1)
}
