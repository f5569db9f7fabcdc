use super::SeriesError;
use std::io::{Read, Write};

pub const HEADER: [&str; 3] = ["time_interval_sec", "peak_frequency", "relative_error"];

/// The first two columns of a duration report: a label per row (normally
/// the record duration) and the peak frequency measured for it.
#[derive(Debug, Clone, PartialEq)]
pub struct PeakSeries {
    pub labels: Vec<String>,
    pub peaks: Vec<f64>,
}

impl PeakSeries {
    pub fn read<R: Read>(reader: R) -> Result<Self, SeriesError> {
        let mut csv_reader = csv::Reader::from_reader(reader);
        let columns = csv_reader.headers()?.len();
        if columns < 2 {
            return Err(SeriesError::TooFewColumns {
                found: columns,
                required: 2,
            });
        }

        let mut labels = Vec::new();
        let mut peaks = Vec::new();
        for (row, record) in csv_reader.records().enumerate() {
            let record = record?;
            let label = record.get(0).unwrap_or_default();
            let raw = record.get(1).unwrap_or_default().trim();
            let peak = raw
                .parse::<f64>()
                .ok()
                .filter(|p| p.is_finite())
                .ok_or_else(|| SeriesError::NonNumericPeak {
                    row: row + 1,
                    value: raw.to_string(),
                })?;
            labels.push(label.to_string());
            peaks.push(peak);
        }

        if peaks.is_empty() {
            return Err(SeriesError::Empty);
        }
        if peaks[0] == 0.0 {
            return Err(SeriesError::ZeroReference);
        }
        Ok(Self { labels, peaks })
    }

    pub fn reference(&self) -> f64 {
        self.peaks[0]
    }

    /// `|(f - f_ref) / f_ref|` for every row, with the first row as reference.
    pub fn relative_errors(&self) -> Vec<f64> {
        let reference = self.reference();
        self.peaks
            .iter()
            .map(|f| ((f - reference) / reference).abs())
            .collect()
    }

    pub fn write_relative_errors<W: Write>(&self, writer: W) -> Result<(), csv::Error> {
        let mut csv_writer = csv::Writer::from_writer(writer);
        csv_writer.write_record(HEADER)?;
        for ((label, peak), error) in self
            .labels
            .iter()
            .zip(&self.peaks)
            .zip(self.relative_errors())
        {
            csv_writer.write_record([label.clone(), peak.to_string(), error.to_string()])?;
        }
        csv_writer.flush()?;
        Ok(())
    }
}
