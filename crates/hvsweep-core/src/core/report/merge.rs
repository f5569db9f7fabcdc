use super::SeriesError;
use std::io::{Read, Write};

pub const LABEL_HEADER: &str = "time_interval_sec";
pub const SUMMARY_HEADER: [&str; 7] = [LABEL_HEADER, "count", "min", "q1", "median", "q3", "max"];

/// The relative-error column of one site's report.
#[derive(Debug, Clone, PartialEq)]
pub struct ErrorColumn {
    pub name: String,
    pub labels: Vec<String>,
    pub values: Vec<String>,
}

impl ErrorColumn {
    /// Reads column 1 as labels and column 3 as values.
    pub fn read<R: Read>(name: impl Into<String>, reader: R) -> Result<Self, SeriesError> {
        let mut csv_reader = csv::Reader::from_reader(reader);
        let columns = csv_reader.headers()?.len();
        if columns < 3 {
            return Err(SeriesError::TooFewColumns {
                found: columns,
                required: 3,
            });
        }

        let mut labels = Vec::new();
        let mut values = Vec::new();
        for record in csv_reader.records() {
            let record = record?;
            labels.push(record.get(0).unwrap_or_default().to_string());
            values.push(record.get(2).unwrap_or_default().trim().to_string());
        }
        Ok(Self {
            name: name.into(),
            labels,
            values,
        })
    }
}

/// Error columns of several sites side by side, aligned by row position.
#[derive(Debug, Clone, PartialEq)]
pub struct MergedTable {
    pub labels: Vec<String>,
    pub columns: Vec<ErrorColumn>,
}

impl MergedTable {
    /// Labels come from the first column; the table is as long as the
    /// longest column.
    pub fn new(columns: Vec<ErrorColumn>) -> Self {
        let rows = columns.iter().map(|c| c.values.len()).max().unwrap_or(0);
        let mut labels = columns
            .first()
            .map(|c| c.labels.clone())
            .unwrap_or_default();
        labels.resize(rows, String::new());
        Self { labels, columns }
    }

    pub fn row_count(&self) -> usize {
        self.labels.len()
    }

    pub fn cell(&self, row: usize, column: usize) -> Option<&str> {
        self.columns
            .get(column)
            .and_then(|c| c.values.get(row))
            .map(String::as_str)
    }

    pub fn write<W: Write>(&self, writer: W) -> Result<(), csv::Error> {
        let mut csv_writer = csv::Writer::from_writer(writer);
        let mut header = vec![LABEL_HEADER.to_string()];
        header.extend(self.columns.iter().map(|c| c.name.clone()));
        csv_writer.write_record(&header)?;

        for (row, label) in self.labels.iter().enumerate() {
            let mut record = vec![label.as_str()];
            record.extend((0..self.columns.len()).map(|col| self.cell(row, col).unwrap_or("")));
            csv_writer.write_record(&record)?;
        }
        csv_writer.flush()?;
        Ok(())
    }

    pub fn summaries(&self) -> Vec<RowSummary> {
        (0..self.row_count())
            .map(|row| {
                let values: Vec<f64> = (0..self.columns.len())
                    .filter_map(|col| self.cell(row, col))
                    .filter_map(|cell| cell.parse::<f64>().ok())
                    .filter(|v| v.is_finite())
                    .collect();
                RowSummary::from_values(self.labels[row].clone(), values)
            })
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FiveNumber {
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RowSummary {
    pub label: String,
    pub count: usize,
    pub stats: Option<FiveNumber>,
}

impl RowSummary {
    pub fn from_values(label: String, mut values: Vec<f64>) -> Self {
        values.sort_by(f64::total_cmp);
        let stats = (!values.is_empty()).then(|| FiveNumber {
            min: values[0],
            q1: quantile(&values, 0.25),
            median: quantile(&values, 0.5),
            q3: quantile(&values, 0.75),
            max: values[values.len() - 1],
        });
        Self {
            label,
            count: values.len(),
            stats,
        }
    }
}

/// Linear-interpolated quantile of an ascending, non-empty slice.
fn quantile(sorted: &[f64], q: f64) -> f64 {
    let position = q * (sorted.len() - 1) as f64;
    let lower = position.floor() as usize;
    let upper = position.ceil() as usize;
    let fraction = position - lower as f64;
    sorted[lower] + (sorted[upper] - sorted[lower]) * fraction
}

pub fn write_summaries<W: Write>(summaries: &[RowSummary], writer: W) -> Result<(), csv::Error> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record(SUMMARY_HEADER)?;
    for summary in summaries {
        let mut record = vec![summary.label.clone(), summary.count.to_string()];
        match summary.stats {
            Some(s) => record.extend([s.min, s.q1, s.median, s.q3, s.max].map(|v| v.to_string())),
            None => record.extend(std::iter::repeat_n(String::new(), 5)),
        }
        csv_writer.write_record(&record)?;
    }
    csv_writer.flush()?;
    Ok(())
}
