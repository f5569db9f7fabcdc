//! Reader and writer for the SAC binary time-series format.
//!
//! Only the fields needed to rebuild an evenly sampled trace are interpreted:
//! `delta`, `b`, `npts`, `nvhdr`, `leven`, `kstnm` and `kcmpnm`. Everything
//! else is written as the SAC "undefined" sentinel.

use super::discovery::ComponentGroup;
use super::traits::{LoadError, RecordingLoader};
use crate::core::models::recording::{RecordingSet, ThreeComponentRecording};
use crate::core::models::timeseries::{TimeSeries, TimeSeriesError};
use byteorder::{BigEndian, ByteOrder, LittleEndian, WriteBytesExt};
use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::Path;
use thiserror::Error;
use tracing::{debug, info};

const HEADER_FLOATS: usize = 70;
const HEADER_INTS: usize = 40;
const HEADER_STRING_BYTES: usize = 192;
const INT_OFFSET: usize = HEADER_FLOATS * 4;
const STRING_OFFSET: usize = INT_OFFSET + HEADER_INTS * 4;
const HEADER_LEN: usize = STRING_OFFSET + HEADER_STRING_BYTES;

const UNDEFINED_FLOAT: f32 = -12345.0;
const UNDEFINED_INT: i32 = -12345;
const UNDEFINED_STRING: &[u8; 8] = b"-12345  ";

const F_DELTA: usize = 0;
const F_DEPMIN: usize = 1;
const F_DEPMAX: usize = 2;
const F_B: usize = 5;
const F_E: usize = 6;
const F_DEPMEN: usize = 56;

const I_NVHDR: usize = 6;
const I_NPTS: usize = 9;
const I_IFTYPE: usize = 15;
const I_LEVEN: usize = 35;
const I_LPSPOL: usize = 36;
const I_LOVROK: usize = 37;
const I_LCALDA: usize = 38;

const S_KSTNM: usize = 0;
const S_KCMPNM: usize = 160;

const IFTYPE_TIME: i32 = 1;
const SUPPORTED_VERSIONS: [i32; 2] = [6, 7];

#[derive(Debug, Error)]
pub enum SacError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("File is too short: expected at least {expected} bytes, found {found}")]
    Truncated { expected: usize, found: usize },
    #[error("Unsupported or unrecognised SAC header version")]
    UnknownVersion,
    #[error("Invalid header field '{field}': {value}")]
    InvalidHeader { field: &'static str, value: String },
    #[error("Unevenly sampled SAC files are not supported")]
    UnevenlySampled,
    #[error(transparent)]
    TimeSeries(#[from] TimeSeriesError),
}

/// An evenly sampled SAC trace.
#[derive(Debug, Clone, PartialEq)]
pub struct SacTrace {
    pub delta: f32,
    pub begin: f32,
    pub station: Option<String>,
    pub component: Option<String>,
    pub data: Vec<f32>,
}

impl SacTrace {
    pub fn from_time_series(
        series: &TimeSeries,
        station: Option<&str>,
        component: Option<&str>,
    ) -> Self {
        Self {
            delta: series.dt() as f32,
            begin: 0.0,
            station: station.map(str::to_string),
            component: component.map(str::to_string),
            data: series.amplitude().iter().map(|&v| v as f32).collect(),
        }
    }

    pub fn to_time_series(&self) -> Result<TimeSeries, SacError> {
        let amplitude = self.data.iter().map(|&v| f64::from(v)).collect();
        Ok(TimeSeries::new(f64::from(self.delta), amplitude)?)
    }

    pub fn read_from(reader: &mut impl Read) -> Result<Self, SacError> {
        let mut buf = Vec::new();
        reader.read_to_end(&mut buf)?;
        Self::parse(&buf)
    }

    pub fn read_from_path<P: AsRef<Path>>(path: P) -> Result<Self, SacError> {
        let file = File::open(path)?;
        let mut reader = BufReader::new(file);
        Self::read_from(&mut reader)
    }

    /// Writes the trace as a little-endian version 6 file.
    pub fn write_to(&self, writer: &mut impl Write) -> Result<(), SacError> {
        let npts = i32::try_from(self.data.len()).map_err(|_| SacError::InvalidHeader {
            field: "npts",
            value: self.data.len().to_string(),
        })?;

        let mut floats = [UNDEFINED_FLOAT; HEADER_FLOATS];
        floats[F_DELTA] = self.delta;
        floats[F_B] = self.begin;
        floats[F_E] = self.begin + self.delta * (self.data.len().saturating_sub(1)) as f32;
        if !self.data.is_empty() {
            let (min, max, sum) = self.data.iter().fold(
                (f32::INFINITY, f32::NEG_INFINITY, 0.0f64),
                |(min, max, sum), &v| (min.min(v), max.max(v), sum + f64::from(v)),
            );
            floats[F_DEPMIN] = min;
            floats[F_DEPMAX] = max;
            floats[F_DEPMEN] = (sum / self.data.len() as f64) as f32;
        }

        let mut ints = [UNDEFINED_INT; HEADER_INTS];
        ints[I_NVHDR] = 6;
        ints[I_NPTS] = npts;
        ints[I_IFTYPE] = IFTYPE_TIME;
        ints[I_LEVEN] = 1;
        ints[I_LPSPOL] = 0;
        ints[I_LOVROK] = 1;
        ints[I_LCALDA] = 0;
        ints[HEADER_INTS - 1] = 0;

        let mut strings = [0u8; HEADER_STRING_BYTES];
        for slot in strings.chunks_exact_mut(8) {
            slot.copy_from_slice(UNDEFINED_STRING);
        }
        if let Some(station) = &self.station {
            write_string_field(&mut strings[S_KSTNM..S_KSTNM + 8], station);
        }
        if let Some(component) = &self.component {
            write_string_field(&mut strings[S_KCMPNM..S_KCMPNM + 8], component);
        }

        for value in floats {
            writer.write_f32::<LittleEndian>(value)?;
        }
        for value in ints {
            writer.write_i32::<LittleEndian>(value)?;
        }
        writer.write_all(&strings)?;
        for &sample in &self.data {
            writer.write_f32::<LittleEndian>(sample)?;
        }
        writer.flush()?;
        Ok(())
    }

    pub fn write_to_path<P: AsRef<Path>>(&self, path: P) -> Result<(), SacError> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        self.write_to(&mut writer)
    }

    fn parse(buf: &[u8]) -> Result<Self, SacError> {
        if buf.len() < HEADER_LEN {
            return Err(SacError::Truncated {
                expected: HEADER_LEN,
                found: buf.len(),
            });
        }

        let version_bytes = &buf[INT_OFFSET + I_NVHDR * 4..INT_OFFSET + I_NVHDR * 4 + 4];
        if SUPPORTED_VERSIONS.contains(&LittleEndian::read_i32(version_bytes)) {
            Self::parse_with::<LittleEndian>(buf)
        } else if SUPPORTED_VERSIONS.contains(&BigEndian::read_i32(version_bytes)) {
            Self::parse_with::<BigEndian>(buf)
        } else {
            Err(SacError::UnknownVersion)
        }
    }

    fn parse_with<B: ByteOrder>(buf: &[u8]) -> Result<Self, SacError> {
        let float_at = |index: usize| B::read_f32(&buf[index * 4..index * 4 + 4]);
        let int_at = |index: usize| {
            let start = INT_OFFSET + index * 4;
            B::read_i32(&buf[start..start + 4])
        };

        let delta = float_at(F_DELTA);
        if !delta.is_finite() || delta <= 0.0 {
            return Err(SacError::InvalidHeader {
                field: "delta",
                value: delta.to_string(),
            });
        }
        let npts = int_at(I_NPTS);
        let npts = usize::try_from(npts).map_err(|_| SacError::InvalidHeader {
            field: "npts",
            value: npts.to_string(),
        })?;
        if int_at(I_LEVEN) == 0 {
            return Err(SacError::UnevenlySampled);
        }

        let expected = HEADER_LEN + npts * 4;
        if buf.len() < expected {
            return Err(SacError::Truncated {
                expected,
                found: buf.len(),
            });
        }

        let begin = match float_at(F_B) {
            b if b == UNDEFINED_FLOAT => 0.0,
            b => b,
        };
        let strings = &buf[STRING_OFFSET..HEADER_LEN];
        let data = buf[HEADER_LEN..expected]
            .chunks_exact(4)
            .map(B::read_f32)
            .collect();

        Ok(Self {
            delta,
            begin,
            station: read_string_field(&strings[S_KSTNM..S_KSTNM + 8]),
            component: read_string_field(&strings[S_KCMPNM..S_KCMPNM + 8]),
            data,
        })
    }
}

fn write_string_field(slot: &mut [u8], value: &str) {
    slot.fill(b' ');
    for (dst, src) in slot.iter_mut().zip(value.bytes()) {
        *dst = src;
    }
}

fn read_string_field(slot: &[u8]) -> Option<String> {
    let text = String::from_utf8_lossy(slot);
    let text = text.trim_end_matches(['\0', ' ']).trim();
    if text.is_empty() || text == "-12345" {
        None
    } else {
        Some(text.to_string())
    }
}

/// `delta` is stored as `f32`, so equal rates may differ in the last bits.
const DT_RELATIVE_TOLERANCE: f64 = 1e-6;

/// Loads three-channel groups of SAC files into a [`RecordingSet`].
#[derive(Debug, Default, Clone, Copy)]
pub struct SacLoader;

impl SacLoader {
    fn load_component(path: &Path) -> Result<TimeSeries, LoadError> {
        let to_load_error = |source| LoadError::Sac {
            path: path.to_path_buf(),
            source,
        };
        SacTrace::read_from_path(path)
            .and_then(|trace| trace.to_time_series())
            .map_err(to_load_error)
    }

    fn check_sample_intervals(record: &ThreeComponentRecording) -> Result<(), LoadError> {
        let (east, north, vertical) = (record.ew.dt(), record.ns.dt(), record.vt.dt());
        let same = |a: f64, b: f64| (a - b).abs() <= DT_RELATIVE_TOLERANCE * a.abs().max(b.abs());
        if same(east, vertical) && same(north, vertical) {
            return Ok(());
        }
        Err(LoadError::SampleIntervalMismatch {
            prefix: record.name.clone(),
            east,
            north,
            vertical,
        })
    }
}

impl RecordingLoader for SacLoader {
    fn load(&self, groups: &[ComponentGroup]) -> Result<RecordingSet, LoadError> {
        if groups.is_empty() {
            return Err(LoadError::NoGroups);
        }

        let mut records = Vec::with_capacity(groups.len());
        for group in groups {
            debug!("Loading SAC channel group '{}'.", group.prefix);
            let record = ThreeComponentRecording {
                name: group.prefix.clone(),
                ns: Self::load_component(&group.north)?,
                ew: Self::load_component(&group.east)?,
                vt: Self::load_component(&group.vertical)?,
            };
            Self::check_sample_intervals(&record)?;
            debug!(
                samples = record.vt.n_samples(),
                dt = record.vt.dt(),
                "Loaded '{}'.",
                group.prefix
            );
            records.push(record);
        }

        info!("Loaded {} recording(s).", records.len());
        Ok(RecordingSet::new(records))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use byteorder::WriteBytesExt;
    use std::io::Cursor;
    use tempfile::tempdir;

    fn sample_trace() -> SacTrace {
        SacTrace {
            delta: 0.01,
            begin: 0.0,
            station: Some("KSTA".to_string()),
            component: Some("HHZ".to_string()),
            data: vec![0.5, -1.25, 3.0, 0.0, 2.5],
        }
    }

    #[test]
    fn written_trace_reads_back_with_same_samples_and_header() {
        let trace = sample_trace();
        let mut bytes = Vec::new();
        trace.write_to(&mut bytes).unwrap();

        assert_eq!(bytes.len(), HEADER_LEN + 5 * 4);

        let parsed = SacTrace::read_from(&mut Cursor::new(bytes)).unwrap();
        assert_eq!(parsed, trace);
    }

    #[test]
    fn big_endian_files_are_detected() {
        let mut bytes = Vec::new();
        for index in 0..HEADER_FLOATS {
            let value = if index == F_DELTA { 0.5 } else { UNDEFINED_FLOAT };
            bytes.write_f32::<BigEndian>(value).unwrap();
        }
        for index in 0..HEADER_INTS {
            let value = match index {
                I_NVHDR => 6,
                I_NPTS => 3,
                I_LEVEN => 1,
                _ => UNDEFINED_INT,
            };
            bytes.write_i32::<BigEndian>(value).unwrap();
        }
        bytes.extend(std::iter::repeat_n(b' ', HEADER_STRING_BYTES));
        for sample in [1.0f32, 2.0, 3.0] {
            bytes.write_f32::<BigEndian>(sample).unwrap();
        }

        let parsed = SacTrace::read_from(&mut Cursor::new(bytes)).unwrap();
        assert_eq!(parsed.delta, 0.5);
        assert_eq!(parsed.begin, 0.0);
        assert_eq!(parsed.station, None);
        assert_eq!(parsed.data, vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn truncated_data_section_is_rejected() {
        let mut bytes = Vec::new();
        sample_trace().write_to(&mut bytes).unwrap();
        bytes.truncate(HEADER_LEN + 8);

        let err = SacTrace::read_from(&mut Cursor::new(bytes)).unwrap_err();
        assert!(matches!(err, SacError::Truncated { .. }));
    }

    #[test]
    fn garbage_header_is_rejected() {
        let bytes = vec![0u8; HEADER_LEN];
        let err = SacTrace::read_from(&mut Cursor::new(bytes)).unwrap_err();
        assert!(matches!(err, SacError::UnknownVersion));
    }

    #[test]
    fn loader_builds_one_recording_per_group() {
        let dir = tempdir().unwrap();
        let group = ComponentGroup {
            prefix: "SITE".to_string(),
            east: dir.path().join("SITE.E.sac"),
            north: dir.path().join("SITE.N.sac"),
            vertical: dir.path().join("SITE.Z.sac"),
        };
        for (path, offset) in [(&group.east, 0.0), (&group.north, 10.0), (&group.vertical, 20.0)] {
            let series = TimeSeries::new(0.01, vec![offset, offset + 1.0]).unwrap();
            SacTrace::from_time_series(&series, Some("SITE"), None)
                .write_to_path(path)
                .unwrap();
        }

        let set = SacLoader.load(std::slice::from_ref(&group)).unwrap();

        assert_eq!(set.len(), 1);
        let record = &set.records()[0];
        assert_eq!(record.name, "SITE");
        assert_eq!(record.ew.amplitude(), &[0.0, 1.0]);
        assert_eq!(record.ns.amplitude(), &[10.0, 11.0]);
        assert_eq!(record.vt.amplitude(), &[20.0, 21.0]);
        assert!((record.vt.dt() - 0.01).abs() < 1e-9);
    }

    #[test]
    fn loader_rejects_channels_with_different_sample_intervals() {
        let dir = tempdir().unwrap();
        let group = ComponentGroup {
            prefix: "SITE".to_string(),
            east: dir.path().join("SITE.E.sac"),
            north: dir.path().join("SITE.N.sac"),
            vertical: dir.path().join("SITE.Z.sac"),
        };
        for (path, dt) in [(&group.east, 0.01), (&group.north, 0.02), (&group.vertical, 0.01)] {
            let series = TimeSeries::new(dt, vec![0.0, 1.0, 2.0]).unwrap();
            SacTrace::from_time_series(&series, Some("SITE"), None)
                .write_to_path(path)
                .unwrap();
        }

        let err = SacLoader.load(&[group]).unwrap_err();
        match err {
            LoadError::SampleIntervalMismatch { prefix, north, .. } => {
                assert_eq!(prefix, "SITE");
                assert!((north - 0.02).abs() < 1e-9);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn loader_reports_path_of_unreadable_component() {
        let dir = tempdir().unwrap();
        let group = ComponentGroup {
            prefix: "SITE".to_string(),
            east: dir.path().join("missing.E.sac"),
            north: dir.path().join("missing.N.sac"),
            vertical: dir.path().join("missing.Z.sac"),
        };

        let err = SacLoader.load(&[group]).unwrap_err();
        match err {
            LoadError::Sac { path, .. } => assert!(path.ends_with("missing.N.sac")),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
