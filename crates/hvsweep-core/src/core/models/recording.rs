use super::timeseries::{TimeSeries, TrimError};
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Component {
    Ns,
    Ew,
    Vt,
}

impl Component {
    pub const ALL: [Component; 3] = [Component::Ns, Component::Ew, Component::Vt];
}

impl fmt::Display for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Component::Ns => "ns",
            Component::Ew => "ew",
            Component::Vt => "vt",
        };
        f.write_str(name)
    }
}

/// One three-component ambient noise recording.
#[derive(Debug, Clone, PartialEq)]
pub struct ThreeComponentRecording {
    pub name: String,
    pub ns: TimeSeries,
    pub ew: TimeSeries,
    pub vt: TimeSeries,
}

impl ThreeComponentRecording {
    pub fn component(&self, component: Component) -> &TimeSeries {
        match component {
            Component::Ns => &self.ns,
            Component::Ew => &self.ew,
            Component::Vt => &self.vt,
        }
    }

    pub fn component_mut(&mut self, component: Component) -> &mut TimeSeries {
        match component {
            Component::Ns => &mut self.ns,
            Component::Ew => &mut self.ew,
            Component::Vt => &mut self.vt,
        }
    }

    /// Cuts each component to its own last `seconds`, so channels that differ
    /// by a sample or two still end up with the same window length. With
    /// `clamp`, a component shorter than `seconds` is kept whole.
    fn trim_tail(&mut self, seconds: f64, clamp: bool) -> Result<(), TrimError> {
        for component in Component::ALL {
            let series = self.component_mut(component);
            let end = series.end_time();
            let start = if clamp {
                (end - seconds).max(0.0)
            } else {
                end - seconds
            };
            series.trim(start, end)?;
        }
        Ok(())
    }
}

/// The baseline dataset of a sweep.
///
/// `RecordingSet` is deliberately not `Clone`: the only way to obtain a copy
/// is [`RecordingSet::snapshot`], which the sweep driver calls once per
/// combination before handing ownership to the pipeline.
#[derive(Debug, PartialEq)]
pub struct RecordingSet {
    records: Vec<ThreeComponentRecording>,
}

impl RecordingSet {
    pub fn new(records: Vec<ThreeComponentRecording>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[ThreeComponentRecording] {
        &self.records
    }

    pub fn records_mut(&mut self) -> &mut [ThreeComponentRecording] {
        &mut self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Returns an independent deep copy of every recording.
    pub fn snapshot(&self) -> RecordingSet {
        RecordingSet {
            records: self.records.clone(),
        }
    }

    /// Cuts every recording to its last `seconds` of data.
    ///
    /// Fails when a recording is shorter than the requested duration.
    pub fn trim_to_last(&mut self, seconds: f64) -> Result<(), TrimError> {
        validate_duration(seconds)?;
        for record in &mut self.records {
            record.trim_tail(seconds, false)?;
        }
        Ok(())
    }

    /// Like [`RecordingSet::trim_to_last`], but recordings shorter than
    /// `seconds` are kept whole.
    pub fn keep_last(&mut self, seconds: f64) -> Result<(), TrimError> {
        validate_duration(seconds)?;
        for record in &mut self.records {
            record.trim_tail(seconds, true)?;
        }
        Ok(())
    }
}

fn validate_duration(seconds: f64) -> Result<(), TrimError> {
    if !seconds.is_finite() || seconds <= 0.0 {
        return Err(TrimError::InvalidDuration(seconds));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recording(name: &str, n: usize, dt: f64) -> ThreeComponentRecording {
        let series = |offset: f64| {
            TimeSeries::new(dt, (0..n).map(|i| i as f64 + offset).collect()).unwrap()
        };
        ThreeComponentRecording {
            name: name.to_string(),
            ns: series(0.0),
            ew: series(1000.0),
            vt: series(2000.0),
        }
    }

    #[test]
    fn snapshot_is_independent_of_the_original() {
        let baseline = RecordingSet::new(vec![recording("SITE", 100, 1.0)]);
        let mut copy = baseline.snapshot();

        copy.trim_to_last(10.0).unwrap();
        copy.records_mut()[0].ns.amplitude_mut()[0] = -1.0;

        assert_eq!(baseline.records()[0].ns.n_samples(), 100);
        assert_eq!(baseline.records()[0].ns.amplitude()[0], 0.0);
        assert_eq!(copy.records()[0].vt.n_samples(), 11);
    }

    #[test]
    fn trim_to_last_keeps_tail_of_every_component() {
        let mut set = RecordingSet::new(vec![recording("SITE", 101, 0.5)]);
        set.trim_to_last(5.0).unwrap();

        let rec = &set.records()[0];
        for component in Component::ALL {
            assert_eq!(rec.component(component).n_samples(), 11);
        }
        assert_eq!(rec.ns.amplitude()[0], 90.0);
        assert_eq!(rec.vt.amplitude()[10], 2100.0);
    }

    #[test]
    fn trim_to_last_fails_when_record_is_too_short() {
        let mut set = RecordingSet::new(vec![recording("SITE", 100, 1.0)]);
        let err = set.trim_to_last(500.0).unwrap_err();
        assert!(matches!(err, TrimError::OutOfRange { .. }));
    }

    #[test]
    fn keep_last_clamps_to_record_start() {
        let mut set = RecordingSet::new(vec![recording("SITE", 100, 1.0)]);
        set.keep_last(500.0).unwrap();
        assert_eq!(set.records()[0].ns.n_samples(), 100);
    }

    fn ragged_recording() -> ThreeComponentRecording {
        let series = |n: usize| TimeSeries::new(1.0, (0..n).map(|i| i as f64).collect()).unwrap();
        ThreeComponentRecording {
            name: "RAGGED".to_string(),
            ns: series(3600),
            ew: series(3601),
            vt: series(3601),
        }
    }

    #[test]
    fn components_one_sample_apart_trim_against_their_own_end() {
        let mut set = RecordingSet::new(vec![ragged_recording()]);
        set.keep_last(1000.0).unwrap();
        let rec = &set.records()[0];
        for component in Component::ALL {
            assert_eq!(rec.component(component).n_samples(), 1001);
        }
        assert_eq!(rec.ns.amplitude()[1000], 3599.0);
        assert_eq!(rec.ew.amplitude()[1000], 3600.0);

        let mut set = RecordingSet::new(vec![ragged_recording()]);
        set.trim_to_last(300.0).unwrap();
        let rec = &set.records()[0];
        for component in Component::ALL {
            assert_eq!(rec.component(component).n_samples(), 301);
        }
        assert_eq!(rec.ns.amplitude()[0], 3299.0);
        assert_eq!(rec.vt.amplitude()[0], 3300.0);
    }

    #[test]
    fn strict_trim_still_fails_when_the_shortest_component_is_too_short() {
        let mut set = RecordingSet::new(vec![ragged_recording()]);
        assert!(matches!(
            set.trim_to_last(3600.0),
            Err(TrimError::OutOfRange { .. })
        ));

        let mut set = RecordingSet::new(vec![ragged_recording()]);
        set.keep_last(3600.0).unwrap();
        assert_eq!(set.records()[0].ns.n_samples(), 3600);
        assert_eq!(set.records()[0].vt.n_samples(), 3601);
    }

    #[test]
    fn non_positive_durations_are_rejected() {
        let mut set = RecordingSet::new(vec![recording("SITE", 10, 1.0)]);
        assert_eq!(set.trim_to_last(0.0), Err(TrimError::InvalidDuration(0.0)));
        assert_eq!(set.keep_last(-1.0), Err(TrimError::InvalidDuration(-1.0)));
    }
}
