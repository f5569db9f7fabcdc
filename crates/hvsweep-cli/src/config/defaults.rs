use hvsweep::engine::config::{
    Detrend, DissimilarTimeSteps, HorizontalCombination, SmoothingOperator, WindowType,
};
use hvsweep::engine::export::OutcomeColumn;
use hvsweep::engine::grid::{RangeSpec, SweepParameter};

pub struct DefaultsConfig {
    pub extension: String,
    pub east: String,
    pub north: String,
    pub vertical: String,

    pub detrend: Detrend,
    pub window_length: f64,
    pub orient_to_degrees_from_north: f64,
    pub bandpass_filter: bool,
    pub filter_low_corner: f64,
    pub filter_high_corner: f64,

    pub sta_lta_rejection: bool,
    pub sta_seconds: f64,
    pub lta_seconds: f64,
    pub min_sta_lta_ratio: f64,
    pub max_sta_lta_ratio: f64,

    pub window_type: WindowType,
    pub taper_width: f64,
    pub smoothing_operator: SmoothingOperator,
    pub smoothing_bandwidth: f64,
    pub center_frequency_min: f64,
    pub center_frequency_max: f64,
    pub center_frequency_count: usize,
    pub combine_horizontals: HorizontalCombination,
    pub dissimilar_time_steps: DissimilarTimeSteps,
    pub sesame: bool,
    pub clarity_pass_threshold: u8,
    pub reliability_pass_threshold: u8,

    pub sweep_axes: Vec<(SweepParameter, RangeSpec)>,
    pub sweep_outcomes: Vec<OutcomeColumn>,
    pub durations: RangeSpec,
    pub duration_outcomes: Vec<OutcomeColumn>,
    pub precision: usize,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            extension: "sac".to_string(),
            east: "E".to_string(),
            north: "N".to_string(),
            vertical: "Z".to_string(),

            detrend: Detrend::Linear,
            window_length: 30.0,
            orient_to_degrees_from_north: 0.0,
            bandpass_filter: true,
            filter_low_corner: 0.5,
            filter_high_corner: 20.0,

            sta_lta_rejection: true,
            sta_seconds: 1.0,
            lta_seconds: 30.0,
            min_sta_lta_ratio: 0.2,
            max_sta_lta_ratio: 2.5,

            window_type: WindowType::Tukey,
            taper_width: 0.1,
            smoothing_operator: SmoothingOperator::KonnoAndOhmachi,
            smoothing_bandwidth: 40.0,
            center_frequency_min: 0.2,
            center_frequency_max: 50.0,
            center_frequency_count: 200,
            combine_horizontals: HorizontalCombination::TotalHorizontalEnergy,
            dissimilar_time_steps: DissimilarTimeSteps::FrequencyDomainResampling,
            sesame: true,
            clarity_pass_threshold: 5,
            reliability_pass_threshold: 3,

            sweep_axes: vec![
                (
                    SweepParameter::WindowLength,
                    RangeSpec::Stepped {
                        start: 5.0,
                        stop: 60.0,
                        step: 5.0,
                    },
                ),
                (
                    SweepParameter::TaperWidth,
                    RangeSpec::Stepped {
                        start: 0.0,
                        stop: 1.0,
                        step: 0.1,
                    },
                ),
                (
                    SweepParameter::SmoothingBandwidth,
                    RangeSpec::Stepped {
                        start: 10.0,
                        stop: 60.0,
                        step: 10.0,
                    },
                ),
            ],
            sweep_outcomes: vec![
                OutcomeColumn::PeakFrequency,
                OutcomeColumn::ClarityPass,
                OutcomeColumn::ReliabilityPass,
            ],
            durations: RangeSpec::Stepped {
                start: 3600.0,
                stop: 300.0,
                step: -60.0,
            },
            duration_outcomes: vec![OutcomeColumn::PeakFrequency],
            precision: 5,
        }
    }
}
