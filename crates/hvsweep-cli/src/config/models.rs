use hvsweep::engine::bridge::CommandPipeline;
use hvsweep::engine::config::SweepConfig;
use hvsweep::workflows::duration_sweep::DurationJob;
use hvsweep::workflows::parameter_sweep::ParameterSweepJob;

pub struct SweepAppConfig {
    pub job: ParameterSweepJob,
    pub sweep: SweepConfig,
    pub pipeline: CommandPipeline,
}

pub struct DurationAppConfig {
    pub job: DurationJob,
    pub sweep: SweepConfig,
    pub pipeline: CommandPipeline,
}
