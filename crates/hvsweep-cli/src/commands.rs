pub mod duration;
pub mod mape;
pub mod merge;
pub mod sweep;
