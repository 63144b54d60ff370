pub mod aggregator;
pub mod result_model;
pub mod status;
