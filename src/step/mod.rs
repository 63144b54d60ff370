pub mod context;
pub mod error;
pub mod parameters;
pub mod step_model;
