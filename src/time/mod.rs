pub mod clock;
pub mod execution_time;
