pub mod notifier;
pub mod text;
pub mod tracing_notifier;
