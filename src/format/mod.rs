pub mod name_formatter;
pub mod template;
pub mod value;
