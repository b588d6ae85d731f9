mod core;
mod json_formatter;
mod line_formatter;
mod registry;

pub use core::LogFormatter;
pub use json_formatter::JsonFormatter;
pub use line_formatter::{LineFormatter, SIMPLE_DATE, SIMPLE_FORMAT};
pub use registry::{formatter_descriptors, register_formatters};
