pub mod formatters;

pub use formatters::format_range;
