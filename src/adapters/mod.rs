// Adapters layer: concrete row sources and sinks behind the domain ports.

pub mod csv_file;
pub mod xlsx;

pub use csv_file::{CsvSink, CsvSource};
pub use xlsx::XlsxSource;
