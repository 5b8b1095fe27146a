pub mod code_table_loader;
pub mod logging;

pub use code_table_loader::load_code_table;
pub use logging::{init_tracing, LogFormat, TracingLogSink};
