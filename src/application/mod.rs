pub mod classify;
pub mod ports;

pub use classify::{Classify, DatabaseCodeTable, ErrorClassifier};
