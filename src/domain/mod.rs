pub mod caught_error;
pub mod classification;
pub mod errors;

pub use caught_error::{CaughtError, ErrorDescription, ErrorKind, HttpException};
pub use classification::{ErrorCategory, ErrorClassification, PublicMessage};
