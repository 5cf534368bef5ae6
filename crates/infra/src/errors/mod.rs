//! Infrastructure error conversions

pub mod conversions;

pub use conversions::{api_error, is_transport_failure, transport_details, InfraError};
