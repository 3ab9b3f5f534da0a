//! Process-wide tracing setup shared by the service binary and tests.

pub mod logging;

pub use logging::{init, init_for_tests, init_with_default};
