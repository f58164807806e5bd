#![allow(dead_code)]

pub use shellpump_test_utils::{init_tracing, pump_until_complete, with_timeout};

pub type TestResult = Result<(), Box<dyn std::error::Error>>;
