#![allow(dead_code)]
#![allow(unused_imports)]

pub use localcmd_test_utils::builders::CommandConfigBuilder;
pub use localcmd_test_utils::{
    SharedBuffer, capture_logs, init_tracing, process_exists, wait_until, with_timeout,
};

pub type TestResult = Result<(), Box<dyn std::error::Error>>;
