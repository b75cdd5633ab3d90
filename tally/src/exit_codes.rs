#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    Success = 0,

    /// One or more assertions or requests failed.
    TestsFailed = 10,

    /// Invalid CLI/plan/event input, including a truncated run.
    InvalidInput = 30,

    /// Internal error, or an artifact could not be persisted.
    RuntimeError = 40,
}

impl ExitCode {
    #[must_use]
    pub fn as_i32(self) -> i32 {
        self as i32
    }

    #[must_use]
    pub fn from_run(failed_tests: u64, failed_requests: u64, persist_failed: bool) -> Self {
        if persist_failed {
            return Self::RuntimeError;
        }
        if failed_tests > 0 || failed_requests > 0 {
            return Self::TestsFailed;
        }
        Self::Success
    }
}
