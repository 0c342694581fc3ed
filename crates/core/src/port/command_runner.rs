// Command Execution Provider Port
// Abstraction over process spawning so backends stay testable

use async_trait::async_trait;

use crate::context::Context;
use crate::error::Result;

/// Process-spawning abstraction injected into backends at construction
/// time, so command execution can be substituted in tests.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Run `program` with `args` and return combined stdout/stderr bytes.
    ///
    /// # Errors
    /// - `ConnectorError::Spawn` if the program cannot be started
    /// - `ConnectorError::CommandFailed` on non-zero exit
    /// - `ConnectorError::Cancelled` / `Timeout` when `ctx` fires
    async fn run(&self, ctx: &Context, program: &str, args: &[String]) -> Result<Vec<u8>>;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use crate::error::ConnectorError;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// One recorded invocation of the mock runner.
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct RecordedCall {
        pub program: String,
        pub args: Vec<String>,
    }

    enum MockResponse {
        Output(Vec<u8>),
        Failure(String),
    }

    /// Mock CommandRunner: records invocations and answers from a script.
    ///
    /// Stubs are keyed on the last argument, which is the command string
    /// for backends that invoke `sh -c <command>`. Unscripted commands get
    /// the default response (empty output, success).
    pub struct MockCommandRunner {
        calls: Mutex<Vec<RecordedCall>>,
        responses: Mutex<HashMap<String, MockResponse>>,
    }

    impl MockCommandRunner {
        pub fn new() -> Self {
            Self {
                calls: Mutex::new(Vec::new()),
                responses: Mutex::new(HashMap::new()),
            }
        }

        /// Canned combined output for `command`.
        pub fn stub_output(&self, command: &str, output: impl Into<Vec<u8>>) {
            self.responses
                .lock()
                .unwrap()
                .insert(command.to_string(), MockResponse::Output(output.into()));
        }

        /// Scripted failure for `command`, surfaced as a spawn error.
        pub fn stub_failure(&self, command: &str, message: &str) {
            self.responses
                .lock()
                .unwrap()
                .insert(command.to_string(), MockResponse::Failure(message.to_string()));
        }

        pub fn calls(&self) -> Vec<RecordedCall> {
            self.calls.lock().unwrap().clone()
        }

        pub fn call_count(&self) -> usize {
            self.calls.lock().unwrap().len()
        }
    }

    impl Default for MockCommandRunner {
        fn default() -> Self {
            Self::new()
        }
    }

    #[async_trait]
    impl CommandRunner for MockCommandRunner {
        async fn run(&self, ctx: &Context, program: &str, args: &[String]) -> Result<Vec<u8>> {
            self.calls.lock().unwrap().push(RecordedCall {
                program: program.to_string(),
                args: args.to_vec(),
            });

            ctx.check()?;

            let key = args.last().map(String::as_str).unwrap_or(program);
            match self.responses.lock().unwrap().get(key) {
                Some(MockResponse::Output(output)) => Ok(output.clone()),
                Some(MockResponse::Failure(message)) => Err(ConnectorError::Spawn {
                    program: program.to_string(),
                    source: std::io::Error::new(std::io::ErrorKind::Other, message.clone()),
                }),
                None => Ok(Vec::new()),
            }
        }
    }
}
