// Transport Port - the contract every execution backend satisfies

use std::path::Path;

use async_trait::async_trait;
use tokio::io::AsyncWrite;

use crate::context::Context;
use crate::domain::HostFacts;
use crate::error::Result;

/// Transport-agnostic execution contract.
///
/// Callers hold a `dyn Connector` and invoke it the same way whether the
/// target is this machine or a node reached over another transport.
///
/// Implementations:
/// - `LocalConnector` (capstan-infra-local): direct filesystem and process
///   access on this machine
/// - remote backends (SSH etc.) live outside this workspace
#[async_trait]
pub trait Connector: Send + Sync {
    /// Prepare the backend for use (e.g. establish a connection for remote
    /// backends). Must succeed as a no-op when nothing needs preparing.
    async fn init(&self, ctx: &Context) -> Result<()>;

    /// Release backend resources. Must succeed as a no-op when nothing is
    /// held.
    async fn close(&self, ctx: &Context) -> Result<()>;

    /// Write `content` to `dst` with unix permission bits `mode`. A missing
    /// parent directory is created recursively with the same mode before
    /// the write. Existing content at `dst` is fully replaced.
    ///
    /// # Errors
    /// - `ConnectorError::DirCreate` if the parent cannot be created
    /// - `ConnectorError::Write` if the write fails
    async fn put_file(&self, ctx: &Context, content: &[u8], dst: &Path, mode: u32) -> Result<()>;

    /// Stream the entire contents of `src` into `dst`.
    ///
    /// Bytes already written to `dst` before a failure are not rolled back;
    /// the copy is a raw stream.
    ///
    /// # Errors
    /// - `ConnectorError::Read` if the source cannot be opened
    /// - `ConnectorError::Copy` if the copy is interrupted
    async fn fetch_file(
        &self,
        ctx: &Context,
        src: &Path,
        dst: &mut (dyn AsyncWrite + Send + Unpin),
    ) -> Result<()>;

    /// Run `command` through a POSIX shell on the target and return its
    /// combined stdout/stderr bytes.
    ///
    /// The command string is trusted input: it reaches `sh -c` unmodified,
    /// so shell quoting and injection safety are the caller's
    /// responsibility.
    ///
    /// # Errors
    /// - `ConnectorError::Spawn` if the shell cannot be started
    /// - `ConnectorError::CommandFailed` on non-zero exit; the output
    ///   captured before the failure stays available on the error
    /// - `ConnectorError::Cancelled` / `Timeout` when `ctx` fires; the
    ///   spawned process is killed rather than awaited to natural exit
    async fn execute_command(&self, ctx: &Context, command: &str) -> Result<Vec<u8>>;
}

/// Optional capability: describe the target host.
///
/// A backend declares support by implementing this alongside [`Connector`].
#[async_trait]
pub trait GatherFacts: Send + Sync {
    /// Assemble the host fact document.
    ///
    /// Returns `Ok(None)` on platforms where gathering is not supported;
    /// absence of facts is not an error. On supported platforms the
    /// document is all-or-nothing: any failing source aborts the gather.
    async fn info(&self, ctx: &Context) -> Result<Option<HostFacts>>;
}
