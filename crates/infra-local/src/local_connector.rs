// Local Transport Backend
// Reaches the target with direct filesystem calls and locally spawned
// processes; fact gathering is built from the backend's own primitives.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::fs;
use tokio::io::AsyncWrite;
use tracing::{debug, warn};

use capstan_core::domain::{
    parse_delimited_map, parse_delimited_records, HostFacts, OsFacts, ProcessFacts,
};
use capstan_core::port::{CommandRunner, Connector, GatherFacts};
use capstan_core::{ConnectorError, Context, Result};

const DEFAULT_SHELL: &str = "/bin/sh";

const OS_RELEASE_PATH: &str = "/etc/os-release";
const CPUINFO_PATH: &str = "/proc/cpuinfo";
const MEMINFO_PATH: &str = "/proc/meminfo";

/// Local backend: the target is this machine.
///
/// The command-execution provider is injected at construction so process
/// spawning stays substitutable in tests. The instance holds no other
/// state and is reusable across calls; it performs no internal locking, so
/// concurrent callers must order operations themselves.
pub struct LocalConnector {
    runner: Arc<dyn CommandRunner>,
    shell: String,
}

impl LocalConnector {
    pub fn new(runner: Arc<dyn CommandRunner>) -> Self {
        Self {
            runner,
            shell: DEFAULT_SHELL.to_string(),
        }
    }

    /// Override the POSIX shell `execute_command` invokes.
    pub fn with_shell(runner: Arc<dyn CommandRunner>, shell: impl Into<String>) -> Self {
        Self {
            runner,
            shell: shell.into(),
        }
    }

    /// Fetch a file through the transport's own primitive into memory.
    async fn fetch_to_vec(&self, ctx: &Context, path: &str) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        self.fetch_file(ctx, Path::new(path), &mut buf).await?;
        Ok(buf)
    }

    /// Run a single-line fact query and strip one trailing newline.
    async fn query_line(&self, ctx: &Context, command: &str) -> Result<String> {
        let output = self.execute_command(ctx, command).await?;
        let mut text = String::from_utf8_lossy(&output).into_owned();
        if text.ends_with('\n') {
            text.pop();
        }
        Ok(text)
    }
}

#[async_trait]
impl Connector for LocalConnector {
    async fn init(&self, _ctx: &Context) -> Result<()> {
        Ok(())
    }

    async fn close(&self, _ctx: &Context) -> Result<()> {
        Ok(())
    }

    async fn put_file(&self, ctx: &Context, content: &[u8], dst: &Path, mode: u32) -> Result<()> {
        ctx.check()?;

        if let Some(parent) = dst.parent() {
            let missing = !parent.as_os_str().is_empty()
                && matches!(
                    fs::metadata(parent).await,
                    Err(ref err) if err.kind() == std::io::ErrorKind::NotFound
                );
            if missing {
                let mut builder = fs::DirBuilder::new();
                builder.recursive(true);
                #[cfg(unix)]
                builder.mode(mode);
                builder.create(parent).await.map_err(|source| {
                    warn!(dst = %dst.display(), error = %source, "failed to create destination directory");
                    ConnectorError::DirCreate {
                        path: parent.to_path_buf(),
                        source,
                    }
                })?;
            }
        }

        ctx.run(fs::write(dst, content))
            .await?
            .map_err(|source| {
                warn!(dst = %dst.display(), error = %source, "failed to write local file");
                ConnectorError::Write {
                    path: dst.to_path_buf(),
                    source,
                }
            })?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(dst, std::fs::Permissions::from_mode(mode))
                .await
                .map_err(|source| ConnectorError::Write {
                    path: dst.to_path_buf(),
                    source,
                })?;
        }

        Ok(())
    }

    async fn fetch_file(
        &self,
        ctx: &Context,
        src: &Path,
        dst: &mut (dyn AsyncWrite + Send + Unpin),
    ) -> Result<()> {
        ctx.check()?;

        let mut file = fs::File::open(src).await.map_err(|source| {
            warn!(src = %src.display(), error = %source, "failed to open local file");
            ConnectorError::Read {
                path: src.to_path_buf(),
                source,
            }
        })?;

        ctx.run(tokio::io::copy(&mut file, dst))
            .await?
            .map_err(|source| {
                warn!(src = %src.display(), error = %source, "failed to copy local file");
                ConnectorError::Copy {
                    path: src.to_path_buf(),
                    source,
                }
            })?;

        Ok(())
    }

    async fn execute_command(&self, ctx: &Context, command: &str) -> Result<Vec<u8>> {
        debug!(command = %command, "executing local command");
        let args = vec!["-c".to_string(), command.to_string()];
        self.runner.run(ctx, &self.shell, &args).await
    }
}

#[async_trait]
impl GatherFacts for LocalConnector {
    async fn info(&self, ctx: &Context) -> Result<Option<HostFacts>> {
        if !cfg!(target_os = "linux") {
            debug!(
                platform = std::env::consts::OS,
                "fact gathering not supported on this platform"
            );
            return Ok(None);
        }

        let release_raw = self
            .fetch_to_vec(ctx, OS_RELEASE_PATH)
            .await
            .map_err(|err| ConnectorError::fact_gather("os-release", err))?;
        let release = parse_delimited_map(&release_raw, '=');

        let kernel_version = self
            .query_line(ctx, "uname -r")
            .await
            .map_err(|err| ConnectorError::fact_gather("kernel version", err))?;

        let hostname = self
            .query_line(ctx, "hostname")
            .await
            .map_err(|err| ConnectorError::fact_gather("hostname", err))?;

        let architecture = self
            .query_line(ctx, "arch")
            .await
            .map_err(|err| ConnectorError::fact_gather("architecture", err))?;

        let cpu_raw = self
            .fetch_to_vec(ctx, CPUINFO_PATH)
            .await
            .map_err(|err| ConnectorError::fact_gather("cpuinfo", err))?;
        let cpu_info = parse_delimited_records(&cpu_raw, ':');

        let mem_raw = self
            .fetch_to_vec(ctx, MEMINFO_PATH)
            .await
            .map_err(|err| ConnectorError::fact_gather("meminfo", err))?;
        let mem_info = parse_delimited_map(&mem_raw, ':');

        Ok(Some(HostFacts {
            os: OsFacts {
                release,
                kernel_version,
                hostname,
                architecture,
            },
            process: ProcessFacts { cpu_info, mem_info },
        }))
    }
}
