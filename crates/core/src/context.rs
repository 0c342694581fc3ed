// Cancellation Context for Transport Operations

use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::error::{ConnectorError, Result};

/// Cancellation/deadline handle passed to every transport operation.
///
/// Clones share the underlying token: cancelling any clone cancels all of
/// them. A default context never fires on its own.
#[derive(Debug, Clone, Default)]
pub struct Context {
    token: CancellationToken,
    deadline: Option<Instant>,
    timeout: Option<Duration>,
}

impl Context {
    /// Context that never fires on its own.
    pub fn background() -> Self {
        Self::default()
    }

    /// Context that fires `timeout` from now.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            token: CancellationToken::new(),
            deadline: Some(Instant::now() + timeout),
            timeout: Some(timeout),
        }
    }

    /// Derive a child context: it observes this context's cancellation, but
    /// cancelling the child does not affect the parent.
    pub fn child(&self) -> Self {
        Self {
            token: self.token.child_token(),
            deadline: self.deadline,
            timeout: self.timeout,
        }
    }

    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Error if the context has already fired, without awaiting.
    pub fn check(&self) -> Result<()> {
        if self.token.is_cancelled() {
            return Err(ConnectorError::Cancelled);
        }
        if let (Some(deadline), Some(timeout)) = (self.deadline, self.timeout) {
            if Instant::now() >= deadline {
                return Err(ConnectorError::Timeout(timeout));
            }
        }
        Ok(())
    }

    /// Resolves once the context fires, with the matching error.
    /// Pending forever for a background context.
    pub async fn done(&self) -> ConnectorError {
        match (self.deadline, self.timeout) {
            (Some(deadline), Some(timeout)) => {
                tokio::select! {
                    _ = self.token.cancelled() => ConnectorError::Cancelled,
                    _ = tokio::time::sleep_until(deadline) => ConnectorError::Timeout(timeout),
                }
            }
            _ => {
                self.token.cancelled().await;
                ConnectorError::Cancelled
            }
        }
    }

    /// Run `fut` to completion unless the context fires first.
    ///
    /// An already-fired context wins even when `fut` is immediately ready.
    pub async fn run<T>(&self, fut: impl Future<Output = T>) -> Result<T> {
        tokio::select! {
            biased;
            err = self.done() => Err(err),
            out = fut => Ok(out),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn background_context_never_fires() {
        let ctx = Context::background();
        assert!(!ctx.is_cancelled());
        assert!(ctx.check().is_ok());

        let value = ctx.run(async { 42 }).await.unwrap();
        assert_eq!(value, 42);
    }

    #[tokio::test]
    async fn cancelled_context_fails_check_and_run() {
        let ctx = Context::background();
        ctx.cancel();

        assert!(ctx.is_cancelled());
        assert!(matches!(ctx.check(), Err(ConnectorError::Cancelled)));

        // Cancellation wins even though the future is immediately ready.
        let result = ctx.run(async { 42 }).await;
        assert!(matches!(result, Err(ConnectorError::Cancelled)));
    }

    #[tokio::test]
    async fn deadline_expiry_reports_timeout() {
        let ctx = Context::with_timeout(Duration::from_millis(20));

        let result = ctx.run(std::future::pending::<()>()).await;
        assert!(matches!(result, Err(ConnectorError::Timeout(_))));
        assert!(ctx.check().is_err());
    }

    #[tokio::test]
    async fn child_observes_parent_cancellation() {
        let parent = Context::background();
        let child = parent.child();

        parent.cancel();
        assert!(child.is_cancelled());
    }

    #[tokio::test]
    async fn cancelling_child_leaves_parent_alive() {
        let parent = Context::background();
        let child = parent.child();

        child.cancel();
        assert!(child.is_cancelled());
        assert!(!parent.is_cancelled());
    }
}
