//! Per-operation deadline carrier. Every data operation runs under the
//! context; an expired deadline aborts the in-flight statement and surfaces
//! a cancellation-kind error instead of blocking.

use crate::error::Error;
use std::future::Future;
use std::time::{Duration, Instant};

#[derive(Clone, Copy, Debug, Default)]
pub struct OpContext {
    deadline: Option<Instant>,
}

impl OpContext {
    /// No deadline.
    pub fn background() -> Self {
        OpContext { deadline: None }
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        OpContext {
            deadline: Some(Instant::now() + timeout),
        }
    }

    pub fn with_deadline(deadline: Instant) -> Self {
        OpContext {
            deadline: Some(deadline),
        }
    }

    pub fn remaining(&self) -> Option<Duration> {
        self.deadline
            .map(|d| d.saturating_duration_since(Instant::now()))
    }

    /// Run one backend statement under the deadline, translating backend
    /// errors at this single seam.
    pub(crate) async fn run<F, T>(&self, op: &'static str, fut: F) -> Result<T, Error>
    where
        F: Future<Output = Result<T, sqlx::Error>>,
    {
        match self.remaining() {
            None => fut.await.map_err(Error::from),
            Some(left) if left.is_zero() => Err(Error::Canceled(op)),
            Some(left) => match tokio::time::timeout(left, fut).await {
                Ok(result) => result.map_err(Error::from),
                Err(_) => Err(Error::Canceled(op)),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn completes_within_deadline() {
        let ctx = OpContext::with_timeout(Duration::from_secs(5));
        let out = ctx.run("get", async { Ok::<_, sqlx::Error>(7) }).await;
        assert_eq!(out.unwrap(), 7);
    }

    #[tokio::test]
    async fn expired_deadline_cancels() {
        let ctx = OpContext::with_timeout(Duration::from_millis(5));
        let out: Result<i32, Error> = ctx
            .run("get", async {
                tokio::time::sleep(Duration::from_secs(60)).await;
                Ok(1)
            })
            .await;
        assert!(matches!(out, Err(Error::Canceled("get"))));
    }

    #[tokio::test]
    async fn background_context_never_cancels() {
        let ctx = OpContext::background();
        let out = ctx.run("list", async { Ok::<_, sqlx::Error>(()) }).await;
        assert!(out.is_ok());
    }
}
