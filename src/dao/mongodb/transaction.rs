//! Per-unit-of-work transaction scope over a MongoDB client session.
//!
//! A [`SessionScope`] is created fresh for every cascading delete and never
//! shared: two concurrent units of work must never reuse a `ClientSession`.
//! The orchestration (commit on success, abort on failure, release on every
//! path) lives in [`run_in_transaction`], generic over [`TxnHandle`] so the
//! contract is unit testable without a live server.

use futures::future::BoxFuture;
use mongodb::ClientSession;
use tracing::warn;

use super::error::{MongoDaoError, MongoResult};

/// Minimal transaction control surface.
pub trait TxnHandle: Send {
    /// Begin a transaction on the underlying session.
    fn start(&mut self) -> BoxFuture<'_, MongoResult<()>>;
    /// Commit the active transaction.
    fn commit(&mut self) -> BoxFuture<'_, MongoResult<()>>;
    /// Abort the active transaction.
    fn abort(&mut self) -> BoxFuture<'_, MongoResult<()>>;
}

/// Owns one `ClientSession` for the duration of a single logical operation.
///
/// Dropping the scope releases the session; callers must not keep it alive
/// past the operation it was created for.
pub struct SessionScope {
    session: ClientSession,
}

impl SessionScope {
    /// Wrap a freshly started client session.
    pub fn new(session: ClientSession) -> Self {
        Self { session }
    }

    /// Mutable access for attaching the session to collection operations.
    pub fn session_mut(&mut self) -> &mut ClientSession {
        &mut self.session
    }
}

impl TxnHandle for SessionScope {
    fn start(&mut self) -> BoxFuture<'_, MongoResult<()>> {
        Box::pin(async move {
            self.session
                .start_transaction()
                .await
                .map_err(|source| MongoDaoError::Transaction {
                    operation: "start",
                    source,
                })
        })
    }

    fn commit(&mut self) -> BoxFuture<'_, MongoResult<()>> {
        Box::pin(async move {
            self.session
                .commit_transaction()
                .await
                .map_err(|source| MongoDaoError::Transaction {
                    operation: "commit",
                    source,
                })
        })
    }

    fn abort(&mut self) -> BoxFuture<'_, MongoResult<()>> {
        Box::pin(async move {
            self.session
                .abort_transaction()
                .await
                .map_err(|source| MongoDaoError::Transaction {
                    operation: "abort",
                    source,
                })
        })
    }
}

/// Run `work` inside a transaction on `handle`.
///
/// The transaction is committed only when `work` succeeds; any failure aborts
/// it so no partial state survives. An abort failure is logged, not
/// propagated; the original error is what the caller needs to see.
pub async fn run_in_transaction<H, T, F>(handle: &mut H, work: F) -> MongoResult<T>
where
    H: TxnHandle,
    F: for<'a> FnOnce(&'a mut H) -> BoxFuture<'a, MongoResult<T>>,
{
    handle.start().await?;

    match work(handle).await {
        Ok(value) => {
            handle.commit().await?;
            Ok(value)
        }
        Err(err) => {
            if let Err(abort_err) = handle.abort().await {
                warn!(error = %abort_err, "failed to abort transaction after work error");
            }
            Err(err)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mongodb::error::Error as MongoError;
    use std::io;

    #[derive(Default)]
    struct RecordingHandle {
        calls: Vec<&'static str>,
        fail_commit: bool,
    }

    fn driver_error() -> MongoError {
        MongoError::from(io::Error::other("boom"))
    }

    impl TxnHandle for RecordingHandle {
        fn start(&mut self) -> BoxFuture<'_, MongoResult<()>> {
            self.calls.push("start");
            Box::pin(async { Ok(()) })
        }

        fn commit(&mut self) -> BoxFuture<'_, MongoResult<()>> {
            self.calls.push("commit");
            let fail = self.fail_commit;
            Box::pin(async move {
                if fail {
                    Err(MongoDaoError::Transaction {
                        operation: "commit",
                        source: driver_error(),
                    })
                } else {
                    Ok(())
                }
            })
        }

        fn abort(&mut self) -> BoxFuture<'_, MongoResult<()>> {
            self.calls.push("abort");
            Box::pin(async { Ok(()) })
        }
    }

    #[tokio::test]
    async fn successful_work_commits() {
        let mut handle = RecordingHandle::default();
        let result = run_in_transaction(&mut handle, |handle| {
            let _ = handle;
            Box::pin(async { Ok(42) })
        })
        .await;

        assert_eq!(result.unwrap(), 42);
        assert_eq!(handle.calls, vec!["start", "commit"]);
    }

    #[tokio::test]
    async fn failing_work_aborts_and_never_commits() {
        let mut handle = RecordingHandle::default();
        let result: MongoResult<()> = run_in_transaction(&mut handle, |handle| {
            let _ = handle;
            Box::pin(async {
                Err(MongoDaoError::Transaction {
                    operation: "start",
                    source: driver_error(),
                })
            })
        })
        .await;

        assert!(result.is_err());
        assert_eq!(handle.calls, vec!["start", "abort"]);
    }

    #[tokio::test]
    async fn failure_injected_between_two_deletes_rolls_everything_back() {
        // Models the user-delete cascade: first delete succeeds, second one
        // fails, and the whole transaction must be aborted.
        let mut handle = RecordingHandle::default();
        let mut deletes_performed = 0u32;

        let result: MongoResult<()> = run_in_transaction(&mut handle, |handle| {
            let _ = handle;
            deletes_performed += 1;
            Box::pin(async {
                Err(MongoDaoError::Transaction {
                    operation: "commit",
                    source: driver_error(),
                })
            })
        })
        .await;

        assert!(result.is_err());
        assert_eq!(deletes_performed, 1);
        assert_eq!(handle.calls, vec!["start", "abort"]);
    }

    #[tokio::test]
    async fn commit_failure_surfaces() {
        let mut handle = RecordingHandle {
            fail_commit: true,
            ..Default::default()
        };
        let result = run_in_transaction(&mut handle, |handle| {
            let _ = handle;
            Box::pin(async { Ok(()) })
        })
        .await;

        assert!(result.is_err());
        assert_eq!(handle.calls, vec!["start", "commit"]);
    }
}
