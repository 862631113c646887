//! Connection guard
//!
//! A session owns exactly one transport. Every request/response cycle, and the
//! teardown in [`ConnectionGuard::close`], runs while holding the guard's lock,
//! so no two logical requests ever interleave on the connection.

use crate::error::TransportError;
use crate::traits::Transport;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::debug;

/// Mutual-exclusion wrapper around a session's transport.
///
/// The lock is a fair (FIFO) async mutex: concurrent callers are served in
/// arrival order. It is released on every exit path of the guarded closure,
/// including errors and cancellation of the caller's future.
///
/// # Examples
///
/// ```rust,no_run
/// use corelink_transport::{ConnectionGuard, HttpRequest, HttpTransport, Transport, TransportError};
/// use std::sync::Arc;
///
/// # async fn example() -> Result<(), TransportError> {
/// let guard = ConnectionGuard::new(Arc::new(HttpTransport::new()?));
///
/// let request = HttpRequest::get("http://localhost:8080/api/core/v1/drivers");
/// let response = guard
///     .with_connection(|transport| async move { transport.send(&request).await })
///     .await?;
///
/// guard.close().await?;
/// # Ok(())
/// # }
/// ```
pub struct ConnectionGuard<T: ?Sized> {
    slot: Mutex<Option<Arc<T>>>,
}

impl<T: Transport + ?Sized> ConnectionGuard<T> {
    /// Take ownership of a transport.
    pub fn new(transport: Arc<T>) -> Self {
        Self {
            slot: Mutex::new(Some(transport)),
        }
    }

    /// Run `f` with exclusive use of the transport.
    ///
    /// The lock is held until the future returned by `f` completes.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Closed`] (converted into `E`) if the guard has
    /// been closed, otherwise whatever `f` returns.
    pub async fn with_connection<F, Fut, R, E>(&self, f: F) -> Result<R, E>
    where
        F: FnOnce(Arc<T>) -> Fut,
        Fut: Future<Output = Result<R, E>>,
        E: From<TransportError>,
    {
        let slot = self.slot.lock().await;
        let transport = slot.as_ref().map(Arc::clone).ok_or(TransportError::Closed)?;
        let result = f(transport).await;
        drop(slot);
        result
    }

    /// Close the transport.
    ///
    /// Waits for any in-flight cycle to finish before tearing down. Closing an
    /// already closed guard is a no-op.
    pub async fn close(&self) -> Result<(), TransportError> {
        let mut slot = self.slot.lock().await;
        match slot.take() {
            Some(transport) => {
                debug!("closing session transport");
                transport.close().await
            }
            None => Ok(()),
        }
    }

    /// Whether [`close`](Self::close) has completed.
    pub async fn is_closed(&self) -> bool {
        self.slot.lock().await.is_none()
    }
}

impl<T: ?Sized> std::fmt::Debug for ConnectionGuard<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionGuard").finish_non_exhaustive()
    }
}
