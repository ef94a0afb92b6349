//! Notification transport seam.

use std::sync::Arc;

use async_trait::async_trait;
use uuid::Uuid;

/// Callback invoked by the transport with every raw notification payload.
///
/// An `Err` is a decode fault the transport should surface; it is never
/// returned for a transient short payload.
pub type NotifyHandler = Arc<dyn Fn(&[u8]) -> rvr_core::Result<()> + Send + Sync>;

/// Subscribe/unsubscribe half of a wireless link that pushes notifications.
///
/// Implementations deliver at most one notification at a time and wait for
/// the handler to return before delivering the next.
#[async_trait]
pub trait NotifyTransport: Send + Sync {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Start notifications on `characteristic`, routing payloads to `on_notify`.
    async fn subscribe(
        &self,
        characteristic: Uuid,
        on_notify: NotifyHandler,
    ) -> Result<(), Self::Error>;

    /// Stop notifications on `characteristic`.
    async fn unsubscribe(&self, characteristic: Uuid) -> Result<(), Self::Error>;
}
