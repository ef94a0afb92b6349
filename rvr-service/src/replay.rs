//! In-memory notification transport.
//!
//! Stands in for a wireless link when payloads come from a capture file or
//! a test: the caller pushes bytes with [`ReplayTransport::deliver`] and they
//! reach whichever handler is subscribed to that characteristic.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use rvr_core::RadarError;
use thiserror::Error;
use uuid::Uuid;

use crate::transport::{NotifyHandler, NotifyTransport};

#[derive(Debug, Error)]
pub enum ReplayError {
    #[error("transport disconnected")]
    Disconnected,
    #[error("no subscription for characteristic {0}")]
    NotSubscribed(Uuid),
    #[error("decode fault: {0}")]
    Decode(#[from] RadarError),
}

/// Transport that delivers payloads pushed by the caller.
#[derive(Default)]
pub struct ReplayTransport {
    handlers: Mutex<HashMap<Uuid, NotifyHandler>>,
    disconnected: AtomicBool,
}

impl ReplayTransport {
    pub fn new() -> Self {
        Self::default()
    }

    fn handlers(&self) -> MutexGuard<'_, HashMap<Uuid, NotifyHandler>> {
        self.handlers.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn check_connected(&self) -> Result<(), ReplayError> {
        if self.disconnected.load(Ordering::Acquire) {
            return Err(ReplayError::Disconnected);
        }
        Ok(())
    }

    /// Drop every subscription; later calls fail with `Disconnected`.
    pub fn disconnect(&self) {
        self.disconnected.store(true, Ordering::Release);
        self.handlers().clear();
    }

    pub fn is_subscribed(&self, characteristic: Uuid) -> bool {
        self.handlers().contains_key(&characteristic)
    }

    /// Push one notification to the handler subscribed on `characteristic`.
    ///
    /// Runs the handler to completion before returning.
    pub fn deliver(&self, characteristic: Uuid, data: &[u8]) -> Result<(), ReplayError> {
        self.check_connected()?;
        let handler = self
            .handlers()
            .get(&characteristic)
            .cloned()
            .ok_or(ReplayError::NotSubscribed(characteristic))?;
        handler(data)?;
        Ok(())
    }
}

#[async_trait]
impl NotifyTransport for ReplayTransport {
    type Error = ReplayError;

    async fn subscribe(
        &self,
        characteristic: Uuid,
        on_notify: NotifyHandler,
    ) -> Result<(), ReplayError> {
        self.check_connected()?;
        self.handlers().insert(characteristic, on_notify);
        Ok(())
    }

    async fn unsubscribe(&self, characteristic: Uuid) -> Result<(), ReplayError> {
        self.check_connected()?;
        self.handlers().remove(&characteristic);
        Ok(())
    }
}
