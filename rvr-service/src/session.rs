//! Radar session: one decoder variant bound to one transport characteristic.
//!
//! States:
//! - disabled (initial): no subscription, deliveries are not expected
//! - enabled: subscribed, every delivery is decoded and handed to the observer
//!
//! The observer slot holds at most one callback; registering a new one
//! replaces the old one and takes effect from the next delivery.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use log::{debug, info, warn};
use rvr_core::{Decoded, RadarMeasurement, RadarVariant};

use crate::transport::{NotifyHandler, NotifyTransport};

/// Callback receiving the measurements of one notification, possibly empty.
pub type Observer = Box<dyn FnMut(&[RadarMeasurement]) + Send>;

/// Registered observer plus a counter bumped on every set/clear.
#[derive(Default)]
struct ObserverSlot {
    observer: Option<Observer>,
    generation: u64,
}

impl ObserverSlot {
    fn replace(&mut self, observer: Option<Observer>) {
        self.observer = observer;
        self.generation = self.generation.wrapping_add(1);
    }
}

/// Decode + observer state shared between the session and the handler it
/// registers with the transport.
struct Dispatcher {
    name: String,
    variant: RadarVariant,
    observer: Mutex<ObserverSlot>,
}

impl Dispatcher {
    fn observer(&self) -> MutexGuard<'_, ObserverSlot> {
        self.observer.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Run the observer with the slot unlocked, so it may set or clear the
    /// observer itself. A set/clear made during the call wins over the
    /// observer that was running.
    fn notify(&self, measurements: &[RadarMeasurement]) {
        let (taken, generation) = {
            let mut slot = self.observer();
            (slot.observer.take(), slot.generation)
        };
        let Some(mut observer) = taken else {
            return;
        };

        observer(measurements);

        let mut slot = self.observer();
        if slot.generation == generation {
            slot.observer = Some(observer);
        }
    }

    fn dispatch(&self, data: &[u8]) -> rvr_core::Result<()> {
        let decoded = self.variant.decode(data).inspect_err(|e| {
            warn!("[{}] {} payload rejected: {e}", self.name, self.variant);
        })?;

        let Decoded::Measurements(measurements) = decoded else {
            debug!(
                "[{}] dropping incomplete {}-byte payload",
                self.name,
                data.len()
            );
            return Ok(());
        };

        self.notify(&measurements);
        Ok(())
    }
}

/// Owns the association between a transport characteristic and a decoder.
pub struct RadarSession<T: NotifyTransport> {
    transport: Arc<T>,
    dispatcher: Arc<Dispatcher>,
    enabled: AtomicBool,
}

impl<T: NotifyTransport> RadarSession<T> {
    pub fn new(transport: Arc<T>, variant: RadarVariant) -> Self {
        Self::with_name(transport, variant, variant.name())
    }

    /// Session with a custom label for log lines.
    pub fn with_name(transport: Arc<T>, variant: RadarVariant, name: &str) -> Self {
        RadarSession {
            transport,
            dispatcher: Arc::new(Dispatcher {
                name: name.to_string(),
                variant,
                observer: Mutex::default(),
            }),
            enabled: AtomicBool::new(false),
        }
    }

    pub fn variant(&self) -> RadarVariant {
        self.dispatcher.variant
    }

    pub fn name(&self) -> &str {
        &self.dispatcher.name
    }

    /// True once `enable` has succeeded and until `disable` succeeds.
    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Acquire)
    }

    /// Subscribe to the variant's characteristic.
    ///
    /// Transport errors are returned unchanged and leave the state as it was.
    /// Double-enable is left to the transport.
    pub async fn enable(&self) -> Result<(), T::Error> {
        let dispatcher = Arc::clone(&self.dispatcher);
        let handler: NotifyHandler = Arc::new(move |data: &[u8]| dispatcher.dispatch(data));

        self.transport
            .subscribe(self.variant().characteristic_id(), handler)
            .await?;
        self.enabled.store(true, Ordering::Release);
        info!("[{}] radar notifications enabled", self.name());
        Ok(())
    }

    /// Unsubscribe. Calling this on a never-enabled session is left to the
    /// transport.
    pub async fn disable(&self) -> Result<(), T::Error> {
        self.transport
            .unsubscribe(self.variant().characteristic_id())
            .await?;
        self.enabled.store(false, Ordering::Release);
        info!("[{}] radar notifications disabled", self.name());
        Ok(())
    }

    /// Replace the observer. Also allowed from inside the running observer.
    pub fn set_observer<F>(&self, observer: F)
    where
        F: FnMut(&[RadarMeasurement]) + Send + 'static,
    {
        self.dispatcher.observer().replace(Some(Box::new(observer)));
    }

    pub fn clear_observer(&self) {
        self.dispatcher.observer().replace(None);
    }

    /// True if an observer is registered. Reads false from inside the
    /// running observer, which is detached for the duration of the call.
    pub fn has_observer(&self) -> bool {
        self.dispatcher.observer().observer.is_some()
    }

    /// Decode one raw delivery and notify the observer.
    ///
    /// Incomplete payloads are dropped without calling the observer. Decode
    /// faults are returned to the caller.
    pub fn dispatch(&self, data: &[u8]) -> rvr_core::Result<()> {
        self.dispatcher.dispatch(data)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
