//! Rear-view radar service: picks a variant and exposes the session to callers.

use std::sync::Arc;

use rvr_core::{RadarMeasurement, RadarVariant};

use crate::session::RadarSession;
use crate::transport::NotifyTransport;

pub struct RearViewRadarService<T: NotifyTransport> {
    session: RadarSession<T>,
}

impl<T: NotifyTransport> RearViewRadarService<T> {
    pub fn new(transport: Arc<T>, variant: RadarVariant) -> Self {
        RearViewRadarService {
            session: RadarSession::new(transport, variant),
        }
    }

    /// Service whose log lines carry `name` instead of the variant name.
    pub fn with_name(transport: Arc<T>, variant: RadarVariant, name: &str) -> Self {
        RearViewRadarService {
            session: RadarSession::with_name(transport, variant, name),
        }
    }

    pub fn variant(&self) -> RadarVariant {
        self.session.variant()
    }

    pub fn session(&self) -> &RadarSession<T> {
        &self.session
    }

    pub async fn enable_radar_measurement_notifications(&self) -> Result<(), T::Error> {
        self.session.enable().await
    }

    pub async fn disable_radar_measurement_notifications(&self) -> Result<(), T::Error> {
        self.session.disable().await
    }

    /// Register the measurement callback, replacing any previous one.
    pub fn set_radar_measurement_handler<F>(&self, handler: F)
    where
        F: FnMut(&[RadarMeasurement]) + Send + 'static,
    {
        self.session.set_observer(handler);
    }

    pub fn clear_radar_measurement_handler(&self) {
        self.session.clear_observer();
    }
}

impl<T: NotifyTransport> RearViewRadarService<T>
where
    T: Default,
{
    /// Service over a freshly constructed transport, for transports that
    /// need no connection setup.
    pub fn with_default_transport(variant: RadarVariant) -> (Arc<T>, Self) {
        let transport = Arc::new(T::default());
        let service = Self::new(Arc::clone(&transport), variant);
        (transport, service)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::replay::ReplayTransport;
    use std::sync::Mutex;

    #[tokio::test]
    async fn test_service_end_to_end() {
        let (transport, service) = RearViewRadarService::<ReplayTransport>::with_default_transport(
            RadarVariant::ByteAligned,
        );
        assert_eq!(service.variant(), RadarVariant::ByteAligned);

        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        service.set_radar_measurement_handler(move |m| {
            sink.lock().unwrap().extend_from_slice(m);
        });

        service
            .enable_radar_measurement_notifications()
            .await
            .unwrap();
        assert!(service.session().is_enabled());

        let characteristic = service.variant().characteristic_id();
        transport.deliver(characteristic, &[0x00, 0x05]).unwrap(); // startup underrun
        transport
            .deliver(characteristic, &[0x00, 0x05, 0x0A, 0x14, 0x06, 0x28, 0x1E])
            .unwrap();

        service.disable_radar_measurement_notifications().await.unwrap();
        assert!(!service.session().is_enabled());

        let seen = seen.lock().unwrap();
        let ids: Vec<_> = seen.iter().map(|m| m.threat_id).collect();
        assert_eq!(ids, vec![Some(5), Some(6)]);
        assert_eq!(seen[1].distance, 40.0);
        assert_eq!(seen[1].speed, 30.0);
    }

    #[tokio::test]
    async fn test_clear_handler() {
        let transport = Arc::new(ReplayTransport::new());
        let service =
            RearViewRadarService::with_name(Arc::clone(&transport), RadarVariant::BitPacked, "rear");
        assert_eq!(service.session().name(), "rear");

        service.set_radar_measurement_handler(|_| panic!("handler was cleared"));
        service.clear_radar_measurement_handler();
        assert!(!service.session().has_observer());

        service.enable_radar_measurement_notifications().await.unwrap();
        transport
            .deliver(
                RadarVariant::BitPacked.characteristic_id(),
                &[0, 0xFF, 0, 0, 0, 0, 0, 0],
            )
            .unwrap();
    }
}
