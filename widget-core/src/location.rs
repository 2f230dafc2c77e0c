//! Location source contract and a fixed-coordinate implementation.

use std::time::Duration;

use tokio::{sync::mpsc::WeakUnboundedSender, task::JoinHandle};

use crate::{controller::WidgetEvent, model::Coordinate};

/// Platform permission state for location access.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthorizationStatus {
    NotDetermined,
    Restricted,
    Denied,
    AuthorizedWhenInUse,
    AuthorizedAlways,
}

impl AuthorizationStatus {
    pub fn is_granted(&self) -> bool {
        matches!(self, Self::AuthorizedWhenInUse | Self::AuthorizedAlways)
    }
}

/// Non-owning back-reference from a location source to the widget controller.
///
/// Updates posted after the controller is gone are dropped.
#[derive(Debug, Clone)]
pub struct LocationSink {
    events: WeakUnboundedSender<WidgetEvent>,
}

impl LocationSink {
    pub(crate) fn new(events: WeakUnboundedSender<WidgetEvent>) -> Self {
        Self { events }
    }

    /// Deliver an update. Returns `false` once the controller has gone away,
    /// so a streaming source can stop.
    pub fn on_location_update(&self, coordinate: Coordinate) -> bool {
        let Some(events) = self.events.upgrade() else {
            tracing::debug!("location update dropped; widget is gone");
            return false;
        };

        events.send(WidgetEvent::LocationUpdated(coordinate)).is_ok()
    }
}

/// A provider of location updates with a single subscriber.
///
/// All calls are idempotent. Implementations deliver updates from their own
/// context and must never call the sink concurrently with itself.
pub trait LocationSource: Send {
    fn set_delegate(&mut self, sink: LocationSink);

    /// Ask for permission. A granted status starts updates on its own;
    /// anything else is logged and the source stays idle.
    fn request_authorization(&mut self);

    fn start_updating(&mut self);

    fn stop_updating(&mut self);
}

/// Reports one configured coordinate, either once or on a fixed period.
#[derive(Debug)]
pub struct FixedLocationSource {
    coordinate: Coordinate,
    refresh: Option<Duration>,
    status: AuthorizationStatus,
    delegate: Option<LocationSink>,
    updating: bool,
    task: Option<JoinHandle<()>>,
}

impl FixedLocationSource {
    pub fn new(coordinate: Coordinate) -> Self {
        Self {
            coordinate,
            refresh: None,
            status: AuthorizationStatus::AuthorizedWhenInUse,
            delegate: None,
            updating: false,
            task: None,
        }
    }

    /// Re-report the coordinate every `period` instead of once.
    pub fn with_refresh(mut self, period: Duration) -> Self {
        self.refresh = Some(period);
        self
    }

    /// Simulate the answer the platform gives to an authorization request.
    pub fn with_authorization(mut self, status: AuthorizationStatus) -> Self {
        self.status = status;
        self
    }

    pub fn is_updating(&self) -> bool {
        self.updating
    }

    fn authorization_changed(&mut self) {
        if self.status.is_granted() {
            self.start_updating();
        } else {
            tracing::warn!(status = ?self.status, "Can't access location");
        }
    }
}

impl LocationSource for FixedLocationSource {
    fn set_delegate(&mut self, sink: LocationSink) {
        self.delegate = Some(sink);
    }

    fn request_authorization(&mut self) {
        self.authorization_changed();
    }

    fn start_updating(&mut self) {
        if self.updating {
            return;
        }
        if !self.status.is_granted() {
            tracing::warn!(status = ?self.status, "location updates need authorization");
            return;
        }
        let Some(sink) = self.delegate.clone() else {
            tracing::debug!("no location delegate set; not starting updates");
            return;
        };

        self.updating = true;
        let coordinate = self.coordinate;
        let refresh = self.refresh;

        self.task = Some(tokio::spawn(async move {
            match refresh {
                None => {
                    sink.on_location_update(coordinate);
                }
                Some(period) => {
                    let mut ticker = tokio::time::interval(period);
                    loop {
                        ticker.tick().await;
                        if !sink.on_location_update(coordinate) {
                            break;
                        }
                    }
                }
            }
        }));
    }

    fn stop_updating(&mut self) {
        self.updating = false;
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

impl Drop for FixedLocationSource {
    fn drop(&mut self) {
        self.stop_updating();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    fn coord() -> Coordinate {
        Coordinate::new(59.33, 18.07)
    }

    #[tokio::test]
    async fn granted_authorization_starts_updates() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut source = FixedLocationSource::new(coord());
        source.set_delegate(LocationSink::new(tx.downgrade()));

        source.request_authorization();
        assert!(source.is_updating());

        match rx.recv().await {
            Some(WidgetEvent::LocationUpdated(c)) => assert_eq!(c, coord()),
            other => panic!("expected a location update, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn start_is_idempotent() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut source = FixedLocationSource::new(coord());
        source.set_delegate(LocationSink::new(tx.downgrade()));

        source.request_authorization();
        source.start_updating();
        source.start_updating();

        assert!(matches!(rx.recv().await, Some(WidgetEvent::LocationUpdated(_))));
        tokio::task::yield_now().await;
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn denied_authorization_stays_idle() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut source = FixedLocationSource::new(coord())
            .with_authorization(AuthorizationStatus::Denied);
        source.set_delegate(LocationSink::new(tx.downgrade()));

        source.request_authorization();
        source.start_updating();

        assert!(!source.is_updating());
        tokio::task::yield_now().await;
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn refresh_period_repeats_until_stopped() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut source = FixedLocationSource::new(coord())
            .with_refresh(Duration::from_secs(30));
        source.set_delegate(LocationSink::new(tx.downgrade()));

        source.start_updating();
        for _ in 0..3 {
            assert!(matches!(rx.recv().await, Some(WidgetEvent::LocationUpdated(_))));
        }

        source.stop_updating();
        assert!(!source.is_updating());
        tokio::time::sleep(Duration::from_secs(120)).await;
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn sink_reports_when_widget_is_gone() {
        let (tx, rx) = mpsc::unbounded_channel::<WidgetEvent>();
        let sink = LocationSink::new(tx.downgrade());
        drop(tx);
        drop(rx);

        assert!(!sink.on_location_update(coord()));
    }
}
