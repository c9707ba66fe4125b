//! Light service — one [`Light`] paired with the bulb it drives.

use std::error::Error;

use kelvin_domain::error::KelvinError;
use kelvin_domain::event::{LightEvent, LightEventKind};
use kelvin_domain::light::{BulbReading, Decision, Light, LightStatus};
use kelvin_domain::schedule::Schedule;
use kelvin_domain::time::Timestamp;

use crate::ports::{Bulb, EventPublisher};

/// Drives one light: reads its bulb, runs the state machine, writes back.
///
/// All mutation goes through `&mut self`, so a light is never polled twice
/// at the same time.
pub struct LightService<B, P> {
    light: Light,
    bulb: B,
    publisher: P,
}

impl<B, P> LightService<B, P>
where
    B: Bulb + Send + Sync,
    P: EventPublisher + Send + Sync,
{
    pub fn new(light: Light, bulb: B, publisher: P) -> Self {
        Self {
            light,
            bulb,
            publisher,
        }
    }

    #[must_use]
    pub fn light(&self) -> &Light {
        &self.light
    }

    #[must_use]
    pub fn status(&self) -> LightStatus {
        self.light.status()
    }

    /// Replace the light's schedule and recompute its interval and target.
    ///
    /// # Errors
    ///
    /// Returns an error if publishing the resulting events fails.
    pub async fn attach_schedule(
        &mut self,
        schedule: Schedule,
        now: Timestamp,
    ) -> Result<(), KelvinError> {
        let events = self.light.attach_schedule(schedule, now);
        self.publish_all(events, now).await
    }

    /// Re-read reachability and power state from the bulb.
    ///
    /// A failed read counts as unreachable for this tick.
    pub async fn refresh(&mut self) {
        match self.bulb.refresh().await {
            Ok(status) => self.light.observe_presence(status.reachable, status.on),
            Err(err) => {
                tracing::debug!(
                    light_id = %self.light.id(),
                    light = %self.light.name(),
                    error = %error_chain(&err),
                    "bulb refresh failed"
                );
                self.light.observe_presence(false, false);
            }
        }
    }

    /// Move the active interval and target state forward to `now`.
    ///
    /// # Errors
    ///
    /// Returns an error if publishing the resulting events fails.
    pub async fn refresh_schedule(&mut self, now: Timestamp) -> Result<(), KelvinError> {
        let mut events = Vec::new();
        events.extend(self.light.refresh_interval(now));
        events.extend(self.light.refresh_target_state(now));
        self.publish_all(events, now).await
    }

    /// Run one step of the state machine against the last refreshed bulb
    /// state, writing to the bulb when the step calls for it.
    ///
    /// # Errors
    ///
    /// Returns [`KelvinError::Bulb`] when the write failed. The light keeps
    /// a consistent state and a later tick decides afresh.
    pub async fn poll(&mut self, now: Timestamp) -> Result<Decision, KelvinError> {
        let reading = BulbReading {
            matches_target: self
                .light
                .target_light_state()
                .is_some_and(|target| self.bulb.has_state(target)),
            changed_externally: self.bulb.has_changed(),
        };
        let decision = self.light.decide(&reading);

        let write_result = match decision.write() {
            Some(state) => self.bulb.set_state(state).await,
            None => Ok(()),
        };

        let events = self.light.apply(&decision, now, write_result.is_ok());
        self.publish_all(events, now).await?;

        if let Err(err) = write_result {
            let error = error_chain(&err);
            tracing::warn!(
                light_id = %self.light.id(),
                light = %self.light.name(),
                error = %error,
                "failed to write bulb state"
            );
            self.publish_all(vec![LightEventKind::WriteFailed { error }], now)
                .await?;
            return Err(err.into());
        }
        Ok(decision)
    }

    /// Refresh, advance the schedule, then poll.
    ///
    /// # Errors
    ///
    /// See [`poll`](Self::poll).
    pub async fn tick(&mut self, now: Timestamp) -> Result<Decision, KelvinError> {
        self.refresh().await;
        self.refresh_schedule(now).await?;
        self.poll(now).await
    }

    async fn publish_all(
        &self,
        events: Vec<LightEventKind>,
        now: Timestamp,
    ) -> Result<(), KelvinError> {
        for kind in events {
            let event = LightEvent::new(self.light.id(), self.light.name(), kind, now);
            self.publisher.publish(event).await?;
        }
        Ok(())
    }
}

/// Render an error and its sources as `outer: inner: root`.
fn error_chain(err: &dyn Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use tokio::sync::broadcast;

    use kelvin_domain::error::BulbError;
    use kelvin_domain::id::LightId;
    use kelvin_domain::light::Outcome;
    use kelvin_domain::light_state::LightState;
    use kelvin_domain::schedule::ScheduleDefinition;

    use super::*;
    use crate::event_bus::InProcessEventBus;
    use crate::ports::SunTimesProvider;
    use crate::services::fakes::{FakeBulb, FakeSunTimes, at, day};

    type Service = LightService<Arc<FakeBulb>, Arc<InProcessEventBus>>;

    fn schedule(enable: bool) -> Schedule {
        let definition = ScheduleDefinition {
            enable_when_lights_appear: enable,
            ..ScheduleDefinition::default()
        };
        definition
            .build(day(), FakeSunTimes.sun_times(day()).unwrap())
            .unwrap()
    }

    fn service(bulb: &Arc<FakeBulb>) -> (Service, broadcast::Receiver<LightEvent>) {
        let bus = Arc::new(InProcessEventBus::new(64));
        let rx = bus.subscribe();
        let light = Light::new(LightId::new(1), "Desk");
        (LightService::new(light, Arc::clone(bulb), bus), rx)
    }

    fn drain(rx: &mut broadcast::Receiver<LightEvent>) -> Vec<LightEventKind> {
        let mut kinds = Vec::new();
        while let Ok(event) = rx.try_recv() {
            kinds.push(event.kind);
        }
        kinds
    }

    #[tokio::test]
    async fn should_publish_attach_events() {
        let bulb = Arc::new(FakeBulb::present());
        let (mut svc, mut rx) = service(&bulb);

        svc.attach_schedule(schedule(false), at(12, 0))
            .await
            .unwrap();

        let kinds = drain(&mut rx);
        assert!(matches!(kinds[0], LightEventKind::ScheduleAttached { .. }));
        assert!(matches!(kinds[1], LightEventKind::IntervalActivated { .. }));
        assert_eq!(
            kinds[2],
            LightEventKind::TargetInitialized {
                state: LightState::kelvin(2750, 100)
            }
        );
        assert!(svc.light().is_scheduled());
    }

    #[tokio::test]
    async fn should_treat_refresh_error_as_unreachable() {
        let bulb = Arc::new(FakeBulb::present());
        bulb.with(|s| s.refresh_fails = true);
        let (mut svc, _rx) = service(&bulb);

        svc.refresh().await;

        assert!(!svc.light().is_reachable());
        assert!(!svc.light().is_on());
    }

    #[tokio::test]
    async fn should_do_nothing_without_schedule() {
        let bulb = Arc::new(FakeBulb::present());
        let (mut svc, mut rx) = service(&bulb);

        let decision = svc.tick(at(12, 0)).await.unwrap();

        assert_eq!(decision.outcome, Outcome::Unscheduled);
        assert!(bulb.writes().is_empty());
        assert!(drain(&mut rx).is_empty());
    }

    #[tokio::test]
    async fn should_claim_matching_light_with_a_single_write() {
        let bulb = Arc::new(FakeBulb::present());
        bulb.with(|s| s.matches = true);
        let (mut svc, mut rx) = service(&bulb);
        svc.attach_schedule(schedule(false), at(12, 0))
            .await
            .unwrap();
        drain(&mut rx);

        let first = svc.tick(at(12, 0)).await.unwrap();
        let second = svc.tick(at(12, 0)).await.unwrap();

        assert_eq!(first.outcome, Outcome::Claim(LightState::kelvin(2750, 100)));
        assert_eq!(second.outcome, Outcome::InSync);
        assert_eq!(bulb.writes(), vec![LightState::kelvin(2750, 100)]);
        assert!(svc.light().is_automatic());
        assert_eq!(
            drain(&mut rx),
            vec![
                LightEventKind::Appeared,
                LightEventKind::Claimed {
                    state: LightState::kelvin(2750, 100)
                },
            ]
        );
    }

    #[tokio::test]
    async fn should_initialize_on_appearance_when_enabled() {
        let bulb = Arc::new(FakeBulb::present());
        let (mut svc, _rx) = service(&bulb);
        svc.attach_schedule(schedule(true), at(12, 0))
            .await
            .unwrap();

        let decision = svc.tick(at(12, 0)).await.unwrap();

        assert_eq!(
            decision.outcome,
            Outcome::Initialize(LightState::kelvin(2750, 100))
        );
        assert_eq!(bulb.writes().len(), 1);
        assert!(svc.light().is_automatic());
    }

    #[tokio::test]
    async fn should_publish_write_failure_and_return_error() {
        let bulb = Arc::new(FakeBulb::present());
        bulb.with(|s| s.fail_writes = true);
        let (mut svc, mut rx) = service(&bulb);
        svc.attach_schedule(schedule(true), at(12, 0))
            .await
            .unwrap();
        drain(&mut rx);

        let err = svc.tick(at(12, 0)).await.unwrap_err();

        assert!(matches!(err, KelvinError::Bulb(BulbError::WriteFailed(_))));
        assert!(svc.light().is_tracking());
        assert!(!svc.light().is_automatic());
        assert_eq!(svc.light().appearance(), Some(at(12, 0)));
        assert_eq!(
            drain(&mut rx),
            vec![
                LightEventKind::Appeared,
                LightEventKind::WriteFailed {
                    error: "failed to write bulb state: connection reset".to_string()
                },
            ]
        );
    }

    #[tokio::test]
    async fn should_claim_after_failed_initial_write_once_bulb_matches() {
        let bulb = Arc::new(FakeBulb::present());
        bulb.with(|s| s.fail_writes = true);
        let (mut svc, _rx) = service(&bulb);
        svc.attach_schedule(schedule(true), at(12, 0))
            .await
            .unwrap();
        svc.tick(at(12, 0)).await.unwrap_err();
        bulb.with(|s| s.fail_writes = false);

        let standby = svc.tick(at(12, 1)).await.unwrap();
        assert_eq!(standby.outcome, Outcome::StandBy);
        assert!(bulb.writes().is_empty());

        bulb.with(|s| s.matches = true);
        let claim = svc.tick(at(12, 2)).await.unwrap();
        assert_eq!(claim.outcome, Outcome::Claim(LightState::kelvin(2750, 100)));
        assert!(svc.light().is_automatic());
        assert_eq!(bulb.writes().len(), 1);
    }

    #[tokio::test]
    async fn should_step_back_when_light_changed_by_hand() {
        let bulb = Arc::new(FakeBulb::present());
        let (mut svc, mut rx) = service(&bulb);
        svc.attach_schedule(schedule(true), at(12, 0))
            .await
            .unwrap();
        svc.tick(at(12, 0)).await.unwrap();
        drain(&mut rx);

        bulb.with(|s| s.changed = true);
        let decision = svc.tick(at(12, 5)).await.unwrap();

        assert_eq!(decision.outcome, Outcome::Override);
        assert!(!svc.light().is_automatic());
        assert_eq!(bulb.writes().len(), 1);
        assert_eq!(
            drain(&mut rx),
            vec![LightEventKind::ManualOverride {
                after_secs: Some(300)
            }]
        );
    }

    #[tokio::test]
    async fn should_report_disappearance_once() {
        let bulb = Arc::new(FakeBulb::present());
        bulb.with(|s| s.matches = true);
        let (mut svc, mut rx) = service(&bulb);
        svc.attach_schedule(schedule(false), at(12, 0))
            .await
            .unwrap();
        svc.tick(at(12, 0)).await.unwrap();
        drain(&mut rx);

        bulb.with(|s| s.refresh_fails = true);
        svc.tick(at(12, 1)).await.unwrap();
        svc.tick(at(12, 2)).await.unwrap();

        assert_eq!(drain(&mut rx).len(), 1);
        assert!(!svc.light().is_tracking());
        assert!(!svc.light().is_automatic());
    }

    #[test]
    fn should_render_error_chain() {
        let err = BulbError::Unreachable("timed out".into());
        assert_eq!(error_chain(&err), "bulb unreachable: timed out");
    }
}
