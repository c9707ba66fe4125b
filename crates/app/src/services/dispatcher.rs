//! Dispatcher — the polling loop that drives every light.

use std::future::Future;
use std::time::Duration;

use chrono::NaiveDate;
use tokio::time::MissedTickBehavior;

use kelvin_domain::error::KelvinError;
use kelvin_domain::schedule::ScheduleDefinition;
use kelvin_domain::time::{self, Timestamp};

use crate::ports::{Bulb, EventPublisher, SunTimesProvider};
use crate::services::LightService;
use crate::status_board::StatusBoard;

/// Counters for one pass over all lights.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickReport {
    /// Lights polled without error.
    pub polled: usize,
    /// Lights whose bulb was written to.
    pub changed: usize,
    /// Lights whose poll failed.
    pub failed: usize,
}

/// Owns every [`LightService`] and ticks them one after another.
///
/// Schedules are built once per day from the definitions and that day's
/// sun times, then attached to the lights they apply to.
pub struct Dispatcher<B, S, P> {
    lights: Vec<LightService<B, P>>,
    definitions: Vec<ScheduleDefinition>,
    sun_times: S,
    board: StatusBoard,
    schedule_date: Option<NaiveDate>,
}

impl<B, S, P> Dispatcher<B, S, P>
where
    B: Bulb + Send + Sync,
    S: SunTimesProvider + Send + Sync,
    P: EventPublisher + Send + Sync,
{
    pub fn new(
        lights: Vec<LightService<B, P>>,
        definitions: Vec<ScheduleDefinition>,
        sun_times: S,
        board: StatusBoard,
    ) -> Self {
        Self {
            lights,
            definitions,
            sun_times,
            board,
            schedule_date: None,
        }
    }

    #[must_use]
    pub fn lights(&self) -> &[LightService<B, P>] {
        &self.lights
    }

    /// Build today's schedules and attach them.
    ///
    /// # Errors
    ///
    /// Returns an error if the sun times are unavailable or a definition
    /// does not build into a valid schedule.
    pub async fn start(&mut self, now: Timestamp) -> Result<(), KelvinError> {
        self.attach_schedules(now).await?;
        self.publish_board();
        Ok(())
    }

    /// Poll every light once.
    ///
    /// A failing light is logged and counted; the others are still polled.
    pub async fn tick(&mut self, now: Timestamp) -> TickReport {
        if self.needs_rebuild(now)
            && let Err(err) = self.attach_schedules(now).await
        {
            tracing::error!(
                error = %err,
                date = %now.date(),
                "failed to rebuild schedules"
            );
        }

        let mut report = TickReport::default();
        for service in &mut self.lights {
            match service.tick(now).await {
                Ok(decision) => {
                    report.polled += 1;
                    if decision.write().is_some() {
                        report.changed += 1;
                    }
                }
                Err(err) => {
                    report.failed += 1;
                    tracing::warn!(
                        light_id = %service.light().id(),
                        light = %service.light().name(),
                        error = %err,
                        "light poll failed"
                    );
                }
            }
        }
        self.publish_board();
        report
    }

    /// Tick every `period` until `shutdown` resolves.
    pub async fn run(&mut self, period: Duration, shutdown: impl Future<Output = ()>) {
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut shutdown = std::pin::pin!(shutdown);

        tracing::info!(lights = self.lights.len(), ?period, "dispatcher started");
        loop {
            tokio::select! {
                biased;
                () = &mut shutdown => break,
                _ = ticker.tick() => {
                    let report = self.tick(time::now()).await;
                    tracing::trace!(
                        polled = report.polled,
                        changed = report.changed,
                        failed = report.failed,
                        "tick done"
                    );
                }
            }
        }
        tracing::info!("dispatcher stopped");
    }

    fn needs_rebuild(&self, now: Timestamp) -> bool {
        self.schedule_date.is_none_or(|date| date < now.date())
    }

    async fn attach_schedules(&mut self, now: Timestamp) -> Result<(), KelvinError> {
        let date = now.date();
        let sun = self.sun_times.sun_times(date)?;
        let schedules = self
            .definitions
            .iter()
            .map(|definition| -> Result<_, KelvinError> {
                Ok((definition, definition.build(date, sun)?))
            })
            .collect::<Result<Vec<_>, _>>()?;

        for service in &mut self.lights {
            let id = service.light().id();
            match schedules
                .iter()
                .find(|(definition, _)| definition.applies_to(id))
            {
                Some((_, schedule)) => {
                    service.attach_schedule(schedule.clone(), now).await?;
                }
                None => tracing::info!(
                    light_id = %id,
                    light = %service.light().name(),
                    "no schedule applies, light stays unscheduled"
                ),
            }
        }
        self.schedule_date = Some(date);
        tracing::debug!(
            %date,
            sunrise = %sun.sunrise,
            sunset = %sun.sunset,
            "schedules attached"
        );
        Ok(())
    }

    fn publish_board(&self) {
        self.board
            .publish(self.lights.iter().map(LightService::status).collect());
    }
}
