//! Shared timer with a background sampler.
//!
//! Commands and sampler ticks both read-modify-write the clock anchors, so
//! every mutation goes through one mutex around the engine. The sampler is a
//! tokio task that runs only while a session is active.

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use super::command::Command;
use super::engine::TimerEngine;
use super::state::{TimerState, TimerView};
use crate::events::Event;

pub const DEFAULT_SAMPLE_INTERVAL: Duration = Duration::from_millis(250);

pub struct TimerService {
    engine: Arc<Mutex<TimerEngine>>,
    sampler: Mutex<Option<JoinHandle<()>>>,
    interval: Duration,
    events: mpsc::UnboundedSender<Event>,
}

impl TimerService {
    /// Wrap `engine`. Every event the timer produces, from commands or
    /// from the sampler, is also sent on the returned channel.
    pub fn new(
        engine: TimerEngine,
        interval: Duration,
    ) -> (Self, mpsc::UnboundedReceiver<Event>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let service = Self {
            engine: Arc::new(Mutex::new(engine)),
            sampler: Mutex::new(None),
            interval,
            events: tx,
        };
        (service, rx)
    }

    /// Apply a command and start or stop the sampler to match.
    ///
    /// Must be called from within a tokio runtime.
    pub fn dispatch(&self, command: Command) -> Option<Event> {
        let (event, active) = {
            let mut engine = lock(&self.engine);
            (engine.apply(command), engine.is_active())
        };
        if let Some(ref event) = event {
            let _ = self.events.send(event.clone());
        }
        self.sync_sampler(active);
        event
    }

    /// Run one sample immediately, outside the sampler's cadence.
    pub fn tick(&self) -> Option<Event> {
        let event = lock(&self.engine).tick();
        if let Some(ref event) = event {
            let _ = self.events.send(event.clone());
        }
        event
    }

    /// Start sampling if the engine holds an active session, e.g. one
    /// restored from a snapshot.
    pub fn resume_sampling(&self) {
        let active = lock(&self.engine).is_active();
        self.sync_sampler(active);
    }

    pub fn view(&self) -> TimerView {
        lock(&self.engine).view()
    }

    pub fn state(&self) -> TimerState {
        lock(&self.engine).state().clone()
    }

    pub fn is_sampling(&self) -> bool {
        lock(&self.sampler)
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    /// Stop the sampler without touching the timer state.
    pub fn shutdown(&self) {
        if let Some(handle) = lock(&self.sampler).take() {
            handle.abort();
        }
    }

    fn sync_sampler(&self, active: bool) {
        let mut slot = lock(&self.sampler);
        let running = slot.as_ref().is_some_and(|handle| !handle.is_finished());
        match (active, running) {
            (true, false) => {
                *slot = Some(spawn_sampler(
                    self.engine.clone(),
                    self.interval,
                    self.events.clone(),
                ));
            }
            (false, true) => {
                if let Some(handle) = slot.take() {
                    handle.abort();
                }
            }
            _ => {}
        }
    }
}

impl Drop for TimerService {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn spawn_sampler(
    engine: Arc<Mutex<TimerEngine>>,
    period: Duration,
    events: mpsc::UnboundedSender<Event>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        loop {
            ticker.tick().await;
            let (event, active) = {
                let mut engine = lock(&engine);
                (engine.tick(), engine.is_active())
            };
            if let Some(event) = event {
                if events.send(event).is_err() {
                    tracing::debug!("event receiver dropped");
                }
            }
            if !active {
                tracing::debug!("session ended, sampler stopping");
                break;
            }
        }
    })
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::notify::NullNotifier;
    use crate::storage::{MemoryStore, Persistence};
    use crate::timer::Phase;

    fn service(clock: &ManualClock) -> (TimerService, mpsc::UnboundedReceiver<Event>) {
        let persistence = Persistence::new(Box::new(MemoryStore::new()), Arc::new(clock.clone()));
        let engine = TimerEngine::new(
            2,
            3,
            Arc::new(clock.clone()),
            persistence,
            Box::new(NullNotifier),
        );
        TimerService::new(engine, DEFAULT_SAMPLE_INTERVAL)
    }

    #[tokio::test(start_paused = true)]
    async fn sampler_runs_only_during_session() {
        let clock = ManualClock::new(0);
        let (service, _rx) = service(&clock);
        assert!(!service.is_sampling());

        service.dispatch(Command::Start);
        assert!(service.is_sampling());

        service.dispatch(Command::Reset);
        assert!(!service.is_sampling());
    }

    #[tokio::test(start_paused = true)]
    async fn sampler_detects_expiry() {
        let clock = ManualClock::new(0);
        let (service, mut rx) = service(&clock);

        service.dispatch(Command::Start);
        assert!(matches!(rx.recv().await, Some(Event::FocusStarted { .. })));

        clock.advance(Duration::from_secs(2));
        tokio::time::sleep(Duration::from_millis(300)).await;

        assert!(matches!(rx.recv().await, Some(Event::FocusExpired { .. })));
        let view = service.view();
        assert_eq!(view.phase, Phase::Focus);
        assert!(view.awaiting_continue);
        assert_eq!(view.progress, 100.0);
    }

    #[tokio::test(start_paused = true)]
    async fn commands_and_ticks_share_one_state() {
        let clock = ManualClock::new(0);
        let (service, mut rx) = service(&clock);

        service.dispatch(Command::Start);
        clock.advance(Duration::from_millis(1_200));
        service.dispatch(Command::Pause);
        clock.advance(Duration::from_secs(30));
        tokio::time::sleep(Duration::from_secs(1)).await;
        service.dispatch(Command::Resume);

        let state = service.state();
        assert_eq!(state.pause_offset_ms, 30_000);
        assert_eq!(state.phase, Phase::Focus);
        assert!(!state.paused);

        // Started, Paused, Resumed and nothing from the paused ticks.
        let mut kinds = Vec::new();
        while let Ok(event) = rx.try_recv() {
            kinds.push(event);
        }
        assert_eq!(kinds.len(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn restored_session_resumes_sampling() {
        let clock = ManualClock::new(0);
        let (service, _rx) = service(&clock);
        service.resume_sampling();
        assert!(!service.is_sampling());

        service.dispatch(Command::Start);
        service.shutdown();
        assert!(!service.is_sampling());
        service.resume_sampling();
        assert!(service.is_sampling());
        assert!(service.tick().is_none());
    }
}
