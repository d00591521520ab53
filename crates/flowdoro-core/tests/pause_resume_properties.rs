//! Property tests for pause/resume accounting.

use std::sync::Arc;
use std::time::Duration;

use flowdoro_core::{ManualClock, MemoryStore, NullNotifier, Persistence, Phase, TimerEngine};
use proptest::prelude::*;

const T0: i64 = 1_700_000_000_000;

proptest! {
    /// After any run/pause sequence, the seconds shown right after the final
    /// resume equal the running time alone.
    #[test]
    fn elapsed_excludes_every_paused_interval(
        spans in prop::collection::vec((0u64..5_000, 0u64..120_000), 1..20),
        samples_per_span in 0usize..4,
    ) {
        let clock = ManualClock::new(T0);
        let persistence = Persistence::new(Box::new(MemoryStore::new()), Arc::new(clock.clone()));
        let mut engine = TimerEngine::new(
            1_000_000,
            60,
            Arc::new(clock.clone()),
            persistence,
            Box::new(NullNotifier),
        );
        engine.start();

        let mut running_ms = 0u64;
        for (run, paused) in &spans {
            for _ in 0..samples_per_span {
                clock.advance(Duration::from_millis(run / (samples_per_span as u64 + 1)));
                engine.tick();
            }
            let sampled = (run / (samples_per_span as u64 + 1)) * samples_per_span as u64;
            clock.advance(Duration::from_millis(run - sampled));
            running_ms += run;

            engine.pause();
            clock.advance(Duration::from_millis(*paused));
            engine.tick();
            engine.resume();
        }
        engine.tick();

        prop_assert_eq!(engine.phase(), Phase::Focus);
        prop_assert_eq!(engine.state().seconds, 1_000_000 - (running_ms / 1000) as i64);
        let paused_total: u64 = spans.iter().map(|(_, p)| p).sum();
        prop_assert_eq!(engine.state().pause_offset_ms, paused_total as i64);
    }

    #[test]
    fn progress_always_within_bounds(
        focus in 1u64..600,
        advance_ms in 0u64..2_000_000,
    ) {
        let clock = ManualClock::new(T0);
        let persistence = Persistence::new(Box::new(MemoryStore::new()), Arc::new(clock.clone()));
        let mut engine = TimerEngine::new(
            focus,
            focus,
            Arc::new(clock.clone()),
            persistence,
            Box::new(NullNotifier),
        );
        engine.start();
        clock.advance(Duration::from_millis(advance_ms));
        engine.tick();

        let progress = engine.progress();
        prop_assert!((0.0..=100.0).contains(&progress));
    }
}
