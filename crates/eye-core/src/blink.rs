//! Self-rescheduling blink loop.
//!
//! One blink is a single timeline: both lids rotate to their closed angles
//! (Closing), stay shut for the repeat delay (Closed), then the yoyo repeat
//! plays the same tweens backwards (Opening). When it completes, a fresh
//! random repeat delay is drawn and the timeline plays again from zero. Only
//! the very first blink waits out a start delay.

use crate::animation::{Animatable, Phase, Target, Tick, Timeline};
use crate::config::BlinkConfig;
use crate::random::RandomSource;
use crate::rig::Lid;

/// Upper bound on blinks replayed inside a single (stalled) frame. Time left
/// over past the cap is dropped.
const MAX_CATCH_UP: u32 = 16;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BlinkState {
    /// Eyes open during the warm-up before the first blink.
    Waiting,
    Closing,
    /// Fully shut during the pause between closing and opening.
    Closed,
    Opening,
}

#[derive(Clone, Debug)]
pub struct BlinkCycle {
    timeline: Timeline,
    delay_range: [f32; 2],
    delay_step: f32,
    blinks: u32,
}

impl BlinkCycle {
    pub fn new(config: &BlinkConfig) -> Self {
        let timeline = Timeline::new()
            .to_at(
                Target::Lid(Lid::Upper),
                config.upper_closed_angle,
                config.close_duration,
                config.easing,
                0.0,
            )
            .to_at(
                Target::Lid(Lid::Lower),
                config.lower_closed_angle,
                config.close_duration,
                config.easing,
                0.0,
            )
            .with_repeat(1, config.first_pause)
            .with_yoyo(true)
            .with_delay(config.warmup);

        Self {
            timeline,
            delay_range: config.delay_range,
            delay_step: config.delay_step,
            blinks: 0,
        }
    }

    /// Completed blinks so far.
    pub fn blinks(&self) -> u32 {
        self.blinks
    }

    /// How long the lids stay shut in the current (or next) blink.
    pub fn next_pause(&self) -> f32 {
        self.timeline.repeat_delay()
    }

    pub fn state(&self) -> BlinkState {
        match self.timeline.phase() {
            Phase::Delay(_) | Phase::Finished => BlinkState::Waiting,
            Phase::RepeatDelay(_) => BlinkState::Closed,
            Phase::Playing if self.timeline.iteration() == 0 => BlinkState::Closing,
            Phase::Playing => BlinkState::Opening,
        }
    }

    pub fn advance<A, R>(&mut self, dt: f32, world: &mut A, rng: &mut R) -> Tick
    where
        A: Animatable + ?Sized,
        R: RandomSource + ?Sized,
    {
        let mut tick = self.timeline.advance(dt, world);
        let mut out = tick;
        let mut rearms = 0;
        while tick.completed {
            self.blinks += 1;
            let [min, max] = self.delay_range;
            let pause = rng.snapped(min, max, self.delay_step);
            self.timeline.set_repeat(1, pause);
            self.timeline.play(Some(0.0));
            log::debug!("blink #{} done, next pause {pause:.1}s", self.blinks);

            rearms += 1;
            if rearms >= MAX_CATCH_UP {
                break;
            }
            tick = self.timeline.advance(tick.overflow, world);
            out.updated |= tick.updated;
        }
        out.overflow = 0.0;
        out
    }
}
