//! Click-triggered pupil pulse: snap `shrink` open, then ease it back.

use crate::animation::{Animatable, Target, Timeline};
use crate::config::ShrinkPulseConfig;

/// Outcome of one [`ShrinkPulse::advance`] call.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PulseTick {
    /// Live shrink value to mirror on the panel.
    pub shrink: Option<f32>,
    pub completed: bool,
}

#[derive(Clone, Debug)]
pub struct ShrinkPulse {
    timeline: Timeline,
    triggers: u32,
}

impl ShrinkPulse {
    pub fn new(config: &ShrinkPulseConfig) -> Self {
        let timeline = Timeline::new()
            .to(
                Target::Shrink,
                config.dilate_to,
                config.dilate_duration,
                config.dilate_easing,
            )
            .to(
                Target::Shrink,
                config.recover_to,
                config.recover_duration,
                config.recover_easing,
            )
            .with_time_scale(config.time_scale)
            .paused();
        Self {
            timeline,
            triggers: 0,
        }
    }

    /// Start from the beginning, superseding a run already in progress.
    pub fn trigger(&mut self) {
        self.triggers += 1;
        self.timeline.play(Some(0.0));
    }

    pub fn triggers(&self) -> u32 {
        self.triggers
    }

    pub fn is_active(&self) -> bool {
        self.timeline.is_active()
    }

    pub fn advance<A: Animatable + ?Sized>(&mut self, dt: f32, world: &mut A) -> PulseTick {
        let tick = self.timeline.advance(dt, world);
        PulseTick {
            shrink: tick.updated.then(|| world.read(Target::Shrink)),
            completed: tick.completed,
        }
    }
}
