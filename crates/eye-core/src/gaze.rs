//! Random gaze redirection and the one-way demon transition.
//!
//! Every cycle draws a look direction and a pupil size, waits a short random
//! pre-delay, then turns both eyes and tweens `shrink` over a fixed duration.
//! A finished cycle immediately schedules the next one. Cycles that finish at
//! or after the demon deadline also switch the iris to the demon palette.

use crate::animation::{Target, Timeline};
use crate::config::GazeConfig;
use crate::params::SHRINK_RANGE;
use crate::random::RandomSource;
use crate::scene::EyeState;

/// Upper bound on cycles replayed inside a single (stalled) frame.
const MAX_CATCH_UP: u32 = 16;

/// Destination drawn for one gaze cycle.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Look {
    pub pitch: f32,
    pub yaw: f32,
    /// `None` while another behavior owns the shrink field.
    pub shrink: Option<f32>,
    pub pre_delay: f32,
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct GazeTick {
    pub updated: bool,
    /// Cycles that finished during this call.
    pub completed: u32,
    /// Set on the call that first switched to the demon palette.
    pub turned_demon: bool,
    /// Live shrink value, when this controller wrote it.
    pub shrink: Option<f32>,
}

#[derive(Clone, Debug)]
pub struct GazeController {
    config: GazeConfig,
    timeline: Timeline,
    look: Look,
    deadline: f32,
    cycles: u32,
    demon: bool,
    owns_shrink: bool,
}

impl GazeController {
    /// Start the first cycle. The demon deadline is fixed here, relative to
    /// `now`.
    pub fn new<R: RandomSource + ?Sized>(config: &GazeConfig, now: f32, rng: &mut R) -> Self {
        let look = draw_look(config, rng, true);
        Self {
            config: config.clone(),
            timeline: build_timeline(config, &look),
            look,
            deadline: now + config.demon_after,
            cycles: 0,
            demon: false,
            owns_shrink: true,
        }
    }

    pub fn deadline(&self) -> f32 {
        self.deadline
    }

    pub fn cycles(&self) -> u32 {
        self.cycles
    }

    pub fn is_demon(&self) -> bool {
        self.demon
    }

    /// Target of the cycle in flight.
    pub fn look(&self) -> Look {
        self.look
    }

    /// Stop writing `shrink`, including in the cycle already in flight.
    pub fn yield_shrink(&mut self) {
        self.owns_shrink = false;
        self.timeline.kill(Target::Shrink);
        self.look.shrink = None;
    }

    /// Resume animating `shrink` from the next cycle on.
    pub fn reclaim_shrink(&mut self) {
        self.owns_shrink = true;
    }

    /// `now` is the scene clock at the end of this frame.
    pub fn advance<R: RandomSource + ?Sized>(
        &mut self,
        dt: f32,
        now: f32,
        state: &mut EyeState,
        rng: &mut R,
    ) -> GazeTick {
        let mut out = GazeTick::default();
        let mut tick = self.timeline.advance(dt, state);
        out.updated = tick.updated;
        if tick.updated && self.timeline.targets(Target::Shrink) {
            out.shrink = Some(state.params.shrink);
        }

        while tick.completed {
            self.cycles += 1;
            out.completed += 1;

            let finished_at = now - tick.overflow;
            if finished_at >= self.deadline {
                // Re-applying on later cycles writes the same values.
                state.params.apply_demon_palette(
                    self.config.demon_base_color_1,
                    self.config.demon_base_color_2,
                );
                if !self.demon {
                    self.demon = true;
                    out.turned_demon = true;
                    log::info!("demon palette engaged after {} gaze cycles", self.cycles);
                }
            }

            self.look = draw_look(&self.config, rng, self.owns_shrink);
            self.timeline = build_timeline(&self.config, &self.look);
            log::debug!(
                "gaze cycle {}: pitch {:.2} yaw {:.2} in {:.1}s",
                self.cycles,
                self.look.pitch,
                self.look.yaw,
                self.look.pre_delay
            );

            // Past the cap the fresh cycle starts now and the backlog is dropped.
            if out.completed >= MAX_CATCH_UP {
                break;
            }
            tick = self.timeline.advance(tick.overflow, state);
            out.updated |= tick.updated;
            if tick.updated && self.timeline.targets(Target::Shrink) {
                out.shrink = Some(state.params.shrink);
            }
        }
        out
    }
}

fn draw_look<R: RandomSource + ?Sized>(config: &GazeConfig, rng: &mut R, with_shrink: bool) -> Look {
    let pitch = rng.range(-config.max_pitch, config.max_pitch);
    let yaw = rng.range(-config.max_yaw, config.max_yaw);
    let [lo, hi] = config.shrink_range;
    let shrink = rng
        .snapped(lo, hi, config.shrink_step)
        .clamp(*SHRINK_RANGE.start(), *SHRINK_RANGE.end());
    let [min_delay, max_delay] = config.pre_delay_range;
    let pre_delay = rng.snapped(min_delay, max_delay, config.pre_delay_step);
    Look {
        pitch,
        yaw,
        shrink: with_shrink.then_some(shrink),
        pre_delay,
    }
}

fn build_timeline(config: &GazeConfig, look: &Look) -> Timeline {
    let mut timeline = Timeline::new()
        .to_at(Target::GazePitch, look.pitch, config.duration, config.rotation_easing, 0.0)
        .to_at(Target::GazeYaw, look.yaw, config.duration, config.rotation_easing, 0.0);
    if let Some(shrink) = look.shrink {
        timeline = timeline.to_at(Target::Shrink, shrink, config.duration, config.shrink_easing, 0.0);
    }
    timeline.with_delay(look.pre_delay)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::{IrisParams, Rgb, DEMON_BASE_COLOR_1, DEMON_BASE_COLOR_2};

    struct Fixed(f32);

    impl RandomSource for Fixed {
        fn unit(&mut self) -> f32 {
            self.0
        }
    }

    const DT: f32 = 1.0 / 64.0;

    /// Advance in exact 1/64 s steps, returning the final clock.
    fn run(
        gaze: &mut GazeController,
        state: &mut EyeState,
        rng: &mut Fixed,
        from: f32,
        seconds: f32,
        ticks: &mut Vec<GazeTick>,
    ) -> f32 {
        let mut now = from;
        for _ in 0..(seconds * 64.0) as usize {
            now += DT;
            ticks.push(gaze.advance(DT, now, state, rng));
        }
        now
    }

    #[test]
    fn first_cycle_draws_bounded_look() {
        let config = GazeConfig::default();
        let gaze = GazeController::new(&config, 0.0, &mut Fixed(0.0));
        let look = gaze.look();
        assert_eq!(look.pitch, -0.5);
        assert_eq!(look.yaw, -1.0);
        assert_eq!(look.shrink, Some(-0.5));
        assert_eq!(look.pre_delay, 0.5);
        assert_eq!(gaze.deadline(), 10.0);
    }

    #[test]
    fn eyes_reach_the_drawn_look_together() {
        let mut state = EyeState::default();
        let mut rng = Fixed(0.0);
        let mut gaze = GazeController::new(&GazeConfig::default(), 0.0, &mut rng);
        let mut ticks = Vec::new();
        // pre-delay 0.5 + duration 0.5, minus one frame so it has not wrapped yet
        run(&mut gaze, &mut state, &mut rng, 0.0, 1.0 - DT, &mut ticks);
        assert_eq!(gaze.cycles(), 0);
        let (pitch, yaw) = state.rig.gaze();
        assert!((pitch + 0.5).abs() < 0.01 && (yaw + 1.0).abs() < 0.01);
        assert!(state.rig.is_conjugate());
        assert!(ticks.iter().any(|t| t.shrink.is_some()));
    }

    #[test]
    fn palette_is_untouched_before_the_deadline() {
        let mut state = EyeState::default();
        let mut rng = Fixed(0.0);
        let mut gaze = GazeController::new(&GazeConfig::default(), 0.0, &mut rng);
        let mut ticks = Vec::new();
        run(&mut gaze, &mut state, &mut rng, 0.0, 9.5, &mut ticks);
        assert_eq!(gaze.cycles(), 9);
        let calm = IrisParams::default();
        assert_eq!(state.params.base_color_1, calm.base_color_1);
        assert_eq!(state.params.base_color_2, calm.base_color_2);
        assert!(!state.params.cat_eye);
        assert!(!gaze.is_demon());
    }

    #[test]
    fn demon_transition_fires_once_and_sticks() {
        let mut state = EyeState::default();
        let mut rng = Fixed(0.0);
        let mut gaze = GazeController::new(&GazeConfig::default(), 0.0, &mut rng);
        let mut ticks = Vec::new();
        run(&mut gaze, &mut state, &mut rng, 0.0, 15.0, &mut ticks);

        assert!(gaze.cycles() >= 14);
        assert_eq!(ticks.iter().filter(|t| t.turned_demon).count(), 1);
        assert_eq!(state.params.base_color_1, Rgb::from_rgb8(DEMON_BASE_COLOR_1));
        assert_eq!(state.params.base_color_2, Rgb::from_rgb8(DEMON_BASE_COLOR_2));
        assert!(state.params.cat_eye);
        assert_eq!(state.params.mid_color, IrisParams::default().mid_color);
    }

    #[test]
    fn yielded_shrink_is_left_alone() {
        let mut state = EyeState::default();
        let mut rng = Fixed(0.0);
        let mut gaze = GazeController::new(&GazeConfig::default(), 0.0, &mut rng);
        gaze.yield_shrink();
        state.params.shrink = 0.2;
        let mut ticks = Vec::new();
        let now = run(&mut gaze, &mut state, &mut rng, 0.0, 3.0, &mut ticks);
        assert_eq!(state.params.shrink, 0.2);
        assert!(ticks.iter().all(|t| t.shrink.is_none()));

        gaze.reclaim_shrink();
        run(&mut gaze, &mut state, &mut rng, now, 2.0, &mut ticks);
        assert!((state.params.shrink + 0.5).abs() < 1e-5);
    }

    #[test]
    fn stalled_frame_keeps_cycling() {
        let mut state = EyeState::default();
        let mut rng = Fixed(0.0);
        let mut gaze = GazeController::new(&GazeConfig::default(), 0.0, &mut rng);
        let stall = gaze.advance(60.0, 60.0, &mut state, &mut rng);
        assert_eq!(stall.completed, MAX_CATCH_UP);
        assert!(stall.turned_demon);

        let mut ticks = Vec::new();
        run(&mut gaze, &mut state, &mut rng, 60.0, 3.0, &mut ticks);
        assert!(gaze.cycles() >= MAX_CATCH_UP + 2, "{}", gaze.cycles());
        assert!(ticks.iter().all(|t| !t.turned_demon));
        assert!(state.params.cat_eye);
    }
}
