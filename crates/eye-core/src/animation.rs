//! Timeline engine.
//!
//! A [`Timeline`] is an ordered list of tween segments, each moving one
//! numeric field of an [`Animatable`] from its current value to a target
//! value over a slice of the timeline. Playback supports a start delay,
//! repeats with a repeat delay, yoyo (ping-pong) iterations and a time scale.
//!
//! There are no callbacks. [`Timeline::advance`] returns a [`Tick`] saying
//! whether the timeline rendered and whether it completed during this call;
//! the owner reacts to that (typically by re-arming the timeline). Completion
//! is reported exactly once per run.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::EyeError;
use crate::params::{ColorParam, Rgb};
use crate::rig::Lid;

// ============================================================
// Easing
// ============================================================

/// Easing curves mapping `[0, 1]` monotonically onto `[0, 1]`.
///
/// `In(n)`/`Out(n)`/`InOut(n)` are the "power-N" curves, using exponent
/// `n + 1` (power1 is quadratic, power3 is quartic).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Easing {
    Linear,
    In(u8),
    Out(u8),
    InOut(u8),
}

impl Easing {
    pub fn apply(self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Easing::Linear => t,
            Easing::In(n) => t.powi(n as i32 + 1),
            Easing::Out(n) => 1.0 - (1.0 - t).powi(n as i32 + 1),
            Easing::InOut(n) => {
                let e = n as i32 + 1;
                if t < 0.5 {
                    0.5 * (2.0 * t).powi(e)
                } else {
                    1.0 - 0.5 * (2.0 * (1.0 - t)).powi(e)
                }
            }
        }
    }
}

impl Default for Easing {
    fn default() -> Self {
        Easing::Out(1)
    }
}

impl fmt::Display for Easing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Easing::Linear => f.write_str("linear"),
            Easing::In(n) => write!(f, "power{n}.in"),
            Easing::Out(n) => write!(f, "power{n}.out"),
            Easing::InOut(n) => write!(f, "power{n}.inOut"),
        }
    }
}

impl FromStr for Easing {
    type Err = EyeError;

    /// Accepts `linear`, `none`, `powerN` (same as `powerN.out`) and
    /// `powerN.in` / `powerN.out` / `powerN.inOut` for N in 0..=4.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bad = || EyeError::InvalidEasing(s.to_string());
        if s == "linear" || s == "none" {
            return Ok(Easing::Linear);
        }
        let rest = s.strip_prefix("power").ok_or_else(bad)?;
        let (n, mode) = rest.split_once('.').unwrap_or((rest, "out"));
        let n: u8 = n.parse().map_err(|_| bad())?;
        if n > 4 {
            return Err(bad());
        }
        if n == 0 {
            return Ok(Easing::Linear);
        }
        match mode {
            "in" => Ok(Easing::In(n)),
            "out" => Ok(Easing::Out(n)),
            "inOut" => Ok(Easing::InOut(n)),
            _ => Err(bad()),
        }
    }
}

impl TryFrom<String> for Easing {
    type Error = EyeError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<Easing> for String {
    fn from(e: Easing) -> Self {
        e.to_string()
    }
}

// ============================================================
// Targets
// ============================================================

/// Address of one animatable scalar field.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Target {
    Shrink,
    Vignette,
    Brightness,
    Darkness,
    /// One channel (0..3) of an iris color.
    Color(ColorParam, usize),
    /// Vertical gaze of both eyes.
    GazePitch,
    /// Horizontal gaze of both eyes.
    GazeYaw,
    Lid(Lid),
}

/// Something a timeline can read from and write into.
pub trait Animatable {
    fn read(&self, target: Target) -> f32;
    fn write(&mut self, target: Target, value: f32);
}

// ============================================================
// Timeline
// ============================================================

#[derive(Clone, Debug)]
struct Segment {
    target: Target,
    /// Captured the first time the segment renders.
    from: Option<f32>,
    to: f32,
    offset: f32,
    duration: f32,
    easing: Easing,
}

impl Segment {
    fn end(&self) -> f32 {
        self.offset + self.duration
    }

    fn progress(&self, t: f32) -> f32 {
        if self.duration <= 0.0 {
            return if t >= self.offset { 1.0 } else { 0.0 };
        }
        ((t - self.offset) / self.duration).clamp(0.0, 1.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Phase {
    /// Waiting out the start delay.
    Delay(f32),
    Playing,
    /// Waiting between two iterations.
    RepeatDelay(f32),
    Finished,
}

/// Result of one [`Timeline::advance`] call.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Tick {
    /// At least one segment was rendered.
    pub updated: bool,
    /// The timeline reached its end during this call.
    pub completed: bool,
    /// Unused part of `dt` (in caller seconds) left after completion.
    pub overflow: f32,
}

/// Repeat count meaning "forever".
pub const REPEAT_FOREVER: i32 = -1;

#[derive(Clone, Debug)]
pub struct Timeline {
    segments: Vec<Segment>,
    delay: f32,
    repeat: i32,
    repeat_delay: f32,
    yoyo: bool,
    time_scale: f32,
    phase: Phase,
    /// Playhead inside the current iteration, `0..=duration`.
    position: f32,
    iteration: u32,
    paused: bool,
    last_rendered: Option<f32>,
}

impl Default for Timeline {
    fn default() -> Self {
        Self::new()
    }
}

impl Timeline {
    pub fn new() -> Self {
        Self {
            segments: Vec::new(),
            delay: 0.0,
            repeat: 0,
            repeat_delay: 0.0,
            yoyo: false,
            time_scale: 1.0,
            phase: Phase::Playing,
            position: 0.0,
            iteration: 0,
            paused: false,
            last_rendered: None,
        }
    }

    // --- building ---

    /// Append a tween that starts where the timeline currently ends.
    pub fn to(self, target: Target, value: f32, duration: f32, easing: Easing) -> Self {
        let offset = self.duration();
        self.to_at(target, value, duration, easing, offset)
    }

    /// Insert a tween at an absolute offset inside the timeline.
    pub fn to_at(
        mut self,
        target: Target,
        value: f32,
        duration: f32,
        easing: Easing,
        offset: f32,
    ) -> Self {
        self.segments.push(Segment {
            target,
            from: None,
            to: value,
            offset: offset.max(0.0),
            duration: duration.max(0.0),
            easing,
        });
        self
    }

    /// Tween every channel of a color field at once.
    pub fn to_rgb(
        mut self,
        slot: ColorParam,
        color: Rgb,
        duration: f32,
        easing: Easing,
        offset: f32,
    ) -> Self {
        for (channel, value) in color.0.into_iter().enumerate() {
            self = self.to_at(Target::Color(slot, channel), value, duration, easing, offset);
        }
        self
    }

    pub fn with_delay(mut self, delay: f32) -> Self {
        self.set_delay(delay);
        self.phase = if self.delay > 0.0 {
            Phase::Delay(self.delay)
        } else {
            Phase::Playing
        };
        self
    }

    pub fn with_repeat(mut self, count: i32, delay: f32) -> Self {
        self.set_repeat(count, delay);
        self
    }

    pub fn with_yoyo(mut self, yoyo: bool) -> Self {
        self.set_yoyo(yoyo);
        self
    }

    pub fn with_time_scale(mut self, scale: f32) -> Self {
        self.set_time_scale(scale);
        self
    }

    /// Start out paused; nothing moves until `play`/`restart`.
    pub fn paused(mut self) -> Self {
        self.paused = true;
        self
    }

    // --- configuration ---

    /// Delay applied before the first iteration on `restart(true)`.
    pub fn set_delay(&mut self, delay: f32) {
        self.delay = delay.max(0.0);
    }

    pub fn delay(&self) -> f32 {
        self.delay
    }

    /// `count` extra iterations (or [`REPEAT_FOREVER`]) separated by `delay`.
    pub fn set_repeat(&mut self, count: i32, delay: f32) {
        self.repeat = count.max(REPEAT_FOREVER);
        self.repeat_delay = delay.max(0.0);
    }

    pub fn repeat_delay(&self) -> f32 {
        self.repeat_delay
    }

    pub fn set_yoyo(&mut self, yoyo: bool) {
        self.yoyo = yoyo;
    }

    pub fn set_time_scale(&mut self, scale: f32) {
        self.time_scale = scale.max(1e-6);
    }

    /// Drop every segment animating `target`.
    pub fn kill(&mut self, target: Target) {
        self.segments.retain(|s| s.target != target);
    }

    pub fn targets(&self, target: Target) -> bool {
        self.segments.iter().any(|s| s.target == target)
    }

    /// Forget captured start values; they are re-read on the next render.
    pub fn invalidate(&mut self) {
        for s in &mut self.segments {
            s.from = None;
        }
    }

    // --- playback control ---

    /// Resume playing, optionally jumping to `from` first (skips the delay).
    pub fn play(&mut self, from: Option<f32>) {
        if let Some(position) = from {
            self.iteration = 0;
            self.position = position.clamp(0.0, self.duration());
            self.phase = Phase::Playing;
            self.last_rendered = None;
        }
        self.paused = false;
    }

    pub fn pause(&mut self) {
        self.paused = true;
    }

    /// Rewind to the start and play. Anything in flight, including a pending
    /// completion, is superseded.
    pub fn restart(&mut self, include_delay: bool) {
        self.iteration = 0;
        self.position = 0.0;
        self.paused = false;
        self.last_rendered = None;
        self.phase = if include_delay && self.delay > 0.0 {
            Phase::Delay(self.delay)
        } else {
            Phase::Playing
        };
    }

    /// Move the playhead of the current iteration and render there.
    pub fn seek<A: Animatable + ?Sized>(&mut self, position: f32, world: &mut A) {
        self.position = position.clamp(0.0, self.duration());
        if matches!(self.phase, Phase::Delay(_) | Phase::RepeatDelay(_)) {
            self.phase = Phase::Playing;
        }
        self.render(world);
    }

    // --- state ---

    /// Length of one iteration.
    pub fn duration(&self) -> f32 {
        self.segments.iter().map(Segment::end).fold(0.0, f32::max)
    }

    pub fn position(&self) -> f32 {
        self.position
    }

    /// Playhead as a fraction of one iteration.
    pub fn progress(&self) -> f32 {
        let total = self.duration();
        if total <= 0.0 {
            1.0
        } else {
            self.position / total
        }
    }

    pub fn iteration(&self) -> u32 {
        self.iteration
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn is_finished(&self) -> bool {
        self.phase == Phase::Finished
    }

    pub fn is_active(&self) -> bool {
        !self.paused && !self.is_finished()
    }

    fn reversed(&self) -> bool {
        self.yoyo && self.iteration % 2 == 1
    }

    /// Timeline-local time the playhead maps to in this iteration.
    fn local_time(&self) -> f32 {
        if self.reversed() {
            self.duration() - self.position
        } else {
            self.position
        }
    }

    fn has_more_iterations(&self) -> bool {
        self.repeat == REPEAT_FOREVER || (self.iteration as i64) < self.repeat as i64
    }

    // --- frame step ---

    pub fn advance<A: Animatable + ?Sized>(&mut self, dt: f32, world: &mut A) -> Tick {
        let mut tick = Tick::default();
        if self.paused || self.is_finished() {
            return tick;
        }
        let mut remaining = (dt * self.time_scale).max(0.0);

        loop {
            match self.phase {
                Phase::Delay(wait) | Phase::RepeatDelay(wait) => {
                    if remaining < wait {
                        self.phase = match self.phase {
                            Phase::Delay(_) => Phase::Delay(wait - remaining),
                            _ => Phase::RepeatDelay(wait - remaining),
                        };
                        return tick;
                    }
                    remaining -= wait;
                    self.phase = Phase::Playing;
                }
                Phase::Playing => {
                    let total = self.duration();
                    let before = self.position;
                    self.position = (self.position + remaining).min(total);
                    remaining = (remaining - (self.position - before)).max(0.0);
                    self.render(world);
                    tick.updated = true;
                    if self.position < total {
                        return tick;
                    }

                    if !self.has_more_iterations() {
                        self.phase = Phase::Finished;
                        tick.completed = true;
                        tick.overflow = remaining / self.time_scale;
                        return tick;
                    }

                    self.iteration += 1;
                    self.position = 0.0;
                    if !self.yoyo {
                        // Wrapping jumps back to the start of every segment.
                        self.last_rendered = None;
                    }
                    self.phase = if self.repeat_delay > 0.0 {
                        Phase::RepeatDelay(self.repeat_delay)
                    } else {
                        Phase::Playing
                    };
                    if total <= 0.0 && self.repeat_delay <= 0.0 {
                        return tick;
                    }
                }
                Phase::Finished => return tick,
            }
        }
    }

    /// Write every segment touched between the previous render and now.
    fn render<A: Animatable + ?Sized>(&mut self, world: &mut A) {
        let t = self.local_time();
        let prev = self.last_rendered;
        let backwards = prev.is_some_and(|p| t < p);
        let n = self.segments.len();

        for k in 0..n {
            let i = if backwards { n - 1 - k } else { k };
            let seg = &mut self.segments[i];
            let touched = match prev {
                None => t >= seg.offset,
                Some(p) => p.max(t) >= seg.offset && p.min(t) <= seg.end(),
            };
            if !touched {
                continue;
            }
            let from = *seg.from.get_or_insert_with(|| world.read(seg.target));
            let k = seg.easing.apply(seg.progress(t));
            world.write(seg.target, from + (seg.to - from) * k);
        }
        self.last_rendered = Some(t);
    }
}
