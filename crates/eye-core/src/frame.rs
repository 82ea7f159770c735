//! Per-frame driver: advance animations first, then render what they wrote.

use std::time::Instant;

use crate::camera::Camera;
use crate::random::RandomSource;
use crate::scene::{EyeScene, EyeState, SceneTick};

/// Anything that can draw the current eye state.
pub trait RenderSurface {
    fn render(&mut self, state: &EyeState, camera: &Camera);
}

#[derive(Debug, Default)]
pub struct FrameLoop {
    last: Option<Instant>,
}

impl FrameLoop {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seconds since the previous call. The first call returns zero.
    pub fn measure(&mut self) -> f32 {
        let now = Instant::now();
        let dt = self
            .last
            .map(|last| now.duration_since(last).as_secs_f32())
            .unwrap_or(0.0);
        self.last = Some(now);
        dt
    }

    /// One frame on the wall clock.
    pub fn frame<R, S>(&mut self, scene: &mut EyeScene<R>, surface: &mut S) -> SceneTick
    where
        R: RandomSource,
        S: RenderSurface + ?Sized,
    {
        let dt = self.measure();
        Self::step(dt, scene, surface)
    }

    /// One frame with an explicit delta.
    pub fn step<R, S>(dt: f32, scene: &mut EyeScene<R>, surface: &mut S) -> SceneTick
    where
        R: RandomSource,
        S: RenderSurface + ?Sized,
    {
        let tick = scene.update(dt);
        surface.render(scene.state(), scene.camera());
        tick
    }
}
