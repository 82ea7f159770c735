//! The animated eye pair: live state plus every behavior that drives it.

use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::animation::{Animatable, Target, Tick};
use crate::blink::BlinkCycle;
use crate::camera::Camera;
use crate::config::EyeConfig;
use crate::gaze::{GazeController, GazeTick};
use crate::input::{normalize_pointer, PointerEvent};
use crate::params::{ColorParam, IrisParams};
use crate::pulse::{PulseTick, ShrinkPulse};
use crate::random::RandomSource;
use crate::rig::EyeRig;

/// Everything the renderer reads each frame.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct EyeState {
    pub params: IrisParams,
    pub rig: EyeRig,
}

impl Animatable for EyeState {
    fn read(&self, target: Target) -> f32 {
        match target {
            Target::Shrink => self.params.shrink,
            Target::Vignette => self.params.vignette,
            Target::Brightness => self.params.brightness,
            Target::Darkness => self.params.darkness,
            Target::Color(slot, channel) => slot.get(&self.params).0[channel.min(2)],
            Target::GazePitch => self.rig.gaze().0,
            Target::GazeYaw => self.rig.gaze().1,
            Target::Lid(lid) => self.rig.lid_angle(lid),
        }
    }

    fn write(&mut self, target: Target, value: f32) {
        match target {
            Target::Shrink => self.params.shrink = value,
            Target::Vignette => self.params.vignette = value,
            Target::Brightness => self.params.brightness = value,
            Target::Darkness => self.params.darkness = value,
            Target::Color(slot, channel) => {
                let color = match slot {
                    ColorParam::BaseColor1 => &mut self.params.base_color_1,
                    ColorParam::BaseColor2 => &mut self.params.base_color_2,
                    ColorParam::MidColor => &mut self.params.mid_color,
                };
                color.0[channel.min(2)] = value;
            }
            Target::GazePitch => self.rig.set_gaze_pitch(value),
            Target::GazeYaw => self.rig.set_gaze_yaw(value),
            Target::Lid(lid) => self.rig.set_lid_angle(lid, value),
        }
    }
}

/// What happened during one [`EyeScene::update`].
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SceneTick {
    pub blink: Tick,
    pub gaze: GazeTick,
    pub pulse: PulseTick,
}

pub struct EyeScene<R: RandomSource = StdRng> {
    state: EyeState,
    camera: Camera,
    blink: BlinkCycle,
    gaze: GazeController,
    pulse: ShrinkPulse,
    rng: R,
    elapsed: f32,
    frames: u64,
    shrink_readout: f32,
    pointer: Option<[f32; 2]>,
}

impl EyeScene<StdRng> {
    pub fn new(config: &EyeConfig) -> Self {
        Self::with_rng(config, StdRng::from_entropy())
    }
}

impl<R: RandomSource> EyeScene<R> {
    /// Build the scene at clock zero. The demon deadline counts from here.
    pub fn with_rng(config: &EyeConfig, mut rng: R) -> Self {
        let rig = EyeRig::new(config.rig.eye_radius, config.rig.interpupil_distance);
        let camera = Camera::new(&config.camera, rig.center_x());
        let params = config.params.clamped();
        let shrink_readout = params.shrink;
        Self {
            state: EyeState { params, rig },
            camera,
            blink: BlinkCycle::new(&config.blink),
            gaze: GazeController::new(&config.gaze, 0.0, &mut rng),
            pulse: ShrinkPulse::new(&config.shrink_pulse),
            rng,
            elapsed: 0.0,
            frames: 0,
            shrink_readout,
            pointer: None,
        }
    }

    /// Advance every behavior by `dt` seconds. Rendering must come after.
    pub fn update(&mut self, dt: f32) -> SceneTick {
        let dt = dt.max(0.0);
        self.elapsed += dt;
        self.frames += 1;

        let blink = self.blink.advance(dt, &mut self.state, &mut self.rng);

        let pulse = self.pulse.advance(dt, &mut self.state);
        if let Some(shrink) = pulse.shrink {
            self.shrink_readout = shrink;
        }
        if pulse.completed {
            self.gaze.reclaim_shrink();
        }

        let gaze = self
            .gaze
            .advance(dt, self.elapsed, &mut self.state, &mut self.rng);
        if let Some(shrink) = gaze.shrink {
            self.shrink_readout = shrink;
        }

        SceneTick { blink, gaze, pulse }
    }

    pub fn handle_pointer(&mut self, event: PointerEvent) {
        match event {
            PointerEvent::Wheel { delta_y } => self.camera.zoom_by(delta_y),
            PointerEvent::Click => self.trigger_shrink_pulse(),
            PointerEvent::TouchMove { x, y } => {
                self.pointer = Some(normalize_pointer(x, y, self.camera.viewport()));
            }
        }
    }

    /// Play the shrink pulse from the start. The gaze controller hands over
    /// the shrink field until the pulse completes.
    pub fn trigger_shrink_pulse(&mut self) {
        self.gaze.yield_shrink();
        self.pulse.trigger();
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.camera.set_viewport(width, height);
    }

    pub fn state(&self) -> &EyeState {
        &self.state
    }

    pub fn params(&self) -> &IrisParams {
        &self.state.params
    }

    /// Direct access for the control panel. Writers clamp.
    pub fn params_mut(&mut self) -> &mut IrisParams {
        &mut self.state.params
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn blink(&self) -> &BlinkCycle {
        &self.blink
    }

    pub fn gaze(&self) -> &GazeController {
        &self.gaze
    }

    pub fn pulse(&self) -> &ShrinkPulse {
        &self.pulse
    }

    /// Seconds since the scene was built, as accumulated by `update`.
    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Last shrink value pushed by an animation, for the panel readout.
    pub fn shrink_readout(&self) -> f32 {
        self.shrink_readout
    }

    /// Normalized touch position, if any touch has moved yet.
    pub fn pointer(&self) -> Option<[f32; 2]> {
        self.pointer
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rig::Lid;

    struct Fixed(f32);

    impl RandomSource for Fixed {
        fn unit(&mut self) -> f32 {
            self.0
        }
    }

    #[test]
    fn state_targets_round_trip() {
        let mut state = EyeState::default();
        let targets = [
            Target::Shrink,
            Target::Vignette,
            Target::Brightness,
            Target::Darkness,
            Target::Color(ColorParam::BaseColor2, 1),
            Target::GazePitch,
            Target::GazeYaw,
            Target::Lid(Lid::Lower),
        ];
        for (i, target) in targets.into_iter().enumerate() {
            let v = 0.1 * i as f32;
            state.write(target, v);
            assert_eq!(state.read(target), v, "{target:?}");
        }
        assert!(state.rig.is_conjugate());
    }

    #[test]
    fn click_hands_shrink_to_the_pulse() {
        let mut scene = EyeScene::with_rng(&EyeConfig::default(), Fixed(0.0));
        scene.handle_pointer(PointerEvent::Click);
        assert!(scene.pulse().is_active());
        assert_eq!(scene.gaze().look().shrink, None);

        // Pulse runs 1.75s at the default 2x time scale.
        for _ in 0..(64 * 2) {
            scene.update(1.0 / 64.0);
        }
        assert!(!scene.pulse().is_active());
        assert!(scene.params().shrink.abs() < 1e-5);
        assert!(scene.shrink_readout().abs() < 1e-5);
    }

    #[test]
    fn wheel_and_touch_events() {
        let mut scene = EyeScene::with_rng(&EyeConfig::default(), Fixed(0.0));
        scene.resize(800, 600);
        scene.handle_pointer(PointerEvent::Wheel { delta_y: 500.0 });
        assert_eq!(scene.camera().zoom(), 650.0);
        scene.handle_pointer(PointerEvent::TouchMove { x: 600.0, y: 150.0 });
        assert_eq!(scene.pointer(), Some([0.5, -0.5]));
    }
}
