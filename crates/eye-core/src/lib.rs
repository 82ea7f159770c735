pub mod animation;
pub mod blink;
pub mod camera;
pub mod config;
pub mod error;
pub mod frame;
pub mod gaze;
pub mod input;
pub mod params;
pub mod pulse;
pub mod random;
pub mod renderer;
pub mod rig;
pub mod scene;

#[cfg(feature = "gui")]
pub mod gui;

pub use animation::{Animatable, Easing, Target, Timeline};
pub use config::EyeConfig;
pub use error::{EyeError, Result};
pub use frame::{FrameLoop, RenderSurface};
pub use input::PointerEvent;
pub use params::{ColorParam, IrisParams, Rgb, ScalarParam};
pub use random::RandomSource;
pub use renderer::{EyeRenderer, EyeUniforms, ShaderSource};
pub use scene::{EyeScene, EyeState};
