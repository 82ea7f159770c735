use std::f32::consts::PI;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::animation::Easing;
use crate::error::{EyeError, Result};
use crate::params::{IrisParams, Rgb, DEMON_BASE_COLOR_1, DEMON_BASE_COLOR_2};

// ============================================================
// Serializable config types
// ============================================================

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EyeConfig {
    pub version: u32,
    pub params: IrisParams,
    pub rig: RigConfig,
    pub camera: CameraConfig,
    pub blink: BlinkConfig,
    pub gaze: GazeConfig,
    pub shrink_pulse: ShrinkPulseConfig,
    pub shader: ShaderConfig,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RigConfig {
    pub eye_radius: f32,
    pub interpupil_distance: f32,
}

impl Default for RigConfig {
    fn default() -> Self {
        Self {
            eye_radius: 30.0,
            interpupil_distance: 96.0,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Camera distance along z.
    pub zoom: f32,
    pub zoom_bounds: [f32; 2],
    /// Zoom change per unit of wheel delta.
    pub wheel_factor: f32,
    pub fov_y_degrees: f32,
    pub near: f32,
    pub far: f32,
    /// Viewports at most this wide get `narrow_offset_y`.
    pub narrow_width: u32,
    pub narrow_offset_y: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            zoom: 600.0,
            zoom_bounds: [300.0, 1000.0],
            wheel_factor: 0.1,
            fov_y_degrees: 20.0,
            near: 1.0,
            far: 10_000.0,
            narrow_width: 800,
            narrow_offset_y: 25.0,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BlinkConfig {
    /// Wait before the very first blink.
    pub warmup: f32,
    /// Time for the lids to close (opening takes the same).
    pub close_duration: f32,
    /// Closed pause of the first blink. Later pauses are drawn from
    /// `delay_range`.
    pub first_pause: f32,
    pub upper_closed_angle: f32,
    pub lower_closed_angle: f32,
    pub easing: Easing,
    /// Bounds of the random pause between closing and reopening.
    pub delay_range: [f32; 2],
    pub delay_step: f32,
}

impl Default for BlinkConfig {
    fn default() -> Self {
        Self {
            warmup: 3.0,
            close_duration: 0.5,
            first_pause: 3.0,
            upper_closed_angle: PI * 0.3,
            lower_closed_angle: PI * -0.3,
            easing: Easing::In(3),
            delay_range: [0.1, 3.0],
            delay_step: 0.1,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GazeConfig {
    /// Vertical look angles are drawn from `[-max_pitch, max_pitch]`.
    pub max_pitch: f32,
    /// Horizontal look angles are drawn from `[-max_yaw, max_yaw]`.
    pub max_yaw: f32,
    pub shrink_range: [f32; 2],
    pub shrink_step: f32,
    pub pre_delay_range: [f32; 2],
    pub pre_delay_step: f32,
    pub duration: f32,
    pub rotation_easing: Easing,
    pub shrink_easing: Easing,
    /// Seconds after startup when the demon palette takes over.
    pub demon_after: f32,
    pub demon_base_color_1: Rgb,
    pub demon_base_color_2: Rgb,
}

impl Default for GazeConfig {
    fn default() -> Self {
        Self {
            max_pitch: 0.5,
            max_yaw: 1.0,
            shrink_range: [-0.5, 0.3],
            shrink_step: 0.1,
            pre_delay_range: [0.5, 1.0],
            pre_delay_step: 0.2,
            duration: 0.5,
            rotation_easing: Easing::Out(1),
            shrink_easing: Easing::Out(2),
            demon_after: 10.0,
            demon_base_color_1: Rgb::from_rgb8(DEMON_BASE_COLOR_1),
            demon_base_color_2: Rgb::from_rgb8(DEMON_BASE_COLOR_2),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShrinkPulseConfig {
    pub dilate_to: f32,
    pub dilate_duration: f32,
    pub dilate_easing: Easing,
    pub recover_to: f32,
    pub recover_duration: f32,
    pub recover_easing: Easing,
    pub time_scale: f32,
}

impl Default for ShrinkPulseConfig {
    fn default() -> Self {
        Self {
            dilate_to: -0.9,
            dilate_duration: 0.5,
            dilate_easing: Easing::Out(2),
            recover_to: 0.0,
            recover_duration: 3.0,
            recover_easing: Easing::InOut(2),
            time_scale: 2.0,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShaderConfig {
    /// WGSL file to use instead of the built-in iris shader.
    pub path: Option<PathBuf>,
}

// ============================================================
// EyeConfig: top-level config
// ============================================================

impl Default for EyeConfig {
    fn default() -> Self {
        Self {
            version: Self::CURRENT_VERSION,
            params: IrisParams::default(),
            rig: RigConfig::default(),
            camera: CameraConfig::default(),
            blink: BlinkConfig::default(),
            gaze: GazeConfig::default(),
            shrink_pulse: ShrinkPulseConfig::default(),
            shader: ShaderConfig::default(),
        }
    }
}

impl EyeConfig {
    pub const CURRENT_VERSION: u32 = 1;

    pub fn to_json(&self) -> std::result::Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Parse a config. Initial parameters are pulled into their ranges.
    pub fn from_json(json: &str) -> Result<Self> {
        let mut config: Self = serde_json::from_str(json)?;
        config.params = config.params.clamped();
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| EyeError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_object_yields_defaults() {
        let config = EyeConfig::from_json("{}").unwrap();
        assert_eq!(config.params, IrisParams::default());
        assert_eq!(config.camera.zoom_bounds, [300.0, 1000.0]);
        assert_eq!(config.gaze.demon_after, 10.0);
        assert_eq!(config.shrink_pulse.recover_easing, Easing::InOut(2));
    }

    #[test]
    fn round_trips_through_json() {
        let config = EyeConfig::default();
        let json = config.to_json().unwrap();
        assert!(json.contains("\"#03565c\""));
        assert!(json.contains("\"power3.in\""));
        let back = EyeConfig::from_json(&json).unwrap();
        assert_eq!(back.version, EyeConfig::CURRENT_VERSION);
        assert_eq!(back.params, config.params);
        assert_eq!(back.blink.easing, Easing::In(3));
        assert_eq!(back.gaze.demon_base_color_1.to_hex(), "#3e035e");
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let config =
            EyeConfig::from_json(r##"{ "params": { "shrink": 2.0, "base_color_1": "#ffffff" } }"##)
                .unwrap();
        assert_eq!(config.params.shrink, 0.3);
        assert_eq!(config.params.base_color_1.to_hex(), "#ffffff");
        assert_eq!(config.params.vignette, 0.65);
    }

    #[test]
    fn bad_values_are_reported() {
        let err = EyeConfig::from_json(r#"{ "blink": { "easing": "wobble" } }"#).unwrap_err();
        assert!(matches!(err, EyeError::Config(_)));
        let err = EyeConfig::from_json(r#"{ "params": { "mid_color": "red" } }"#).unwrap_err();
        assert!(matches!(err, EyeError::Config(_)));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = EyeConfig::load("/definitely/not/here.json").unwrap_err();
        assert!(matches!(err, EyeError::Io { .. }));
    }
}
