//! Iris shader parameters.
//!
//! `IrisParams` is the live parameter set the iris shader reads every frame.
//! It stores raw values and never clamps on its own: whoever writes a field
//! is responsible for keeping it in range. Outside writers (the control
//! panel, config loading) go through [`ScalarParam`] / [`ColorParam`], which
//! clamp and step-quantize before touching the set.

use std::fmt;
use std::ops::RangeInclusive;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::EyeError;

/// Linear RGB triple in `[0, 1]`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Rgb(pub [f32; 3]);

impl Rgb {
    pub fn from_rgb8(rgb: [u8; 3]) -> Self {
        Self([
            rgb[0] as f32 / 255.0,
            rgb[1] as f32 / 255.0,
            rgb[2] as f32 / 255.0,
        ])
    }

    /// Parse `#rrggbb` (the leading `#` is optional).
    pub fn from_hex(hex: &str) -> Result<Self, EyeError> {
        let digits = hex.strip_prefix('#').unwrap_or(hex);
        if digits.len() != 6 || !digits.is_ascii() {
            return Err(EyeError::InvalidColor(hex.to_string()));
        }
        let channel = |i: usize| {
            u8::from_str_radix(&digits[i..i + 2], 16)
                .map_err(|_| EyeError::InvalidColor(hex.to_string()))
        };
        Ok(Self::from_rgb8([channel(0)?, channel(2)?, channel(4)?]))
    }

    pub fn to_rgb8(self) -> [u8; 3] {
        self.0.map(|c| (c.clamp(0.0, 1.0) * 255.0).round() as u8)
    }

    pub fn to_hex(self) -> String {
        let [r, g, b] = self.to_rgb8();
        format!("#{r:02x}{g:02x}{b:02x}")
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl FromStr for Rgb {
    type Err = EyeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl TryFrom<String> for Rgb {
    type Error = EyeError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::from_hex(&s)
    }
}

impl From<Rgb> for String {
    fn from(c: Rgb) -> Self {
        c.to_hex()
    }
}

pub const SHRINK_RANGE: RangeInclusive<f32> = -0.9..=0.3;
pub const VIGNETTE_RANGE: RangeInclusive<f32> = 0.0..=1.0;
pub const BRIGHTNESS_RANGE: RangeInclusive<f32> = 0.2..=0.65;
pub const DARKNESS_RANGE: RangeInclusive<f32> = 0.0..=1.0;

/// Slider step used by the control panel for every scalar.
pub const PANEL_STEP: f32 = 0.05;

pub const CALM_BASE_COLOR_1: [u8; 3] = [0x03, 0x56, 0x5c];
pub const CALM_BASE_COLOR_2: [u8; 3] = [0x42, 0xcf, 0x44];
pub const CALM_MID_COLOR: [u8; 3] = [0xf2, 0xaa, 0x00];
pub const DEMON_BASE_COLOR_1: [u8; 3] = [0x3e, 0x03, 0x5e];
pub const DEMON_BASE_COLOR_2: [u8; 3] = [0xa7, 0x16, 0x16];

/// The visual parameters that define iris appearance.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IrisParams {
    /// Negative dilates the pupil, positive constricts it.
    pub shrink: f32,
    pub base_color_1: Rgb,
    pub base_color_2: Rgb,
    pub mid_color: Rgb,
    pub vignette: f32,
    pub brightness: f32,
    pub darkness: f32,
    pub cat_eye: bool,
}

impl Default for IrisParams {
    fn default() -> Self {
        Self {
            shrink: 0.0,
            base_color_1: Rgb::from_rgb8(CALM_BASE_COLOR_1),
            base_color_2: Rgb::from_rgb8(CALM_BASE_COLOR_2),
            mid_color: Rgb::from_rgb8(CALM_MID_COLOR),
            vignette: 0.65,
            brightness: 0.6,
            darkness: 0.5,
            cat_eye: false,
        }
    }
}

impl IrisParams {
    /// Switch to the demon palette and slit pupils.
    ///
    /// Writes fixed values only, so calling it again is a no-op.
    pub fn apply_demon_palette(&mut self, base_color_1: Rgb, base_color_2: Rgb) {
        self.base_color_1 = base_color_1;
        self.base_color_2 = base_color_2;
        self.cat_eye = true;
    }

    /// Copy of `self` with every scalar pulled into its declared range.
    pub fn clamped(&self) -> Self {
        let mut out = self.clone();
        for param in ScalarParam::ALL {
            param.set_clamped(&mut out, param.get(self));
        }
        out
    }
}

/// Get/set adapter for one scalar field of [`IrisParams`].
///
/// The panel binds to these instead of to the struct fields, so it needs no
/// knowledge of the parameter layout.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ScalarParam {
    Shrink,
    Vignette,
    Brightness,
    Darkness,
}

impl ScalarParam {
    pub const ALL: [ScalarParam; 4] = [
        ScalarParam::Shrink,
        ScalarParam::Vignette,
        ScalarParam::Brightness,
        ScalarParam::Darkness,
    ];

    pub fn label(self) -> &'static str {
        match self {
            ScalarParam::Shrink => "shrink",
            ScalarParam::Vignette => "vignette",
            ScalarParam::Brightness => "brightness",
            ScalarParam::Darkness => "darkness",
        }
    }

    pub fn range(self) -> RangeInclusive<f32> {
        match self {
            ScalarParam::Shrink => SHRINK_RANGE,
            ScalarParam::Vignette => VIGNETTE_RANGE,
            ScalarParam::Brightness => BRIGHTNESS_RANGE,
            ScalarParam::Darkness => DARKNESS_RANGE,
        }
    }

    pub fn get(self, params: &IrisParams) -> f32 {
        match self {
            ScalarParam::Shrink => params.shrink,
            ScalarParam::Vignette => params.vignette,
            ScalarParam::Brightness => params.brightness,
            ScalarParam::Darkness => params.darkness,
        }
    }

    /// Clamp `value` into range, snap it to the panel step, then write it.
    /// Returns the value actually stored.
    pub fn set(self, params: &mut IrisParams, value: f32) -> f32 {
        self.set_clamped(params, quantize(value, self.range(), PANEL_STEP))
    }

    /// Clamp `value` into range and write it without step snapping.
    pub fn set_clamped(self, params: &mut IrisParams, value: f32) -> f32 {
        let range = self.range();
        let value = value.clamp(*range.start(), *range.end());
        match self {
            ScalarParam::Shrink => params.shrink = value,
            ScalarParam::Vignette => params.vignette = value,
            ScalarParam::Brightness => params.brightness = value,
            ScalarParam::Darkness => params.darkness = value,
        }
        value
    }
}

/// Get/set adapter for one color field of [`IrisParams`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ColorParam {
    BaseColor1,
    BaseColor2,
    MidColor,
}

impl ColorParam {
    pub const ALL: [ColorParam; 3] = [
        ColorParam::BaseColor1,
        ColorParam::BaseColor2,
        ColorParam::MidColor,
    ];

    pub fn label(self) -> &'static str {
        match self {
            ColorParam::BaseColor1 => "base color #1",
            ColorParam::BaseColor2 => "base color #2",
            ColorParam::MidColor => "middle color",
        }
    }

    pub fn get(self, params: &IrisParams) -> Rgb {
        match self {
            ColorParam::BaseColor1 => params.base_color_1,
            ColorParam::BaseColor2 => params.base_color_2,
            ColorParam::MidColor => params.mid_color,
        }
    }

    pub fn set(self, params: &mut IrisParams, color: Rgb) {
        let color = Rgb(color.0.map(|c| c.clamp(0.0, 1.0)));
        match self {
            ColorParam::BaseColor1 => params.base_color_1 = color,
            ColorParam::BaseColor2 => params.base_color_2 = color,
            ColorParam::MidColor => params.mid_color = color,
        }
    }
}

/// Clamp into `range`, then snap to the nearest `step` counted from the
/// range start.
pub fn quantize(value: f32, range: RangeInclusive<f32>, step: f32) -> f32 {
    let (min, max) = (*range.start(), *range.end());
    if value <= min {
        return min;
    }
    if value >= max {
        return max;
    }
    let v = value;
    if step <= 0.0 {
        return v;
    }
    (min + ((v - min) / step).round() * step).clamp(min, max)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_colors_parse_and_print() {
        let c = Rgb::from_hex("#3e035e").unwrap();
        assert_eq!(c.to_rgb8(), [0x3e, 0x03, 0x5e]);
        assert_eq!(c.to_hex(), "#3e035e");
        assert_eq!(Rgb::from_hex("a71616").unwrap().to_rgb8(), [0xa7, 0x16, 0x16]);
    }

    #[test]
    fn bad_hex_is_rejected() {
        assert!(matches!(Rgb::from_hex("#12345"), Err(EyeError::InvalidColor(_))));
        assert!(matches!(Rgb::from_hex("#zz0000"), Err(EyeError::InvalidColor(_))));
        assert!(Rgb::from_hex("#ééé").is_err());
    }

    #[test]
    fn defaults_match_calm_palette() {
        let p = IrisParams::default();
        assert_eq!(p.shrink, 0.0);
        assert_eq!(p.vignette, 0.65);
        assert_eq!(p.brightness, 0.6);
        assert_eq!(p.darkness, 0.5);
        assert!(!p.cat_eye);
        assert_eq!(p.base_color_1.to_hex(), "#03565c");
        assert_eq!(p.base_color_2.to_hex(), "#42cf44");
        assert_eq!(p.mid_color.to_hex(), "#f2aa00");
    }

    #[test]
    fn panel_writes_clamp_to_nearest_bound() {
        let mut p = IrisParams::default();
        assert_eq!(ScalarParam::Shrink.set(&mut p, 1.0), 0.3);
        assert_eq!(p.shrink, 0.3);
        assert_eq!(ScalarParam::Shrink.set(&mut p, -5.0), -0.9);
        assert_eq!(p.shrink, -0.9);
        assert_eq!(ScalarParam::Brightness.set(&mut p, 0.0), 0.2);
        assert_eq!(ScalarParam::Darkness.set(&mut p, 2.0), 1.0);
    }

    #[test]
    fn panel_writes_snap_to_step() {
        let mut p = IrisParams::default();
        let stored = ScalarParam::Vignette.set(&mut p, 0.43);
        assert!((stored - 0.45).abs() < 1e-5);
    }

    #[test]
    fn clamped_copy_respects_every_range() {
        let p = IrisParams {
            shrink: 4.0,
            vignette: -1.0,
            brightness: 0.9,
            darkness: 1.5,
            ..IrisParams::default()
        };
        let c = p.clamped();
        for param in ScalarParam::ALL {
            assert!(param.range().contains(&param.get(&c)), "{param:?}");
        }
    }

    #[test]
    fn demon_palette_is_idempotent() {
        let mut p = IrisParams::default();
        let (a, b) = (Rgb::from_rgb8(DEMON_BASE_COLOR_1), Rgb::from_rgb8(DEMON_BASE_COLOR_2));
        p.apply_demon_palette(a, b);
        let once = p.clone();
        p.apply_demon_palette(a, b);
        assert_eq!(p, once);
        assert!(p.cat_eye);
    }

    #[test]
    fn color_adapter_round_trips_through_params() {
        let mut p = IrisParams::default();
        let red = Rgb::from_hex("#ff0000").unwrap();
        ColorParam::MidColor.set(&mut p, red);
        assert_eq!(ColorParam::MidColor.get(&p), red);
        assert_eq!(p.mid_color, red);
    }
}
