//! Perspective camera looking down -z at the eye pair.

use crate::config::CameraConfig;

#[derive(Clone, Debug, PartialEq)]
pub struct Camera {
    config: CameraConfig,
    zoom: f32,
    center_x: f32,
    viewport: (u32, u32),
}

impl Camera {
    /// Camera centred on `center_x` (midway between the eyes).
    pub fn new(config: &CameraConfig, center_x: f32) -> Self {
        let [min, max] = config.zoom_bounds;
        Self {
            config: config.clone(),
            zoom: config.zoom.clamp(min, max),
            center_x,
            viewport: (1, 1),
        }
    }

    pub fn zoom(&self) -> f32 {
        self.zoom
    }

    /// Apply a wheel delta; the distance stays inside the zoom bounds.
    pub fn zoom_by(&mut self, wheel_delta_y: f32) {
        let [min, max] = self.config.zoom_bounds;
        self.zoom = (self.zoom + self.config.wheel_factor * wheel_delta_y).clamp(min, max);
    }

    pub fn set_viewport(&mut self, width: u32, height: u32) {
        self.viewport = (width.max(1), height.max(1));
    }

    pub fn viewport(&self) -> (u32, u32) {
        self.viewport
    }

    pub fn aspect(&self) -> f32 {
        self.viewport.0 as f32 / self.viewport.1 as f32
    }

    pub fn fov_y(&self) -> f32 {
        self.config.fov_y_degrees.to_radians()
    }

    /// Narrow viewports lift the camera a little.
    pub fn offset_y(&self) -> f32 {
        if self.viewport.0 > self.config.narrow_width {
            0.0
        } else {
            self.config.narrow_offset_y
        }
    }

    pub fn position(&self) -> [f32; 3] {
        [self.center_x, self.offset_y(), self.zoom]
    }

    pub fn near_far(&self) -> (f32, f32) {
        (self.config.near, self.config.far)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wheel_zoom_is_bounded() {
        let mut cam = Camera::new(&CameraConfig::default(), 48.0);
        assert_eq!(cam.zoom(), 600.0);
        cam.zoom_by(1000.0);
        assert_eq!(cam.zoom(), 700.0);
        cam.zoom_by(100_000.0);
        assert_eq!(cam.zoom(), 1000.0);
        cam.zoom_by(-100_000.0);
        assert_eq!(cam.zoom(), 300.0);
    }

    #[test]
    fn viewport_drives_aspect_and_offset() {
        let mut cam = Camera::new(&CameraConfig::default(), 48.0);
        cam.set_viewport(1600, 800);
        assert_eq!(cam.aspect(), 2.0);
        assert_eq!(cam.position(), [48.0, 0.0, 600.0]);
        cam.set_viewport(600, 0);
        assert_eq!(cam.viewport(), (600, 1));
        assert_eq!(cam.offset_y(), 25.0);
    }
}
