//! Pointer events the scene reacts to.

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PointerEvent {
    /// Wheel scroll, in pixels; positive moves the camera away.
    Wheel { delta_y: f32 },
    /// Primary click or tap on the canvas.
    Click,
    /// Touch drag at a position in physical pixels.
    TouchMove { x: f32, y: f32 },
}

/// Map a pixel position to `[-1, 1]` around the viewport centre.
pub fn normalize_pointer(x: f32, y: f32, viewport: (u32, u32)) -> [f32; 2] {
    let half_w = viewport.0.max(1) as f32 / 2.0;
    let half_h = viewport.1.max(1) as f32 / 2.0;
    [(x - half_w) / half_w, (y - half_h) / half_h]
}
