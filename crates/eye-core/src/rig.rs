//! Eye geometry: two eye assemblies, each an eyeball group plus an upper
//! and a lower eyelid group.
//!
//! The right eye sits at the origin and the left eye is the same assembly
//! translated along +x by the interpupillary distance. Gaze and blink only
//! ever go through [`EyeRig::set_gaze`] and [`EyeRig::set_lid_angle`], which
//! write both sides at once, so the eyes stay conjugate.

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Side {
    Right,
    Left,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Lid {
    Upper,
    Lower,
}

/// Position + Euler rotation (radians, XYZ order).
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Transform {
    pub position: [f32; 3],
    pub rotation: [f32; 3],
}

impl Transform {
    pub fn at(position: [f32; 3]) -> Self {
        Self {
            position,
            rotation: [0.0; 3],
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct EyeAssembly {
    /// Eyeball group. rotation.x is vertical gaze, rotation.y horizontal.
    pub eye: Transform,
    /// Upper lid pivot; rotation.x is blink openness.
    pub upper_lid: Transform,
    pub lower_lid: Transform,
}

impl EyeAssembly {
    fn new(origin_x: f32, eye_radius: f32) -> Self {
        Self {
            eye: Transform::at([origin_x, 0.0, 0.0]),
            upper_lid: Transform::at([origin_x, eye_radius * 1.25, eye_radius]),
            lower_lid: Transform::at([origin_x, eye_radius * -1.1, eye_radius]),
        }
    }

    pub fn lid(&self, lid: Lid) -> &Transform {
        match lid {
            Lid::Upper => &self.upper_lid,
            Lid::Lower => &self.lower_lid,
        }
    }

    fn lid_mut(&mut self, lid: Lid) -> &mut Transform {
        match lid {
            Lid::Upper => &mut self.upper_lid,
            Lid::Lower => &mut self.lower_lid,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct EyeRig {
    pub right: EyeAssembly,
    pub left: EyeAssembly,
    eye_radius: f32,
    interpupil_distance: f32,
}

impl Default for EyeRig {
    fn default() -> Self {
        Self::new(30.0, 96.0)
    }
}

impl EyeRig {
    pub fn new(eye_radius: f32, interpupil_distance: f32) -> Self {
        Self {
            right: EyeAssembly::new(0.0, eye_radius),
            left: EyeAssembly::new(interpupil_distance, eye_radius),
            eye_radius,
            interpupil_distance,
        }
    }

    pub fn eye_radius(&self) -> f32 {
        self.eye_radius
    }

    pub fn interpupil_distance(&self) -> f32 {
        self.interpupil_distance
    }

    /// Midpoint between the two eyeballs along x.
    pub fn center_x(&self) -> f32 {
        self.interpupil_distance * 0.5
    }

    pub fn assembly(&self, side: Side) -> &EyeAssembly {
        match side {
            Side::Right => &self.right,
            Side::Left => &self.left,
        }
    }

    /// Current (pitch, yaw) shared by both eyes.
    pub fn gaze(&self) -> (f32, f32) {
        (self.right.eye.rotation[0], self.right.eye.rotation[1])
    }

    pub fn set_gaze(&mut self, pitch: f32, yaw: f32) {
        for assembly in [&mut self.right, &mut self.left] {
            assembly.eye.rotation[0] = pitch;
            assembly.eye.rotation[1] = yaw;
        }
    }

    pub fn set_gaze_pitch(&mut self, pitch: f32) {
        let (_, yaw) = self.gaze();
        self.set_gaze(pitch, yaw);
    }

    pub fn set_gaze_yaw(&mut self, yaw: f32) {
        let (pitch, _) = self.gaze();
        self.set_gaze(pitch, yaw);
    }

    pub fn lid_angle(&self, lid: Lid) -> f32 {
        self.right.lid(lid).rotation[0]
    }

    pub fn set_lid_angle(&mut self, lid: Lid, angle: f32) {
        self.right.lid_mut(lid).rotation[0] = angle;
        self.left.lid_mut(lid).rotation[0] = angle;
    }

    /// Both eyes share rotations and the left side is a pure x translation
    /// of the right.
    pub fn is_conjugate(&self) -> bool {
        let shifted = |t: &Transform| {
            [
                t.position[0] - self.interpupil_distance,
                t.position[1],
                t.position[2],
            ]
        };
        let pairs = [
            (&self.right.eye, &self.left.eye),
            (&self.right.upper_lid, &self.left.upper_lid),
            (&self.right.lower_lid, &self.left.lower_lid),
        ];
        pairs
            .iter()
            .all(|(r, l)| r.rotation == l.rotation && shifted(l) == r.position)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn left_eye_is_translated_by_ipd() {
        let rig = EyeRig::new(30.0, 96.0);
        assert_eq!(rig.left.eye.position, [96.0, 0.0, 0.0]);
        assert_eq!(rig.right.eye.position, [0.0, 0.0, 0.0]);
        assert_eq!(rig.center_x(), 48.0);
        assert!(rig.is_conjugate());
    }

    #[test]
    fn gaze_writes_both_eyes() {
        let mut rig = EyeRig::default();
        rig.set_gaze(0.25, -0.8);
        assert_eq!(rig.left.eye.rotation, rig.right.eye.rotation);
        rig.set_gaze_yaw(0.1);
        assert_eq!(rig.gaze(), (0.25, 0.1));
        assert!(rig.is_conjugate());
    }

    #[test]
    fn lids_move_together() {
        let mut rig = EyeRig::default();
        rig.set_lid_angle(Lid::Upper, 0.9);
        rig.set_lid_angle(Lid::Lower, -0.9);
        assert_eq!(rig.left.upper_lid.rotation[0], 0.9);
        assert_eq!(rig.left.lower_lid.rotation[0], -0.9);
        assert!(rig.is_conjugate());
    }

    #[test]
    fn diverging_rotation_is_detected() {
        let mut rig = EyeRig::default();
        rig.left.eye.rotation[1] = 0.3;
        assert!(!rig.is_conjugate());
    }
}
