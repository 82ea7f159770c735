use rand::rngs::StdRng;
use rand::Rng;

/// Uniform draws used by the blink and gaze schedulers.
pub trait RandomSource {
    /// Uniform value in `[0, 1)`.
    fn unit(&mut self) -> f32;

    fn range(&mut self, min: f32, max: f32) -> f32 {
        min + (max - min) * self.unit()
    }

    /// Uniform draw in `[min, max]` snapped to `min + k * step`.
    fn snapped(&mut self, min: f32, max: f32, step: f32) -> f32 {
        let v = self.range(min, max);
        if step <= 0.0 {
            return v;
        }
        (min + ((v - min) / step).round() * step).min(max)
    }
}

impl RandomSource for StdRng {
    fn unit(&mut self) -> f32 {
        self.gen::<f32>()
    }
}
