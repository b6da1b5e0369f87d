use noise::{Fbm, MultiFractal, NoiseFn, Perlin};

/// Scalar elevation per world column. Called from every generation worker
/// concurrently, so implementations must be pure and thread-safe.
pub trait HeightField: Send + Sync {
    /// Surface elevation, in world voxels, of column `(x, z)`.
    fn elevation(&self, x: i32, z: i32) -> f64;
}

impl<F> HeightField for F
where
    F: Fn(i32, i32) -> f64 + Send + Sync,
{
    fn elevation(&self, x: i32, z: i32) -> f64 {
        self(x, z)
    }
}

/// Rolling hills from seeded fractal Perlin noise.
#[derive(Clone)]
pub struct NoiseHeightField {
    hills: Fbm<Perlin>,
    /// Mean elevation in world voxels.
    pub base: f64,
    /// Peak deviation from `base` in world voxels.
    pub amplitude: f64,
}

impl NoiseHeightField {
    /// Frequency of the first octave, per world voxel.
    pub const FREQUENCY: f64 = 0.01;
    pub const OCTAVES: usize = 3;

    pub fn new(seed: u64) -> Self {
        // Fold the high half in so seeds differing only above bit 32 still differ.
        let seed = (seed ^ (seed >> 32)) as u32;
        let hills = Fbm::<Perlin>::new(seed)
            .set_octaves(Self::OCTAVES)
            .set_frequency(Self::FREQUENCY);
        Self {
            hills,
            base: 48.0,
            amplitude: 24.0,
        }
    }

    pub fn with_shape(mut self, base: f64, amplitude: f64) -> Self {
        self.base = base;
        self.amplitude = amplitude;
        self
    }

    /// Highest elevation this field can produce.
    pub fn max_elevation(&self) -> f64 {
        self.base + self.amplitude
    }
}

impl HeightField for NoiseHeightField {
    fn elevation(&self, x: i32, z: i32) -> f64 {
        let h = self.hills.get([x as f64, z as f64]);
        // Fbm can overshoot [-1, 1] slightly; max_elevation must stay a bound.
        self.base + h.clamp(-1.0, 1.0) * self.amplitude
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_noise_field_deterministic() {
        let a = NoiseHeightField::new(42);
        let b = NoiseHeightField::new(42);
        for (x, z) in [(0, 0), (17, -3), (-250, 999)] {
            assert_eq!(a.elevation(x, z), b.elevation(x, z));
        }
    }

    #[test]
    fn test_noise_field_stays_in_range() {
        let field = NoiseHeightField::new(7).with_shape(32.0, 10.0);
        for x in (-200..200).step_by(13) {
            for z in (-200..200).step_by(11) {
                let e = field.elevation(x, z);
                assert!(e >= 32.0 - 10.0 - 1e-9 && e <= field.max_elevation() + 1e-9);
            }
        }
    }

    #[test]
    fn test_seed_changes_field() {
        let a = NoiseHeightField::new(1);
        let b = NoiseHeightField::new(2);
        let differs = (0..64).any(|x| a.elevation(x * 5, x * 3) != b.elevation(x * 5, x * 3));
        assert!(differs, "different seeds should give different terrain");
    }

    #[test]
    fn test_closure_is_height_field() {
        let ramp = |x: i32, _z: i32| x as f64 * 0.5;
        let field: &dyn HeightField = &ramp;
        assert_eq!(field.elevation(10, 3), 5.0);
    }
}
