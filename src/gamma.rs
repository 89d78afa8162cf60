// Replaces a per-pixel powf with a table lookup when turning a normalised
// field value (0..1) into an 8-bit level. Without a gamma exponent the
// table is a plain linear ramp.

const STEPS: usize = 4096;

pub struct GammaLut {
    // normalised (0..1) -> level (0..255), quantised to 4096 steps
    // (index = (t * 4095).round())
    table: [u8; STEPS],
}

impl GammaLut {
    /// Build the table once; `gamma` is the exponent applied to `t` before scaling.
    pub fn new(gamma: Option<f32>) -> Self {
        let exponent = gamma.unwrap_or(1.0);
        let mut table = [0u8; STEPS];
        for (i, slot) in table.iter_mut().enumerate() {
            let t = i as f32 / (STEPS - 1) as f32;
            let v = if exponent == 1.0 { t } else { t.powf(exponent) };
            // truncate, like a plain float -> u8 cast of the scaled value
            *slot = (v * 255.0).clamp(0.0, 255.0) as u8;
        }
        Self { table }
    }

    #[inline]
    pub fn level(&self, t: f32) -> u8 {
        // NaN clamps to NaN; `as usize` turns it into 0
        let idx = (t.clamp(0.0, 1.0) * (STEPS - 1) as f32).round() as usize;
        self.table[idx]
    }
}
