// The pressure field: three row-major buffers (previous, current, next).
// A step reads `previous`/`current` and writes only `next`; `rotate` then
// swaps the handles so nothing is ever copied element by element.

/// Scalar field state on an `nx` x `ny` grid, indexed `[y * nx + x]`.
pub struct WaveField {
    nx: usize,
    ny: usize,
    previous: Vec<f32>,
    current: Vec<f32>,
    next: Vec<f32>,
}

impl WaveField {
    /// All three buffers start at zero.
    pub fn new(nx: usize, ny: usize) -> Self {
        let len = nx * ny;
        Self {
            nx,
            ny,
            previous: vec![0.0; len],
            current: vec![0.0; len],
            next: vec![0.0; len],
        }
    }

    pub fn nx(&self) -> usize {
        self.nx
    }

    pub fn ny(&self) -> usize {
        self.ny
    }

    #[inline(always)]
    pub fn idx(&self, x: usize, y: usize) -> usize {
        y * self.nx + x
    }

    /// Present amplitude at (x, y), or `None` off the grid.
    pub fn get(&self, x: usize, y: usize) -> Option<f32> {
        if x < self.nx && y < self.ny {
            Some(self.current[self.idx(x, y)])
        } else {
            None
        }
    }

    /// The field as the renderer sees it (row-major).
    pub fn current(&self) -> &[f32] {
        &self.current
    }

    pub fn previous(&self) -> &[f32] {
        &self.previous
    }

    /// Add to the present amplitude only. Callers check bounds.
    #[inline]
    pub fn add(&mut self, x: usize, y: usize, amplitude: f32) {
        let idx = self.idx(x, y);
        self.current[idx] += amplitude;
    }

    /// Add a displacement at rest: both `current` and `previous` move,
    /// so the cell starts with zero velocity.
    pub fn seed(&mut self, x: usize, y: usize, amplitude: f32) {
        if x < self.nx && y < self.ny {
            let idx = self.idx(x, y);
            self.current[idx] += amplitude;
            self.previous[idx] += amplitude;
        }
    }

    /// Read views of `previous`/`current` plus the write-only `next`.
    pub fn split_mut(&mut self) -> (&[f32], &[f32], &mut [f32]) {
        (&self.previous, &self.current, &mut self.next)
    }

    /// previous <- current, current <- next. The old `previous` becomes scratch.
    pub fn rotate(&mut self) {
        std::mem::swap(&mut self.previous, &mut self.current);
        std::mem::swap(&mut self.current, &mut self.next);
    }

    pub fn reset(&mut self) {
        self.previous.fill(0.0);
        self.current.fill(0.0);
        self.next.fill(0.0);
    }

    /// (min, max) of the present field. A flat field returns equal values.
    pub fn range(&self) -> (f32, f32) {
        self.current
            .iter()
            .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)))
    }

    pub fn max_abs(&self) -> f32 {
        self.current.iter().map(|v| v.abs()).fold(0.0, f32::max)
    }

    /// Discrete leapfrog energy between `previous` and `current`:
    /// kinetic sum of (u^n+1 - u^n)^2 over interior cells, plus
    /// Cx/Cy-weighted gradient products over every link touching an interior cell.
    /// Constant in time for the undamped scheme with zero-gradient edges.
    pub fn energy(&self, courant_x: f32, courant_y: f32) -> f64 {
        let (nx, ny) = (self.nx, self.ny);
        let u1 = &self.current;
        let u0 = &self.previous;
        let mut kinetic = 0.0f64;
        let mut potential = 0.0f64;

        for y in 1..ny - 1 {
            let row = y * nx;
            for x in 1..nx - 1 {
                let d = (u1[row + x] - u0[row + x]) as f64;
                kinetic += d * d;
            }
            // x-links, including the two that reach the edge columns
            for x in 0..nx - 1 {
                let i = row + x;
                let g1 = (u1[i + 1] - u1[i]) as f64;
                let g0 = (u0[i + 1] - u0[i]) as f64;
                potential += courant_x as f64 * g1 * g0;
            }
        }
        for y in 0..ny - 1 {
            let row = y * nx;
            for x in 1..nx - 1 {
                let i = row + x;
                let g1 = (u1[i + nx] - u1[i]) as f64;
                let g0 = (u0[i + nx] - u0[i]) as f64;
                potential += courant_y as f64 * g1 * g0;
            }
        }

        kinetic + potential
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_starts_at_zero() {
        let field = WaveField::new(6, 4);
        assert_eq!(field.current().len(), 24);
        assert!(field.current().iter().all(|&v| v == 0.0));
        assert_eq!(field.range(), (0.0, 0.0));
    }

    #[test]
    fn test_rotate_swaps_handles() {
        let mut field = WaveField::new(3, 3);
        field.add(1, 1, 2.0);
        {
            let (_, _, next) = field.split_mut();
            next[4] = 5.0;
        }
        field.rotate();
        assert_eq!(field.get(1, 1), Some(5.0));
        assert_eq!(field.previous()[4], 2.0);
    }

    #[test]
    fn test_seed_moves_both_levels() {
        let mut field = WaveField::new(4, 4);
        field.seed(2, 1, 0.5);
        field.seed(9, 9, 1.0);
        assert_eq!(field.get(2, 1), Some(0.5));
        assert_eq!(field.previous()[field.idx(2, 1)], 0.5);
        assert_eq!(field.max_abs(), 0.5);
    }

    #[test]
    fn test_reset_zeroes_everything() {
        let mut field = WaveField::new(3, 3);
        field.seed(1, 1, 1.0);
        field.reset();
        assert_eq!(field.max_abs(), 0.0);
        assert!(field.previous().iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_energy_of_displacement_at_rest_is_potential() {
        let mut field = WaveField::new(5, 5);
        field.seed(2, 2, 1.0);
        // four links around the centre, each with gradient 1 at both levels
        let e = field.energy(0.25, 0.25);
        assert!((e - 1.0).abs() < 1e-9, "energy = {e}");
    }
}
