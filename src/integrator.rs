// One FDTD time step of the 2D wave equation:
//
//   next = 2*cur - prev
//        + Cx*(cur[x+1] - 2*cur[x] + cur[x-1])
//        + Cy*(cur[y+1] - 2*cur[y] + cur[y-1])
//        - damping*cur
//
// Interior cells only; the outer ring is set by the boundary policy.
// Rigid cells are zeroed afterwards, then the buffers rotate.

use rayon::prelude::*;
use serde::Deserialize;
use tracing::warn;

use crate::config::GridSpec;
use crate::error::{Error, Result};
use crate::field::WaveField;
use crate::injector::ImpulseInjector;
use crate::obstacle::ObstacleMask;

/// Grids at least this tall sweep their rows on the rayon pool.
const PARALLEL_ROWS: usize = 256;

/// What happens at the edge of the grid.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BoundaryPolicy {
    /// Edge rows/columns copy their interior neighbour (zero gradient).
    Reflective,
    /// The outer ring is held at zero and the `width` cells nearest each edge
    /// are scaled by `factor^distance` (distance 0 = outermost ring).
    ///
    /// The scaling is strongest on the innermost band cell, so a small factor
    /// turns the band's inner edge into a zero-valued wall: with the default
    /// (width 30, factor 0.1) waves reflect there instead of being absorbed.
    /// A factor just below 1 (e.g. 0.999) gives an actual absorbing layer.
    Absorbing { width: usize, factor: f32 },
}

impl Default for BoundaryPolicy {
    fn default() -> Self {
        BoundaryPolicy::Absorbing { width: 30, factor: 0.1 }
    }
}

#[derive(Debug, Clone)]
pub struct StencilIntegrator {
    nx: usize,
    ny: usize,
    courant_x: f32,
    courant_y: f32,
    boundary: BoundaryPolicy,
}

impl StencilIntegrator {
    /// Fails on a degenerate grid or when Cx + Cy > 1: the explicit scheme is unstable there.
    pub fn new(grid: &GridSpec, boundary: BoundaryPolicy) -> Result<Self> {
        grid.validate()?;
        let (courant_x, courant_y) = (grid.courant_x(), grid.courant_y());
        if !(courant_x + courant_y <= 1.0) {
            return Err(Error::UnstableGrid { courant_x, courant_y });
        }
        if let BoundaryPolicy::Absorbing { factor, .. } = boundary {
            if !(factor > 0.0 && factor <= 1.0) {
                return Err(Error::invalid_config(format!(
                    "absorbing factor must be in (0, 1], got {factor}"
                )));
            }
        }
        Ok(Self { nx: grid.nx, ny: grid.ny, courant_x, courant_y, boundary })
    }

    pub fn courant(&self) -> (f32, f32) {
        (self.courant_x, self.courant_y)
    }

    pub fn boundary(&self) -> BoundaryPolicy {
        self.boundary
    }

    /// Grid size this integrator was built for.
    pub fn dims(&self) -> (usize, usize) {
        (self.nx, self.ny)
    }

    /// Inject pending sources, advance one step, zero rigid cells, rotate.
    /// A field, mask or injector of another size is left untouched.
    pub fn step(
        &self,
        field: &mut WaveField,
        mask: &ObstacleMask,
        damping: f32,
        injector: &mut ImpulseInjector,
    ) {
        let dims = self.dims();
        let (field_dims, mask_dims) = ((field.nx(), field.ny()), mask.dims());
        if field_dims != dims || mask_dims != dims || injector.dims() != dims {
            warn!(
                ?dims,
                ?field_dims,
                ?mask_dims,
                injector_dims = ?injector.dims(),
                "size mismatch, step skipped"
            );
            return;
        }

        injector.apply_pending(field);

        let (nx, ny) = dims;
        let (prev, cur, next) = field.split_mut();
        let coeffs = (self.courant_x, self.courant_y, damping);
        sweep_interior(prev, cur, next, nx, ny, coeffs, ny >= PARALLEL_ROWS);

        match self.boundary {
            BoundaryPolicy::Reflective => copy_edges(next, nx, ny),
            BoundaryPolicy::Absorbing { width, factor } => {
                zero_ring(next, nx, ny);
                fade_band(next, nx, ny, width, factor);
            }
        }

        for &i in mask.flagged() {
            next[i] = 0.0;
        }

        field.rotate();
    }
}

/// Write the stencil into the interior rows of `next`. Rows only ever read
/// `prev`/`cur`, so they can be handed to separate workers.
fn sweep_interior(
    prev: &[f32],
    cur: &[f32],
    next: &mut [f32],
    nx: usize,
    ny: usize,
    (cx, cy, damping): (f32, f32, f32),
    parallel: bool,
) {
    let interior = &mut next[nx..(ny - 1) * nx];
    let sweep = |(r, row): (usize, &mut [f32])| {
        let base = (r + 1) * nx;
        for x in 1..nx - 1 {
            let i = base + x;
            let c = cur[i];
            let lap_x = cur[i + 1] - 2.0 * c + cur[i - 1];
            let lap_y = cur[i + nx] - 2.0 * c + cur[i - nx];
            row[x] = 2.0 * c - prev[i] + cx * lap_x + cy * lap_y - damping * c;
        }
    };
    if parallel {
        interior.par_chunks_mut(nx).enumerate().for_each(sweep);
    } else {
        interior.chunks_mut(nx).enumerate().for_each(sweep);
    }
}

/// Zero-gradient edges: rows first, then columns (which also fixes the corners).
fn copy_edges(u: &mut [f32], nx: usize, ny: usize) {
    u.copy_within(nx..2 * nx, 0);
    u.copy_within((ny - 2) * nx..(ny - 1) * nx, (ny - 1) * nx);
    for y in 0..ny {
        let row = y * nx;
        u[row] = u[row + 1];
        u[row + nx - 1] = u[row + nx - 2];
    }
}

fn zero_ring(u: &mut [f32], nx: usize, ny: usize) {
    u[..nx].fill(0.0);
    u[(ny - 1) * nx..].fill(0.0);
    for y in 1..ny - 1 {
        u[y * nx] = 0.0;
        u[y * nx + nx - 1] = 0.0;
    }
}

/// Scale the rows and columns at distance `i < width` from each edge by `factor^i`.
/// Where bands cross (corners, or grids narrower than two bands) the factors multiply.
fn fade_band(u: &mut [f32], nx: usize, ny: usize, width: usize, factor: f32) {
    let mut scale = 1.0f32;
    for i in 0..width {
        if i > 0 {
            scale *= factor;
        }
        if i < ny {
            scale_row(u, nx, i, scale);
            scale_row(u, nx, ny - 1 - i, scale);
        }
        if i < nx {
            for y in 0..ny {
                u[y * nx + i] *= scale;
                u[y * nx + nx - 1 - i] *= scale;
            }
        }
    }
}

fn scale_row(u: &mut [f32], nx: usize, y: usize, scale: f32) {
    for v in &mut u[y * nx..(y + 1) * nx] {
        *v *= scale;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::injector::ImpulseMode;
    use crate::obstacle::WallSegment;

    fn grid(n: usize, extent: f32, dt: f32) -> GridSpec {
        GridSpec { nx: n, ny: n, lx: extent, ly: extent, wave_speed: 1.0, dt }
    }

    #[test]
    fn test_rejects_unstable_grid() {
        // dx = 0.25, c*dt/dx = 0.8 -> Cx + Cy = 1.28
        let err = StencilIntegrator::new(&grid(5, 1.0, 0.2), BoundaryPolicy::Reflective).unwrap_err();
        assert!(matches!(err, Error::UnstableGrid { .. }));
    }

    #[test]
    fn test_rejects_degenerate_grid() {
        let tiny = GridSpec { nx: 1, ny: 1, ..GridSpec::default() };
        let err = StencilIntegrator::new(&tiny, BoundaryPolicy::Reflective).unwrap_err();
        assert!(matches!(err, Error::InvalidConfig(_)));

        let backwards = GridSpec { lx: -1.0, dt: -0.001, ..grid(5, 1.0, 0.001) };
        assert!(StencilIntegrator::new(&backwards, BoundaryPolicy::Reflective).is_err());

        let two_rows = GridSpec { ny: 2, ..grid(5, 1.0, 0.001) };
        assert!(StencilIntegrator::new(&two_rows, BoundaryPolicy::default()).is_err());
    }

    #[test]
    fn test_mismatched_sizes_skip_the_step() {
        let g = grid(5, 1.0, 0.001);
        let integrator = StencilIntegrator::new(&g, BoundaryPolicy::Reflective).unwrap();
        assert_eq!(integrator.dims(), (5, 5));

        let mut field = WaveField::new(5, 5);
        field.seed(2, 2, 1.0);
        let mut big_mask = ObstacleMask::new(8, 8);
        big_mask.load(&[WallSegment::new(0.0, 70.0, 100.0, 70.0)], 100.0, 100.0).unwrap();
        let mut inj = ImpulseInjector::new(5, 5, ImpulseMode::Continuous);
        inj.enqueue(1, 1, 1.0);

        integrator.step(&mut field, &big_mask, 0.0, &mut inj);
        assert_eq!(field.get(2, 2), Some(1.0));
        assert_eq!(field.get(1, 1), Some(0.0));

        let mut small_field = WaveField::new(3, 3);
        integrator.step(&mut small_field, &ObstacleMask::new(5, 5), 0.0, &mut inj);
        assert_eq!(small_field.max_abs(), 0.0);
        assert_eq!(inj.pending().len(), 1);
    }

    #[test]
    fn test_rejects_bad_absorbing_factor() {
        let policy = BoundaryPolicy::Absorbing { width: 4, factor: 1.5 };
        assert!(StencilIntegrator::new(&grid(5, 1.0, 0.001), policy).is_err());
    }

    #[test]
    fn test_single_impulse_step() {
        // nx = ny = 5 over 1.0 -> dx = 0.25; Cx = Cy = (0.001 / 0.25)^2 = 1.6e-5
        let g = grid(5, 1.0, 0.001);
        let integrator = StencilIntegrator::new(&g, BoundaryPolicy::Reflective).unwrap();
        let (cx, cy) = integrator.courant();
        assert!((cx - 1.6e-5).abs() < 1e-9);
        assert!((cy - 1.6e-5).abs() < 1e-9);

        let mut field = WaveField::new(5, 5);
        let mask = ObstacleMask::new(5, 5);
        let mut inj = ImpulseInjector::new(5, 5, ImpulseMode::OneShot);
        inj.enqueue(2, 2, 1.0);

        integrator.step(&mut field, &mask, 0.0, &mut inj);

        let centre = field.get(2, 2).unwrap();
        assert!((centre - 2.0).abs() < 1e-4, "centre = {centre}");
        for (x, y) in [(1, 2), (3, 2), (2, 1), (2, 3)] {
            let v = field.get(x, y).unwrap();
            assert!((v - 1.6e-5).abs() < 1e-9, "({x}, {y}) = {v}");
        }
        for (x, y) in [(1, 1), (3, 1), (1, 3), (3, 3)] {
            assert_eq!(field.get(x, y), Some(0.0));
        }
        // previous holds the injected state
        assert_eq!(field.previous()[field.idx(2, 2)], 1.0);
    }

    #[test]
    fn test_reflective_edges_copy_interior() {
        let g = grid(6, 1.0, 0.01);
        let integrator = StencilIntegrator::new(&g, BoundaryPolicy::Reflective).unwrap();
        let mut field = WaveField::new(6, 6);
        field.seed(1, 3, 1.0);
        let mask = ObstacleMask::new(6, 6);
        let mut inj = ImpulseInjector::new(6, 6, ImpulseMode::OneShot);

        integrator.step(&mut field, &mask, 0.0, &mut inj);

        assert_eq!(field.get(0, 3), field.get(1, 3));
        assert_eq!(field.get(3, 0), field.get(3, 1));
        assert_eq!(field.get(5, 2), field.get(4, 2));
        assert_eq!(field.get(0, 0), field.get(1, 1));
    }

    #[test]
    fn test_absorbing_ring_is_zero() {
        let g = grid(8, 1.0, 0.01);
        let policy = BoundaryPolicy::Absorbing { width: 3, factor: 0.5 };
        let integrator = StencilIntegrator::new(&g, policy).unwrap();
        let mut field = WaveField::new(8, 8);
        let mask = ObstacleMask::new(8, 8);
        let mut inj = ImpulseInjector::new(8, 8, ImpulseMode::Continuous);
        inj.enqueue(0, 4, 1.0);
        inj.enqueue(4, 4, 1.0);

        for _ in 0..5 {
            integrator.step(&mut field, &mask, 0.0, &mut inj);
            for k in 0..8 {
                assert_eq!(field.get(k, 0), Some(0.0));
                assert_eq!(field.get(k, 7), Some(0.0));
                assert_eq!(field.get(0, k), Some(0.0));
                assert_eq!(field.get(7, k), Some(0.0));
            }
        }
    }

    #[test]
    fn test_fade_band_scales_by_distance() {
        let (nx, ny) = (9, 9);
        let mut u = vec![1.0f32; nx * ny];
        fade_band(&mut u, nx, ny, 2, 0.5);
        // middle of the top edge: row scale only
        assert_eq!(u[4], 1.0);
        assert_eq!(u[nx + 4], 0.5);
        assert_eq!(u[2 * nx + 4], 1.0);
        // (1, 1) sits in the second row band and the second column band
        assert_eq!(u[nx + 1], 0.25);
        assert_eq!(u[4 * nx + 4], 1.0);
    }

    #[test]
    fn test_obstacles_stay_zero() {
        let g = grid(20, 1.0, 0.01);
        let integrator = StencilIntegrator::new(&g, BoundaryPolicy::Reflective).unwrap();
        let mut field = WaveField::new(20, 20);
        let mut mask = ObstacleMask::new(20, 20);
        mask.load(&[WallSegment::new(0.0, 50.0, 100.0, 50.0)], 100.0, 100.0).unwrap();
        let mut inj = ImpulseInjector::new(20, 20, ImpulseMode::Continuous);
        inj.enqueue(10, 5, 1.0);
        inj.enqueue(3, 10, 1.0); // on the wall itself

        for _ in 0..50 {
            integrator.step(&mut field, &mask, 0.01, &mut inj);
            for &i in mask.flagged() {
                assert_eq!(field.current()[i], 0.0);
            }
        }
        assert!(field.max_abs() > 0.0);
    }

    #[test]
    fn test_parallel_sweep_matches_sequential() {
        let (nx, ny) = (37, 29);
        let cur: Vec<f32> = (0..nx * ny).map(|i| ((i * 7919) % 101) as f32 / 101.0).collect();
        let prev: Vec<f32> = (0..nx * ny).map(|i| ((i * 104729) % 89) as f32 / 89.0).collect();
        let mut seq = vec![0.0f32; nx * ny];
        let mut par = vec![0.0f32; nx * ny];

        sweep_interior(&prev, &cur, &mut seq, nx, ny, (0.2, 0.3, 0.01), false);
        sweep_interior(&prev, &cur, &mut par, nx, ny, (0.2, 0.3, 0.01), true);

        assert_eq!(seq, par);
        // the ring is never written by the sweep
        assert!(seq[..nx].iter().all(|&v| v == 0.0));
        assert!(seq[nx + 1] != 0.0);
    }
}
