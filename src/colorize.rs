// Field snapshot -> RGB image at grid resolution.
// Both modes min-max normalise the field, apply the optional gamma, then
// either replicate the level across channels or look it up in a palette.
// A flat field (max == min) renders black.

use image::{Rgb, RgbImage};
use serde::Deserialize;

use crate::field::WaveField;
use crate::gamma::GammaLut;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RenderMode {
    #[default]
    Grayscale,
    Colormap,
}

impl RenderMode {
    pub fn toggled(self) -> Self {
        match self {
            RenderMode::Grayscale => RenderMode::Colormap,
            RenderMode::Colormap => RenderMode::Grayscale,
        }
    }
}

// Viridis anchors at t = 0, 1/8, ..., 1; the 256-entry palette interpolates between them.
const VIRIDIS: [[u8; 3]; 9] = [
    [68, 1, 84],
    [71, 44, 122],
    [59, 81, 139],
    [44, 113, 142],
    [33, 144, 141],
    [39, 173, 129],
    [92, 200, 99],
    [170, 220, 50],
    [253, 231, 37],
];

fn build_palette() -> [[u8; 3]; 256] {
    let mut palette = [[0u8; 3]; 256];
    let segments = (VIRIDIS.len() - 1) as f32;
    for (i, entry) in palette.iter_mut().enumerate() {
        let pos = i as f32 / 255.0 * segments;
        let k = (pos.floor() as usize).min(VIRIDIS.len() - 2);
        let f = pos - k as f32;
        for c in 0..3 {
            let a = VIRIDIS[k][c] as f32;
            let b = VIRIDIS[k + 1][c] as f32;
            entry[c] = (a + (b - a) * f).round() as u8;
        }
    }
    palette
}

pub struct FieldToColor {
    mode: RenderMode,
    lut: GammaLut,
    palette: [[u8; 3]; 256],
}

impl FieldToColor {
    pub fn new(mode: RenderMode, gamma: Option<f32>) -> Self {
        Self { mode, lut: GammaLut::new(gamma), palette: build_palette() }
    }

    pub fn mode(&self) -> RenderMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: RenderMode) {
        self.mode = mode;
    }

    /// One pixel per grid cell, row y of the field -> row y of the image.
    pub fn render(&self, field: &WaveField) -> RgbImage {
        let (nx, ny) = (field.nx(), field.ny());
        let (lo, hi) = field.range();
        let span = hi - lo;
        if !(span > 0.0 && span.is_finite()) {
            return RgbImage::new(nx as u32, ny as u32);
        }

        let values = field.current();
        RgbImage::from_fn(nx as u32, ny as u32, |x, y| {
            let v = values[y as usize * nx + x as usize];
            let level = self.lut.level((v - lo) / span);
            match self.mode {
                RenderMode::Grayscale => Rgb([level, level, level]),
                RenderMode::Colormap => Rgb(self.palette[level as usize]),
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flat_field_is_black() {
        let field = WaveField::new(4, 3);
        for mode in [RenderMode::Grayscale, RenderMode::Colormap] {
            let img = FieldToColor::new(mode, Some(2.2)).render(&field);
            assert_eq!(img.dimensions(), (4, 3));
            assert!(img.pixels().all(|p| p.0 == [0, 0, 0]));
        }

        let mut raised = WaveField::new(3, 3);
        for y in 0..3 {
            for x in 0..3 {
                raised.add(x, y, 0.7);
            }
        }
        let img = FieldToColor::new(RenderMode::Grayscale, None).render(&raised);
        assert!(img.pixels().all(|p| p.0 == [0, 0, 0]));
    }

    #[test]
    fn test_grayscale_normalises() {
        let mut field = WaveField::new(3, 1);
        field.add(0, 0, -1.0);
        field.add(2, 0, 1.0);

        let img = FieldToColor::new(RenderMode::Grayscale, None).render(&field);
        assert_eq!(img.get_pixel(0, 0).0, [0, 0, 0]);
        assert_eq!(img.get_pixel(1, 0).0, [127, 127, 127]);
        assert_eq!(img.get_pixel(2, 0).0, [255, 255, 255]);
    }

    #[test]
    fn test_colormap_endpoints() {
        let mut field = WaveField::new(2, 2);
        field.add(1, 1, 3.0);

        let img = FieldToColor::new(RenderMode::Colormap, None).render(&field);
        assert_eq!(img.get_pixel(0, 0).0, VIRIDIS[0]);
        assert_eq!(img.get_pixel(1, 1).0, VIRIDIS[8]);
    }

    #[test]
    fn test_palette_is_monotone_in_green() {
        let palette = build_palette();
        assert!(palette.windows(2).all(|w| w[1][1] >= w[0][1]));
    }

    #[test]
    fn test_toggle() {
        assert_eq!(RenderMode::Grayscale.toggled(), RenderMode::Colormap);
        assert_eq!(RenderMode::Colormap.toggled(), RenderMode::Grayscale);

        let mut colorizer = FieldToColor::new(RenderMode::default(), None);
        colorizer.set_mode(colorizer.mode().toggled());
        assert_eq!(colorizer.mode(), RenderMode::Colormap);
    }
}
