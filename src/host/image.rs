use std::path::Path;

use image::{ImageError, RgbImage};

use crate::construct::grid::{PixelGrid, Rgb};

/// The host's real pixel grid, backed by a decoded raster image. Implements
/// the same `PixelGrid` trait `construct::grid::MemoryGrid` uses for tests,
/// so the evaluator never has to know which one it's holding.
pub struct ImageGrid {
    image: RgbImage,
}

impl ImageGrid {
    pub fn load(path: &Path) -> Result<ImageGrid, ImageError> {
        let image = image::open(path)?.into_rgb8();
        Ok(ImageGrid { image })
    }

    pub fn blank(width: u32, height: u32, fill: Rgb) -> ImageGrid {
        let mut image = RgbImage::new(width, height);
        for pixel in image.pixels_mut() {
            *pixel = image::Rgb([fill.0, fill.1, fill.2]);
        }
        ImageGrid { image }
    }

    pub fn save(&self, path: &Path) -> Result<(), ImageError> {
        self.image.save(path)
    }
}

impl PixelGrid for ImageGrid {
    fn width(&self) -> i64 {
        self.image.width() as i64
    }

    fn height(&self) -> i64 {
        self.image.height() as i64
    }

    fn get(&self, x: i64, y: i64) -> Option<Rgb> {
        if x < 0 || y < 0 || x >= self.width() || y >= self.height() {
            return None;
        }
        let pixel = self.image.get_pixel(x as u32, y as u32);
        Some((pixel[0], pixel[1], pixel[2]))
    }

    fn set(&mut self, x: i64, y: i64, rgb: Rgb) -> bool {
        if x < 0 || y < 0 || x >= self.width() || y >= self.height() {
            return false;
        }
        self.image.put_pixel(x as u32, y as u32, image::Rgb([rgb.0, rgb.1, rgb.2]));
        true
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn blank_grid_reads_back_the_fill_color() {
        let grid = ImageGrid::blank(3, 3, (1, 2, 3));
        assert_eq!(grid.get(0, 0), Some((1, 2, 3)));
        assert_eq!(grid.get(2, 2), Some((1, 2, 3)));
        assert_eq!(grid.get(3, 0), None);
    }

    #[test]
    fn set_then_get_round_trips() {
        let mut grid = ImageGrid::blank(2, 2, (0, 0, 0));
        assert!(grid.set(1, 1, (10, 20, 30)));
        assert_eq!(grid.get(1, 1), Some((10, 20, 30)));
        assert!(!grid.set(5, 5, (0, 0, 0)));
    }
}
