//! The drawing surface frames and landmark markers are rendered onto.

use image::imageops::{self, FilterType};
use image::{Rgba, RgbaImage};

use crate::types::Point;

pub const TRANSPARENT: Rgba<u8> = Rgba([0, 0, 0, 0]);

/// An RGBA drawing surface.
#[derive(Debug, Clone)]
pub struct Canvas {
    surface: RgbaImage,
}

impl Canvas {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            surface: RgbaImage::from_pixel(width, height, TRANSPARENT),
        }
    }

    pub fn width(&self) -> u32 {
        self.surface.width()
    }

    pub fn height(&self) -> u32 {
        self.surface.height()
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.surface.dimensions()
    }

    /// Resize the surface. Contents are discarded when the size changes.
    pub fn resize(&mut self, width: u32, height: u32) {
        if self.dimensions() != (width, height) {
            self.surface = RgbaImage::from_pixel(width, height, TRANSPARENT);
        }
    }

    pub fn clear(&mut self) {
        for pixel in self.surface.pixels_mut() {
            *pixel = TRANSPARENT;
        }
    }

    /// Draw `image` stretched over the whole surface.
    pub fn draw_image(&mut self, image: &RgbaImage) {
        if image.dimensions() == self.dimensions() {
            self.surface.copy_from_slice(image.as_raw());
        } else {
            let (width, height) = self.dimensions();
            self.surface = imageops::resize(image, width, height, FilterType::Triangle);
        }
    }

    /// Fill a disc centred on a pixel position. Parts outside the surface are clipped.
    pub fn fill_circle(&mut self, cx: f64, cy: f64, radius: i32, color: Rgba<u8>) {
        let (img_w, img_h) = self.dimensions();
        let (cx, cy) = (cx as i32, cy as i32);

        for dy in -radius..=radius {
            for dx in -radius..=radius {
                if dx * dx + dy * dy <= radius * radius {
                    let px = cx + dx;
                    let py = cy + dy;
                    if px >= 0 && px < img_w as i32 && py >= 0 && py < img_h as i32 {
                        self.surface.put_pixel(px as u32, py as u32, color);
                    }
                }
            }
        }
    }

    /// Draw a marker at a normalized landmark position.
    pub fn mark(&mut self, point: &Point, radius: i32, color: Rgba<u8>) {
        let (x, y) = point.to_pixel(self.width(), self.height());
        self.fill_circle(x, y, radius, color);
    }

    pub fn image(&self) -> &RgbaImage {
        &self.surface
    }
}

impl Default for Canvas {
    fn default() -> Self {
        Self::new(0, 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RED: Rgba<u8> = Rgba([255, 0, 0, 255]);

    fn red_pixels(canvas: &Canvas) -> Vec<(u32, u32)> {
        canvas
            .image()
            .enumerate_pixels()
            .filter(|(_, _, p)| **p == RED)
            .map(|(x, y, _)| (x, y))
            .collect()
    }

    #[test]
    fn resize_and_clear() {
        let mut canvas = Canvas::new(4, 4);
        canvas.fill_circle(1.0, 1.0, 0, RED);
        assert_eq!(*canvas.image().get_pixel(1, 1), RED);

        // Same size keeps contents until cleared
        canvas.resize(4, 4);
        assert_eq!(*canvas.image().get_pixel(1, 1), RED);
        canvas.clear();
        assert_eq!(*canvas.image().get_pixel(1, 1), TRANSPARENT);

        canvas.resize(8, 6);
        assert_eq!(canvas.dimensions(), (8, 6));
    }

    #[test]
    fn draw_image_same_size_copies() {
        let source = RgbaImage::from_fn(3, 2, |x, y| Rgba([x as u8 * 10, y as u8 * 10, 0, 255]));
        let mut canvas = Canvas::new(3, 2);
        canvas.draw_image(&source);
        assert_eq!(canvas.image(), &source);
    }

    #[test]
    fn draw_image_stretches_to_surface() {
        let source = RgbaImage::from_pixel(2, 2, Rgba([0, 0, 255, 255]));
        let mut canvas = Canvas::new(6, 4);
        canvas.draw_image(&source);
        assert_eq!(canvas.dimensions(), (6, 4));
        let Rgba([r, g, b, _]) = *canvas.image().get_pixel(5, 3);
        assert_eq!((r, g), (0, 0));
        assert!(b >= 254);
    }

    #[test]
    fn unit_radius_marker() {
        let mut canvas = Canvas::new(10, 10);
        canvas.mark(&Point::new(0.5, 0.5), 1, RED);

        assert_eq!(
            red_pixels(&canvas),
            vec![(5, 4), (4, 5), (5, 5), (6, 5), (5, 6)]
        );
    }

    #[test]
    fn markers_clip_at_edges() {
        let mut canvas = Canvas::new(4, 4);
        canvas.mark(&Point::new(0.0, 0.0), 1, RED);
        // Centre lands on (3, 3), the right and bottom neighbours fall off
        canvas.mark(&Point::new(0.99, 0.99), 1, RED);

        assert_eq!(
            red_pixels(&canvas),
            vec![(0, 0), (1, 0), (0, 1), (3, 2), (2, 3), (3, 3)]
        );
    }

    #[test]
    fn marker_fully_off_surface_draws_nothing() {
        let mut canvas = Canvas::new(4, 4);
        // Centre lands on (4, 4), just past the last pixel
        canvas.mark(&Point::new(1.0, 1.0), 1, RED);
        assert!(red_pixels(&canvas).is_empty());
        assert!(canvas.image().pixels().all(|p| *p == TRANSPARENT));
    }
}
