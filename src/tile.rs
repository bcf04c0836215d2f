// Web-Mercator tile indices and tile rasters
use crate::error::{ChipError, Result};
use crate::geo::{BoundingBox, GeoPoint};
use crate::pixel::CropRectangle;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use std::fmt;
use std::path::Path;

/// Deepest zoom level whose tile count still fits in a u32 per axis
pub const MAX_ZOOM: u8 = 30;

// Keeps points sitting exactly on a tile edge in the tile to the east/south
const EDGE_EPSILON: f64 = 1e-14;

/// Identifies a tile in the standard XYZ Web-Mercator scheme
/// (x grows eastwards from the anti-meridian, y grows southwards from the top)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TileIndex {
    pub zoom: u8,
    pub x: u32,
    pub y: u32,
}

impl TileIndex {
    pub fn new(zoom: u8, x: u32, y: u32) -> Self {
        Self { zoom, x, y }
    }

    /// Tile containing `point` at `zoom`. Latitudes beyond the Mercator limit
    /// land in the first or last row.
    pub fn from_point(point: GeoPoint, zoom: u8) -> Result<Self> {
        if zoom > MAX_ZOOM {
            return Err(ChipError::Geometry(format!(
                "zoom {} above maximum {}",
                zoom, MAX_ZOOM
            )));
        }
        let n = 1u64 << zoom;

        let fx = point.lon / 360.0 + 0.5;
        let sin_lat = point.lat.to_radians().sin();
        let fy = 0.5 - 0.25 * ((1.0 + sin_lat) / (1.0 - sin_lat)).ln() / PI;

        Ok(Self {
            zoom,
            x: Self::axis_index(fx, n),
            y: Self::axis_index(fy, n),
        })
    }

    fn axis_index(fraction: f64, n: u64) -> u32 {
        if fraction <= 0.0 {
            0
        } else if fraction >= 1.0 {
            (n - 1) as u32
        } else {
            (((fraction + EDGE_EPSILON) * n as f64).floor() as u64).min(n - 1) as u32
        }
    }

    /// Geographic footprint of the tile
    pub fn bounds(&self) -> BoundingBox {
        let n = (1u64 << self.zoom) as f64;
        let lon = |x: u32| x as f64 / n * 360.0 - 180.0;
        let lat = |y: u32| (PI * (1.0 - 2.0 * y as f64 / n)).sinh().atan().to_degrees();

        BoundingBox {
            north: lat(self.y),
            south: lat(self.y + 1),
            east: lon(self.x + 1),
            west: lon(self.x),
        }
    }
}

impl fmt::Display for TileIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.zoom, self.x, self.y)
    }
}

/// 8-bit raster, row-major with interleaved channels
#[derive(Debug, Clone, PartialEq)]
pub struct Raster {
    pub width: usize,
    pub height: usize,
    pub channels: usize,
    pub pixels: Vec<u8>,
}

impl Raster {
    /// All-zero RGB raster
    pub fn zeroed(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            channels: 3,
            pixels: vec![0; width * height * 3],
        }
    }

    /// Wrap raw samples; `None` if the buffer length does not match the shape
    pub fn from_pixels(width: usize, height: usize, channels: usize, pixels: Vec<u8>) -> Option<Self> {
        if channels == 0 || pixels.len() != width * height * channels {
            return None;
        }
        Some(Self {
            width,
            height,
            channels,
            pixels,
        })
    }

    /// Channels of the pixel at (x, y)
    pub fn pixel(&self, x: usize, y: usize) -> Option<&[u8]> {
        if x < self.width && y < self.height {
            let start = (y * self.width + x) * self.channels;
            Some(&self.pixels[start..start + self.channels])
        } else {
            None
        }
    }

    /// Same raster as 3-channel RGB. Extra channels are dropped, grey is replicated.
    pub fn to_rgb(&self) -> Raster {
        if self.channels == 3 {
            return self.clone();
        }
        let mut out = Vec::with_capacity(self.width * self.height * 3);
        for px in self.pixels.chunks_exact(self.channels) {
            if self.channels >= 3 {
                out.extend_from_slice(&px[..3]);
            } else {
                out.extend_from_slice(&[px[0], px[0], px[0]]);
            }
        }
        Raster {
            width: self.width,
            height: self.height,
            channels: 3,
            pixels: out,
        }
    }

    /// Copy the first three channels of `src` with its top-left corner at (x, y).
    /// Parts of `src` falling outside `self` are clipped.
    pub fn paste(&mut self, src: &Raster, x: usize, y: usize) {
        let src_rgb;
        let src = if src.channels == 3 {
            src
        } else {
            src_rgb = src.to_rgb();
            &src_rgb
        };

        let cols = src.width.min(self.width.saturating_sub(x));
        let rows = src.height.min(self.height.saturating_sub(y));
        for row in 0..rows {
            let src_start = row * src.width * 3;
            let dst_start = ((y + row) * self.width + x) * self.channels;
            for col in 0..cols {
                let s = src_start + col * 3;
                let d = dst_start + col * self.channels;
                self.pixels[d..d + 3].copy_from_slice(&src.pixels[s..s + 3]);
            }
        }
    }

    /// Sub-raster covered by `rect`, clipped to this raster
    pub fn crop(&self, rect: &CropRectangle) -> Raster {
        let clamp = |v: i64, max: usize| v.clamp(0, max as i64) as usize;
        let (r0, r1) = (clamp(rect.min_row, self.height), clamp(rect.max_row, self.height));
        let (c0, c1) = (clamp(rect.min_col, self.width), clamp(rect.max_col, self.width));
        let width = c1.saturating_sub(c0);
        let height = r1.saturating_sub(r0);

        let mut pixels = Vec::with_capacity(width * height * self.channels);
        for row in r0..r0 + height {
            let start = (row * self.width + c0) * self.channels;
            pixels.extend_from_slice(&self.pixels[start..start + width * self.channels]);
        }
        Raster {
            width,
            height,
            channels: self.channels,
            pixels,
        }
    }

    /// Decode-side conversion; the result is always RGB
    pub fn from_image(image: image::DynamicImage) -> Self {
        let rgb = image.into_rgb8();
        let (width, height) = rgb.dimensions();
        Raster {
            width: width as usize,
            height: height as usize,
            channels: 3,
            pixels: rgb.into_raw(),
        }
    }

    pub fn into_rgb_image(self) -> Option<image::RgbImage> {
        let rgb = if self.channels == 3 { self } else { self.to_rgb() };
        image::RgbImage::from_raw(rgb.width as u32, rgb.height as u32, rgb.pixels)
    }

    /// Write the raster to disk; the format follows the file extension
    pub fn save(&self, path: impl AsRef<Path>) -> image::ImageResult<()> {
        let rgb = self.to_rgb();
        image::save_buffer(
            path,
            &rgb.pixels,
            rgb.width as u32,
            rgb.height as u32,
            image::ExtendedColorType::Rgb8,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tile_for_point() {
        let tile = TileIndex::from_point(GeoPoint::new(50.7929, 6.0402), 18).unwrap();
        assert_eq!(tile, TileIndex::new(18, 135470, 87999));

        let tile = TileIndex::from_point(GeoPoint::new(0.0, 0.0), 1).unwrap();
        assert_eq!(tile, TileIndex::new(1, 1, 1));

        let tile = TileIndex::from_point(GeoPoint::new(45.0, -90.0), 2).unwrap();
        assert_eq!(tile, TileIndex::new(2, 1, 1));
    }

    #[test]
    fn test_world_edges_clamp() {
        assert_eq!(
            TileIndex::from_point(GeoPoint::new(89.0, 180.0), 3).unwrap(),
            TileIndex::new(3, 7, 0)
        );
        assert_eq!(
            TileIndex::from_point(GeoPoint::new(-89.0, -180.0), 3).unwrap(),
            TileIndex::new(3, 0, 7)
        );
        assert!(TileIndex::from_point(GeoPoint::new(0.0, 0.0), MAX_ZOOM + 1).is_err());
    }

    #[test]
    fn test_bounds_contain_point() {
        let point = GeoPoint::new(5.0, 20.0);
        let tile = TileIndex::from_point(point, 15).unwrap();
        let bounds = tile.bounds();
        assert!(bounds.contains(point));
        assert!(bounds.north > bounds.south);
        assert!(bounds.east > bounds.west);
    }

    #[test]
    fn test_world_tile_bounds() {
        let bounds = TileIndex::new(0, 0, 0).bounds();
        assert!((bounds.west + 180.0).abs() < 1e-9);
        assert!((bounds.east - 180.0).abs() < 1e-9);
        assert!((bounds.north - 85.051_128_779_806_59).abs() < 1e-9);
        assert!((bounds.south + 85.051_128_779_806_59).abs() < 1e-9);
    }

    #[test]
    fn test_neighbouring_tiles_share_edges() {
        let tile = TileIndex::new(12, 2000, 1500);
        let east = TileIndex::new(12, 2001, 1500).bounds();
        let south = TileIndex::new(12, 2000, 1501).bounds();
        assert_eq!(tile.bounds().east, east.west);
        assert_eq!(tile.bounds().south, south.north);
    }

    #[test]
    fn test_display() {
        assert_eq!(TileIndex::new(15, 18204, 15928).to_string(), "15/18204/15928");
    }

    #[test]
    fn test_raster_paste_and_crop() {
        let mut canvas = Raster::zeroed(4, 4);
        let rgba = Raster::from_pixels(2, 2, 4, vec![9; 16]).unwrap();
        canvas.paste(&rgba, 2, 2);

        assert_eq!(canvas.pixel(0, 0), Some(&[0, 0, 0][..]));
        assert_eq!(canvas.pixel(3, 3), Some(&[9, 9, 9][..]));
        assert_eq!(canvas.pixel(4, 0), None);

        let rect = CropRectangle::new(1, 3, 1, 3);
        let chip = canvas.crop(&rect);
        assert_eq!((chip.width, chip.height), (2, 2));
        assert_eq!(chip.pixel(0, 0), Some(&[0, 0, 0][..]));
        assert_eq!(chip.pixel(1, 1), Some(&[9, 9, 9][..]));
    }

    #[test]
    fn test_raster_shape_checks() {
        assert!(Raster::from_pixels(2, 2, 3, vec![0; 11]).is_none());
        let grey = Raster::from_pixels(1, 1, 1, vec![7]).unwrap();
        assert_eq!(grey.to_rgb().pixels, vec![7, 7, 7]);
    }
}
