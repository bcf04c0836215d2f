// Geographic to pixel mapping inside a tile composite
use crate::geo::{BoundingBox, GeoPoint};
use serde::{Deserialize, Serialize};

/// Pixel rectangle in composite coordinates. Rows and columns are half-open:
/// `min_row..max_row`, `min_col..max_col`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CropRectangle {
    pub min_row: i64,
    pub max_row: i64,
    pub min_col: i64,
    pub max_col: i64,
}

impl CropRectangle {
    pub fn new(min_row: i64, max_row: i64, min_col: i64, max_col: i64) -> Self {
        Self {
            min_row,
            max_row,
            min_col,
            max_col,
        }
    }

    pub fn width(&self) -> i64 {
        self.max_col - self.min_col
    }

    pub fn height(&self) -> i64 {
        self.max_row - self.min_row
    }

    /// True when the rectangle is non-empty and lies inside a `width` x `height` raster
    pub fn fits_within(&self, width: usize, height: usize) -> bool {
        0 <= self.min_row
            && self.min_row < self.max_row
            && self.max_row <= height as i64
            && 0 <= self.min_col
            && self.min_col < self.max_col
            && self.max_col <= width as i64
    }

    /// Intersection with a `width` x `height` raster, `None` if nothing is left
    pub fn clamp_to(&self, width: usize, height: usize) -> Option<CropRectangle> {
        let clamped = CropRectangle {
            min_row: self.min_row.clamp(0, height as i64),
            max_row: self.max_row.clamp(0, height as i64),
            min_col: self.min_col.clamp(0, width as i64),
            max_col: self.max_col.clamp(0, width as i64),
        };
        (clamped.min_row < clamped.max_row && clamped.min_col < clamped.max_col).then_some(clamped)
    }

    /// Shift from a tile-local frame into the composite frame, where the
    /// reference tile sits at cell (`col`, `row`).
    pub fn rebase(&self, col: u32, row: u32, tile_size: u32) -> CropRectangle {
        let dx = col as i64 * tile_size as i64;
        let dy = row as i64 * tile_size as i64;
        CropRectangle {
            min_row: self.min_row + dy,
            max_row: self.max_row + dy,
            min_col: self.min_col + dx,
            max_col: self.max_col + dx,
        }
    }
}

/// Pixel position of `point` relative to the top-left corner of `tile_bounds`,
/// truncated toward zero. Points outside the tile give negative or
/// `>= tile_size` values.
pub fn point_to_pixel(point: GeoPoint, tile_bounds: &BoundingBox, tile_size: u32) -> (i64, i64) {
    let size = tile_size as f64;
    let px = (point.lon - tile_bounds.west) / (tile_bounds.east - tile_bounds.west) * size;
    let py = (point.lat - tile_bounds.north) / (tile_bounds.south - tile_bounds.north) * size;
    (px as i64, py as i64)
}

/// `bbox` in the frame of the tile with bounds `tile_bounds`, before any re-basing
pub fn local_rectangle(bbox: &BoundingBox, tile_bounds: &BoundingBox, tile_size: u32) -> CropRectangle {
    let (min_col, min_row) = point_to_pixel(bbox.north_west(), tile_bounds, tile_size);
    let (max_col, max_row) = point_to_pixel(bbox.south_east(), tile_bounds, tile_size);
    CropRectangle {
        min_row,
        max_row,
        min_col,
        max_col,
    }
}

/// Crop rectangle for `bbox` inside a composite built around the center tile.
///
/// A negative minimum on an axis means the box starts in the previous tile on
/// that axis, so the center tile is the second cell of the composite there.
pub fn crop_rectangle(bbox: &BoundingBox, center_tile_bounds: &BoundingBox, tile_size: u32) -> CropRectangle {
    let local = local_rectangle(bbox, center_tile_bounds, tile_size);
    let col = u32::from(local.min_col < 0);
    let row = u32::from(local.min_row < 0);
    local.rebase(col, row, tile_size)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tile::TileIndex;

    #[test]
    fn test_tile_center_maps_to_middle_pixel() {
        let bounds = BoundingBox::new(10.0, 0.0, 10.0, 0.0);
        assert_eq!(point_to_pixel(GeoPoint::new(5.0, 5.0), &bounds, 256), (128, 128));

        // Geographic center of a Mercator tile is slightly off the pixel center in y
        let tile = TileIndex::new(15, 18204, 15928);
        let b = tile.bounds();
        let center = b.center();
        let (px, py) = point_to_pixel(center, &b, 256);
        assert_eq!(px, 128);
        assert!((py - 128).abs() <= 1);
    }

    #[test]
    fn test_corners_of_tile() {
        let bounds = BoundingBox::new(10.0, 0.0, 10.0, 0.0);
        assert_eq!(point_to_pixel(GeoPoint::new(10.0, 0.0), &bounds, 256), (0, 0));
        assert_eq!(point_to_pixel(GeoPoint::new(0.0, 10.0), &bounds, 256), (256, 256));
        // Truncation is toward zero on both sides of the origin
        assert_eq!(point_to_pixel(GeoPoint::new(10.1, -0.1), &bounds, 256), (-2, -2));
    }

    #[test]
    fn test_crop_inside_single_tile() {
        let bounds = BoundingBox::new(10.0, 0.0, 10.0, 0.0);
        let bbox = BoundingBox::new(6.0, 4.0, 6.0, 4.0);
        let rect = crop_rectangle(&bbox, &bounds, 100);
        assert_eq!(rect, CropRectangle::new(40, 60, 40, 60));
        assert!(rect.fits_within(100, 100));
    }

    #[test]
    fn test_crop_rebased_when_box_starts_in_previous_tile() {
        let bounds = BoundingBox::new(10.0, 0.0, 10.0, 0.0);
        // Starts 1 degree west and north of the tile
        let bbox = BoundingBox::new(11.0, 9.0, 1.0, -1.0);
        let rect = crop_rectangle(&bbox, &bounds, 100);
        assert_eq!(rect, CropRectangle::new(90, 110, 90, 110));
        assert!(rect.fits_within(200, 200));
        assert!(!rect.fits_within(100, 100));
    }

    #[test]
    fn test_clamp() {
        let rect = CropRectangle::new(-5, 20, 90, 120);
        assert_eq!(rect.clamp_to(100, 100), Some(CropRectangle::new(0, 20, 90, 100)));
        assert_eq!(CropRectangle::new(120, 130, 0, 10).clamp_to(100, 100), None);
    }
}
