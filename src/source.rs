// Tile source contract
use crate::error::Result;
use crate::tile::{Raster, TileIndex};

/// Anything that can hand out square tile rasters by index.
///
/// `Ok(None)` means the source has no data for the tile; the extractor draws
/// an all-zero tile in its place. `Err` aborts the whole extraction.
pub trait TileSource {
    /// Side length of the tiles this source returns, in pixels
    fn tile_size(&self) -> u32;

    fn fetch(&mut self, tile: TileIndex) -> Result<Option<Raster>>;
}

impl<T: TileSource + ?Sized> TileSource for &mut T {
    fn tile_size(&self) -> u32 {
        (**self).tile_size()
    }

    fn fetch(&mut self, tile: TileIndex) -> Result<Option<Raster>> {
        (**self).fetch(tile)
    }
}
