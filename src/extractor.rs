// Chip extraction: bounding box -> corner tiles -> composite -> crop
use crate::composite::{stitch, Degeneracy, QuadrantAssignment, Role, RoleRaster};
use crate::config::ExtractorConfig;
use crate::downloader::TileDownloader;
use crate::error::{ChipError, Result};
use crate::geo::{bounding_box, BoundingBox, GeoPoint};
use crate::pixel::{local_rectangle, CropRectangle};
use crate::source::TileSource;
use crate::tile::{Raster, TileIndex};
use tracing::{debug, info, warn};

/// Everything about an extraction that can be worked out without fetching tiles
#[derive(Debug, Clone, PartialEq)]
pub struct ChipPlan {
    pub center: GeoPoint,
    pub zoom: u8,
    pub bbox: BoundingBox,
    pub quadrants: QuadrantAssignment,
    pub degeneracy: Degeneracy,
    /// Tile containing the center point; pixel mapping is done in its frame
    pub center_tile: TileIndex,
    /// Composite (width, height) in pixels
    pub composite_size: (usize, usize),
    /// Area of the composite covered by `bbox`
    pub crop: CropRectangle,
}

/// Cuts north-up image chips out of a tiled map.
///
/// The corners of the requested box must fall in the center tile or its
/// direct neighbours, i.e. the radius must stay below half a tile.
pub struct ChipExtractor {
    config: ExtractorConfig,
}

impl ChipExtractor {
    pub fn new(config: ExtractorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    /// Work out the tiles and the crop rectangle for a chip of half-side
    /// `radius_km` around `center` at `zoom`
    pub fn plan(&self, center: GeoPoint, radius_km: f64, zoom: u8) -> Result<ChipPlan> {
        center.validate()?;
        if !radius_km.is_finite() || radius_km <= 0.0 {
            return Err(ChipError::Geometry(format!(
                "radius {} km must be positive",
                radius_km
            )));
        }

        let bbox = bounding_box(center, radius_km);
        bbox.validate()?;

        let quadrants = QuadrantAssignment::from_bbox(&bbox, zoom)?;
        let degeneracy = quadrants.degeneracy()?;
        let center_tile = TileIndex::from_point(center, zoom)?;
        let (col, row) = quadrants.cell_of(center_tile).ok_or_else(|| {
            ChipError::Composition(format!(
                "center tile {} is not among the corner tiles",
                center_tile
            ))
        })?;

        let tile_size = self.config.tile_size;
        let (width, height) = degeneracy.composite_size(tile_size);
        let rect = local_rectangle(&bbox, &center_tile.bounds(), tile_size).rebase(col, row, tile_size);
        let crop = rect.clamp_to(width, height).ok_or_else(|| {
            ChipError::Geometry(format!(
                "crop {:?} falls outside the {}x{} composite",
                rect, width, height
            ))
        })?;
        if crop != rect {
            debug!("crop {:?} clamped to {:?}", rect, crop);
        }

        Ok(ChipPlan {
            center,
            zoom,
            bbox,
            quadrants,
            degeneracy,
            center_tile,
            composite_size: (width, height),
            crop,
        })
    }

    /// Extract the chip, fetching each distinct corner tile once from `source`
    /// in north-west, north-east, south-west, south-east order. Any fetch
    /// failure aborts the extraction.
    pub fn extract<S: TileSource>(
        &self,
        center: GeoPoint,
        radius_km: f64,
        zoom: u8,
        mut source: S,
    ) -> Result<Raster> {
        let tile_size = self.config.tile_size;
        if source.tile_size() != tile_size {
            return Err(ChipError::Source(format!(
                "source serves {}px tiles, configured for {}px",
                source.tile_size(),
                tile_size
            )));
        }

        let plan = self.plan(center, radius_km, zoom)?;
        info!(
            "extracting chip at ({}, {}) radius {} km zoom {}: {:?}, crop {:?}",
            center.lat, center.lon, radius_km, zoom, plan.degeneracy, plan.crop
        );

        let [nw, ne, sw, se] = Role::ALL;
        let slots = [
            self.fetch_slot(&plan.quadrants, nw, &mut source)?,
            self.fetch_slot(&plan.quadrants, ne, &mut source)?,
            self.fetch_slot(&plan.quadrants, sw, &mut source)?,
            self.fetch_slot(&plan.quadrants, se, &mut source)?,
        ];

        let composite = stitch(&plan.quadrants, slots, tile_size)?;
        Ok(composite.crop(&plan.crop))
    }

    fn fetch_slot<S: TileSource>(
        &self,
        quadrants: &QuadrantAssignment,
        role: Role,
        source: &mut S,
    ) -> Result<RoleRaster> {
        if let Some(original) = quadrants.duplicate_of(role) {
            return Ok(RoleRaster::DuplicateOf(original));
        }

        let tile = quadrants.tile(role);
        let size = self.config.tile_size as usize;
        debug!("fetching {:?} tile {}", role, tile);
        let raster = match source.fetch(tile)? {
            Some(raster) => raster,
            None => {
                warn!("tile {} has no data, using a blank tile", tile);
                Raster::zeroed(size, size)
            }
        };

        if raster.width != size || raster.height != size {
            return Err(ChipError::fetch(
                tile,
                format!(
                    "tile is {}x{}, expected {}x{}",
                    raster.width, raster.height, size, size
                ),
            ));
        }
        Ok(RoleRaster::Fetched(raster))
    }
}

/// Fetch a chip of half-side `radius_km` around (`lat`, `lon`) from a Planet basemap
pub fn extract_chip(
    lat: f64,
    lon: f64,
    radius_km: f64,
    zoom: u8,
    map_id: &str,
    api_key: &str,
) -> Result<Raster> {
    let config = ExtractorConfig::planet(map_id, api_key);
    let downloader = TileDownloader::new(&config)?;
    ChipExtractor::new(config).extract(GeoPoint::new(lat, lon), radius_km, zoom, downloader)
}
