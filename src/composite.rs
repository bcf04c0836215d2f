// Stitching corner tiles into one composite raster
use crate::error::{ChipError, Result};
use crate::geo::BoundingBox;
use crate::tile::{Raster, TileIndex};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Position of a corner tile in the composite. Declaration order is the fetch order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    NorthWest,
    NorthEast,
    SouthWest,
    SouthEast,
}

impl Role {
    pub const ALL: [Role; 4] = [
        Role::NorthWest,
        Role::NorthEast,
        Role::SouthWest,
        Role::SouthEast,
    ];

    fn index(self) -> usize {
        self as usize
    }

    fn is_east(self) -> bool {
        matches!(self, Role::NorthEast | Role::SouthEast)
    }

    fn is_south(self) -> bool {
        matches!(self, Role::SouthWest | Role::SouthEast)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Axis {
    /// West and east tiles side by side
    Horizontal,
    /// North and south tiles stacked
    Vertical,
}

/// How many distinct tiles the corners resolve to, and how they are arranged
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Degeneracy {
    Single,
    Adjacent(Axis),
    Quad,
}

impl Degeneracy {
    pub fn columns(&self) -> u32 {
        match self {
            Degeneracy::Single | Degeneracy::Adjacent(Axis::Vertical) => 1,
            Degeneracy::Adjacent(Axis::Horizontal) | Degeneracy::Quad => 2,
        }
    }

    pub fn rows(&self) -> u32 {
        match self {
            Degeneracy::Single | Degeneracy::Adjacent(Axis::Horizontal) => 1,
            Degeneracy::Adjacent(Axis::Vertical) | Degeneracy::Quad => 2,
        }
    }

    pub fn distinct_tiles(&self) -> usize {
        (self.columns() * self.rows()) as usize
    }

    /// Composite (width, height) in pixels
    pub fn composite_size(&self, tile_size: u32) -> (usize, usize) {
        (
            (self.columns() * tile_size) as usize,
            (self.rows() * tile_size) as usize,
        )
    }

    /// Composite cell (col, row) a role is drawn into. Roles that duplicate
    /// another collapse onto that role's cell.
    pub fn cell(&self, role: Role) -> (u32, u32) {
        let col = u32::from(role.is_east() && self.columns() == 2);
        let row = u32::from(role.is_south() && self.rows() == 2);
        (col, row)
    }
}

/// The tile under each corner of a bounding box
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuadrantAssignment {
    tiles: [TileIndex; 4],
}

impl QuadrantAssignment {
    /// Tiles in `Role::ALL` order
    pub fn new(tiles: [TileIndex; 4]) -> Self {
        Self { tiles }
    }

    pub fn from_bbox(bbox: &BoundingBox, zoom: u8) -> Result<Self> {
        Ok(Self::new([
            TileIndex::from_point(bbox.north_west(), zoom)?,
            TileIndex::from_point(bbox.north_east(), zoom)?,
            TileIndex::from_point(bbox.south_west(), zoom)?,
            TileIndex::from_point(bbox.south_east(), zoom)?,
        ]))
    }

    pub fn tile(&self, role: Role) -> TileIndex {
        self.tiles[role.index()]
    }

    /// Earliest role holding the same tile as `role`, if any
    pub fn duplicate_of(&self, role: Role) -> Option<Role> {
        let tile = self.tile(role);
        Role::ALL[..role.index()]
            .iter()
            .copied()
            .find(|&earlier| self.tile(earlier) == tile)
    }

    /// Classify the corner tiles. Fails when they do not form a 1x1, 1x2,
    /// 2x1 or 2x2 block of neighbouring tiles.
    pub fn degeneracy(&self) -> Result<Degeneracy> {
        let nw = self.tile(Role::NorthWest);
        let ne = self.tile(Role::NorthEast);
        let sw = self.tile(Role::SouthWest);
        let se = self.tile(Role::SouthEast);

        let same_zoom = self.tiles.iter().all(|t| t.zoom == nw.zoom);
        let aligned = nw.y == ne.y && sw.y == se.y && nw.x == sw.x && ne.x == se.x;
        let adjacent = matches!(ne.x.checked_sub(nw.x), Some(0 | 1))
            && matches!(sw.y.checked_sub(nw.y), Some(0 | 1));
        if !(same_zoom && aligned && adjacent) {
            return Err(ChipError::Composition(format!(
                "corner tiles {} {} {} {} are not a block of at most 2x2 neighbours",
                nw, ne, sw, se
            )));
        }

        Ok(match (nw != ne, nw != sw) {
            (false, false) => Degeneracy::Single,
            (true, false) => Degeneracy::Adjacent(Axis::Horizontal),
            (false, true) => Degeneracy::Adjacent(Axis::Vertical),
            (true, true) => Degeneracy::Quad,
        })
    }

    /// Composite cell (col, row) occupied by `tile`, if it is one of the corners
    pub fn cell_of(&self, tile: TileIndex) -> Option<(u32, u32)> {
        let nw = self.tile(Role::NorthWest);
        let se = self.tile(Role::SouthEast);
        let inside = tile.zoom == nw.zoom
            && (nw.x..=se.x).contains(&tile.x)
            && (nw.y..=se.y).contains(&tile.y);
        inside.then(|| (tile.x - nw.x, tile.y - nw.y))
    }
}

/// Raster slot for one role of the composite
#[derive(Debug, Clone, PartialEq)]
pub enum RoleRaster {
    Fetched(Raster),
    /// Same tile as an earlier role; not fetched again
    DuplicateOf(Role),
}

/// Assemble the composite for `quadrants` from the per-role rasters, given in
/// `Role::ALL` order.
///
/// Every distinct tile is fetched exactly once and drawn into its own cell.
/// Duplicate roles collapse onto the cell of the role they repeat, so skipping
/// them leaves no blank area in the composite.
pub fn stitch(
    quadrants: &QuadrantAssignment,
    rasters: [RoleRaster; 4],
    tile_size: u32,
) -> Result<Raster> {
    let degeneracy = quadrants.degeneracy()?;
    let (width, height) = degeneracy.composite_size(tile_size);
    let mut composite = Raster::zeroed(width, height);

    for (role, slot) in Role::ALL.into_iter().zip(rasters) {
        match (slot, quadrants.duplicate_of(role)) {
            (RoleRaster::Fetched(raster), None) => {
                if raster.width != tile_size as usize || raster.height != tile_size as usize {
                    return Err(ChipError::Composition(format!(
                        "{:?} tile {} is {}x{}, expected {}x{}",
                        role,
                        quadrants.tile(role),
                        raster.width,
                        raster.height,
                        tile_size,
                        tile_size
                    )));
                }
                let (col, row) = degeneracy.cell(role);
                composite.paste(
                    &raster,
                    (col * tile_size) as usize,
                    (row * tile_size) as usize,
                );
            }
            (RoleRaster::DuplicateOf(original), Some(expected)) if original == expected => {
                debug!("skipping {:?}: same tile as {:?}", role, original);
            }
            (slot, expected) => {
                return Err(ChipError::Composition(format!(
                    "{:?} slot {} does not match corner layout (duplicate of {:?})",
                    role,
                    match slot {
                        RoleRaster::Fetched(_) => "is fetched".to_string(),
                        RoleRaster::DuplicateOf(r) => format!("claims duplicate of {:?}", r),
                    },
                    expected
                )));
            }
        }
    }

    Ok(composite)
}
