// Error types for chip extraction
use crate::tile::TileIndex;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ChipError>;

/// Broad class of a failure, for callers that only care which stage broke
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Geometry,
    TileFetch,
    Composition,
}

#[derive(Debug, Error)]
pub enum ChipError {
    /// Input coordinates, radius or zoom cannot produce a valid chip
    #[error("invalid geometry: {0}")]
    Geometry(String),

    /// The tile source failed for a tile the chip needs
    #[error("failed to fetch tile {tile}: {reason}")]
    TileFetch { tile: TileIndex, reason: String },

    /// The tile source could not be set up at all
    #[error("tile source unavailable: {0}")]
    Source(String),

    /// Corner tiles do not form a 1x1, 1x2, 2x1 or 2x2 grid
    #[error("cannot compose tiles: {0}")]
    Composition(String),
}

impl ChipError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ChipError::Geometry(_) => ErrorKind::Geometry,
            ChipError::TileFetch { .. } | ChipError::Source(_) => ErrorKind::TileFetch,
            ChipError::Composition(_) => ErrorKind::Composition,
        }
    }

    pub(crate) fn fetch(tile: TileIndex, reason: impl ToString) -> Self {
        ChipError::TileFetch {
            tile,
            reason: reason.to_string(),
        }
    }
}
