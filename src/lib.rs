//! Cut north-up image chips out of XYZ web-map tiles.
//!
//! Given a center point, a half-side in kilometers and a zoom level, the
//! extractor works out the geographic box around the point, finds the one,
//! two or four tiles its corners fall into, stitches them and crops the
//! stitched raster down to the box.
//!
//! ```rust,no_run
//! use tilechip::{ChipExtractor, ExtractorConfig, GeoPoint, TileDownloader};
//!
//! fn main() -> tilechip::Result<()> {
//!     let config = ExtractorConfig::planet("global_monthly_2020_01_mosaic", "API_KEY");
//!     let downloader = TileDownloader::new(&config)?;
//!     let chip = ChipExtractor::new(config).extract(GeoPoint::new(5.0, 20.0), 0.2, 15, downloader)?;
//!     chip.save("chip.png").ok();
//!     Ok(())
//! }
//! ```

pub mod composite;
pub mod config;
pub mod downloader;
pub mod earth;
pub mod error;
pub mod extractor;
pub mod geo;
pub mod pixel;
pub mod source;
pub mod tile;

pub use composite::{stitch, Axis, Degeneracy, QuadrantAssignment, Role, RoleRaster};
pub use config::ExtractorConfig;
pub use downloader::TileDownloader;
pub use earth::earth_radius_at;
pub use error::{ChipError, ErrorKind, Result};
pub use extractor::{extract_chip, ChipExtractor, ChipPlan};
pub use geo::{bounding_box, BoundingBox, GeoPoint};
pub use pixel::{crop_rectangle, point_to_pixel, CropRectangle};
pub use source::TileSource;
pub use tile::{Raster, TileIndex};
