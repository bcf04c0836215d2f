// Blocking HTTP tile downloader
use crate::config::ExtractorConfig;
use crate::error::{ChipError, Result};
use crate::source::TileSource;
use crate::tile::{Raster, TileIndex};
use reqwest::blocking::Client;
use reqwest::StatusCode;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Outcome of a single tile request
#[derive(Debug)]
pub enum DownloadResult {
    Success(Raster),
    Missing(TileIndex),
    Error(TileIndex, String),
}

impl From<DownloadResult> for Result<Option<Raster>> {
    fn from(result: DownloadResult) -> Self {
        match result {
            DownloadResult::Success(raster) => Ok(Some(raster)),
            DownloadResult::Missing(_) => Ok(None),
            DownloadResult::Error(tile, reason) => Err(ChipError::fetch(tile, reason)),
        }
    }
}

/// Fetches tiles from a URL template, one request at a time, keeping at least
/// `request_delay` between consecutive requests.
pub struct TileDownloader {
    client: Client,
    url_template: String,
    tile_size: u32,
    request_delay: Duration,
    last_request: Option<Instant>,
}

impl TileDownloader {
    pub fn new(config: &ExtractorConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| ChipError::Source(format!("cannot build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            url_template: config.url_template.clone(),
            tile_size: config.tile_size,
            request_delay: config.request_delay(),
            last_request: None,
        })
    }

    /// URL for a tile
    pub fn tile_url(&self, tile: TileIndex) -> String {
        format_tile_url(&self.url_template, tile)
    }

    /// Download a single tile
    pub fn download_tile(&mut self, tile: TileIndex) -> DownloadResult {
        self.throttle();
        let url = self.tile_url(tile);
        debug!("GET {}", url);

        let response = match self.client.get(&url).send() {
            Ok(response) => response,
            Err(e) => return DownloadResult::Error(tile, e.to_string()),
        };

        let status = response.status();
        if status == StatusCode::NOT_FOUND || status == StatusCode::NO_CONTENT {
            return DownloadResult::Missing(tile);
        }
        if !status.is_success() {
            return DownloadResult::Error(tile, format!("HTTP {}", status));
        }

        let body = match response.bytes() {
            Ok(body) => body,
            Err(e) => return DownloadResult::Error(tile, e.to_string()),
        };
        let raster = match image::load_from_memory(&body) {
            Ok(image) => Raster::from_image(image),
            Err(e) => return DownloadResult::Error(tile, format!("cannot decode image: {}", e)),
        };

        let size = self.tile_size as usize;
        if raster.width != size || raster.height != size {
            return DownloadResult::Error(
                tile,
                format!(
                    "tile is {}x{}, expected {}x{}",
                    raster.width, raster.height, size, size
                ),
            );
        }
        DownloadResult::Success(raster)
    }

    fn throttle(&mut self) {
        if let Some(last) = self.last_request {
            let wait = remaining_delay(last.elapsed(), self.request_delay);
            if !wait.is_zero() {
                std::thread::sleep(wait);
            }
        }
        self.last_request = Some(Instant::now());
    }
}

impl TileSource for TileDownloader {
    fn tile_size(&self) -> u32 {
        self.tile_size
    }

    fn fetch(&mut self, tile: TileIndex) -> Result<Option<Raster>> {
        let result = self.download_tile(tile);
        if let DownloadResult::Missing(tile) = &result {
            warn!("no data for tile {}", tile);
        }
        result.into()
    }
}

fn format_tile_url(template: &str, tile: TileIndex) -> String {
    template
        .replace("{z}", &tile.zoom.to_string())
        .replace("{x}", &tile.x.to_string())
        .replace("{y}", &tile.y.to_string())
}

fn remaining_delay(elapsed: Duration, delay: Duration) -> Duration {
    delay.saturating_sub(elapsed)
}
