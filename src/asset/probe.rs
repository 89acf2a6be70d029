//! Pixel dimensions of images and videos.

use std::path::Path;
use std::sync::OnceLock;

use regex::Regex;

/// Dimensions of a raster image, `None` if unreadable.
pub fn image_size(path: &Path) -> Option<(u32, u32)> {
    image::image_dimensions(path).ok()
}

/// Parse `WxH` from the `Stream ... Video ...` line ffmpeg prints for `-i`.
pub fn parse_video_size(ffmpeg_stderr: &str) -> Option<(u32, u32)> {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| Regex::new(r"Stream.*Video.*, (\d+)x(\d+)").expect("valid regex"));
    let caps = re.captures(ffmpeg_stderr)?;
    Some((caps[1].parse().ok()?, caps[2].parse().ok()?))
}

/// Apply a figure `scale` to dimensions, truncating like integer pixels.
pub fn scaled((width, height): (u32, u32), scale: f64) -> (u32, u32) {
    ((width as f64 * scale) as u32, (height as f64 * scale) as u32)
}
