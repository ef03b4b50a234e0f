//! Screenshot of the framed preview. Capture is best-effort: a cross-origin
//! sandbox may refuse to be read, in which case there is simply no image.

use ex33_core::{DeviceId, Ex33Result};
use std::fs;
use std::path::{Path, PathBuf};

pub trait FrameCapture: Send + Sync {
    /// PNG bytes of the device frame as currently shown, if it can be read.
    fn capture_visible_frame(&self) -> Option<Vec<u8>>;
}

pub fn screenshot_file_name(device: DeviceId, unix_ms: i64) -> String {
    format!("Ex33_Pro_Shot_{}_{}.png", device, unix_ms)
}

/// Writes `png` into `dir` under the standard screenshot name.
pub fn save_png(dir: &Path, device: DeviceId, unix_ms: i64, png: &[u8]) -> Ex33Result<PathBuf> {
    fs::create_dir_all(dir)?;
    let path = dir.join(screenshot_file_name(device, unix_ms));
    fs::write(&path, png)?;
    Ok(path)
}
