//! System clipboard access. Every call can fail (no display, permission
//! denied); callers turn failures into log entries.

use ex33_core::{Ex33Error, Ex33Result};
use std::borrow::Cow;
use std::sync::Mutex;

pub trait ClipboardPort: Send + Sync {
    fn read_text(&self) -> Ex33Result<String>;
    fn write_text(&self, text: &str) -> Ex33Result<()>;
    /// `png` is an encoded PNG image.
    fn write_image(&self, png: &[u8]) -> Ex33Result<()>;
}

/// Clipboard of the desktop session, via `arboard`.
pub struct SystemClipboard {
    inner: Mutex<arboard::Clipboard>,
}

impl SystemClipboard {
    pub fn new() -> Ex33Result<Self> {
        let inner = arboard::Clipboard::new().map_err(clipboard_err)?;
        Ok(Self {
            inner: Mutex::new(inner),
        })
    }

    fn with<T>(
        &self,
        f: impl FnOnce(&mut arboard::Clipboard) -> Result<T, arboard::Error>,
    ) -> Ex33Result<T> {
        let mut clipboard = self
            .inner
            .lock()
            .map_err(|e| Ex33Error::Clipboard(e.to_string()))?;
        f(&mut clipboard).map_err(clipboard_err)
    }
}

fn clipboard_err(err: arboard::Error) -> Ex33Error {
    Ex33Error::Clipboard(err.to_string())
}

impl ClipboardPort for SystemClipboard {
    fn read_text(&self) -> Ex33Result<String> {
        self.with(|c| c.get_text())
    }

    fn write_text(&self, text: &str) -> Ex33Result<()> {
        self.with(|c| c.set_text(text.to_string()))
    }

    fn write_image(&self, png: &[u8]) -> Ex33Result<()> {
        let rgba = image::load_from_memory_with_format(png, image::ImageFormat::Png)
            .map_err(|e| Ex33Error::Capture(e.to_string()))?
            .to_rgba8();
        let (width, height) = rgba.dimensions();
        let data = arboard::ImageData {
            width: width as usize,
            height: height as usize,
            bytes: Cow::Owned(rgba.into_raw()),
        };
        self.with(|c| c.set_image(data))
    }
}
