//! Sandbox backed by an HTML file on disk, opened in a browser by the user.

use ex33_core::{Ex33Error, Ex33Result, Sandbox};
use std::fs;
use std::path::{Path, PathBuf};

/// Rewrites one HTML file per reload.
///
/// The instrumentation posts to `window.parent`, which a directly opened file
/// does not have, so console output and runtime errors never reach the
/// [`MessageBridge`](crate::MessageBridge). A host that embeds the document in
/// a frame or webview forwards those posts with `MessageBridge::post`.
#[derive(Debug, Clone)]
pub struct FileSandbox {
    path: PathBuf,
}

impl FileSandbox {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Sandbox for FileSandbox {
    /// Writes next to the target and renames, so a reader never sees a half-written document.
    fn load(&mut self, document: &str) -> Ex33Result<()> {
        let sandbox_err = |e: std::io::Error| {
            Ex33Error::Sandbox(format!("{}: {}", self.path.display(), e))
        };
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(sandbox_err)?;
            }
        }
        let tmp = self.path.with_extension("html.tmp");
        fs::write(&tmp, document).map_err(sandbox_err)?;
        fs::rename(&tmp, &self.path).map_err(sandbox_err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn replaces_whole_document() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("preview").join("index.html");
        let mut sandbox = FileSandbox::new(&path);

        sandbox.load("<p>first</p>").unwrap();
        sandbox.load("<p>second</p>").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "<p>second</p>");
    }

    #[test]
    fn unwritable_target_is_a_sandbox_error() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("file");
        fs::write(&blocker, "x").unwrap();
        let mut sandbox = FileSandbox::new(blocker.join("index.html"));
        assert!(matches!(sandbox.load("<p/>"), Err(Ex33Error::Sandbox(_))));
    }
}
