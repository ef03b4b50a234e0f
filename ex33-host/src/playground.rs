//! The playground session: owns the source text and wires the core engine to
//! storage, the sandbox, the message bridge and the external collaborators.
//!
//! Nothing here returns an error to the UI. User-input no-ops are silent and
//! collaborator failures end up as a single `error` entry in the log feed.

use chrono::Utc;
use ex33_core::{
    beautify, mutate, CodeStats, DeviceId, DeviceProfile, EditorBuffer, EditorCommands,
    Ex33Result, Extraction, GridOverlay, LogEntry, LogFeed, LogLevel, PreviewRenderer, Sandbox,
    Ticket, Viewport, Zoom,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::broadcast;

use crate::analysis::{CodeIssue, PerformanceAnalyzer, PerformanceReport};
use crate::bridge::{self, MessageBridge};
use crate::capture::{self, FrameCapture};
use crate::clipboard::ClipboardPort;
use crate::store::{KeyValueStore, Preferences};

pub struct Playground<S: Sandbox> {
    code: String,
    dark_mode: bool,
    store: Arc<dyn KeyValueStore>,
    renderer: PreviewRenderer<S>,
    editor: EditorBuffer,
    logs: LogFeed,
    bridge: MessageBridge,
    bridge_rx: broadcast::Receiver<LogEntry>,
    device: DeviceId,
    zoom: Zoom,
    viewport: Viewport,
    grid: GridOverlay,
}

impl<S: Sandbox> Playground<S> {
    /// Restores the saved snippet (or the default) and renders it right away.
    pub fn open(store: Arc<dyn KeyValueStore>, sandbox: S) -> Self {
        let prefs = Preferences::load_or_default(store.as_ref());
        let bridge = MessageBridge::new();
        let bridge_rx = bridge.subscribe();
        let mut playground = Self {
            editor: EditorBuffer::new(prefs.code.clone()),
            code: prefs.code,
            dark_mode: prefs.dark_mode,
            store,
            renderer: PreviewRenderer::new(sandbox),
            logs: LogFeed::new(),
            bridge,
            bridge_rx,
            device: DeviceId::default(),
            zoom: Zoom::default(),
            viewport: Viewport::default(),
            grid: GridOverlay::default(),
        };
        tracing::info!(bytes = playground.code.len(), "playground opened");
        playground.run();
        playground
    }

    // --- source text ---

    pub fn code(&self) -> &str {
        &self.code
    }

    /// Adopts new source text: persist, then schedule a debounced reload.
    /// Returns the reload ticket, or `None` if the text did not change.
    pub fn set_text(&mut self, text: impl Into<String>, now: Instant) -> Option<Ticket> {
        let text = text.into();
        if text == self.code {
            return None;
        }
        self.code = text;
        self.editor.set_text(self.code.clone());
        if let Err(e) = Preferences::save_code(self.store.as_ref(), &self.code) {
            tracing::warn!(error = %e, "failed to persist snippet");
            self.log(LogLevel::Error, format!("Could not save code: {}", e));
        }
        Some(self.renderer.source_changed(&self.code, now))
    }

    pub fn replace_all(&mut self, find: &str, replace: &str, now: Instant) -> Option<Ticket> {
        let next = mutate::replace_all_literal(&self.code, find, replace);
        self.set_text(next, now)
    }

    pub fn replace_instance(
        &mut self,
        old_val: &str,
        new_val: &str,
        now: Instant,
    ) -> Option<Ticket> {
        let next = mutate::replace_occurrence(&self.code, old_val, new_val);
        self.set_text(next, now)
    }

    pub fn remove_emoji(&mut self, emoji: &str, now: Instant) -> Option<Ticket> {
        let next = mutate::remove_occurrence(&self.code, emoji);
        self.set_text(next, now)
    }

    pub fn remove_media(&mut self, url: &str, now: Instant) -> Option<Ticket> {
        match mutate::remove_media(&self.code, url) {
            Ok(next) => self.set_text(next, now),
            Err(e) => {
                self.log(LogLevel::Error, format!("Could not remove media: {}", e));
                None
            }
        }
    }

    pub fn beautify(&mut self, now: Instant) -> Option<Ticket> {
        let next = beautify(&self.code);
        self.set_text(next, now)
    }

    pub fn clear(&mut self, now: Instant) -> Option<Ticket> {
        let ticket = self.set_text(String::new(), now);
        if ticket.is_some() {
            self.log(LogLevel::Info, "Editor cleared");
        }
        ticket
    }

    pub fn extraction(&self) -> Extraction {
        Extraction::from_text(&self.code)
    }

    pub fn stats(&self) -> CodeStats {
        CodeStats::from_text(&self.code)
    }

    // --- editor commands ---

    pub fn focus_text(&mut self, text: &str) -> bool {
        self.editor.focus_and_select(text)
    }

    pub fn select_all(&mut self) {
        self.editor.select_all();
    }

    pub fn editor(&self) -> &EditorBuffer {
        &self.editor
    }

    // --- preview ---

    /// "Run": reload now instead of waiting for the debounce.
    pub fn run(&mut self) {
        if let Err(e) = self.renderer.reload_now(&self.code) {
            self.log(LogLevel::Error, format!("Preview failed: {}", e));
        }
    }

    /// Drives the debounce and drains sandbox messages. Call on every loop turn.
    pub fn tick(&mut self, now: Instant) -> bool {
        let reloaded = match self.renderer.tick(now) {
            Ok(reloaded) => reloaded,
            Err(e) => {
                self.log(LogLevel::Error, format!("Preview failed: {}", e));
                false
            }
        };
        self.pump_bridge();
        reloaded
    }

    /// Timer-driven reload for a specific ticket; stale tickets do nothing.
    pub fn fire(&mut self, ticket: Ticket) -> bool {
        match self.renderer.fire(ticket) {
            Ok(reloaded) => reloaded,
            Err(e) => {
                self.log(LogLevel::Error, format!("Preview failed: {}", e));
                false
            }
        }
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.renderer.next_deadline()
    }

    pub fn reload_count(&self) -> u64 {
        self.renderer.reload_count()
    }

    pub fn sandbox(&self) -> &S {
        self.renderer.sandbox()
    }

    /// Handle the sandbox transport posts raw messages into.
    pub fn bridge(&self) -> MessageBridge {
        self.bridge.clone()
    }

    fn pump_bridge(&mut self) {
        let logs = &mut self.logs;
        bridge::drain(&mut self.bridge_rx, |entry| logs.push(entry));
    }

    // --- device frame ---

    pub fn select_device(&mut self, device: DeviceId) {
        self.device = device;
        self.run();
    }

    pub fn device(&self) -> DeviceId {
        self.device
    }

    pub fn profile(&self) -> &'static DeviceProfile {
        self.device.profile()
    }

    pub fn zoom_in(&mut self) -> Zoom {
        self.zoom = self.zoom.zoom_in();
        self.zoom
    }

    pub fn zoom_out(&mut self) -> Zoom {
        self.zoom = self.zoom.zoom_out();
        self.zoom
    }

    pub fn set_zoom(&mut self, zoom: Zoom) {
        self.zoom = zoom;
    }

    pub fn zoom(&self) -> Zoom {
        self.zoom
    }

    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    pub fn scale(&self) -> f64 {
        self.profile().scale_for(self.viewport, self.zoom)
    }

    pub fn toggle_grid(&mut self) -> bool {
        self.grid.toggle()
    }

    /// Grid widths outside the catalog are ignored.
    pub fn select_grid(&mut self, size: u32) -> bool {
        self.grid.select(size)
    }

    pub fn set_grid(&mut self, grid: GridOverlay) {
        if GridOverlay::is_known_size(grid.size) {
            self.grid = grid;
        } else {
            self.grid.active = grid.active;
        }
    }

    pub fn grid(&self) -> GridOverlay {
        self.grid
    }

    // --- preferences ---

    pub fn dark_mode(&self) -> bool {
        self.dark_mode
    }

    pub fn toggle_dark_mode(&mut self) -> bool {
        self.dark_mode = !self.dark_mode;
        if let Err(e) = Preferences::save_dark_mode(self.store.as_ref(), self.dark_mode) {
            tracing::warn!(error = %e, "failed to persist dark mode");
        }
        self.dark_mode
    }

    // --- log feed ---

    pub fn log(&mut self, level: LogLevel, message: impl Into<String>) {
        self.logs.log(level, message);
    }

    pub fn logs(&self) -> &LogFeed {
        &self.logs
    }

    // --- collaborators ---

    pub fn copy_code(&mut self, clipboard: &dyn ClipboardPort) {
        match clipboard.write_text(&self.code) {
            Ok(()) => self.log(LogLevel::Info, "Code copied to clipboard"),
            Err(e) => self.log(LogLevel::Error, format!("Could not copy code: {}", e)),
        }
    }

    pub fn paste_code(&mut self, clipboard: &dyn ClipboardPort, now: Instant) {
        match clipboard.read_text() {
            Ok(text) if text.is_empty() => {}
            Ok(text) => {
                self.set_text(text, now);
                self.log(LogLevel::Info, "Code pasted from clipboard");
            }
            Err(e) => self.log(
                LogLevel::Error,
                format!("Could not paste code (check permissions): {}", e),
            ),
        }
    }

    pub fn copy_screenshot(&mut self, capture: &dyn FrameCapture, clipboard: &dyn ClipboardPort) {
        let Some(png) = capture.capture_visible_frame() else {
            self.log(LogLevel::Error, "Could not capture the preview");
            return;
        };
        match clipboard.write_image(&png) {
            Ok(()) => self.log(LogLevel::Info, "Screenshot copied to clipboard"),
            Err(e) => self.log(LogLevel::Error, format!("Could not copy screenshot: {}", e)),
        }
    }

    pub fn save_screenshot(&mut self, capture: &dyn FrameCapture, dir: &Path) -> Option<PathBuf> {
        let Some(png) = capture.capture_visible_frame() else {
            self.log(LogLevel::Error, "Could not capture the preview");
            return None;
        };
        let saved: Ex33Result<PathBuf> =
            capture::save_png(dir, self.device, Utc::now().timestamp_millis(), &png);
        match saved {
            Ok(path) => {
                self.log(LogLevel::Event, format!("Screenshot saved to {}", path.display()));
                Some(path)
            }
            Err(e) => {
                self.log(LogLevel::Error, format!("Could not save screenshot: {}", e));
                None
            }
        }
    }

    /// Asks the model for a simulated performance report. Rendering is not
    /// blocked on this; a failure is logged and yields `None`.
    pub async fn run_analysis(
        &mut self,
        analyzer: &dyn PerformanceAnalyzer,
    ) -> Option<PerformanceReport> {
        let code = self.code.clone();
        match analyzer.analyze_performance(&code).await {
            Ok(report) => {
                self.log(
                    LogLevel::Event,
                    format!("Performance analysis finished: score {}", report.score),
                );
                Some(report)
            }
            Err(e) => {
                self.log(LogLevel::Error, format!("Performance analysis failed: {}", e));
                None
            }
        }
    }

    /// Code review; failures yield an empty list plus a log entry.
    pub async fn analyze_issues(&mut self, analyzer: &dyn PerformanceAnalyzer) -> Vec<CodeIssue> {
        let code = self.code.clone();
        match analyzer.analyze_issues(&code).await {
            Ok(issues) => issues,
            Err(e) => {
                self.log(LogLevel::Error, format!("Code analysis failed: {}", e));
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::Metrics;
    use crate::store::{MemoryStore, CODE_KEY};
    use async_trait::async_trait;
    use ex33_core::{Ex33Error, RELOAD_DEBOUNCE, DEFAULT_CODE};
    use std::sync::Mutex;
    use std::time::Duration;

    #[derive(Default)]
    struct MemorySandbox {
        documents: Vec<String>,
    }

    impl Sandbox for MemorySandbox {
        fn load(&mut self, document: &str) -> Ex33Result<()> {
            self.documents.push(document.to_string());
            Ok(())
        }
    }

    #[derive(Default)]
    struct FakeClipboard {
        text: Mutex<String>,
        image: Mutex<Option<Vec<u8>>>,
        denied: bool,
    }

    impl ClipboardPort for FakeClipboard {
        fn read_text(&self) -> Ex33Result<String> {
            if self.denied {
                return Err(Ex33Error::Clipboard("permission denied".to_string()));
            }
            Ok(self.text.lock().unwrap().clone())
        }

        fn write_text(&self, text: &str) -> Ex33Result<()> {
            if self.denied {
                return Err(Ex33Error::Clipboard("permission denied".to_string()));
            }
            *self.text.lock().unwrap() = text.to_string();
            Ok(())
        }

        fn write_image(&self, png: &[u8]) -> Ex33Result<()> {
            *self.image.lock().unwrap() = Some(png.to_vec());
            Ok(())
        }
    }

    struct FixedCapture(Option<Vec<u8>>);

    impl FrameCapture for FixedCapture {
        fn capture_visible_frame(&self) -> Option<Vec<u8>> {
            self.0.clone()
        }
    }

    struct FakeAnalyzer {
        score: Option<f64>,
    }

    #[async_trait]
    impl PerformanceAnalyzer for FakeAnalyzer {
        async fn analyze_performance(&self, _code: &str) -> Ex33Result<PerformanceReport> {
            match self.score {
                Some(score) => Ok(PerformanceReport {
                    score,
                    metrics: Metrics::default(),
                    suggestions: vec!["Compress images".to_string()],
                }),
                None => Err(Ex33Error::AnalysisTransport("timed out".to_string())),
            }
        }

        async fn analyze_issues(&self, _code: &str) -> Ex33Result<Vec<CodeIssue>> {
            Err(Ex33Error::MalformedAnalysis("expected value".to_string()))
        }
    }

    fn open() -> Playground<MemorySandbox> {
        Playground::open(Arc::new(MemoryStore::new()), MemorySandbox::default())
    }

    #[test]
    fn opens_with_default_and_renders() {
        let pg = open();
        assert_eq!(pg.code(), DEFAULT_CODE);
        assert_eq!(pg.reload_count(), 1);
        assert!(pg.sandbox().documents[0].ends_with(DEFAULT_CODE));
    }

    #[test]
    fn edits_persist_and_debounce() {
        let store = Arc::new(MemoryStore::new());
        let mut pg = Playground::open(store.clone(), MemorySandbox::default());
        let start = Instant::now();

        pg.set_text("<p>a</p>", start);
        pg.set_text("<p>ab</p>", start + Duration::from_millis(100));
        assert!(!pg.tick(start + Duration::from_millis(450)));
        assert!(pg.tick(start + Duration::from_millis(100) + RELOAD_DEBOUNCE));

        assert_eq!(store.get(CODE_KEY).as_deref(), Some("<p>ab</p>"));
        assert_eq!(pg.reload_count(), 2);
        assert!(pg.sandbox().documents[1].ends_with("<p>ab</p>"));
    }

    #[test]
    fn no_op_edits_are_silent() {
        let mut pg = open();
        let now = Instant::now();
        assert!(pg.replace_all("", "x", now).is_none());
        assert!(pg.replace_instance("🚀", "🚀", now).is_none());
        assert!(pg.replace_instance("🚀", "", now).is_none());
        assert!(pg.logs().is_empty());
        assert_eq!(pg.next_deadline(), None);
    }

    #[test]
    fn emoji_removal_updates_extraction() {
        let mut pg = open();
        let now = Instant::now();
        assert!(pg.extraction().emoji.contains(&"🚀".to_string()));
        pg.remove_emoji("🚀", now);
        assert!(!pg.extraction().emoji.contains(&"🚀".to_string()));
    }

    #[test]
    fn media_removal_drops_image() {
        let mut pg = open();
        pg.remove_media("https://picsum.photos/800/400", Instant::now());
        assert!(pg.extraction().media.is_empty());
        assert!(!pg.code().contains("<img"));
    }

    #[test]
    fn bridge_messages_reach_log_feed() {
        let mut pg = open();
        let bridge = pg.bridge();
        bridge.post(r#"{"type":"log","level":"error","message":"foo is not defined (line 1)"}"#);
        pg.tick(Instant::now());

        let latest = pg.logs().latest().unwrap();
        assert_eq!(latest.level, LogLevel::Error);
        assert_eq!(latest.message, "foo is not defined (line 1)");
    }

    #[test]
    fn device_and_zoom_drive_scale() {
        let mut pg = open();
        pg.select_device(DeviceId::Laptop);
        pg.set_viewport(Viewport::new(1920.0, 1080.0));
        let full = pg.scale();
        assert!(full < 1.0);

        pg.zoom_out();
        assert!((pg.scale() - full * 0.9).abs() < 1e-9);
    }

    #[test]
    fn clear_logs_once() {
        let mut pg = open();
        let now = Instant::now();
        assert!(pg.clear(now).is_some());
        assert!(pg.clear(now).is_none());
        assert_eq!(pg.logs().len(), 1);
        assert_eq!(pg.code(), "");
    }

    #[test]
    fn focus_text_selects_color() {
        let mut pg = open();
        assert!(pg.focus_text("#5f6368"));
        assert_eq!(pg.editor().selected_text(), Some("#5f6368"));
    }

    #[test]
    fn grid_toggles_and_rejects_unknown_widths() {
        let mut pg = open();
        assert!(!pg.grid().active);
        assert!(pg.toggle_grid());
        assert!(pg.select_grid(960));
        assert!(!pg.select_grid(1024));
        assert_eq!(
            pg.grid(),
            GridOverlay {
                active: true,
                size: 960
            }
        );

        pg.set_grid(GridOverlay {
            active: false,
            size: 777,
        });
        assert_eq!(pg.grid().size, 960);
        assert!(!pg.grid().active);
    }

    #[test]
    fn dark_mode_persists() {
        let store = Arc::new(MemoryStore::new());
        let mut pg = Playground::open(store.clone(), MemorySandbox::default());
        assert!(pg.toggle_dark_mode());

        let reopened = Playground::open(store, MemorySandbox::default());
        assert!(reopened.dark_mode());
    }

    #[test]
    fn clipboard_round_trip_and_denial() {
        let mut pg = open();
        let clipboard = FakeClipboard::default();
        *clipboard.text.lock().unwrap() = "<p>pasted</p>".to_string();

        pg.paste_code(&clipboard, Instant::now());
        assert_eq!(pg.code(), "<p>pasted</p>");

        let denied = FakeClipboard {
            denied: true,
            ..Default::default()
        };
        pg.copy_code(&denied);
        let latest = pg.logs().latest().unwrap();
        assert_eq!(latest.level, LogLevel::Error);
        assert_eq!(pg.code(), "<p>pasted</p>");
    }

    #[test]
    fn screenshots_are_best_effort() {
        let mut pg = open();
        let dir = tempfile::tempdir().unwrap();

        assert!(pg.save_screenshot(&FixedCapture(None), dir.path()).is_none());
        assert_eq!(pg.logs().latest().unwrap().level, LogLevel::Error);

        let saved = pg
            .save_screenshot(&FixedCapture(Some(b"png".to_vec())), dir.path())
            .unwrap();
        let name = saved.file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with("Ex33_Pro_Shot_desktop_"));

        let clipboard = FakeClipboard::default();
        pg.copy_screenshot(&FixedCapture(Some(b"png".to_vec())), &clipboard);
        assert_eq!(clipboard.image.lock().unwrap().as_deref(), Some(&b"png"[..]));
    }

    #[tokio::test]
    async fn analysis_failure_is_logged_not_raised() {
        let mut pg = open();
        let report = pg.run_analysis(&FakeAnalyzer { score: Some(92.0) }).await;
        assert_eq!(report.map(|r| r.score), Some(92.0));

        assert!(pg.run_analysis(&FakeAnalyzer { score: None }).await.is_none());
        assert!(pg.logs().latest().unwrap().message.contains("timed out"));

        assert!(pg.analyze_issues(&FakeAnalyzer { score: None }).await.is_empty());
        assert_eq!(pg.logs().latest().unwrap().level, LogLevel::Error);
    }
}
