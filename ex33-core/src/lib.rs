//! # Ex33 Playground Core
//!
//! The engine behind a live HTML/CSS/JS snippet playground with device-frame
//! previews. Everything here is synchronous and free of I/O; the host drives
//! it with a clock and a [`preview::Sandbox`] implementation.
//!
//! ## Features
//! - Content extraction: media URLs, emoji glyphs, hex color swatches
//! - Literal find/replace and escaped-pattern media removal
//! - Device catalog with viewport-fit scaling and zoom stepping
//! - Sandbox document composition with style reset and console bridge
//! - Debounced, latest-wins preview reloads
//! - Bounded log feed fed by sandbox messages
//!
//! ## Example
//! ```ignore
//! use ex33_core::{Extraction, DeviceId, Viewport, Zoom};
//!
//! let hints = Extraction::from_text(r#"<img src="https://x.com/a.png"> #1a73e8 🚀"#);
//! assert_eq!(hints.colors, vec!["#1a73e8"]);
//!
//! let scale = DeviceId::Laptop
//!     .profile()
//!     .scale_for(Viewport::new(1920.0, 1080.0), Zoom::default());
//! assert!(scale < 1.0);
//! ```

pub mod bridge;
pub mod device;
pub mod editor;
pub mod error;
pub mod extract;
pub mod mutate;
pub mod preview;
pub mod schedule;
pub mod stats;

// --- Core types ---
pub use bridge::{LogEntry, LogFeed, LogLevel, SandboxMessage, LOG_CAPACITY};
pub use device::{
    compute_scale, DeviceId, DeviceProfile, FrameStyle, GridOverlay, Viewport, Zoom, CATALOG, GRIDS,
};
pub use editor::{EditorBuffer, EditorCommands};
pub use error::{Ex33Error, Ex33Result};
pub use extract::{extract_emoji, extract_hex_colors, extract_media_urls, Extraction, MAX_COLORS};
pub use mutate::{remove_media, remove_occurrence, replace_all_literal, replace_occurrence};
pub use preview::{compose_document, PreviewRenderer, Sandbox};
pub use schedule::{Debouncer, Ticket, RELOAD_DEBOUNCE};
pub use stats::{beautify, CodeStats};

/// Snippet shown when nothing has been saved yet.
pub const DEFAULT_CODE: &str = r#"<!-- Ex33 Pro Playground -->
<div style="padding: 80px 20px; text-align: center; font-family: 'Google Sans', sans-serif;">
  <h1 style="color: #1a73e8; font-size: 48px; font-weight: 700;">Ex33 Pro 🚀</h1>
  <p style="color: #5f6368; font-size: 18px;">A live editor with an AI performance advisor and device simulator.</p>
  <img src="https://picsum.photos/800/400" style="border-radius: 24px; margin-top: 40px; width: 100%; max-width: 600px; box-shadow: 0 10px 30px rgba(0,0,0,0.1);">
  <div style="margin-top: 40px;">
    <button style="background: #1a73e8; color: white; border: none; padding: 16px 32px; border-radius: 12px; font-weight: 700; cursor: pointer;">Get started ✨</button>
  </div>
</div>"#;
