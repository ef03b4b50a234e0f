//! Ex33 playground host.
//!
//! Owns the source text for a session and connects the core engine to its
//! collaborators: key-value persistence, the sandbox document, the message
//! bridge, the clipboard, frame capture and the AI analysis service.

pub mod analysis;
pub mod bridge;
pub mod capture;
pub mod clipboard;
pub mod config;
pub mod playground;
pub mod sandbox;
pub mod store;

pub use analysis::{CodeIssue, GeminiAnalyzer, Metrics, PerformanceAnalyzer, PerformanceReport};
pub use bridge::MessageBridge;
pub use capture::FrameCapture;
pub use clipboard::{ClipboardPort, SystemClipboard};
pub use config::{AnalysisConfig, HostConfig};
pub use playground::Playground;
pub use sandbox::FileSandbox;
pub use store::{FileStore, KeyValueStore, MemoryStore, Preferences};
