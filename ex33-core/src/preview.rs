//! Builds the sandbox document for a snippet and reloads the sandbox on a
//! debounce.
//!
//! The document is the user's markup with two things spliced in: a style
//! reset and an instrumentation script that reports `console.log` and
//! uncaught errors back to the host via `postMessage`.

use crate::error::Ex33Result;
use crate::schedule::{Debouncer, Ticket, RELOAD_DEBOUNCE};
use regex::Regex;
use std::sync::OnceLock;
use std::time::{Duration, Instant};

/// Removes default body margin and keeps images inside the device width.
pub const STYLE_RESET: &str = "<style>\
body{margin:0;padding:0;min-height:100vh;}\
img{max-width:100%;height:auto;display:block;}\
*{box-sizing:border-box;}\
</style>";

/// Forwards errors and console.log to the host; disables link navigation.
pub const INSTRUMENTATION: &str = "<script>(function(){\
window.onerror=function(msg,url,line){\
window.parent.postMessage({type:'log',level:'error',message:msg+' (line '+line+')'},'*');\
};\
var origLog=console.log;\
console.log=function(){\
var args=Array.prototype.slice.call(arguments);\
window.parent.postMessage({type:'log',level:'info',message:args.join(' ')},'*');\
origLog.apply(console,args);\
};\
document.addEventListener('click',function(e){\
if(e.target&&e.target.tagName==='A')e.preventDefault();\
});\
})();</script>";

fn head_open_regex() -> &'static Regex {
    static HEAD_OPEN_REGEX: OnceLock<Regex> = OnceLock::new();
    HEAD_OPEN_REGEX.get_or_init(|| Regex::new(r"(?i)<head(?:\s[^>]*)?>").unwrap())
}

/// Splices the style reset and instrumentation into `source`.
///
/// Goes right after the first opening `<head>` tag when there is one,
/// otherwise in front of the whole snippet.
pub fn compose_document(source: &str) -> String {
    let injected_len = STYLE_RESET.len() + INSTRUMENTATION.len();
    let mut doc = String::with_capacity(source.len() + injected_len);

    match head_open_regex().find(source) {
        Some(head) => {
            doc.push_str(&source[..head.end()]);
            doc.push_str(STYLE_RESET);
            doc.push_str(INSTRUMENTATION);
            doc.push_str(&source[head.end()..]);
        }
        None => {
            doc.push_str(STYLE_RESET);
            doc.push_str(INSTRUMENTATION);
            doc.push_str(source);
        }
    }

    doc
}

/// An isolated rendering surface. `load` replaces the whole document.
pub trait Sandbox {
    fn load(&mut self, document: &str) -> Ex33Result<()>;
}

/// Debounced renderer owning one sandbox.
pub struct PreviewRenderer<S: Sandbox> {
    sandbox: S,
    pending: Debouncer<String>,
    reloads: u64,
}

impl<S: Sandbox> PreviewRenderer<S> {
    pub fn new(sandbox: S) -> Self {
        Self::with_delay(sandbox, RELOAD_DEBOUNCE)
    }

    pub fn with_delay(sandbox: S, delay: Duration) -> Self {
        Self {
            sandbox,
            pending: Debouncer::new(delay),
            reloads: 0,
        }
    }

    /// Schedules a reload with `text`, superseding any pending one.
    pub fn source_changed(&mut self, text: &str, now: Instant) -> Ticket {
        let ticket = self.pending.schedule(text.to_string(), now);
        tracing::debug!(generation = ticket.generation(), "preview reload scheduled");
        ticket
    }

    /// Performs the pending reload if it is due. Returns true if the sandbox was reloaded.
    pub fn tick(&mut self, now: Instant) -> Ex33Result<bool> {
        match self.pending.poll(now) {
            Some(text) => {
                self.reload(&text)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Timer-driven variant of [`tick`](Self::tick): reloads only if `ticket`
    /// is still the latest one.
    pub fn fire(&mut self, ticket: Ticket) -> Ex33Result<bool> {
        match self.pending.take_if_current(ticket) {
            Some(text) => {
                self.reload(&text)?;
                Ok(true)
            }
            None => {
                tracing::debug!(generation = ticket.generation(), "stale preview reload skipped");
                Ok(false)
            }
        }
    }

    /// Reloads immediately and drops whatever was pending.
    pub fn reload_now(&mut self, text: &str) -> Ex33Result<()> {
        self.pending.cancel();
        self.reload(text)
    }

    fn reload(&mut self, text: &str) -> Ex33Result<()> {
        let document = compose_document(text);
        self.sandbox.load(&document)?;
        self.reloads += 1;
        tracing::debug!(reloads = self.reloads, bytes = document.len(), "preview reloaded");
        Ok(())
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.pending.next_deadline()
    }

    pub fn reload_count(&self) -> u64 {
        self.reloads
    }

    pub fn sandbox(&self) -> &S {
        &self.sandbox
    }

    pub fn sandbox_mut(&mut self) -> &mut S {
        &mut self.sandbox
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Ex33Error;

    #[derive(Default)]
    struct RecordingSandbox {
        loads: Vec<String>,
        fail: bool,
    }

    impl Sandbox for RecordingSandbox {
        fn load(&mut self, document: &str) -> Ex33Result<()> {
            if self.fail {
                return Err(Ex33Error::Sandbox("surface gone".to_string()));
            }
            self.loads.push(document.to_string());
            Ok(())
        }
    }

    #[test]
    fn injects_after_head_tag() {
        let doc = compose_document("<html><head><title>t</title></head><body></body></html>");
        let expected = format!(
            "<html><head>{}{}<title>t</title></head><body></body></html>",
            STYLE_RESET, INSTRUMENTATION
        );
        assert_eq!(doc, expected);
    }

    #[test]
    fn head_with_attributes_and_case() {
        let doc = compose_document(r#"<HEAD lang="en"><meta charset="utf-8">"#);
        assert!(doc.starts_with(&format!(r#"<HEAD lang="en">{}"#, STYLE_RESET)));
    }

    #[test]
    fn header_tag_is_not_head() {
        let doc = compose_document("<header>x</header>");
        assert!(doc.starts_with(STYLE_RESET));
        assert!(doc.ends_with("<header>x</header>"));
    }

    #[test]
    fn prepends_without_head() {
        let doc = compose_document("<p>hi</p>");
        assert_eq!(doc, format!("{}{}<p>hi</p>", STYLE_RESET, INSTRUMENTATION));
    }

    #[test]
    fn burst_of_edits_reloads_once_with_last_text() {
        let start = Instant::now();
        let mut renderer = PreviewRenderer::new(RecordingSandbox::default());
        for (i, text) in ["<p>1</p>", "<p>12</p>", "<p>123</p>"].iter().enumerate() {
            renderer.source_changed(text, start + Duration::from_millis(100 * i as u64));
            assert!(!renderer.tick(start + Duration::from_millis(100 * i as u64 + 50)).unwrap());
        }
        assert!(renderer.tick(start + Duration::from_millis(200) + RELOAD_DEBOUNCE).unwrap());
        assert!(!renderer.tick(start + Duration::from_secs(10)).unwrap());

        assert_eq!(renderer.reload_count(), 1);
        assert!(renderer.sandbox().loads[0].ends_with("<p>123</p>"));
    }

    #[test]
    fn stale_ticket_does_not_fire() {
        let start = Instant::now();
        let mut renderer = PreviewRenderer::new(RecordingSandbox::default());
        let old = renderer.source_changed("old", start);
        let new = renderer.source_changed("new", start);

        assert!(!renderer.fire(old).unwrap());
        assert!(renderer.fire(new).unwrap());
        assert!(renderer.sandbox().loads[0].ends_with("new"));
    }

    #[test]
    fn reload_now_cancels_pending() {
        let start = Instant::now();
        let mut renderer = PreviewRenderer::new(RecordingSandbox::default());
        renderer.source_changed("typing", start);
        renderer.reload_now("run").unwrap();

        assert!(!renderer.tick(start + Duration::from_secs(1)).unwrap());
        assert_eq!(renderer.reload_count(), 1);
    }

    #[test]
    fn sandbox_failure_is_returned() {
        let sandbox = RecordingSandbox {
            fail: true,
            ..Default::default()
        };
        let mut renderer = PreviewRenderer::new(sandbox);
        assert!(matches!(renderer.reload_now("x"), Err(Ex33Error::Sandbox(_))));
        assert_eq!(renderer.reload_count(), 0);
    }
}
