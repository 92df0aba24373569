//! Debouncer + renderer + surface.
//!
//! The pipeline samples every buffer change with [`RenderPipeline::input`]
//! but only runs the transformation when the debouncer releases a value.
//! The surface is replaced wholesale on success and left untouched on
//! failure.

use std::time::{Duration, Instant};

use crate::debounce::Debouncer;
use crate::markdown::{MarkdownRenderer, RenderError, Transform};

// ─── Configuration ───────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderConfig {
    /// Quiet period before a render.
    pub wait: Duration,
    /// Longest a pending change may wait while input keeps arriving.
    pub max_wait: Duration,
    /// syntect theme for the light preview stylesheet.
    pub light_theme: String,
    /// syntect theme for the dark preview stylesheet.
    pub dark_theme: String,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            wait: Duration::from_millis(100),
            max_wait: Duration::from_millis(1000),
            light_theme: "InspiredGitHub".to_string(),
            dark_theme: "base16-ocean.dark".to_string(),
        }
    }
}

impl RenderConfig {
    pub fn theme(&self, dark: bool) -> &str {
        if dark {
            &self.dark_theme
        } else {
            &self.light_theme
        }
    }
}

// ─── Surface ─────────────────────────────────────────────────────────

/// The rendered preview. Only successful renders replace its contents.
#[derive(Debug, Default, Clone)]
pub struct RenderSurface {
    html: String,
    renders: u64,
    failures: u64,
}

impl RenderSurface {
    pub fn html(&self) -> &str {
        &self.html
    }

    /// Number of successful renders applied.
    pub fn renders(&self) -> u64 {
        self.renders
    }

    pub fn failures(&self) -> u64 {
        self.failures
    }

    /// Apply a render result. Returns `true` if the contents were replaced.
    pub fn apply(&mut self, result: Result<String, RenderError>) -> bool {
        match result {
            Ok(html) => {
                self.html = html;
                self.renders += 1;
                true
            }
            Err(e) => {
                self.failures += 1;
                log::warn!("Render failed, keeping previous preview: {e}");
                false
            }
        }
    }
}

// ─── Pipeline ────────────────────────────────────────────────────────

pub struct RenderPipeline<R: Transform = MarkdownRenderer> {
    renderer: R,
    debouncer: Debouncer<String>,
    surface: RenderSurface,
}

impl RenderPipeline<MarkdownRenderer> {
    pub fn new(config: &RenderConfig) -> Self {
        Self::with_renderer(MarkdownRenderer::new(), config)
    }
}

impl<R: Transform> RenderPipeline<R> {
    pub fn with_renderer(renderer: R, config: &RenderConfig) -> Self {
        Self {
            renderer,
            debouncer: Debouncer::new(config.wait, Some(config.max_wait)),
            surface: RenderSurface::default(),
        }
    }

    /// Sample the buffer text. Supersedes any input not yet rendered.
    pub fn input(&mut self, text: impl Into<String>, now: Instant) {
        self.debouncer.push(text.into(), now);
    }

    /// When the next render is due, if an input is pending.
    pub fn deadline(&self) -> Option<Instant> {
        self.debouncer.deadline()
    }

    /// Render if the pending input is due. Returns `true` if the surface
    /// changed.
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.debouncer.poll(now) {
            Some(text) => self.render(&text),
            None => false,
        }
    }

    /// Render the pending input immediately.
    pub fn flush(&mut self) -> bool {
        match self.debouncer.flush() {
            Some(text) => self.render(&text),
            None => false,
        }
    }

    /// Drop the pending input. Used when the session is torn down.
    pub fn cancel(&mut self) {
        self.debouncer.cancel();
    }

    pub fn is_pending(&self) -> bool {
        self.debouncer.is_pending()
    }

    pub fn surface(&self) -> &RenderSurface {
        &self.surface
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    fn render(&mut self, text: &str) -> bool {
        let result = self.renderer.render(text);
        self.surface.apply(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::{Cell, RefCell};

    /// Echoes its input and records every call. Fails on "boom".
    #[derive(Default)]
    struct Recorder {
        calls: RefCell<Vec<String>>,
        count: Cell<usize>,
    }

    impl Transform for Recorder {
        fn render(&self, markdown: &str) -> Result<String, RenderError> {
            self.count.set(self.count.get() + 1);
            self.calls.borrow_mut().push(markdown.to_string());
            if markdown == "boom" {
                Err(RenderError::Panicked("boom".into()))
            } else {
                Ok(format!("<p>{markdown}</p>"))
            }
        }
    }

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn test_default_config() {
        let config = RenderConfig::default();
        assert_eq!(config.wait, ms(100));
        assert_eq!(config.max_wait, ms(1000));
        assert_eq!(config.theme(false), "InspiredGitHub");
        assert_eq!(config.theme(true), "base16-ocean.dark");
    }

    #[test]
    fn test_burst_renders_once_with_last_value() {
        let t0 = Instant::now();
        let mut p = RenderPipeline::with_renderer(Recorder::default(), &RenderConfig::default());
        p.input("a", t0);
        p.input("ab", t0 + ms(20));
        p.input("abc", t0 + ms(40));
        assert!(!p.poll(t0 + ms(90)));
        assert!(p.poll(t0 + ms(140)));
        assert!(!p.poll(t0 + ms(500)));

        assert_eq!(p.renderer().count.get(), 1);
        assert_eq!(*p.renderer().calls.borrow(), vec!["abc".to_string()]);
        assert_eq!(p.surface().html(), "<p>abc</p>");
    }

    #[test]
    fn test_failure_keeps_previous_output() {
        let t0 = Instant::now();
        let mut p = RenderPipeline::with_renderer(Recorder::default(), &RenderConfig::default());
        p.input("ok", t0);
        assert!(p.flush());
        p.input("boom", t0 + ms(10));
        assert!(!p.flush());

        assert_eq!(p.surface().html(), "<p>ok</p>");
        assert_eq!(p.surface().renders(), 1);
        assert_eq!(p.surface().failures(), 1);

        // Later input recovers.
        p.input("again", t0 + ms(20));
        assert!(p.flush());
        assert_eq!(p.surface().html(), "<p>again</p>");
    }

    #[test]
    fn test_cancel_discards_pending() {
        let t0 = Instant::now();
        let mut p = RenderPipeline::with_renderer(Recorder::default(), &RenderConfig::default());
        p.input("x", t0);
        p.cancel();
        assert!(!p.is_pending());
        assert_eq!(p.deadline(), None);
        assert!(!p.poll(t0 + ms(2000)));
        assert_eq!(p.renderer().count.get(), 0);
    }

    #[test]
    fn test_real_renderer() {
        let mut p = RenderPipeline::new(&RenderConfig::default());
        p.input("# Hello", Instant::now());
        assert!(p.flush());
        assert!(p.surface().html().contains("<h1>Hello</h1>"));
    }
}
