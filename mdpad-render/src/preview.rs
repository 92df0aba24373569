//! Standalone preview page.
//!
//! Wraps a rendered fragment in a full HTML document with the highlight
//! stylesheet for the chosen theme. Stylesheets are generated once per
//! theme and cached for the life of the process.

use std::collections::HashMap;
use std::sync::{Mutex, OnceLock};

use crate::highlight;
use crate::pipeline::RenderConfig;

const LIGHT_PAGE: &str = "body { background: #ffffff; color: #24292e; }\n\
                          a { color: #0366d6; }\n\
                          pre { background: #f6f8fa; }\n";

const DARK_PAGE: &str = "body { background: #1a202c; color: #e2e8f0; }\n\
                         a { color: #90cdf4; }\n\
                         pre { background: #2b303b; }\n";

const BASE_PAGE: &str = "body { font-family: sans-serif; line-height: 1.6; \
                         max-width: 48rem; margin: 2rem auto; padding: 0 1rem; }\n\
                         pre { padding: 0.75rem; overflow-x: auto; border-radius: 4px; }\n\
                         table { border-collapse: collapse; }\n\
                         td, th { border: 1px solid #8884; padding: 0.25rem 0.5rem; }\n";

fn theme_stylesheet(theme: &str) -> String {
    static CACHE: OnceLock<Mutex<HashMap<String, String>>> = OnceLock::new();
    let cache = CACHE.get_or_init(|| Mutex::new(HashMap::new()));
    let mut cache = cache.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    cache
        .entry(theme.to_string())
        .or_insert_with(|| {
            highlight::stylesheet(theme).unwrap_or_else(|| {
                log::warn!("Unknown highlight theme {theme}, preview is unstyled");
                String::new()
            })
        })
        .clone()
}

/// A complete HTML page showing `html` under the light or dark theme.
pub fn preview_document(html: &str, config: &RenderConfig, dark: bool) -> String {
    let page = if dark { DARK_PAGE } else { LIGHT_PAGE };
    let syntax = theme_stylesheet(config.theme(dark));
    format!(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n\
         <title>mdpad preview</title>\n<style>\n{BASE_PAGE}{page}{syntax}</style>\n\
         </head>\n<body class=\"{}\">\n{html}\n</body>\n</html>\n",
        if dark { "dark" } else { "light" }
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wraps_fragment() {
        let doc = preview_document("<p>hi</p>", &RenderConfig::default(), false);
        assert!(doc.starts_with("<!DOCTYPE html>"));
        assert!(doc.contains("<p>hi</p>"));
        assert!(doc.contains("class=\"light\""));
        assert!(doc.contains(".hl-"));
    }

    #[test]
    fn test_dark_uses_dark_theme() {
        let config = RenderConfig::default();
        let light = preview_document("", &config, false);
        let dark = preview_document("", &config, true);
        assert!(dark.contains("class=\"dark\""));
        assert!(dark.contains(DARK_PAGE));
        assert_ne!(light, dark);
    }

    #[test]
    fn test_unknown_theme_still_renders() {
        let config = RenderConfig {
            dark_theme: "missing".into(),
            ..RenderConfig::default()
        };
        let doc = preview_document("<p>x</p>", &config, true);
        assert!(doc.contains("<p>x</p>"));
    }
}
