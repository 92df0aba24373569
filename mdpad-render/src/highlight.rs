//! Fenced code block highlighting with syntect.
//!
//! Output uses CSS classes (prefix `hl-`) rather than inline colors so
//! the same HTML works under the light and dark stylesheets.

use std::panic::{self, AssertUnwindSafe};

use syntect::highlighting::ThemeSet;
use syntect::html::{css_for_theme_with_class_style, ClassStyle, ClassedHTMLGenerator};
use syntect::parsing::{SyntaxReference, SyntaxSet};
use syntect::util::LinesWithEndings;

/// Class style shared by the highlighter and the stylesheets.
pub const CLASS_STYLE: ClassStyle = ClassStyle::SpacedPrefixed { prefix: "hl-" };

pub struct Highlighter {
    syntaxes: SyntaxSet,
}

impl Default for Highlighter {
    fn default() -> Self {
        Self::new()
    }
}

impl Highlighter {
    pub fn new() -> Self {
        Self {
            syntaxes: SyntaxSet::load_defaults_newlines(),
        }
    }

    /// Map a fence tag to a syntax, trying common aliases.
    pub fn resolve(&self, lang: &str) -> Option<&SyntaxReference> {
        let lang = lang.trim();
        if lang.is_empty() {
            return None;
        }
        let token = match lang.to_ascii_lowercase().as_str() {
            "sh" | "shell" | "zsh" => "bash".to_string(),
            "py" | "python3" => "python".to_string(),
            "rs" => "rust".to_string(),
            "yml" => "yaml".to_string(),
            "c++" => "cpp".to_string(),
            "golang" => "go".to_string(),
            other => other.to_string(),
        };
        self.syntaxes.find_syntax_by_token(&token)
    }

    /// Highlight `code` as `lang`.
    ///
    /// `None` when the language is unknown or highlighting fails; the
    /// caller falls back to plain escaping for that block.
    pub fn highlight(&self, lang: &str, code: &str) -> Option<String> {
        let syntax = self.resolve(lang)?;
        let result = panic::catch_unwind(AssertUnwindSafe(|| {
            let mut generator =
                ClassedHTMLGenerator::new_with_class_style(syntax, &self.syntaxes, CLASS_STYLE);
            for line in LinesWithEndings::from(code) {
                generator.parse_html_for_line_which_includes_newline(line)?;
            }
            Ok::<_, syntect::Error>(generator.finalize())
        }));

        match result {
            Ok(Ok(html)) => Some(html),
            Ok(Err(e)) => {
                log::debug!("Highlighting {lang} failed, using plain block: {e}");
                None
            }
            Err(_) => {
                log::debug!("Highlighter panicked on {lang}, using plain block");
                None
            }
        }
    }
}

/// CSS for the highlight classes under the named syntect theme.
pub fn stylesheet(theme_name: &str) -> Option<String> {
    let themes = ThemeSet::load_defaults();
    let theme = themes.themes.get(theme_name)?;
    match css_for_theme_with_class_style(theme, CLASS_STYLE) {
        Ok(css) => Some(css),
        Err(e) => {
            log::warn!("Could not build stylesheet for {theme_name}: {e}");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_language_highlights() {
        let hl = Highlighter::new();
        let html = hl.highlight("rust", "fn main() {}\n").unwrap();
        assert!(html.contains("hl-"));
        assert!(html.contains("main"));
    }

    #[test]
    fn test_aliases() {
        let hl = Highlighter::new();
        assert!(hl.resolve("py").is_some());
        assert!(hl.resolve("JS").is_some());
        assert!(hl.resolve("sh").is_some());
    }

    #[test]
    fn test_unknown_language_falls_back() {
        let hl = Highlighter::new();
        assert!(hl.resolve("no-such-lang").is_none());
        assert!(hl.highlight("no-such-lang", "x").is_none());
        assert!(hl.highlight("", "x").is_none());
    }

    #[test]
    fn test_highlight_escapes_markup() {
        let hl = Highlighter::new();
        let html = hl.highlight("html", "<script>alert(1)</script>\n").unwrap();
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;"));
    }

    #[test]
    fn test_stylesheets() {
        let css = stylesheet("InspiredGitHub").unwrap();
        assert!(css.contains(".hl-"));
        assert!(stylesheet("no-such-theme").is_none());
    }
}
