//! Markdown → sanitized HTML.
//!
//! One pass over the pulldown-cmark event stream does the extensions
//! the parser has no switch for (fenced block highlighting, `:emoji:`,
//! bare links), then the HTML is run through ammonia. Raw HTML in the
//! source is passed to the sanitizer, never straight to the preview.
//!
//! A panic anywhere in the transformation is caught and reported as
//! [`RenderError::Panicked`] so the caller can keep its previous output.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use pulldown_cmark::{
    html, CodeBlockKind, CowStr, Event, LinkType, Options, Parser, Tag, TagEnd, TextMergeStream,
};
use thiserror::Error;

use crate::emoji;
use crate::highlight::Highlighter;
use crate::linkify;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("renderer panicked: {0}")]
    Panicked(String),
}

/// A markdown to HTML transformation.
///
/// Must be idempotent: the same input always yields the same output.
pub trait Transform {
    fn render(&self, markdown: &str) -> Result<String, RenderError>;
}

pub struct MarkdownRenderer {
    options: Options,
    highlighter: Highlighter,
    sanitizer: ammonia::Builder<'static>,
}

impl Default for MarkdownRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl MarkdownRenderer {
    pub fn new() -> Self {
        let mut options = Options::empty();
        options.insert(Options::ENABLE_FOOTNOTES);
        options.insert(Options::ENABLE_TABLES);
        options.insert(Options::ENABLE_STRIKETHROUGH);
        options.insert(Options::ENABLE_SMART_PUNCTUATION);
        options.insert(Options::ENABLE_SUPERSCRIPT);
        options.insert(Options::ENABLE_SUBSCRIPT);

        let mut sanitizer = ammonia::Builder::default();
        sanitizer
            .add_generic_attributes(&["class"])
            .add_tag_attributes("div", &["id"])
            .add_tag_attributes("li", &["id"]);

        Self {
            options,
            highlighter: Highlighter::new(),
            sanitizer,
        }
    }

    fn render_unguarded(&self, markdown: &str) -> String {
        let parser = TextMergeStream::new(Parser::new_ext(markdown, self.options));
        let events = self.rewrite(parser);

        let mut out = String::with_capacity(markdown.len() * 3 / 2);
        html::push_html(&mut out, events.into_iter());
        self.sanitizer.clean(&out).to_string()
    }

    fn rewrite<'a>(&self, parser: impl Iterator<Item = Event<'a>>) -> Vec<Event<'a>> {
        let mut events = Vec::new();
        // Open fenced block: info string and buffered events.
        let mut block: Option<(String, Vec<Event<'a>>)> = None;
        let mut link_depth = 0usize;
        // Inside an untagged fence or an indented block.
        let mut in_plain_block = false;

        for event in parser {
            if let Some((lang, buffered)) = block.as_mut() {
                if matches!(event, Event::End(TagEnd::CodeBlock)) {
                    let code: String = buffered
                        .iter()
                        .filter_map(|e| match e {
                            Event::Text(t) => Some(&**t),
                            _ => None,
                        })
                        .collect();
                    match self.highlighter.highlight(lang, &code) {
                        Some(highlighted) => {
                            events.push(Event::Html(
                                format!(
                                    "<pre><code class=\"language-{}\">{highlighted}</code></pre>\n",
                                    class_token(lang)
                                )
                                .into(),
                            ));
                        }
                        None => {
                            events.append(buffered);
                            events.push(event);
                        }
                    }
                    block = None;
                } else {
                    buffered.push(event);
                }
                continue;
            }

            match event {
                Event::Start(Tag::CodeBlock(CodeBlockKind::Fenced(info))) => {
                    let lang = info.split_whitespace().next().unwrap_or("").to_string();
                    let start = Event::Start(Tag::CodeBlock(CodeBlockKind::Fenced(info)));
                    if lang.is_empty() {
                        in_plain_block = true;
                        events.push(start);
                    } else {
                        block = Some((lang, vec![start]));
                    }
                }
                Event::Start(Tag::CodeBlock(CodeBlockKind::Indented)) => {
                    in_plain_block = true;
                    events.push(event);
                }
                Event::End(TagEnd::CodeBlock) => {
                    in_plain_block = false;
                    events.push(event);
                }
                Event::Start(Tag::Link { .. }) | Event::Start(Tag::Image { .. }) => {
                    link_depth += 1;
                    events.push(event);
                }
                Event::End(TagEnd::Link) | Event::End(TagEnd::Image) => {
                    link_depth = link_depth.saturating_sub(1);
                    events.push(event);
                }
                Event::Text(text) if link_depth == 0 && !in_plain_block => {
                    push_text(&mut events, text)
                }
                other => events.push(other),
            }
        }

        // Unterminated block at end of input.
        if let Some((_, buffered)) = block {
            events.extend(buffered);
        }
        events
    }
}

impl Transform for MarkdownRenderer {
    fn render(&self, markdown: &str) -> Result<String, RenderError> {
        panic::catch_unwind(AssertUnwindSafe(|| self.render_unguarded(markdown))).map_err(|payload| {
            let message = panic_message(payload.as_ref());
            log::warn!("Markdown render failed: {message}");
            RenderError::Panicked(message)
        })
    }
}

/// Expand emoji in a text run and split out bare links.
fn push_text<'a>(events: &mut Vec<Event<'a>>, text: CowStr<'a>) {
    let expanded = emoji::expand(&text).into_owned();
    let links = linkify::find_links(&expanded);
    if links.is_empty() {
        events.push(Event::Text(expanded.into()));
        return;
    }

    let mut cursor = 0;
    for link in links {
        if link.range.start > cursor {
            events.push(Event::Text(expanded[cursor..link.range.start].to_string().into()));
        }
        events.push(Event::Start(Tag::Link {
            link_type: LinkType::Autolink,
            dest_url: link.href.into(),
            title: "".into(),
            id: "".into(),
        }));
        events.push(Event::Text(expanded[link.range.clone()].to_string().into()));
        events.push(Event::End(TagEnd::Link));
        cursor = link.range.end;
    }
    if cursor < expanded.len() {
        events.push(Event::Text(expanded[cursor..].to_string().into()));
    }
}

/// Language tag reduced to characters safe inside a class attribute.
fn class_token(lang: &str) -> String {
    lang.chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '+' | '#'))
        .collect()
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
