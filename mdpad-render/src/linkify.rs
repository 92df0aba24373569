//! Bare URL detection for plain text runs.
//!
//! Recognizes `http://`, `https://` and `www.` addresses that start at a
//! word boundary. Trailing sentence punctuation is not part of the link.

use std::ops::Range;

/// A detected link: byte range in the source text and its target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkSpan {
    pub range: Range<usize>,
    pub href: String,
}

const SCHEMES: &[&str] = &["https://", "http://"];
const WWW: &str = "www.";

fn at_boundary(text: &str, index: usize) -> bool {
    text[..index]
        .chars()
        .next_back()
        .map_or(true, |c| c.is_whitespace() || matches!(c, '(' | '[' | '<' | '"' | '\''))
}

fn link_end(text: &str, start: usize) -> usize {
    let tail = &text[start..];
    let raw_len = tail
        .find(|c: char| c.is_whitespace() || matches!(c, '<' | '>' | '"'))
        .unwrap_or(tail.len());
    let mut candidate = &tail[..raw_len];

    loop {
        let trimmed = candidate.trim_end_matches(&['.', ',', ':', ';', '!', '?', '\'', '*', '_'][..]);
        // A closing paren belongs to the link only if it balances one inside it.
        let trimmed = if trimmed.ends_with(')')
            && trimmed.matches(')').count() > trimmed.matches('(').count()
        {
            &trimmed[..trimmed.len() - 1]
        } else {
            trimmed
        };
        if trimmed.len() == candidate.len() {
            break;
        }
        candidate = trimmed;
    }
    start + candidate.len()
}

/// Find all bare links in `text`, in order.
pub fn find_links(text: &str) -> Vec<LinkSpan> {
    let mut links = Vec::new();
    let mut index = 0;

    while index < text.len() {
        let tail = &text[index..];
        let prefix = SCHEMES
            .iter()
            .copied()
            .chain(std::iter::once(WWW))
            .find(|p| tail.get(..p.len()).is_some_and(|head| head.eq_ignore_ascii_case(p)));

        if let Some(prefix) = prefix.filter(|_| at_boundary(text, index)) {
            let end = link_end(text, index);
            let plausible = match text.get(index + prefix.len()..end) {
                Some(body) if prefix == WWW => body.contains('.') && !body.starts_with('.'),
                Some(body) => !body.is_empty(),
                None => false,
            };
            if plausible {
                let literal = &text[index..end];
                let href = if prefix == WWW {
                    format!("http://{literal}")
                } else {
                    literal.to_string()
                };
                links.push(LinkSpan {
                    range: index..end,
                    href,
                });
                index = end;
                continue;
            }
        }

        index += tail.chars().next().map_or(1, char::len_utf8);
    }

    links
}
