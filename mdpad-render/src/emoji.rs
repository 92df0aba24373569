//! `:shortcode:` emoji expansion.

use std::borrow::Cow;
use std::collections::HashMap;
use std::sync::OnceLock;

pub fn shortcode_map() -> &'static HashMap<&'static str, &'static str> {
    static MAP: OnceLock<HashMap<&'static str, &'static str>> = OnceLock::new();
    MAP.get_or_init(|| {
        HashMap::from([
            ("+1", "\u{1f44d}"),
            ("-1", "\u{1f44e}"),
            ("angry", "\u{1f620}"),
            ("blush", "\u{1f60a}"),
            ("brain", "\u{1f9e0}"),
            ("broken_heart", "\u{1f494}"),
            ("bug", "\u{1f41b}"),
            ("bulb", "\u{1f4a1}"),
            ("check_mark", "\u{2705}"),
            ("clap", "\u{1f44f}"),
            ("confused", "\u{1f615}"),
            ("cry", "\u{1f622}"),
            ("eyes", "\u{1f440}"),
            ("exclamation", "\u{2757}"),
            ("fire", "\u{1f525}"),
            ("grin", "\u{1f601}"),
            ("grinning", "\u{1f600}"),
            ("heart", "\u{2764}\u{fe0f}"),
            ("heart_eyes", "\u{1f60d}"),
            ("innocent", "\u{1f607}"),
            ("joy", "\u{1f602}"),
            ("kissing", "\u{1f617}"),
            ("laughing", "\u{1f606}"),
            ("memo", "\u{1f4dd}"),
            ("muscle", "\u{1f4aa}"),
            ("neutral_face", "\u{1f610}"),
            ("ok_hand", "\u{1f44c}"),
            ("open_mouth", "\u{1f62e}"),
            ("package", "\u{1f4e6}"),
            ("pray", "\u{1f64f}"),
            ("question", "\u{2753}"),
            ("rage", "\u{1f621}"),
            ("raised_hands", "\u{1f64c}"),
            ("relaxed", "\u{263a}\u{fe0f}"),
            ("rocket", "\u{1f680}"),
            ("scream", "\u{1f631}"),
            ("sleeping", "\u{1f634}"),
            ("slightly_smiling_face", "\u{1f642}"),
            ("smile", "\u{1f604}"),
            ("smiley", "\u{1f603}"),
            ("smirk", "\u{1f60f}"),
            ("sob", "\u{1f62d}"),
            ("sparkles", "\u{2728}"),
            ("star", "\u{2b50}"),
            ("stuck_out_tongue", "\u{1f61b}"),
            ("sunglasses", "\u{1f60e}"),
            ("sweat_smile", "\u{1f605}"),
            ("tada", "\u{1f389}"),
            ("test_tube", "\u{1f9ea}"),
            ("thinking", "\u{1f914}"),
            ("thumbsdown", "\u{1f44e}"),
            ("thumbsup", "\u{1f44d}"),
            ("warning", "\u{26a0}\u{fe0f}"),
            ("wave", "\u{1f44b}"),
            ("white_check_mark", "\u{2705}"),
            ("wink", "\u{1f609}"),
            ("wrench", "\u{1f527}"),
            ("x", "\u{274c}"),
            ("yum", "\u{1f60b}"),
            ("zap", "\u{26a1}"),
        ])
    })
}

fn is_shortcode_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '_' | '+' | '-')
}

/// Replace every known `:name:` in `text` with its emoji.
///
/// Unknown shortcodes are left as written.
pub fn expand(text: &str) -> Cow<'_, str> {
    if !text.contains(':') {
        return Cow::Borrowed(text);
    }
    let map = shortcode_map();
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    let mut changed = false;

    while let Some(open) = rest.find(':') {
        let after = &rest[open + 1..];
        let name_len = after
            .find(|c: char| !is_shortcode_char(c))
            .unwrap_or(after.len());
        let closes = after[name_len..].starts_with(':');

        match map.get(&after[..name_len]) {
            Some(emoji) if closes && name_len > 0 => {
                out.push_str(&rest[..open]);
                out.push_str(emoji);
                rest = &after[name_len + 1..];
                changed = true;
            }
            _ => {
                out.push_str(&rest[..=open]);
                rest = after;
            }
        }
    }
    out.push_str(rest);

    if changed {
        Cow::Owned(out)
    } else {
        Cow::Borrowed(text)
    }
}
