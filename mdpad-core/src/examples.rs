//! Example documents offered by "Load an example".

use rand::Rng;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExampleDocument {
    pub name: &'static str,
    pub title: &'static str,
    pub content: &'static str,
}

pub const EXAMPLES: &[ExampleDocument] = &[
    ExampleDocument {
        name: "sample.md",
        title: "Welcome",
        content: SAMPLE_CONTENT,
    },
    ExampleDocument {
        name: "extensions.md",
        title: "Markdown extensions tour",
        content: EXTENSIONS_CONTENT,
    },
    ExampleDocument {
        name: "cheatsheet.md",
        title: "Markdown cheatsheet",
        content: CHEATSHEET_CONTENT,
    },
];

/// Pick one of [`EXAMPLES`] uniformly at random.
pub fn random_example() -> &'static ExampleDocument {
    let index = rand::rng().random_range(0..EXAMPLES.len());
    &EXAMPLES[index]
}

const SAMPLE_CONTENT: &str = r#"# Let's Markdown!

Everyone with the link can edit this document **at the same time**.
Changes show up for all participants as they type, and the preview on
the right follows along.

## Getting started

1. Copy the share link and send it to a friend.
2. Pick a name in the *Active Users* panel so others know who you are.
3. Start writing :rocket:

## What the preview understands

- Headings, lists, **bold**, *italic* and `inline code`
- Tables and footnotes[^1]
- Fenced code with syntax highlighting
- Emoji shortcodes like :tada: and :thumbsup:
- Links are detected automatically: https://commonmark.org

```rust
fn main() {
    println!("Hello, collaborators!");
}
```

> Tip: the preview waits for you to pause typing before it refreshes.

[^1]: Footnotes are collected at the bottom of the preview.
"#;

const EXTENSIONS_CONTENT: &str = r#"# Extensions tour

## Typography

"Smart quotes" and 'single quotes' -- en dash --- em dash... ellipsis.

## Subscript and superscript

- Water is H~2~O
- Einstein wrote E = mc^2^

## Strikethrough

~~This sentence was a mistake.~~

## Emoji

:fire: :star: :bulb: :white_check_mark: :memo: :heart:

## Footnotes

Collaboration is easier with shared context[^ctx], and with a clear
record of who said what[^who].

[^ctx]: Everyone sees the same document.
[^who]: Each participant gets their own color.

## Tables

| Feature      | Syntax         |
|--------------|----------------|
| Subscript    | `H~2~O`        |
| Superscript  | `x^2^`         |
| Footnote     | `[^label]`     |

## Highlighted code

```python
def fib(n):
    a, b = 0, 1
    for _ in range(n):
        a, b = b, a + b
    return a
```

```js
const greet = (name) => `Hello, ${name}!`;
console.log(greet("world"));
```

## Raw HTML

<details>
<summary>Click to expand</summary>

Inline HTML passes through, minus anything that could run script.

</details>
"#;

const CHEATSHEET_CONTENT: &str = r#"# Markdown cheatsheet

## Emphasis

*italic* or _italic_, **bold** or __bold__, ***both***

## Headings

# H1
## H2
### H3

## Lists

1. First ordered item
2. Second item
   - Unordered sub-list
3. Third item

* Bullets with asterisks
- or minuses
+ or pluses

## Links

[An inline link](https://www.markdownguide.org)

[A reference link][guide]

Bare addresses become links too: www.example.com

[guide]: https://www.markdownguide.org/cheat-sheet/

## Code

Inline `code` uses back-ticks.

```
A fence without a language is left unhighlighted.
```

```bash
echo "fences with a language are highlighted"
```

## Blockquotes

> Blockquotes are very handy to emphasize a quote.
> They can span multiple lines.

## Horizontal rule

---

## Tables

| Left | Center | Right |
|:-----|:------:|------:|
| a    |   b    |     c |
| 1    |   2    |     3 |
"#;
