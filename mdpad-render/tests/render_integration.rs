//! End-to-end rendering of the bundled example documents and the
//! pipeline's behavior across a simulated typing session.

use std::time::{Duration, Instant};

use mdpad_core::EXAMPLES;
use mdpad_render::markdown::Transform;
use mdpad_render::{preview_document, MarkdownRenderer, RenderConfig, RenderPipeline};

fn ms(n: u64) -> Duration {
    Duration::from_millis(n)
}

// ─── Examples ────────────────────────────────────────────────────────

#[test]
fn test_every_example_renders() {
    let renderer = MarkdownRenderer::new();
    for example in EXAMPLES {
        let html = renderer.render(example.content).unwrap();
        assert!(html.contains("<h1>"), "{} has no heading", example.name);
        assert!(!html.contains("<script"), "{}", example.name);
    }
}

#[test]
fn test_extensions_tour_features() {
    let renderer = MarkdownRenderer::new();
    let tour = EXAMPLES.iter().find(|e| e.name == "extensions.md").unwrap();
    let html = renderer.render(tour.content).unwrap();

    assert!(html.contains("<sub>2</sub>"));
    assert!(html.contains("<sup>2</sup>"));
    assert!(html.contains("<del>"));
    assert!(html.contains("<table>"));
    assert!(html.contains("footnote-definition"));
    assert!(html.contains("language-python"));
    assert!(html.contains("language-js"));
    assert!(html.contains("hl-"));
    assert!(html.contains("\u{1f525}"));
    assert!(html.contains("<details>"));
}

#[test]
fn test_cheatsheet_links_and_plain_fence() {
    let renderer = MarkdownRenderer::new();
    let sheet = EXAMPLES.iter().find(|e| e.name == "cheatsheet.md").unwrap();
    let html = renderer.render(sheet.content).unwrap();

    assert!(html.contains("href=\"http://www.example.com\""));
    assert!(html.contains("href=\"https://www.markdownguide.org/cheat-sheet/\""));
    assert!(html.contains("A fence without a language is left unhighlighted."));
    assert!(html.contains("language-bash"));
}

// ─── Sanitization ────────────────────────────────────────────────────

#[test]
fn test_hostile_html_is_neutralized() {
    let renderer = MarkdownRenderer::new();
    let md = "<img src=x onerror=\"alert(1)\">\n\n\
              [click](javascript:alert(1))\n\n\
              <iframe src=\"https://evil.example\"></iframe>\n\n\
              <style>body { display: none }</style>\n";
    let html = renderer.render(md).unwrap();

    assert!(!html.contains("onerror"));
    assert!(!html.contains("javascript:"));
    assert!(!html.contains("<iframe"));
    assert!(!html.contains("<style"));
}

#[test]
fn test_render_is_idempotent_across_instances() {
    let a = MarkdownRenderer::new();
    let b = MarkdownRenderer::new();
    for example in EXAMPLES {
        assert_eq!(a.render(example.content).unwrap(), b.render(example.content).unwrap());
    }
}

// ─── Pipeline ────────────────────────────────────────────────────────

#[test]
fn test_typing_session() {
    let config = RenderConfig::default();
    let mut pipeline = RenderPipeline::new(&config);
    let t0 = Instant::now();
    let text = "# Title\n\nSome text";

    // One keystroke every 30ms, then a pause.
    let mut typed = String::new();
    let mut renders = 0;
    for (i, c) in text.chars().enumerate() {
        let now = t0 + ms(i as u64 * 30);
        if pipeline.poll(now) {
            renders += 1;
        }
        typed.push(c);
        pipeline.input(typed.clone(), now);
    }
    assert_eq!(renders, 0);

    let last = t0 + ms((text.chars().count() as u64 - 1) * 30);
    let due = pipeline.deadline().unwrap();
    assert_eq!(due, last + config.wait);
    assert!(pipeline.poll(due));

    let html = pipeline.surface().html();
    assert!(html.contains("<h1>Title</h1>"));
    assert!(html.contains("Some text"));
    assert_eq!(pipeline.surface().renders(), 1);
}

#[test]
fn test_preview_page_for_rendered_output() {
    let config = RenderConfig::default();
    let mut pipeline = RenderPipeline::new(&config);
    pipeline.input("```rust\nlet x = 1;\n```\n", Instant::now());
    assert!(pipeline.flush());

    let page = preview_document(pipeline.surface().html(), &config, true);
    assert!(page.contains("language-rust"));
    assert!(page.contains("class=\"dark\""));
}
