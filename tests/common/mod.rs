//! Shared fixtures for the webextract integration tests

use std::sync::Arc;

use webextract::testing::FixtureBackend;
use webextract::{ExtractionPipeline, SessionConfig};

/// Wraps `body` in a minimal HTML document
#[allow(dead_code)]
pub fn html_page(title: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <title>{title}</title>
</head>
<body>
    {body}
</body>
</html>"#
    )
}

/// Google-style results page: five `div.g` containers, the second and fourth
/// without any link.
#[allow(dead_code)]
pub fn search_results_page() -> String {
    html_page(
        "rust async - Google Search",
        r#"
    <div id="search">
      <div class="g">
        <a href="https://tokio.rs/"><h3>Tokio - An asynchronous Rust runtime</h3></a>
        <div class="VwiC3b">Tokio is an asynchronous runtime for Rust.</div>
      </div>
      <div class="g">
        <h3>Result without a link</h3>
        <div class="VwiC3b">Nothing to click here.</div>
      </div>
      <div class="g">
        <a href="/url?q=https://rust-lang.github.io/async-book/"><h3>Asynchronous Programming in Rust</h3></a>
      </div>
      <div class="g">
        <h3>Another orphan title</h3>
      </div>
      <div class="g">
        <a href="https://docs.rs/futures"><h3>futures - Rust</h3></a>
        <div class="VwiC3b">  Abstractions for   asynchronous programming. </div>
      </div>
    </div>"#,
    )
}

/// Blog index with four title links, one of them empty
#[allow(dead_code)]
pub fn listing_page() -> String {
    html_page(
        "Blog",
        r#"
    <h1> Engineering Blog </h1>
    <ul>
      <li><h3><a href="/posts/foo"> Foo </a></h3></li>
      <li><div class="post-title"><a href="https://blog.example.com/posts/bar">Bar</a></div></li>
      <li><h3><a href="posts/empty"></a></h3></li>
      <li><div class="article-title"><a href="../baz">Baz</a></div></li>
    </ul>
    <footer><a href="/about">About</a></footer>"#,
    )
}

/// Session options with a short timeout so failing tests stay fast
#[allow(dead_code)]
pub fn quick_session(timeout_ms: u64) -> SessionConfig {
    SessionConfig::default().with_timeout_ms(timeout_ms)
}

#[allow(dead_code)]
pub fn pipeline_for(backend: &FixtureBackend, timeout_ms: u64) -> ExtractionPipeline {
    ExtractionPipeline::new(Arc::new(backend.clone()), quick_session(timeout_ms))
}
