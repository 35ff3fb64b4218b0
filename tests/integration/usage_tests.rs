//! Usage index integration tests
//!
//! These tests check the inclusion answers of every index against selectors
//! parsed through the public API.

use cssprune::selector::parse;
use cssprune::usage::{HtmlExtractor, HtmlUsage, PatternSet, WordExtractor};
use cssprune::{CssUsage, UsageIndex};

const PAGE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <title>Demo</title>
  <style>.from-style { color: red }</style>
</head>
<body class="home">
  <nav id="top" class="navbar navbar-dark" data-toggle="collapse">
    <a href="/" class="brand">Home</a>
  </nav>
  <img src="logo.png" alt="logo">
  <script>if (a < b) { document.body.classList.add("from-script"); }</script>
</body>
</html>"#;

fn html() -> HtmlUsage {
    HtmlExtractor::new().extract(PAGE).unwrap()
}

// ============================================================================
// HTML index
// ============================================================================

#[test]
fn test_html_index_answers() {
    let usage = html();

    for selector in [
        "*",
        "html",
        "body.home",
        "nav#top.navbar.navbar-dark",
        "nav[data-toggle]",
        "a[href].brand:hover",
        "body nav > a.brand",
        "img[alt]",
        "NAV.navbar",
    ] {
        assert!(usage.includes(&parse(selector).unwrap()), "{} should be used", selector);
    }

    for selector in [
        "table",
        ".from-style",
        ".from-script",
        "nav#bottom",
        "a.navbar",
        "nav[title]",
        "body .missing",
    ] {
        assert!(!usage.includes(&parse(selector).unwrap()), "{} should be unused", selector);
    }
}

#[test]
fn test_html_index_is_order_independent() {
    let usage = html();
    let mut reversed = usage.seen().to_vec();
    reversed.reverse();
    let reversed = HtmlUsage::from_nodes(reversed);

    for selector in ["a.brand nav#top", "nav.navbar-dark", "img.brand", "head title"] {
        let chain = parse(selector).unwrap();
        assert_eq!(usage.includes(&chain), reversed.includes(&chain), "{}", selector);
    }
}

#[test]
fn test_merged_documents() {
    let mut usage = HtmlUsage::extract("<section class=hero>").unwrap();
    usage.merge(HtmlUsage::extract("<footer id=bottom>").unwrap());

    assert!(usage.includes(&parse("section.hero footer#bottom").unwrap()));
    assert!(!usage.includes(&parse("section#bottom").unwrap()));
}

// ============================================================================
// Word and pattern indices
// ============================================================================

#[test]
fn test_word_index() {
    let words = WordExtractor::new().extract(
        r#"<template><div :class="{ 'is-active': on }" id="menu-panel"></div></template>"#,
    );

    assert!(words.includes(&parse(".is-active").unwrap()));
    assert!(words.includes(&parse("div#menu-panel.is-active").unwrap()));
    assert!(!words.includes(&parse(".is-hidden").unwrap()));
}

#[test]
fn test_pattern_indices() {
    let classes = UsageIndex::ClassPatterns(PatternSet::new(&["^btn-", "-icon$"]).unwrap());
    let ids = UsageIndex::IdPatterns(PatternSet::new(&["^app$"]).unwrap());

    assert!(classes.includes(&parse(".btn-primary").unwrap()));
    assert!(classes.includes(&parse("span.search-icon").unwrap()));
    assert!(!classes.includes(&parse("span").unwrap()));
    assert!(ids.includes(&parse("#app").unwrap()));
    assert!(!ids.includes(&parse("#application").unwrap()));
}

#[test]
fn test_union() {
    let index = UsageIndex::Union(vec![
        UsageIndex::Html(html()),
        UsageIndex::Words(WordExtractor::new().extract("toast")),
    ]);

    assert!(index.includes(&parse("nav").unwrap()));
    assert!(index.includes(&parse(".toast").unwrap()));
    assert!(!index.includes(&parse(".modal").unwrap()));
    assert!(!UsageIndex::Union(Vec::new()).includes(&parse("*").unwrap()));
}

// ============================================================================
// CSS usage
// ============================================================================

#[test]
fn test_css_usage_across_stylesheets() {
    let mut usage = CssUsage::extract(
        "@font-face{font-family:Brand}@keyframes pulse{from{opacity:0}}",
    )
    .unwrap();
    usage.merge(
        CssUsage::extract(".brand{font-family:'Brand',serif;animation:pulse 1s infinite}")
            .unwrap(),
    );

    let index = UsageIndex::Html(html());
    assert!(usage.font_face_used("Brand", &index));
    assert!(usage.keyframes_used("pulse", &index));
    assert!(!usage.keyframes_used("spin", &index));

    let unrelated = UsageIndex::Html(HtmlUsage::extract("<p>").unwrap());
    assert!(!usage.font_face_used("Brand", &unrelated));
}
