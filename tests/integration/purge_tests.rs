//! Purge engine integration tests
//!
//! These tests drive whole stylesheets through the public API and compare
//! the purged output.

use cssprune::usage::{HtmlUsage, PatternSet, WordExtractor, DEFAULT_PRESET};
use cssprune::{CssUsage, PurgeError, Purger, UsageIndex};

/// Purge `css` against the nodes seen in `html`
fn purge(html: &str, css: &str) -> String {
    let index = UsageIndex::Html(HtmlUsage::extract(html).unwrap());
    purge_with(&index, css)
}

fn purge_with(index: &UsageIndex, css: &str) -> String {
    let css_usage = CssUsage::extract(css).unwrap();
    let mut out = Vec::new();
    Purger::new(index, &css_usage).purge(css, &mut out).unwrap();
    String::from_utf8(out).unwrap()
}

// ============================================================================
// Rulesets
// ============================================================================

#[test]
fn test_unused_ruleset_is_removed() {
    assert_eq!(
        purge(r#"<a class="used">"#, "a.used{color:red}b.unused{color:blue}"),
        "a.used{color:red}"
    );
}

#[test]
fn test_selector_list_is_filtered() {
    let html = r#"<a class="used">"#;
    assert_eq!(purge(html, "a.used, b.unused{color:red}"), "a.used{color:red}");
    assert_eq!(purge(html, "b.unused, a.used{color:red}"), "a.used{color:red}");
    assert_eq!(
        purge(r#"<a class="used"><b class="unused">"#, "a.used, b.unused{color:red}"),
        "a.used,b.unused{color:red}"
    );
}

#[test]
fn test_whitespace_is_normalized() {
    let css = "\n\na.used  >  span {\n    color :  red;\n    border: 1px   solid  #000 ;\n}\n\n";
    assert_eq!(
        purge(r#"<a class="used"><span>"#, css),
        "a.used > span{color:red;border:1px solid #000}"
    );
}

#[test]
fn test_positions_match_independently() {
    // ancestry is not modelled: each position only needs some witness
    assert_eq!(purge("<p><a>", "a p{color:red}"), "a p{color:red}");
    assert_eq!(purge("<p>", "a p{color:red}"), "");
}

#[test]
fn test_pseudo_classes_do_not_affect_matching() {
    assert_eq!(
        purge(r#"<a class="nav">"#, "a.nav:hover::before{content:'x'}"),
        "a.nav:hover::before{content:'x'}"
    );
}

#[test]
fn test_non_ascii_names_are_kept() {
    assert_eq!(
        purge(r#"<a class="Ärger">"#, ".Ärger{color:red}"),
        ".Ärger{color:red}"
    );
    assert_eq!(purge(r#"<a id="Ñu">"#, "#Ñu{color:red}"), "#Ñu{color:red}");
    assert_eq!(purge(r#"<a class="ärger">"#, "a.ÄRGER{color:red}"), "a.ÄRGER{color:red}");
}

#[test]
fn test_volatile_attributes_are_ignored() {
    assert_eq!(
        purge("<input>", "input[checked]{color:red}input[data-x]{color:blue}"),
        "input[checked]{color:red}"
    );
}

// ============================================================================
// Conditional groups
// ============================================================================

#[test]
fn test_media_block_is_kept_when_used() {
    assert_eq!(
        purge(r#"<a class="used">"#, "@media screen{a.used{color:red}}"),
        "@media screen{a.used{color:red}}"
    );
}

#[test]
fn test_empty_media_block_is_elided() {
    assert_eq!(purge(r#"<a class="used">"#, "@media screen{b.unused{color:blue}}"), "");
}

#[test]
fn test_media_only_wraps_survivors() {
    assert_eq!(
        purge(
            "<a>",
            "@media (min-width: 600px) { b { color: blue } a { color: red } i { color: green } }"
        ),
        "@media (min-width: 600px){a{color:red}}"
    );
}

// ============================================================================
// Font faces and keyframes
// ============================================================================

#[test]
fn test_font_face_follows_its_users() {
    let css = "@font-face{font-family:Foo}a{font-family:Foo}";
    assert_eq!(purge("<a>", css), "@font-face{font-family:Foo}a{font-family:Foo}");
    assert_eq!(purge("<b>", css), "");
}

#[test]
fn test_font_face_kept_by_any_user() {
    let css = "@font-face{font-family:\"Open Sans\";src:url(os.woff2)}\
               b{font-family:'Open Sans', sans-serif}i{font:12px Foo}";
    assert_eq!(
        purge("<b>", css),
        "@font-face{font-family:\"Open Sans\";src:url(os.woff2)}\
         b{font-family:'Open Sans', sans-serif}"
    );
}

#[test]
fn test_keyframes_pass_through_verbatim() {
    let css = "@keyframes spin{0%{}}a{animation:spin}";
    assert_eq!(purge("<a>", css), css);
    assert_eq!(purge("<b>", css), "");
}

#[test]
fn test_keyframes_keep_inner_formatting() {
    let css = "@keyframes fade {\n  from { opacity: 0 }\n  to { opacity: 1 }\n}\n.box { animation: fade 2s ease-in }";
    assert_eq!(
        purge(r#"<div class="box">"#, css),
        "@keyframes fade {\n  from { opacity: 0 }\n  to { opacity: 1 }\n}.box{animation:fade 2s ease-in}"
    );
}

// ============================================================================
// Comments
// ============================================================================

#[test]
fn test_comments() {
    assert_eq!(
        purge("<a>", "/*! license */\n/* drop me */\na{color:red}/* and me */"),
        "/*! license */\na{color:red}"
    );
}

// ============================================================================
// Overrides
// ============================================================================

#[test]
fn test_union_with_overrides() {
    let index = UsageIndex::Union(vec![
        UsageIndex::Html(HtmlUsage::extract(r#"<div class="card">"#).unwrap()),
        UsageIndex::Words(WordExtractor::new().extract("el.classList.add('is-open')")),
        UsageIndex::ClassPatterns(PatternSet::new(&["^js-"]).unwrap()),
        UsageIndex::IdPatterns(PatternSet::new(&["^modal$"]).unwrap()),
        UsageIndex::Preset(HtmlUsage::from_selectors(DEFAULT_PRESET).unwrap()),
    ]);

    let css = "html,body{margin:0}.card{}.is-open{}.js-hook{}#modal{}#other{}.gone{}";
    assert_eq!(
        purge_with(&index, css),
        "html,body{margin:0}.card{}.is-open{}.js-hook{}#modal{}"
    );
}

// ============================================================================
// Errors
// ============================================================================

#[test]
fn test_errors_abort_the_stylesheet() {
    let index = UsageIndex::Union(Vec::new());
    let css_usage = CssUsage::default();
    let purger = Purger::new(&index, &css_usage);

    assert!(matches!(
        purger.purge("a{color:red}}", &mut Vec::new()),
        Err(PurgeError::Css(_))
    ));
    assert!(matches!(
        purger.purge("a:1{color:red}", &mut Vec::new()),
        Err(PurgeError::Selector { .. })
    ));
}
