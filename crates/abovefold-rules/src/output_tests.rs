use super::*;
use crate::parser::parse;

#[test]
fn generate_then_minify_round_trips_declarations() {
    let rules = parse(".hero{color:red;font-size:16px}");
    let minified = minify(&generate(&rules));
    assert_eq!(minified, ".hero{color:red;font-size:16px}");
}

#[test]
fn minified_output_has_no_comments_or_newlines() {
    let css = "/* top */\n.a {\n  color: red; /* why */\n}\n.b { margin: 0 auto; }";
    let minified = minify(css);
    assert!(!minified.contains("/*"));
    assert!(!minified.contains('\n'));
    assert_eq!(minified, ".a{color:red}.b{margin:0 auto}");
}

#[test]
fn value_spacing_survives_minification() {
    let minified = minify(".x { box-shadow: 0 2px 4px rgba(0, 0, 0, .1); }");
    assert_eq!(minified, ".x{box-shadow:0 2px 4px rgba(0,0,0,.1)}");
}

#[test]
fn important_is_emitted() {
    let rules = parse(".x { color: red !important; }");
    let minified = minify(&generate(&rules));
    assert_eq!(minified, ".x{color:red !important}");
}

#[test]
fn media_rules_are_wrapped() {
    let rules = parse("@media (min-width: 768px) { .r { font-size: 18px; } }");
    let generated = generate(&rules);
    assert!(generated.starts_with("@media (min-width:768px) {"));
    let minified = minify(&generated);
    assert_eq!(minified, "@media (min-width:768px){.r{font-size:18px}}");
}

#[test]
fn consecutive_same_media_rules_share_a_block() {
    let css = "@media (min-width:768px) { .a { color: red } .b { color: blue } }";
    let minified = minify(&generate(&parse(css)));
    assert_eq!(
        minified,
        "@media (min-width:768px){.a{color:red}.b{color:blue}}"
    );
}

#[test]
fn rule_order_is_preserved_across_media_boundaries() {
    let css = ".a{color:red} @media (min-width:768px){.b{color:blue}} .c{color:green}";
    let minified = minify(&generate(&parse(css)));
    assert_eq!(
        minified,
        ".a{color:red}@media (min-width:768px){.b{color:blue}}.c{color:green}"
    );
}

#[test]
fn font_face_serializes_with_literal_selector() {
    let rules = parse("@font-face { font-family: X; src: url(x.woff2); }");
    let minified = minify(&generate(&rules));
    assert_eq!(minified, "@font-face{font-family:X;src:url(x.woff2)}");
}
