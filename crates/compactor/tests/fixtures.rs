//! Fixture scenarios for the public compressor API.

use compactor::{compress, CompressionConfig, Compressor, Dialect, DiagnosticKind, Error};
use serde_json::json;
use std::io::{BufRead, Cursor};

const FIXTURE_CSS: &str = "
      div.warning {
        display: none;
      }

      div.error {
        background: red;
        color: white;
      }
";

const FIXTURE_JS: &str = r#"
      // here's a comment
      var Foo = { "a": 1 };
      Foo["bar"] = (function(baz) {
        /* here's a
           multiline comment */
        if (false) {
          doSomething();
        } else {
          for (var index = 0; index < baz.length; index++) {
            doSomething(baz[index]);
          }
        }
      })("hello");
"#;

fn css() -> CompressionConfig {
    CompressionConfig::new(Dialect::Css)
}

fn js() -> CompressionConfig {
    CompressionConfig::new(Dialect::Js)
}

#[test]
fn test_css_fixture() {
    assert_eq!(
        compress(FIXTURE_CSS, &css()),
        "div.warning{display:none;}div.error{background:red;color:white;}"
    );
}

#[test]
fn test_css_fixture_line_break() {
    assert_eq!(
        compress(FIXTURE_CSS, &css().with_line_break(Some(0))),
        "div.warning{display:none;}\ndiv.error{background:red;color:white;}"
    );
}

#[test]
fn test_js_fixture() {
    assert_eq!(
        compress(FIXTURE_JS, &js()),
        r#"var Foo={a:1};Foo.bar=(function(baz){if(false){doSomething()}else{for(var index=0;index<baz.length;index++){doSomething(baz[index])}}})("hello");"#
    );
}

#[test]
fn test_js_fixture_line_break() {
    assert_eq!(
        compress(FIXTURE_JS, &js().with_line_break(Some(0))),
        "var Foo={a:1};\nFoo.bar=(function(baz){if(false){doSomething()\n}else{for(var index=0;\nindex<baz.length;\nindex++){doSomething(baz[index])\n}}})(\"hello\");"
    );
}

#[test]
fn test_js_fixture_munge() {
    assert_eq!(
        compress(FIXTURE_JS, &js().with_munge(true)),
        r#"var Foo={a:1};Foo.bar=(function(b){if(false){doSomething()}else{for(var a=0;a<b.length;a++){doSomething(b[a])}}})("hello");"#
    );
}

#[test]
fn test_js_fixture_without_optimizations() {
    assert_eq!(
        compress(FIXTURE_JS, &js().with_optimize(false)),
        r#"var Foo={"a":1};Foo["bar"]=(function(baz){if(false){doSomething()}else{for(var index=0;index<baz.length;index++){doSomething(baz[index])}}})("hello");"#
    );
}

#[test]
fn test_js_fixture_preserve_semicolons() {
    assert_eq!(
        compress(FIXTURE_JS, &js().with_preserve_semicolons(true)),
        r#"var Foo={a:1};Foo.bar=(function(baz){if(false){doSomething();}else{for(var index=0;index<baz.length;index++){doSomething(baz[index]);}}})("hello");"#
    );
}

#[test]
fn test_default_dialect_is_js() {
    let compressor = Compressor::default();
    assert_eq!(compressor.config().dialect, Dialect::Js);
    assert_eq!(compressor.compress(FIXTURE_JS).unwrap(), compress(FIXTURE_JS, &js()));
}

#[test]
fn test_idempotent() {
    for config in [css(), js(), js().with_munge(true), js().with_preserve_semicolons(true)] {
        let source = if config.dialect == Dialect::Css { FIXTURE_CSS } else { FIXTURE_JS };
        let once = compress(source, &config);
        assert_eq!(compress(&once, &config), once, "{config:?}");
    }
}

#[test]
fn test_literals_are_lossless() {
    let source = "var s = 'it\\'s' + \"a  /* not a comment */ b\" + `x ${ y } z`; var r = /[/]  +/g;";
    assert_eq!(
        compress(source, &js()),
        "var s='it\\'s'+\"a  /* not a comment */ b\"+`x ${y} z`;var r=/[/]  +/g;"
    );
}

#[test]
fn test_renaming_avoids_collisions() {
    let source = "function outer(first, second) { return function(inner) { return first + inner + a + b; }; }";
    assert_eq!(
        compress(source, &js().with_munge(true)),
        "function outer(c,d){return function(e){return c+e+a+b}}"
    );
}

#[test]
fn test_renaming_keeps_expression_names_bound() {
    let config = js().with_munge(true);
    assert_eq!(
        compress("var fact = function fact(n) { return n <= 1 ? 1 : n * fact(n - 1); };", &config),
        "var fact=function b(a){return a<=1?1:a*b(a-1)};"
    );
    assert_eq!(
        compress("var C = class C { m() { return C } }", &config),
        "var C=class a{m(){return a}}"
    );
}

#[test]
fn test_renaming_after_semicolon_free_line() {
    assert_eq!(
        compress("foo()\nfunction bar(x) { return x }\nbar(1)", &js().with_munge(true)),
        "foo()\nfunction bar(a){return a}\nbar(1)"
    );
}

#[test]
fn test_integer_with_separators_keeps_space() {
    assert_eq!(compress("x = 1_000 .toString()", &js()), "x=1_000 .toString()");
}

#[test]
fn test_unknown_option_is_rejected() {
    let err = Compressor::from_options([("foo", json!("bar"))]).unwrap_err();
    assert!(matches!(&err, Error::UnrecognizedOption { name } if name == "foo"));
    assert_eq!(err.to_string(), "unrecognized option: foo");

    // An unknown key wins over a bad value.
    let err = CompressionConfig::from_json(&json!({"munge": "yes", "foo": 1})).unwrap_err();
    assert!(matches!(err, Error::UnrecognizedOption { .. }));
}

#[test]
fn test_option_values_are_checked() {
    let err = CompressionConfig::from_json(&json!({"munge": "yes"})).unwrap_err();
    assert!(matches!(&err, Error::InvalidOption { name, .. } if name == "munge"));

    let config = CompressionConfig::from_json(&json!({"type": "css", "line_break": 0})).unwrap();
    assert_eq!(config, css().with_line_break(Some(0)));
}

#[test]
fn test_reader_source() {
    let compressor = Compressor::new(css());
    let mut reader = Cursor::new(FIXTURE_CSS.as_bytes().to_vec());
    assert_eq!(
        compressor.compress(&mut reader).unwrap(),
        "div.warning{display:none;}div.error{background:red;color:white;}"
    );
}

#[test]
fn test_compress_with_consumer() {
    let compressor = Compressor::new(css().with_line_break(Some(0)));
    let lines = compressor
        .compress_with(FIXTURE_CSS, |handle| handle.lines().map(Result::unwrap).collect::<Vec<_>>())
        .unwrap();
    assert_eq!(lines, ["div.warning{display:none;}", "div.error{background:red;color:white;}"]);
}

#[test]
fn test_malformed_input_still_compresses() {
    let report = Compressor::default().compress_report("var a = [1, 2;\nvar b = 'x").unwrap();
    assert!(report.output.starts_with("var a=[1,2;"));
    let kinds: Vec<_> = report.diagnostics.iter().map(|d| d.kind).collect();
    assert!(kinds.contains(&DiagnosticKind::UnterminatedString));
    assert!(kinds.contains(&DiagnosticKind::UnbalancedBracket));
}
