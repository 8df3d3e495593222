//! Local variable renaming.
//!
//! Shortens local names (`index` → `a`) using the scope tree from
//! [`crate::scope`]:
//! 1. Scopes are processed top-down, so parent names are final first
//! 2. Within a scope, the most used bindings get the shortest names
//! 3. A new name never collides with a name visible from the scope or with
//!    a global referenced anywhere below it
//!
//! Root-level bindings, hinted names, and scopes touched by `eval` or `with`
//! keep their original names.

use crate::scope::{BindingId, ScopeAnalysis, ScopeKind};
use crate::token::is_reserved;
use rustc_hash::FxHashSet;
use std::borrow::Cow;
use std::cmp::Reverse;

/// Final name of every binding.
#[derive(Debug)]
pub struct RenameMap<'a> {
    names: Vec<Cow<'a, str>>,
}

impl<'a> RenameMap<'a> {
    /// Assign final names to every binding of an analysis.
    pub fn build(analysis: &ScopeAnalysis<'a>) -> Self {
        let bindings = &analysis.bindings;
        let mut names: Vec<Cow<'a, str>> = bindings.iter().map(|b| Cow::Borrowed(b.name)).collect();

        // Parents come before children.
        for scope in &analysis.scopes {
            if scope.kind == ScopeKind::Root || scope.tainted || scope.bindings.is_empty() {
                continue;
            }

            let mut taken: FxHashSet<String> = scope.unavailable.iter().map(|n| (*n).to_string()).collect();
            let mut ancestor = scope.parent;
            while let Some(id) = ancestor {
                let s = &analysis.scopes[id];
                taken.extend(s.bindings.iter().map(|&b| names[b].to_string()));
                ancestor = s.parent;
            }

            let (kept, mut renamed): (Vec<BindingId>, Vec<BindingId>) = scope
                .bindings
                .iter()
                .partition(|&&b| scope.keep.contains(bindings[b].name));
            taken.extend(kept.iter().map(|&b| bindings[b].name.to_string()));

            // Stable: ties stay in declaration order.
            renamed.sort_by_key(|&b| Reverse(bindings[b].occurrences));

            let mut generator = NameGenerator::new();
            for binding in renamed {
                let name = generator.next_free(&taken);
                taken.insert(name.clone());
                names[binding] = Cow::Owned(name);
            }
        }

        Self { names }
    }

    /// Final name of a binding.
    pub fn name(&self, binding: BindingId) -> &str {
        &self.names[binding]
    }

    /// Number of bindings that got a new name.
    pub fn renamed_count(&self) -> usize {
        self.names.iter().filter(|n| matches!(n, Cow::Owned(_))).count()
    }
}

// =============================================================================
// Name Generation
// =============================================================================

const ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyz";

/// Produces `a`, `b`, ..., `z`, `aa`, `ab`, ...
struct NameGenerator {
    counter: usize,
}

impl NameGenerator {
    fn new() -> Self {
        Self { counter: 0 }
    }

    /// Next generated name that is neither reserved nor in `taken`.
    fn next_free(&mut self, taken: &FxHashSet<String>) -> String {
        loop {
            let name = encode_name(self.counter);
            self.counter += 1;
            if !is_reserved(&name) && !taken.contains(&name) {
                return name;
            }
        }
    }
}

/// Bijective base-26: 0 → `a`, 25 → `z`, 26 → `aa`.
fn encode_name(mut n: usize) -> String {
    let mut bytes = Vec::with_capacity(4);
    loop {
        bytes.push(ALPHABET[n % ALPHABET.len()]);
        n /= ALPHABET.len();
        if n == 0 {
            break;
        }
        n -= 1;
    }
    bytes.reverse();
    bytes.into_iter().map(char::from).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codegen;
    use crate::config::{CompressionConfig, Dialect};
    use crate::lexer::tokenize;
    use crate::scope::{analyze, Role};
    use crate::skeleton::Skeleton;
    use std::collections::BTreeSet;

    /// Final names of the identifiers in `source`, in order.
    fn renamed(source: &str) -> Vec<String> {
        let skeleton = Skeleton::new(tokenize(source, Dialect::Js));
        let analysis = analyze(&skeleton);
        let map = RenameMap::build(&analysis);
        (0..skeleton.len())
            .filter(|&i| analysis.role(i).is_some())
            .map(|i| match analysis.binding_at(i) {
                Some(b) => map.name(b).to_string(),
                None => skeleton.text(i).to_string(),
            })
            .collect()
    }

    fn munge(source: &str) -> String {
        let skeleton = Skeleton::new(tokenize(source, Dialect::Js));
        let analysis = analyze(&skeleton);
        let map = RenameMap::build(&analysis);
        let config = CompressionConfig::default().with_munge(true);
        codegen::print(&skeleton, &config, Some((&analysis, &map)))
    }

    /// Names that resolve to no declaration.
    fn free_names(source: &str) -> BTreeSet<String> {
        let skeleton = Skeleton::new(tokenize(source, Dialect::Js));
        let analysis = analyze(&skeleton);
        (0..skeleton.len())
            .filter(|&i| matches!(analysis.role(i), Some(Role::Name { binding: None, .. })))
            .map(|i| skeleton.text(i).to_string())
            .collect()
    }

    #[test]
    fn test_encode_name() {
        assert_eq!(encode_name(0), "a");
        assert_eq!(encode_name(25), "z");
        assert_eq!(encode_name(26), "aa");
        assert_eq!(encode_name(27), "ab");
        assert_eq!(encode_name(26 + 26 * 26), "aaa");
    }

    #[test]
    fn test_generator_skips_reserved() {
        let mut taken = FxHashSet::default();
        let mut generator = NameGenerator { counter: 26 * 4 + 14 - 1 };
        // "dn" then "do" (reserved) is skipped
        assert_eq!(generator.next_free(&taken), "dn");
        assert_eq!(generator.next_free(&taken), "dp");
        taken.insert("a".to_string());
        let mut generator = NameGenerator::new();
        assert_eq!(generator.next_free(&taken), "b");
    }

    #[test]
    fn test_most_used_gets_shortest() {
        let names = renamed("(function(baz){for(var index=0;index<baz.length;index++){f(baz[index])}})()");
        assert_eq!(names, ["b", "a", "a", "b", "length", "a", "f", "b", "a"]);
    }

    #[test]
    fn test_root_bindings_kept() {
        let names = renamed("var longName = 1; function outer(param) { return param + longName; }");
        assert_eq!(names, ["longName", "outer", "a", "a", "longName"]);
    }

    #[test]
    fn test_globals_are_not_shadowed() {
        // `a` is a global used inside, so the parameter cannot become `a`
        let names = renamed("function f(x) { return a + x; }");
        assert_eq!(names, ["f", "b", "a", "b"]);
    }

    #[test]
    fn test_sibling_scopes_reuse_names() {
        let names = renamed("function f(first) { return first; } function g(second) { return second; }");
        assert_eq!(names, ["f", "a", "a", "g", "a", "a"]);
    }

    #[test]
    fn test_nested_scope_avoids_parent_names() {
        let names = renamed("function f(x) { return function(y) { return x + y; }; }");
        assert_eq!(names, ["f", "a", "b", "a", "b"]);
    }

    #[test]
    fn test_eval_keeps_names() {
        let names = renamed("function f(value) { eval('value'); return value; }");
        assert_eq!(names, ["f", "value", "eval", "value"]);
    }

    #[test]
    fn test_hinted_names_kept() {
        let names = renamed("function f(keep, other) { \"keep:nomunge\"; return keep + other; }");
        assert_eq!(names, ["f", "keep", "a", "keep", "a"]);
    }

    #[test]
    fn test_properties_not_renamed() {
        let names = renamed("function f(obj) { return obj.length + {length: 1}.length; }");
        assert_eq!(names, ["f", "a", "a", "length", "length", "length"]);
    }

    #[test]
    fn test_named_function_expression() {
        assert_eq!(
            munge("var fact = function fact(n) { return n <= 1 ? 1 : n * fact(n - 1); };"),
            "var fact=function b(a){return a<=1?1:a*b(a-1)};"
        );
    }

    #[test]
    fn test_named_class_expression() {
        assert_eq!(
            munge("function f() { var C = class C { m() { return C } }; return C }"),
            "function f(){var a=class b{m(){return b}};return a}"
        );
    }

    #[test]
    fn test_declaration_after_asi_newline() {
        assert_eq!(
            munge("function outer() { init()\n function helper(x) { return x }\n return helper(1) }"),
            "function outer(){init()\nfunction a(b){return b}\nreturn a(1)}"
        );
    }

    #[test]
    fn test_renamed_output_resolves_like_input() {
        let sources = [
            "var fact = function fact(n) { return n <= 1 ? 1 : n * fact(n - 1); };",
            "function outer() { init()\n function helper(x) { return x }\n return helper(1) }",
            "foo()\nfunction bar(x) { return x }\nbar(1)",
            "function f() { var C = class C { m() { return C; } }; return C; }",
            "function f(a, b) { try { g(a); } catch (e) { return e + b + c; } }",
            "function f(list) { return list.map(item => item * scale).filter((x, i) => x > i); }",
            "function f({ key, value: v = fallback }, [first, ...rest]) { return { key, v, first, rest }; }",
            "function f(x) { { let x = 1; y(x); } return function g(z) { return x + z + a; }; }",
        ];
        for source in sources {
            let output = munge(source);
            assert_eq!(free_names(&output), free_names(source), "{source} => {output}");
        }
    }
}
