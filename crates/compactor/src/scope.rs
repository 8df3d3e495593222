//! Scope analysis over the token skeleton.
//!
//! Builds the scope tree for a JavaScript program and gives every identifier
//! token a [`Role`]: a property name, a label, or a name that refers to a
//! binding (or to nothing in the program, i.e. a global).
//!
//! Scopes are created in source order, so a parent always has a smaller
//! [`ScopeId`] than its children. The renamer relies on that.

use crate::diagnostics::{Diagnostic, DiagnosticKind};
use crate::skeleton::{BraceKind, Skeleton};
use crate::token::{is_identifier_name, TokenKind};
use rustc_hash::{FxHashMap, FxHashSet};

pub type ScopeId = usize;
pub type BindingId = usize;

/// The root scope is always the first one.
pub const ROOT: ScopeId = 0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeKind {
    Root,
    Function,
    Block,
    Catch,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindingKind {
    Var,
    Let,
    Const,
    Function,
    Class,
    Param,
    CatchParam,
    Import,
}

#[derive(Debug)]
pub struct Scope<'a> {
    pub kind: ScopeKind,
    pub parent: Option<ScopeId>,
    /// Bindings in declaration order.
    pub bindings: Vec<BindingId>,
    names: FxHashMap<&'a str, BindingId>,
    /// `eval` or `with` appears here or in a nested scope.
    pub tainted: bool,
    /// Names listed in a `"name:nomunge"` prologue hint.
    pub keep: FxHashSet<&'a str>,
    /// Names that must keep their meaning anywhere in this subtree: globals
    /// referenced below, and names kept by nested hints.
    pub unavailable: FxHashSet<&'a str>,
}

impl<'a> Scope<'a> {
    fn new(kind: ScopeKind, parent: Option<ScopeId>) -> Self {
        Self {
            kind,
            parent,
            bindings: Vec::new(),
            names: FxHashMap::default(),
            tainted: false,
            keep: FxHashSet::default(),
            unavailable: FxHashSet::default(),
        }
    }

    /// Binding declared here under `name`.
    pub fn lookup(&self, name: &str) -> Option<BindingId> {
        self.names.get(name).copied()
    }
}

#[derive(Debug)]
pub struct Binding<'a> {
    pub name: &'a str,
    pub kind: BindingKind,
    /// Declarations plus resolved references.
    pub occurrences: usize,
}

/// What an identifier token means.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// `a.name`, `{name: 1}`, class members. Never renamed.
    Property,
    /// `name:` statement labels and `break name`. Never renamed.
    Label,
    /// A variable name. `binding` is `None` for globals. `shorthand` marks
    /// `{name}` object shorthand, which prints as `name:renamed`.
    Name { binding: Option<BindingId>, shorthand: bool },
}

/// Result of scope analysis.
pub struct ScopeAnalysis<'a> {
    pub scopes: Vec<Scope<'a>>,
    pub bindings: Vec<Binding<'a>>,
    roles: Vec<Option<Role>>,
    hints: Vec<usize>,
    diagnostics: Vec<Diagnostic>,
}

impl<'a> ScopeAnalysis<'a> {
    /// Role of significant token `i`, if it is an identifier.
    pub fn role(&self, i: usize) -> Option<Role> {
        self.roles.get(i).copied().flatten()
    }

    /// Binding referenced by significant token `i`.
    pub fn binding_at(&self, i: usize) -> Option<BindingId> {
        match self.role(i) {
            Some(Role::Name { binding, .. }) => binding,
            _ => None,
        }
    }

    /// Significant index `i` is a `nomunge` hint string.
    pub fn is_hint(&self, i: usize) -> bool {
        self.hints.binary_search(&i).is_ok()
    }

    pub fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.diagnostics
    }
}

/// Analyze the scopes of a JavaScript token skeleton.
pub fn analyze<'a>(skeleton: &Skeleton<'a>) -> ScopeAnalysis<'a> {
    let mut analyzer = Analyzer::new(skeleton);
    analyzer.run();
    analyzer.finish()
}

struct Analyzer<'s, 'a> {
    sk: &'s Skeleton<'a>,
    scopes: Vec<Scope<'a>>,
    bindings: Vec<Binding<'a>>,
    roles: Vec<Option<Role>>,
    /// Open scopes with the significant index of their last token.
    stack: Vec<(ScopeId, usize)>,
    /// Function and catch bodies whose scope was opened at the parameters.
    owned_bodies: FxHashSet<usize>,
    /// Name of a function expression, bound inside its own scope.
    pending_function: Option<usize>,
    /// Name of a class expression, bound inside the class body.
    pending_class: Option<usize>,
    references: Vec<(usize, ScopeId)>,
    hints: Vec<usize>,
    diagnostics: Vec<Diagnostic>,
}

impl<'s, 'a> Analyzer<'s, 'a> {
    fn new(sk: &'s Skeleton<'a>) -> Self {
        Self {
            sk,
            scopes: vec![Scope::new(ScopeKind::Root, None)],
            bindings: Vec::new(),
            roles: vec![None; sk.len()],
            stack: vec![(ROOT, usize::MAX)],
            owned_bodies: FxHashSet::default(),
            pending_function: None,
            pending_class: None,
            references: Vec::new(),
            hints: Vec::new(),
            diagnostics: Vec::new(),
        }
    }

    fn run(&mut self) {
        self.scan_prologue(0, ROOT);
        for i in 0..self.sk.len() {
            self.visit(i);
            while self.stack.len() > 1 && self.stack.last().is_some_and(|&(_, end)| end <= i) {
                self.stack.pop();
            }
        }
        self.resolve();
    }

    fn finish(mut self) -> ScopeAnalysis<'a> {
        self.hints.sort_unstable();
        ScopeAnalysis {
            scopes: self.scopes,
            bindings: self.bindings,
            roles: self.roles,
            hints: self.hints,
            diagnostics: self.diagnostics,
        }
    }

    // =========================================================================
    // Scope tree
    // =========================================================================

    fn current(&self) -> ScopeId {
        self.stack.last().map_or(ROOT, |&(id, _)| id)
    }

    fn push_scope(&mut self, kind: ScopeKind, end: usize) -> ScopeId {
        let id = self.scopes.len();
        self.scopes.push(Scope::new(kind, Some(self.current())));
        self.stack.push((id, end));
        id
    }

    /// Nearest function or root scope, where `var` and function
    /// declarations land.
    fn hoist_target(&self, scope: ScopeId) -> ScopeId {
        let mut current = scope;
        loop {
            let s = &self.scopes[current];
            if matches!(s.kind, ScopeKind::Function | ScopeKind::Root) {
                return current;
            }
            match s.parent {
                Some(p) => current = p,
                None => return current,
            }
        }
    }

    /// Mark a scope and all its ancestors as unsafe to rename.
    fn mark_eval(&mut self, scope: ScopeId) {
        let mut current = Some(scope);
        while let Some(id) = current {
            self.scopes[id].tainted = true;
            current = self.scopes[id].parent;
        }
    }

    fn mark_unavailable(&mut self, scope: ScopeId, name: &'a str) {
        let mut current = Some(scope);
        while let Some(id) = current {
            if !self.scopes[id].unavailable.insert(name) {
                break;
            }
            current = self.scopes[id].parent;
        }
    }

    fn declare(&mut self, i: usize, scope: ScopeId, kind: BindingKind, shorthand: bool) -> BindingId {
        let name = self.sk.text(i);
        let id = match self.scopes[scope].lookup(name) {
            Some(id) => {
                if kind == BindingKind::Var && self.bindings[id].kind == BindingKind::Var {
                    self.diagnostics.push(Diagnostic::new(
                        DiagnosticKind::DuplicateDeclaration,
                        self.sk.token(i).span,
                        format!("variable `{name}` declared more than once"),
                    ));
                }
                id
            }
            None => {
                let id = self.bindings.len();
                self.bindings.push(Binding {
                    name,
                    kind,
                    occurrences: 0,
                });
                let s = &mut self.scopes[scope];
                s.bindings.push(id);
                s.names.insert(name, id);
                id
            }
        };
        self.bindings[id].occurrences += 1;
        self.roles[i] = Some(Role::Name {
            binding: Some(id),
            shorthand,
        });
        id
    }

    fn reference(&mut self, i: usize, shorthand: bool) {
        self.roles[i] = Some(Role::Name { binding: None, shorthand });
        let scope = self.current();
        self.references.push((i, scope));
        if self.sk.text(i) == "eval" {
            self.mark_eval(scope);
            self.diagnostics.push(Diagnostic::new(
                DiagnosticKind::EvalUsed,
                self.sk.token(i).span,
                "eval prevents renaming in enclosing scopes",
            ));
        }
    }

    fn resolve(&mut self) {
        let references = std::mem::take(&mut self.references);
        for (i, scope) in references {
            // Declared after it was first seen.
            if matches!(self.roles[i], Some(Role::Name { binding: Some(_), .. })) {
                continue;
            }
            let name = self.sk.text(i);
            let mut current = Some(scope);
            let mut found = None;
            while let Some(id) = current {
                if let Some(binding) = self.scopes[id].lookup(name) {
                    found = Some(binding);
                    break;
                }
                current = self.scopes[id].parent;
            }
            match found {
                Some(binding) => {
                    self.bindings[binding].occurrences += 1;
                    if let Some(Role::Name { binding: slot, .. }) = &mut self.roles[i] {
                        *slot = Some(binding);
                    }
                }
                None => self.mark_unavailable(scope, name),
            }
        }
    }

    // =========================================================================
    // Token walk
    // =========================================================================

    fn visit(&mut self, i: usize) {
        let token = *self.sk.token(i);
        match token.kind {
            TokenKind::Keyword => self.visit_keyword(i, token.text),
            TokenKind::Identifier if self.roles[i].is_none() => self.visit_identifier(i),
            TokenKind::Punctuator if token.text == "(" => self.visit_paren(i),
            TokenKind::Punctuator if token.text == "{" => self.visit_brace(i),
            _ => {}
        }
    }

    fn after_dot(&self, i: usize) -> bool {
        i > 0 && (self.sk.is_punct(i - 1, ".") || self.sk.is_punct(i - 1, "?.") || self.sk.is_punct(i - 1, "#"))
    }

    fn visit_keyword(&mut self, i: usize, keyword: &'a str) {
        if self.after_dot(i) || self.sk.is_punct(i + 1, ":") {
            return;
        }
        match keyword {
            "var" => self.declare_list(i + 1, BindingKind::Var),
            "let" => self.declare_list(i + 1, BindingKind::Let),
            "const" => self.declare_list(i + 1, BindingKind::Const),
            "function" => self.visit_function(i),
            "class" => self.visit_class(i),
            "import" => self.visit_import(i),
            "export" => self.visit_export(i),
            "with" => {
                let scope = self.current();
                self.mark_eval(scope);
                self.diagnostics.push(Diagnostic::new(
                    DiagnosticKind::WithUsed,
                    self.sk.token(i).span,
                    "with prevents renaming in enclosing scopes",
                ));
            }
            _ => {}
        }
    }

    /// `function` at a statement start declares its name in the enclosing
    /// function scope; otherwise the name is only visible inside.
    fn visit_function(&mut self, i: usize) {
        let mut j = i + 1;
        if self.sk.is_punct(j, "*") {
            j += 1;
        }
        if self.sk.kind(j) != Some(TokenKind::Identifier) {
            return;
        }
        if self.is_declaration(i) {
            let target = self.hoist_target(self.current());
            self.declare(j, target, BindingKind::Function, false);
        } else {
            self.defer_name(j);
            self.pending_function = Some(j);
        }
    }

    fn visit_class(&mut self, i: usize) {
        let j = i + 1;
        if self.sk.kind(j) != Some(TokenKind::Identifier) {
            return;
        }
        if self.is_declaration(i) {
            let scope = self.current();
            self.declare(j, scope, BindingKind::Class, false);
        } else {
            self.defer_name(j);
            self.pending_class = Some(j);
        }
    }

    /// The name of a function or class expression belongs to a scope that
    /// opens later; keep the walk from treating it as a reference.
    fn defer_name(&mut self, j: usize) {
        self.roles[j] = Some(Role::Name {
            binding: None,
            shorthand: false,
        });
    }

    fn is_declaration(&self, i: usize) -> bool {
        if self.sk.is_statement_start(i) {
            return true;
        }
        let Some(prev) = i.checked_sub(1) else {
            return true;
        };
        self.sk.is_keyword(prev, "export")
            || self.sk.is_keyword(prev, "default")
            || self.sk.text(prev) == "async" && self.sk.is_statement_start(prev)
    }

    fn visit_paren(&mut self, i: usize) {
        let Some(close) = self.sk.matching(i) else {
            return;
        };
        match self.sk.head(i) {
            Some("catch") => {
                let body = close + 1;
                if self.sk.is_punct(body, "{") {
                    let end = self.sk.matching(body).unwrap_or(usize::MAX);
                    let scope = self.push_scope(ScopeKind::Catch, end);
                    self.owned_bodies.insert(body);
                    self.declare_elements(i + 1, close, scope, BindingKind::CatchParam);
                }
                return;
            }
            Some("for") => {
                // `for (let i ...) { }` scopes `i` to the loop.
                let body = close + 1;
                let lexical = self.sk.is_keyword(i + 1, "let") || self.sk.is_keyword(i + 1, "const");
                if lexical && self.sk.is_punct(body, "{") {
                    let end = self.sk.matching(body).unwrap_or(usize::MAX);
                    self.push_scope(ScopeKind::Block, end);
                }
                return;
            }
            Some(_) => return,
            None => {}
        }

        let after = close + 1;
        let (end, body) = if self.sk.is_punct(after, "{") && self.sk.brace_kind(after) == Some(BraceKind::FunctionBody) {
            (self.sk.matching(after).unwrap_or(usize::MAX), Some(after))
        } else if self.sk.is_punct(after, "=>") {
            let body = self.sk.is_punct(after + 1, "{").then_some(after + 1);
            (self.sk.arrow_end(after).unwrap_or(usize::MAX), body)
        } else {
            self.pending_function = None;
            return;
        };

        let scope = self.push_scope(ScopeKind::Function, end);
        if let Some(name) = self.pending_function.take() {
            self.declare(name, scope, BindingKind::Function, false);
        }
        self.declare_elements(i + 1, close, scope, BindingKind::Param);
        if let Some(body) = body {
            self.owned_bodies.insert(body);
            self.scan_prologue(body + 1, scope);
        }
    }

    fn visit_brace(&mut self, i: usize) {
        if self.owned_bodies.contains(&i) {
            return;
        }
        let end = self.sk.matching(i).unwrap_or(usize::MAX);
        match self.sk.brace_kind(i) {
            Some(BraceKind::Block | BraceKind::Switch) => {
                self.push_scope(ScopeKind::Block, end);
            }
            Some(BraceKind::ClassBody) => {
                let scope = self.push_scope(ScopeKind::Block, end);
                if let Some(name) = self.pending_class.take() {
                    self.declare(name, scope, BindingKind::Class, false);
                }
            }
            Some(BraceKind::FunctionBody) => {
                // A body whose parameters were not recognized still gets
                // its own scope for `let`/`const`.
                let scope = self.push_scope(ScopeKind::Function, end);
                self.scan_prologue(i + 1, scope);
            }
            _ => {}
        }
    }

    fn visit_identifier(&mut self, i: usize) {
        let sk = self.sk;
        let text = sk.text(i);

        if self.after_dot(i) {
            self.roles[i] = Some(Role::Property);
            return;
        }

        // `x => ...`
        if sk.is_punct(i + 1, "=>") {
            let end = sk.arrow_end(i + 1).unwrap_or(usize::MAX);
            let scope = self.push_scope(ScopeKind::Function, end);
            self.declare(i, scope, BindingKind::Param, false);
            if sk.is_punct(i + 2, "{") {
                self.owned_bodies.insert(i + 2);
                self.scan_prologue(i + 3, scope);
            }
            return;
        }

        match sk.enclosing_brace(i) {
            Some(BraceKind::Object) if self.at_key_position(i) => {
                if sk.is_punct(i + 1, ":") || sk.is_punct(i + 1, "(") || self.is_modifier(i) {
                    self.roles[i] = Some(Role::Property);
                } else {
                    self.reference(i, true);
                }
                return;
            }
            Some(BraceKind::ClassBody) if self.at_member_position(i) => {
                self.roles[i] = Some(Role::Property);
                return;
            }
            _ => {}
        }

        if i > 0 && (sk.is_keyword(i - 1, "break") || sk.is_keyword(i - 1, "continue")) && !sk.newline_before(i) {
            self.roles[i] = Some(Role::Label);
            return;
        }
        if sk.is_punct(i + 1, ":")
            && sk.is_statement_start(i)
            && !matches!(sk.enclosing_brace(i), Some(BraceKind::Object | BraceKind::ClassBody))
        {
            self.roles[i] = Some(Role::Label);
            return;
        }
        // `for (x of xs)`
        if text == "of" && i > 0 && sk.ends_expression(i - 1) && sk.container(i).is_some_and(|c| sk.head(c) == Some("for")) {
            self.roles[i] = Some(Role::Property);
            return;
        }

        self.reference(i, false);
    }

    /// Directly after `{` or `,` of an object literal, possibly behind
    /// `get`/`set`/`async`/`*`.
    fn at_key_position(&self, i: usize) -> bool {
        let Some(prev) = i.checked_sub(1) else {
            return false;
        };
        if self.sk.is_punct(prev, "{") || self.sk.is_punct(prev, ",") {
            return true;
        }
        (self.sk.is_punct(prev, "*") || self.is_modifier(prev)) && self.at_key_position(prev)
    }

    fn at_member_position(&self, i: usize) -> bool {
        let Some(prev) = i.checked_sub(1) else {
            return false;
        };
        let sk = self.sk;
        if sk.is_punct(prev, "{") || sk.is_punct(prev, ";") || sk.is_punct(prev, "}") {
            return true;
        }
        if sk.is_punct(prev, "*") || self.is_modifier(prev) {
            return self.at_member_position(prev);
        }
        // Field without a semicolon.
        sk.newline_before(i) && sk.ends_expression(prev)
    }

    /// `get`/`set`/`async`/`static` in front of a member name.
    fn is_modifier(&self, i: usize) -> bool {
        let sk = self.sk;
        matches!(sk.text(i), "get" | "set" | "async" | "static" | "accessor")
            && sk.kind(i) == Some(TokenKind::Identifier)
            && match sk.get(i + 1) {
                Some(next) => {
                    matches!(
                        next.kind,
                        TokenKind::Identifier | TokenKind::Keyword | TokenKind::String | TokenKind::Number
                    ) || next.is_punct("[")
                        || next.is_punct("*")
                        || next.is_punct("#")
                        || next.is_punct("{") && sk.text(i) == "static"
                }
                None => false,
            }
    }

    fn visit_import(&mut self, i: usize) {
        let sk = self.sk;
        if sk.is_punct(i + 1, "(") || sk.is_punct(i + 1, ".") {
            return;
        }
        let mut j = i + 1;
        while j < sk.len() {
            let token = *sk.token(j);
            // `import "module"` has nothing to bind.
            if token.is_punct(";") || token.kind == TokenKind::String && j == i + 1 {
                break;
            }
            if token.kind == TokenKind::Identifier {
                let renamed_import = sk.text(j + 1) == "as" && sk.kind(j + 1) == Some(TokenKind::Identifier);
                if matches!(token.text, "from" | "as") || renamed_import {
                    self.roles[j] = Some(Role::Property);
                } else {
                    self.declare(j, ROOT, BindingKind::Import, false);
                }
                if token.text == "from" {
                    break;
                }
            }
            j += 1;
        }
    }

    /// Exported aliases and `from` are not variable names.
    fn visit_export(&mut self, i: usize) {
        let sk = self.sk;
        let start = i + 1;
        let mut j = if sk.is_punct(start, "{") {
            let end = sk.matching(start).unwrap_or(start);
            for k in start + 1..end {
                if sk.text(k) == "as" && sk.kind(k) == Some(TokenKind::Identifier) {
                    self.roles[k] = Some(Role::Property);
                    if k + 1 < end && sk.kind(k + 1) == Some(TokenKind::Identifier) {
                        self.roles[k + 1] = Some(Role::Property);
                    }
                }
            }
            end + 1
        } else if sk.is_punct(start, "*") {
            start + 1
        } else {
            return;
        };
        if sk.text(j) == "as" {
            self.roles[j] = Some(Role::Property);
            if sk.kind(j + 1) == Some(TokenKind::Identifier) {
                self.roles[j + 1] = Some(Role::Property);
            }
            j += 2;
        }
        if sk.text(j) == "from" && sk.kind(j) == Some(TokenKind::Identifier) {
            self.roles[j] = Some(Role::Property);
        }
    }

    // =========================================================================
    // Declarations and patterns
    // =========================================================================

    fn declare_list(&mut self, start: usize, kind: BindingKind) {
        let scope = self.current();
        let target = if kind == BindingKind::Var { self.hoist_target(scope) } else { scope };
        let mut j = start;
        loop {
            let next = self.declare_pattern(j, target, kind);
            if next == j {
                return;
            }
            j = next;
            if self.sk.is_punct(j, "=") {
                j = self.sk.expression_end(j + 1) + 1;
            }
            if !self.sk.is_punct(j, ",") {
                return;
            }
            j += 1;
        }
    }

    /// Declare the names in the pattern starting at `j`; returns the index
    /// after it (or `j` if nothing there is a pattern).
    fn declare_pattern(&mut self, j: usize, scope: ScopeId, kind: BindingKind) -> usize {
        let Some(token) = self.sk.get(j).copied() else {
            return j;
        };
        match token.kind {
            TokenKind::Identifier => {
                self.declare(j, scope, kind, false);
                j + 1
            }
            TokenKind::Punctuator if token.text == "[" => match self.sk.matching(j) {
                Some(close) => {
                    self.declare_elements(j + 1, close, scope, kind);
                    close + 1
                }
                None => j + 1,
            },
            TokenKind::Punctuator if token.text == "{" => match self.sk.matching(j) {
                Some(close) => {
                    self.declare_properties(j + 1, close, scope, kind);
                    close + 1
                }
                None => j + 1,
            },
            _ => j,
        }
    }

    /// Comma-separated patterns with optional defaults: parameter lists and
    /// array patterns.
    fn declare_elements(&mut self, start: usize, end: usize, scope: ScopeId, kind: BindingKind) {
        let mut j = start;
        while j < end {
            if self.sk.is_punct(j, ",") || self.sk.is_punct(j, "...") {
                j += 1;
                continue;
            }
            let next = self.declare_pattern(j, scope, kind);
            j = if next == j { j + 1 } else { next };
            if self.sk.is_punct(j, "=") {
                j = self.skip_default(j + 1, end);
            }
        }
    }

    fn declare_properties(&mut self, start: usize, end: usize, scope: ScopeId, kind: BindingKind) {
        let sk = self.sk;
        let mut j = start;
        while j < end {
            if sk.is_punct(j, ",") {
                j += 1;
                continue;
            }
            if sk.is_punct(j, "...") {
                let next = self.declare_pattern(j + 1, scope, kind);
                j = next.max(j + 1);
                continue;
            }
            let key_end = if sk.is_punct(j, "[") {
                sk.matching(j).map_or(end, |close| close + 1)
            } else {
                j + 1
            };
            if sk.is_punct(key_end, ":") {
                if sk.kind(j) == Some(TokenKind::Identifier) {
                    self.roles[j] = Some(Role::Property);
                }
                let value = key_end + 1;
                let next = self.declare_pattern(value, scope, kind);
                j = if next == value { value + 1 } else { next };
            } else if sk.kind(j) == Some(TokenKind::Identifier) {
                self.declare(j, scope, kind, true);
                j += 1;
            } else {
                j = key_end;
            }
            if sk.is_punct(j, "=") {
                j = self.skip_default(j + 1, end);
            }
        }
    }

    /// Skip a default-value expression, leaving its identifiers to the main
    /// walk. Returns the index of the next `,` or `end`.
    fn skip_default(&self, start: usize, end: usize) -> usize {
        let mut j = start;
        while j < end {
            let token = self.sk.token(j);
            if token.is_punct(",") {
                return j;
            }
            if matches!(token.text, "(" | "[" | "{") && token.kind == TokenKind::Punctuator {
                j = self.sk.matching(j).map_or(end, |close| close + 1);
            } else {
                j += 1;
            }
        }
        end
    }

    // =========================================================================
    // Hints
    // =========================================================================

    /// Record `"a:nomunge, b:nomunge"` directives at the start of a body.
    fn scan_prologue(&mut self, start: usize, scope: ScopeId) {
        let sk = self.sk;
        let mut j = start;
        while sk.kind(j) == Some(TokenKind::String) {
            let next = j + 1;
            let complete = next >= sk.len() || sk.is_punct(next, ";") || sk.is_punct(next, "}") || sk.asi_boundary(next);
            if !complete {
                return;
            }
            if let Some(names) = parse_hint(sk.text(j)) {
                for name in names {
                    self.scopes[scope].keep.insert(name);
                    if let Some(parent) = self.scopes[scope].parent {
                        self.mark_unavailable(parent, name);
                    }
                }
                self.hints.push(j);
            }
            j = if sk.is_punct(next, ";") { next + 1 } else { next };
        }
    }
}

/// Parse the names out of a quoted `name:nomunge` list.
fn parse_hint(literal: &str) -> Option<Vec<&str>> {
    let inner = literal.get(1..literal.len().checked_sub(1)?)?;
    let mut names = Vec::new();
    for item in inner.split(',') {
        let (name, tag) = item.split_once(':')?;
        let name = name.trim();
        if tag.trim() != "nomunge" || !is_identifier_name(name) {
            return None;
        }
        names.push(name);
    }
    Some(names)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Dialect;
    use crate::lexer::tokenize;

    fn with_analysis(source: &str, check: impl FnOnce(&Skeleton<'_>, &ScopeAnalysis<'_>)) {
        let skeleton = Skeleton::new(tokenize(source, Dialect::Js));
        let analysis = analyze(&skeleton);
        check(&skeleton, &analysis);
    }

    fn nth(sk: &Skeleton<'_>, text: &str, n: usize) -> usize {
        (0..sk.len()).filter(|&i| sk.text(i) == text).nth(n).unwrap()
    }

    /// Scope that declares binding `b`.
    fn scope_of(an: &ScopeAnalysis<'_>, b: BindingId) -> ScopeId {
        an.scopes.iter().position(|s| s.bindings.contains(&b)).unwrap()
    }

    #[test]
    fn test_var_hoisting() {
        with_analysis("function f(a) { if (a) { var b = 1; let c = 2; } return b; }", |sk, an| {
            let b = an.binding_at(nth(sk, "b", 0)).unwrap();
            assert_eq!(an.binding_at(nth(sk, "b", 1)), Some(b));
            assert_eq!(an.scopes[scope_of(an, b)].kind, ScopeKind::Function);
            let c = an.binding_at(nth(sk, "c", 0)).unwrap();
            assert_eq!(an.scopes[scope_of(an, c)].kind, ScopeKind::Block);
            let f = an.binding_at(nth(sk, "f", 0)).unwrap();
            assert_eq!(scope_of(an, f), ROOT);
        });
    }

    #[test]
    fn test_properties_and_labels() {
        with_analysis("var o = {a: 1, b() {}, get c() {}}; o.a; outer: for (;;) { break outer; }", |sk, an| {
            assert_eq!(an.role(nth(sk, "a", 0)), Some(Role::Property));
            assert_eq!(an.role(nth(sk, "a", 1)), Some(Role::Property));
            assert_eq!(an.role(nth(sk, "b", 0)), Some(Role::Property));
            assert_eq!(an.role(nth(sk, "get", 0)), Some(Role::Property));
            assert_eq!(an.role(nth(sk, "c", 0)), Some(Role::Property));
            assert_eq!(an.role(nth(sk, "outer", 0)), Some(Role::Label));
            assert_eq!(an.role(nth(sk, "outer", 1)), Some(Role::Label));
        });
    }

    #[test]
    fn test_globals_are_unresolved() {
        with_analysis("function f() { return window.x + y; }", |sk, an| {
            assert_eq!(
                an.role(nth(sk, "window", 0)),
                Some(Role::Name {
                    binding: None,
                    shorthand: false
                })
            );
            assert!(an.scopes[ROOT].unavailable.contains("window"));
            assert!(an.scopes[1].unavailable.contains("y"));
            assert_eq!(scope_of(an, an.binding_at(nth(sk, "f", 0)).unwrap()), ROOT);
        });
    }

    #[test]
    fn test_destructuring_and_shorthand() {
        with_analysis("function f({a, b: c = d}, [e, ...g]) { return {a, c}; }", |sk, an| {
            assert_eq!(an.role(nth(sk, "b", 0)), Some(Role::Property));
            for name in ["a", "c", "e", "g"] {
                let b = an.binding_at(nth(sk, name, 0)).unwrap();
                assert_eq!(an.bindings[b].kind, BindingKind::Param, "{name}");
            }
            assert_eq!(an.binding_at(nth(sk, "d", 0)), None);
            assert!(matches!(
                an.role(nth(sk, "a", 1)),
                Some(Role::Name { binding: Some(_), shorthand: true })
            ));
        });
    }

    #[test]
    fn test_arrows_and_catch() {
        with_analysis("xs.map(x => x * 2); try { } catch (err) { log(err); } let h = (p, q) => p + q;", |sk, an| {
            let x = an.binding_at(nth(sk, "x", 0)).unwrap();
            assert_eq!(an.binding_at(nth(sk, "x", 1)), Some(x));
            assert_eq!(an.bindings[x].kind, BindingKind::Param);
            let err = an.binding_at(nth(sk, "err", 0)).unwrap();
            assert_eq!(an.scopes[scope_of(an, err)].kind, ScopeKind::Catch);
            assert_eq!(an.binding_at(nth(sk, "err", 1)), Some(err));
            let q = an.binding_at(nth(sk, "q", 1)).unwrap();
            assert_eq!(an.bindings[q].occurrences, 2);
        });
    }

    #[test]
    fn test_eval_and_with_taint_ancestors() {
        with_analysis("function f() { function g() { eval('x'); } } function h() { with (o) {} }", |_, an| {
            let tainted: Vec<bool> = an.scopes.iter().map(|s| s.tainted).collect();
            assert!(tainted[ROOT]);
            assert!(tainted[1] && tainted[2]);
        });
        let skeleton = Skeleton::new(tokenize("function g() { eval('x'); } with (o) {}", Dialect::Js));
        let kinds: Vec<_> = analyze(&skeleton).into_diagnostics().iter().map(|d| d.kind).collect();
        assert_eq!(kinds, [DiagnosticKind::EvalUsed, DiagnosticKind::WithUsed]);
    }

    #[test]
    fn test_named_function_expression_binds_inside() {
        with_analysis("var fact = function fact(n) { return n <= 1 ? 1 : n * fact(n - 1); };", |sk, an| {
            let outer = an.binding_at(nth(sk, "fact", 0)).unwrap();
            let inner = an.binding_at(nth(sk, "fact", 1)).unwrap();
            assert_ne!(outer, inner);
            assert_eq!(scope_of(an, outer), ROOT);
            assert_eq!(an.scopes[scope_of(an, inner)].kind, ScopeKind::Function);
            assert_eq!(an.binding_at(nth(sk, "fact", 2)), Some(inner));
            assert_eq!(an.bindings[outer].occurrences, 1);
            assert_eq!(an.bindings[inner].occurrences, 2);
        });
    }

    #[test]
    fn test_named_class_expression_binds_inside() {
        with_analysis("function f() { var C = class C { m() { return C; } }; return C; }", |sk, an| {
            let outer = an.binding_at(nth(sk, "C", 0)).unwrap();
            let inner = an.binding_at(nth(sk, "C", 1)).unwrap();
            assert_ne!(outer, inner);
            assert_eq!(an.binding_at(nth(sk, "C", 2)), Some(inner));
            assert_eq!(an.binding_at(nth(sk, "C", 3)), Some(outer));
        });
    }

    #[test]
    fn test_declaration_after_asi_newline_is_hoisted() {
        with_analysis("function outer() { init()\n function helper(x) { return x }\n return helper(1) }", |sk, an| {
            let helper = an.binding_at(nth(sk, "helper", 0)).unwrap();
            assert_eq!(an.binding_at(nth(sk, "helper", 1)), Some(helper));
            assert_eq!(an.scopes[scope_of(an, helper)].kind, ScopeKind::Function);
            assert_ne!(scope_of(an, helper), ROOT);
        });
    }

    #[test]
    fn test_nomunge_hint() {
        with_analysis("function f(a, b) { \"a:nomunge, b:nomunge\"; \"use strict\"; return a; }", |sk, an| {
            let scope = scope_of(an, an.binding_at(nth(sk, "a", 0)).unwrap());
            assert!(an.scopes[scope].keep.contains("a"));
            assert!(an.scopes[scope].keep.contains("b"));
            assert!(!an.is_hint(nth(sk, "\"use strict\"", 0)));
            assert!(an.is_hint(nth(sk, "\"a:nomunge, b:nomunge\"", 0)));
        });
    }

    #[test]
    fn test_parse_hint() {
        assert_eq!(parse_hint("'x:nomunge'"), Some(vec!["x"]));
        assert_eq!(parse_hint("\"use strict\""), None);
        assert_eq!(parse_hint("\"x:nomunge, 1y:nomunge\""), None);
        assert_eq!(parse_hint("\"\""), None);
    }

    #[test]
    fn test_class_members_are_properties() {
        with_analysis("class A extends B { static s = 1; m(v) { return this.m(v); } }", |sk, an| {
            assert_eq!(an.role(nth(sk, "static", 0)), Some(Role::Property));
            assert_eq!(an.role(nth(sk, "s", 0)), Some(Role::Property));
            assert_eq!(an.role(nth(sk, "m", 0)), Some(Role::Property));
            assert!(an.binding_at(nth(sk, "A", 0)).is_some());
            assert_eq!(an.binding_at(nth(sk, "B", 0)), None);
            let v = an.binding_at(nth(sk, "v", 0)).unwrap();
            assert_eq!(an.binding_at(nth(sk, "v", 1)), Some(v));
        });
    }
}
