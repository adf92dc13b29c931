//! Builds a [`Package`] from fetched Go source files.
//!
//! Sources are parsed with tree-sitter. Exported and unexported
//! declarations are split by identifier case, functions returning a
//! declared type are filed under that type, and methods under their
//! receiver. Examples are collected from test files but not attached to
//! any declaration; the renderer claims them.

use crate::doc::{clean_comment, synopsis};
use crate::error::{ExtractError, Result};
use crate::source::{is_readme, readme_lang};
use gowalker_core::{Example, Func, Package, Source, Type, Value};
use std::collections::{BTreeSet, HashMap};
use tree_sitter::{Node, Parser};

/// Per-fetch settings the walker cannot derive from the sources.
#[derive(Debug, Clone, Default)]
pub struct WalkOptions {
    pub import_path: String,
    /// Appended to a file's browse URL before the line number, e.g. `#L`.
    pub line_anchor: String,
}

/// Creates a parser loaded with the Go grammar.
pub fn go_parser() -> Result<Parser> {
    let mut parser = Parser::new();
    parser.set_language(&tree_sitter_go::LANGUAGE.into())?;
    Ok(parser)
}

/// Extracts documentation from `files`.
///
/// Files are visited in name order. `_test.go` files only contribute
/// examples and test imports; README files are kept as text.
///
/// # Errors
///
/// Any file with a syntax error aborts the whole build, as do non-test
/// files that disagree on the package name.
///
/// # Examples
///
/// ```
/// use gowalker_core::Source;
/// use gowalker_go::{WalkOptions, build};
///
/// let mut file = Source::new("a.go", "https://example.com/a.go", "");
/// file.data = b"// Package a is tiny.\npackage a\n\nfunc Hello() {}\n".to_vec();
///
/// let opts = WalkOptions {
///     import_path: "example.com/a".into(),
///     line_anchor: "#L".into(),
/// };
/// let pkg = build(&[file], &opts).unwrap();
/// assert_eq!(pkg.synopsis, "Package a is tiny.");
/// assert_eq!(pkg.funcs[0].url, "https://example.com/a.go#L4");
/// ```
pub fn build(files: &[Source], opts: &WalkOptions) -> Result<Package> {
    let mut parser = go_parser()?;
    let mut walker = Walker::new(opts);
    let mut pkg = Package {
        import_path: opts.import_path.clone(),
        ..Package::default()
    };

    let mut sorted: Vec<&Source> = files.iter().collect();
    sorted.sort_by(|a, b| a.name.cmp(&b.name));

    for file in sorted {
        if is_readme(&file.name) {
            pkg.readme
                .insert(readme_lang(&file.name), file.text().into_owned());
            continue;
        }
        if !file.name.ends_with(".go") {
            continue;
        }

        let src = file.text();
        let tree = parser
            .parse(src.as_bytes(), None)
            .ok_or_else(|| ExtractError::ParserFailed {
                file: file.name.clone(),
            })?;
        let root = tree.root_node();
        if root.has_error() {
            return Err(ExtractError::Syntax {
                file: file.name.clone(),
                line: first_error(root).map_or(0, line_of),
            });
        }

        let descriptor = Source::new(&file.name, &file.browse_url, &file.raw_url);
        if file.name.ends_with("_test.go") {
            walker.visit_test_file(root, &src);
            pkg.test_files.push(descriptor);
        } else if is_ignored(root, &src) {
            tracing::debug!(file = %file.name, "skipping file excluded by build constraint");
        } else {
            walker.visit_file(root, &src, file)?;
            pkg.files.push(descriptor);
        }
    }

    walker.finish(pkg)
}

struct Walker<'o> {
    opts: &'o WalkOptions,
    package_name: Option<(String, String)>,
    doc: Option<(String, String)>,
    values: Vec<(ValueKind, Value)>,
    types: Vec<Type>,
    funcs: Vec<(Func, Option<String>)>,
    methods: Vec<(Func, String)>,
    imports: BTreeSet<String>,
    test_imports: BTreeSet<String>,
    examples: Vec<Example>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ValueKind {
    Const,
    Var,
}

impl<'o> Walker<'o> {
    fn new(opts: &'o WalkOptions) -> Self {
        Self {
            opts,
            package_name: None,
            doc: None,
            values: Vec::new(),
            types: Vec::new(),
            funcs: Vec::new(),
            methods: Vec::new(),
            imports: BTreeSet::new(),
            test_imports: BTreeSet::new(),
            examples: Vec::new(),
        }
    }

    fn visit_file(&mut self, root: Node<'_>, src: &str, file: &Source) -> Result<()> {
        let mut cursor = root.walk();
        for node in root.named_children(&mut cursor) {
            match node.kind() {
                "package_clause" => self.visit_package_clause(node, src, file)?,
                "import_declaration" => self.imports.extend(import_paths(node, src)),
                "function_declaration" => {
                    if let Some(func) = self.func(node, src, file) {
                        let result = result_type_name(node, src);
                        self.funcs.push((func, result));
                    }
                }
                "method_declaration" => self.visit_method(node, src, file),
                "type_declaration" => self.visit_types(node, src, file),
                "const_declaration" => self.visit_values(node, src, file, ValueKind::Const),
                "var_declaration" => self.visit_values(node, src, file, ValueKind::Var),
                _ => {}
            }
        }
        Ok(())
    }

    fn visit_package_clause(&mut self, node: Node<'_>, src: &str, file: &Source) -> Result<()> {
        let name = node.named_child(0).map(|n| text(n, src)).unwrap_or("");
        match &self.package_name {
            Some((first, _)) if first != name => {
                return Err(ExtractError::MultiplePackages {
                    first: first.clone(),
                    second: name.to_string(),
                    file: file.name.clone(),
                });
            }
            Some(_) => {}
            None => self.package_name = Some((name.to_string(), file.name.clone())),
        }

        let doc = doc_comment(node, src);
        let prefer = file.name == "doc.go" || self.doc.is_none();
        if !doc.is_empty() && prefer {
            self.doc = Some((file.name.clone(), doc));
        }
        Ok(())
    }

    fn visit_test_file(&mut self, root: Node<'_>, src: &str) {
        let mut cursor = root.walk();
        for node in root.named_children(&mut cursor) {
            match node.kind() {
                "import_declaration" => self.test_imports.extend(import_paths(node, src)),
                "function_declaration" => {
                    if let Some(example) = example(node, src) {
                        self.examples.push(example);
                    }
                }
                _ => {}
            }
        }
    }

    fn url(&self, file: &Source, node: Node<'_>) -> String {
        format!("{}{}{}", file.browse_url, self.opts.line_anchor, line_of(node))
    }

    fn func(&self, node: Node<'_>, src: &str, file: &Source) -> Option<Func> {
        let name = text(node.child_by_field_name("name")?, src).to_string();
        let body = node.child_by_field_name("body");
        let decl_end = body.map_or(node.end_byte(), |b| b.start_byte());
        let decl = src[node.start_byte()..decl_end].trim_end().to_string();
        let code = body.map(|b| block_inner(b, src).to_string()).unwrap_or_default();

        Some(Func {
            full_name: name.clone(),
            name,
            doc: doc_comment(node, src),
            decl,
            fmt_decl: String::new(),
            url: self.url(file, node),
            code,
            examples: Vec::new(),
        })
    }

    fn visit_method(&mut self, node: Node<'_>, src: &str, file: &Source) {
        let Some(mut func) = self.func(node, src, file) else {
            return;
        };
        let Some(receiver) = receiver_type_name(node, src) else {
            tracing::debug!(method = %func.name, "method without a named receiver type");
            return;
        };
        func.full_name = format!("{}_{}", receiver, func.name);
        self.methods.push((func, receiver));
    }

    fn visit_types(&mut self, decl: Node<'_>, src: &str, file: &Source) {
        let grouped = has_paren(decl);
        for spec in specs(decl, &["type_spec", "type_alias"]) {
            let Some(name) = spec.child_by_field_name("name").map(|n| text(n, src)) else {
                continue;
            };
            let mut doc = doc_comment(spec, src);
            if doc.is_empty() && !grouped {
                doc = doc_comment(decl, src);
            }
            let decl_text = if grouped {
                format!("type {}", text(spec, src))
            } else {
                text(decl, src).to_string()
            };

            self.types.push(Type {
                name: name.to_string(),
                doc,
                decl: decl_text,
                url: self.url(file, spec),
                ..Type::default()
            });
        }
    }

    fn visit_values(&mut self, decl: Node<'_>, src: &str, file: &Source, kind: ValueKind) {
        let spec_kind = match kind {
            ValueKind::Const => "const_spec",
            ValueKind::Var => "var_spec",
        };
        let first_name = specs(decl, &[spec_kind]).into_iter().find_map(|spec| {
            let mut cursor = spec.walk();
            let name = spec
                .children_by_field_name("name", &mut cursor)
                .next()
                .map(|n| text(n, src).to_string());
            name
        });
        let Some(name) = first_name else {
            return;
        };

        self.values.push((
            kind,
            Value {
                name,
                doc: doc_comment(decl, src),
                decl: text(decl, src).to_string(),
                fmt_decl: String::new(),
                url: self.url(file, decl),
            },
        ));
    }

    fn finish(self, mut pkg: Package) -> Result<Package> {
        let name = self.package_name.map(|(name, _)| name).unwrap_or_default();
        pkg.is_cmd = name == "main";
        pkg.name = name;
        if let Some((file, doc)) = self.doc {
            tracing::debug!(file = %file, "package documentation");
            pkg.synopsis = synopsis(&doc);
            pkg.doc = doc;
        }

        for (kind, value) in self.values {
            let exported = is_exported(&value.name);
            let list = match (kind, exported) {
                (ValueKind::Const, true) => &mut pkg.consts,
                (ValueKind::Const, false) => &mut pkg.iconsts,
                (ValueKind::Var, true) => &mut pkg.vars,
                (ValueKind::Var, false) => &mut pkg.ivars,
            };
            list.push(value);
        }

        let mut types = self.types;
        types.sort_by(|a, b| a.name.cmp(&b.name));
        // exported types first so association prefers them on a name clash
        types.sort_by_key(|t| !is_exported(&t.name));
        let index: HashMap<String, usize> = types
            .iter()
            .enumerate()
            .rev()
            .map(|(i, t)| (t.name.clone(), i))
            .collect();

        for (func, result) in self.funcs {
            match result.as_ref().and_then(|r| index.get(r)) {
                Some(&i) if is_exported(&func.name) => types[i].funcs.push(func),
                Some(&i) => types[i].ifuncs.push(func),
                None if is_exported(&func.name) => pkg.funcs.push(func),
                None => pkg.ifuncs.push(func),
            }
        }

        for (method, receiver) in self.methods {
            match index.get(&receiver) {
                Some(&i) if is_exported(&method.name) => types[i].methods.push(method),
                Some(&i) => types[i].imethods.push(method),
                None => {
                    tracing::debug!(method = %method.full_name, "dropping method of undeclared type");
                }
            }
        }

        for t in &mut types {
            for list in [&mut t.funcs, &mut t.ifuncs, &mut t.methods, &mut t.imethods] {
                list.sort_by(|a, b| a.name.cmp(&b.name));
            }
        }
        let (exported, internal): (Vec<Type>, Vec<Type>) =
            types.into_iter().partition(|t| is_exported(&t.name));
        pkg.types = exported;
        pkg.itypes = internal;

        pkg.funcs.sort_by(|a, b| a.name.cmp(&b.name));
        pkg.ifuncs.sort_by(|a, b| a.name.cmp(&b.name));

        pkg.imports = self.imports.into_iter().collect();
        pkg.test_imports = self
            .test_imports
            .into_iter()
            .filter(|p| *p != pkg.import_path)
            .collect();
        pkg.examples = self.examples;
        pkg.has_export = pkg.has_exports();
        pkg.has_example = !pkg.examples.is_empty();

        tracing::debug!(
            path = %pkg.import_path,
            funcs = pkg.funcs.len(),
            types = pkg.types.len(),
            examples = pkg.examples.len(),
            "walked package"
        );
        Ok(pkg)
    }
}

fn text<'s>(node: Node<'_>, src: &'s str) -> &'s str {
    &src[node.byte_range()]
}

fn line_of(node: Node<'_>) -> usize {
    node.start_position().row + 1
}

fn is_exported(name: &str) -> bool {
    name.chars().next().is_some_and(char::is_uppercase)
}

fn first_error(node: Node<'_>) -> Option<Node<'_>> {
    if node.is_error() || node.is_missing() {
        return Some(node);
    }
    let mut cursor = node.walk();
    let children: Vec<Node<'_>> = node.children(&mut cursor).collect();
    children
        .into_iter()
        .filter(|c| c.has_error())
        .find_map(first_error)
}

/// Files starting with an `ignore` build constraint are never compiled.
fn is_ignored(root: Node<'_>, src: &str) -> bool {
    let mut cursor = root.walk();
    let header: Vec<Node<'_>> = root
        .children(&mut cursor)
        .take_while(|n| n.kind() == "comment")
        .collect();
    header.into_iter().any(|n| {
        let comment = text(n, src);
        (comment.starts_with("//go:build") || comment.starts_with("// +build"))
            && comment.split_whitespace().any(|w| w == "ignore")
    })
}

/// Collects the comment block directly above `node`, skipping comments
/// that trail code on their own line.
fn doc_comment(node: Node<'_>, src: &str) -> String {
    let mut comments = Vec::new();
    let mut next_row = node.start_position().row;
    let mut current = node.prev_sibling();

    while let Some(prev) = current {
        if prev.kind() != "comment" || prev.end_position().row + 1 != next_row {
            break;
        }
        if let Some(before) = prev.prev_sibling()
            && before.kind() != "comment"
            && before.end_position().row == prev.start_position().row
        {
            break;
        }
        comments.push(text(prev, src));
        next_row = prev.start_position().row;
        current = prev.prev_sibling();
    }

    comments.reverse();
    clean_comment(&comments)
}

/// Named descendants of the given kinds, looking through `*_list` wrappers.
fn specs<'t>(node: Node<'t>, kinds: &[&str]) -> Vec<Node<'t>> {
    let mut out = Vec::new();
    let mut cursor = node.walk();
    for child in node.named_children(&mut cursor) {
        if kinds.contains(&child.kind()) {
            out.push(child);
        } else if child.kind().ends_with("_list") {
            out.extend(specs(child, kinds));
        }
    }
    out
}

fn has_paren(node: Node<'_>) -> bool {
    let mut cursor = node.walk();
    let found = node.children(&mut cursor).any(|c| c.kind() == "(");
    found
}

fn import_paths(decl: Node<'_>, src: &str) -> Vec<String> {
    specs(decl, &["import_spec"])
        .into_iter()
        .filter_map(|spec| spec.child_by_field_name("path"))
        .map(|path| text(path, src).trim_matches(|c| c == '"' || c == '`').to_string())
        .filter(|path| !path.is_empty())
        .collect()
}

fn block_inner<'s>(block: Node<'_>, src: &'s str) -> &'s str {
    let body = text(block, src);
    body.strip_prefix('{')
        .and_then(|b| b.strip_suffix('}'))
        .unwrap_or(body)
}

/// Name of the package-local type behind `node`, with pointers and type
/// arguments stripped. Qualified types belong to other packages.
fn base_type_name(node: Node<'_>, src: &str) -> Option<String> {
    match node.kind() {
        "type_identifier" => Some(text(node, src).to_string()),
        "pointer_type" | "parenthesized_type" => {
            node.named_child(0).and_then(|n| base_type_name(n, src))
        }
        "generic_type" => node
            .child_by_field_name("type")
            .and_then(|n| base_type_name(n, src)),
        _ => None,
    }
}

fn first_param_type<'t>(list: Node<'t>) -> Option<Node<'t>> {
    let mut cursor = list.walk();
    let param = list
        .named_children(&mut cursor)
        .find(|c| c.kind() == "parameter_declaration")?;
    param.child_by_field_name("type")
}

fn result_type_name(node: Node<'_>, src: &str) -> Option<String> {
    let result = node.child_by_field_name("result")?;
    let ty = if result.kind() == "parameter_list" {
        first_param_type(result)?
    } else {
        result
    };
    base_type_name(ty, src)
}

fn receiver_type_name(node: Node<'_>, src: &str) -> Option<String> {
    let receiver = node.child_by_field_name("receiver")?;
    base_type_name(first_param_type(receiver)?, src)
}

/// Builds an example from an `ExampleXxx()` function in a test file.
fn example(node: Node<'_>, src: &str) -> Option<Example> {
    let name = text(node.child_by_field_name("name")?, src);
    let suffix = name.strip_prefix("Example")?;
    if suffix.chars().next().is_some_and(char::is_lowercase) {
        return None;
    }
    let params = node.child_by_field_name("parameters")?;
    if params.named_child_count() != 0 || node.child_by_field_name("type_parameters").is_some() {
        return None;
    }

    let body = node.child_by_field_name("body")?;
    let (code_end, output) = example_output(body, src);
    let code_start = (body.start_byte() + 1).min(code_end);

    Some(Example {
        name: suffix.to_string(),
        doc: doc_comment(node, src),
        code: dedent_body(&src[code_start..code_end]),
        output,
        used: false,
    })
}

/// Finds the `// Output:` comment of an example body. Returns where the
/// example code ends and the expected output.
fn example_output(body: Node<'_>, src: &str) -> (usize, String) {
    let mut comments = Vec::new();
    collect_body_comments(body, &mut comments);
    comments.sort_by_key(|c| c.start_byte());

    for (i, comment) in comments.iter().enumerate() {
        let line = comment_line(text(*comment, src));
        let rest = line
            .strip_prefix("Output:")
            .or_else(|| line.strip_prefix("Unordered output:"));
        let Some(rest) = rest else {
            continue;
        };

        let mut lines = Vec::new();
        if !rest.trim().is_empty() {
            lines.push(rest.trim().to_string());
        }
        let mut row = comment.start_position().row;
        for next in &comments[i + 1..] {
            if next.start_position().row != row + 1 {
                break;
            }
            lines.push(comment_line(text(*next, src)).to_string());
            row = next.start_position().row;
        }

        let output = if lines.is_empty() {
            String::new()
        } else {
            lines.join("\n") + "\n"
        };
        return (comment.start_byte(), output);
    }

    (body.end_byte().saturating_sub(1), String::new())
}

fn collect_body_comments<'t>(node: Node<'t>, out: &mut Vec<Node<'t>>) {
    let mut cursor = node.walk();
    for child in node.named_children(&mut cursor) {
        match child.kind() {
            "comment" => out.push(child),
            "statement_list" => collect_body_comments(child, out),
            _ => {}
        }
    }
}

fn comment_line(comment: &str) -> &str {
    comment
        .strip_prefix("//")
        .map(|rest| rest.strip_prefix(' ').unwrap_or(rest))
        .unwrap_or(comment)
        .trim_end()
}

/// Drops surrounding blank lines and one level of indentation.
fn dedent_body(code: &str) -> String {
    let lines: Vec<&str> = code.lines().collect();
    let start = lines
        .iter()
        .position(|l| !l.trim().is_empty())
        .unwrap_or(lines.len());
    let end = lines
        .iter()
        .rposition(|l| !l.trim().is_empty())
        .map_or(start, |i| i + 1);

    lines[start..end]
        .iter()
        .map(|l| l.strip_prefix('\t').unwrap_or(l))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    const DEMO: &str = r#"// Package demo provides demos.
package demo

import (
	"fmt"
	"strings"
)

// Max is the limit.
const Max = 10

const (
	a = iota
	b
)

// ErrBad is returned for bad input.
var ErrBad = fmt.Errorf("bad")

// Conn is a connection.
type Conn struct {
	name string
}

// Dial opens a Conn.
func Dial(name string) (*Conn, error) {
	return &Conn{name: strings.ToLower(name)}, nil
}

func newConn() *Conn { return &Conn{} }

// Close closes c.
func (c *Conn) Close() error {
	return nil
}

func (c *Conn) reset() {}

// Hello prints a greeting.
func Hello() {
	fmt.Println("hi")
}

type state int
"#;

    const DEMO_TEST: &str = r#"package demo_test

import (
	"fmt"
	"testing"

	"github.com/a/demo"
)

func ExampleDial() {
	c, _ := demo.Dial("x")
	fmt.Println(c != nil)
	// Output: true
}

// This example closes.
func ExampleConn_Close() {
	c, _ := demo.Dial("x")
	c.Close()
}

func Examplehelper() {}

func TestX(t *testing.T) {}
"#;

    fn source(name: &str, data: &str) -> Source {
        let mut source = Source::new(
            name,
            format!("https://github.com/a/demo/blob/master/{}", name),
            format!("https://raw.githubusercontent.com/a/demo/master/{}", name),
        );
        source.data = data.as_bytes().to_vec();
        source
    }

    fn opts() -> WalkOptions {
        WalkOptions {
            import_path: "github.com/a/demo".into(),
            line_anchor: "#L".into(),
        }
    }

    fn demo() -> Package {
        build(
            &[source("demo.go", DEMO), source("demo_test.go", DEMO_TEST)],
            &opts(),
        )
        .unwrap()
    }

    #[test]
    fn test_package_doc() {
        let pkg = demo();
        assert_eq!(pkg.name, "demo");
        assert_eq!(pkg.doc, "Package demo provides demos.\n");
        assert_eq!(pkg.synopsis, "Package demo provides demos.");
        assert!(!pkg.is_cmd);
        assert!(pkg.has_export);
    }

    #[test]
    fn test_values_split_by_visibility() {
        let pkg = demo();
        assert_eq!(pkg.consts.len(), 1);
        assert_eq!(pkg.consts[0].name, "Max");
        assert_eq!(pkg.consts[0].doc, "Max is the limit.\n");
        assert_eq!(pkg.consts[0].decl, "const Max = 10");
        assert_eq!(pkg.iconsts.len(), 1);
        assert_eq!(pkg.iconsts[0].name, "a");
        assert_eq!(pkg.vars[0].name, "ErrBad");
        assert!(pkg.ivars.is_empty());
    }

    #[test]
    fn test_type_association() {
        let pkg = demo();
        assert_eq!(pkg.types.len(), 1);
        let conn = &pkg.types[0];
        assert_eq!(conn.name, "Conn");
        assert_eq!(conn.doc, "Conn is a connection.\n");
        assert_eq!(conn.decl, "type Conn struct {\n\tname string\n}");
        assert_eq!(conn.funcs[0].name, "Dial");
        assert_eq!(conn.ifuncs[0].name, "newConn");
        assert_eq!(conn.methods[0].name, "Close");
        assert_eq!(conn.methods[0].full_name, "Conn_Close");
        assert_eq!(conn.imethods[0].name, "reset");

        assert_eq!(pkg.funcs.len(), 1);
        assert_eq!(pkg.funcs[0].name, "Hello");
        assert_eq!(pkg.itypes[0].name, "state");
    }

    #[test]
    fn test_func_decl_code_and_url() {
        let pkg = demo();
        let dial = &pkg.types[0].funcs[0];
        assert_eq!(dial.decl, "func Dial(name string) (*Conn, error)");
        assert_eq!(dial.doc, "Dial opens a Conn.\n");
        assert_eq!(
            dial.code,
            "\n\treturn &Conn{name: strings.ToLower(name)}, nil\n"
        );
        assert_eq!(dial.url, "https://github.com/a/demo/blob/master/demo.go#L26");
    }

    #[test]
    fn test_imports() {
        let pkg = demo();
        assert_eq!(pkg.imports, vec!["fmt", "strings"]);
        assert_eq!(pkg.test_imports, vec!["fmt", "testing"]);
        assert_eq!(pkg.files.len(), 1);
        assert_eq!(pkg.test_files.len(), 1);
        assert!(pkg.files[0].data.is_empty());
    }

    #[test]
    fn test_examples() {
        let pkg = demo();
        assert_eq!(pkg.examples.len(), 2);
        let dial = &pkg.examples[0];
        assert_eq!(dial.name, "Dial");
        assert_eq!(dial.code, "c, _ := demo.Dial(\"x\")\nfmt.Println(c != nil)");
        assert_eq!(dial.output, "true\n");

        let close = &pkg.examples[1];
        assert_eq!(close.name, "Conn_Close");
        assert_eq!(close.doc, "This example closes.\n");
        assert_eq!(close.output, "");
        assert!(pkg.has_example);
    }

    #[test]
    fn test_syntax_error_aborts() {
        let files = [
            source("demo.go", DEMO),
            source("broken.go", "package demo\n\nfunc ( {\n"),
        ];
        let err = build(&files, &opts()).unwrap_err();
        assert!(matches!(err, ExtractError::Syntax { ref file, .. } if file == "broken.go"));
    }

    #[test]
    fn test_multiple_packages() {
        let files = [
            source("a.go", "package a\n"),
            source("b.go", "package b\n"),
        ];
        assert!(matches!(
            build(&files, &opts()),
            Err(ExtractError::MultiplePackages { .. })
        ));
    }

    #[test]
    fn test_ignored_file_and_command() {
        let files = [
            source("main.go", "package main\n\nfunc main() {}\n"),
            source("gen.go", "//go:build ignore\n\npackage other\n"),
        ];
        let pkg = build(&files, &opts()).unwrap();
        assert!(pkg.is_cmd);
        assert_eq!(pkg.files.len(), 1);
    }

    #[test]
    fn test_readme_kept() {
        let files = [
            source("a.go", "package a\n"),
            source("README.md", "# demo"),
            source("README_ZH.md", "# 演示"),
        ];
        let pkg = build(&files, &opts()).unwrap();
        assert_eq!(pkg.readme.get("en").map(String::as_str), Some("# demo"));
        assert!(pkg.readme.contains_key("zh"));
    }

    #[test]
    fn test_doc_go_preferred() {
        let files = [
            source("a.go", "// Package a from a.go.\npackage a\n"),
            source("doc.go", "// Package a from doc.go.\npackage a\n"),
        ];
        let pkg = build(&files, &opts()).unwrap();
        assert_eq!(pkg.synopsis, "Package a from doc.go.");
    }

    #[test]
    fn test_trailing_comment_is_not_doc() {
        let src = "package a\n\nvar x = 1 // x\nfunc F() {}\n";
        let pkg = build(&[source("a.go", src)], &opts()).unwrap();
        assert_eq!(pkg.funcs[0].doc, "");
    }

    #[test]
    fn test_dedent_body() {
        assert_eq!(dedent_body("\n\ta()\n\t\tb()\n\t"), "a()\n\tb()");
        assert_eq!(dedent_body("\n"), "");
    }
}
