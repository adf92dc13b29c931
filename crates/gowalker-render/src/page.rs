//! Turns a walked [`Package`] into the display data a page template needs.

use crate::comment::comment_to_html;
use crate::examples::claim_examples;
use crate::highlight::format_code;
use crate::links::{Link, package_links};
use gowalker_core::{Example, Func, Package, Source, Type, Value};
use serde::Serialize;

/// Everything a template needs to draw one package page.
///
/// Declaration docs are already HTML; declarations carry highlighted
/// `fmt_decl` and highlighted code.
#[derive(Debug, Clone, Default, Serialize)]
pub struct DocPage {
    pub import_path: String,
    pub name: String,
    pub project_name: String,
    pub project_url: String,
    pub view_dir_path: String,
    pub tag: String,
    pub synopsis: String,
    pub doc_html: String,

    pub is_cmd: bool,
    pub has_export: bool,
    pub has_const: bool,
    pub has_var: bool,
    pub has_example: bool,
    pub has_file: bool,
    pub has_subdir: bool,

    pub consts: Vec<Value>,
    pub iconsts: Vec<Value>,
    pub vars: Vec<Value>,
    pub ivars: Vec<Value>,
    pub funcs: Vec<Func>,
    pub ifuncs: Vec<Func>,
    pub types: Vec<Type>,
    pub itypes: Vec<Type>,
    /// Package-level examples left after every declaration claimed its own.
    pub examples: Vec<Example>,

    pub files: Vec<Source>,
    pub test_files: Vec<Source>,
    pub imports: Vec<String>,
    pub test_imports: Vec<String>,
    pub dirs: Vec<String>,

    pub stars: i64,
    pub views: i64,
    pub imported_num: i64,
}

struct Renderer {
    links: Vec<Link>,
    example_links: Vec<Link>,
    examples: Vec<Example>,
}

impl Renderer {
    fn value(&self, value: &Value) -> Value {
        Value {
            fmt_decl: format_code(&value.decl, &self.links),
            doc: comment_to_html(&value.doc),
            ..value.clone()
        }
    }

    fn example(&self, example: Example) -> Example {
        Example {
            code: format_code(&example.code, &self.example_links),
            doc: comment_to_html(&example.doc),
            ..example
        }
    }

    fn func(&mut self, func: &Func, type_name: &str) -> Func {
        let claimed = claim_examples(&mut self.examples, type_name, &func.name);
        let code = if func.code.is_empty() {
            String::new()
        } else {
            format_code(&format!("{{{}}}", func.code), &self.links)
        };
        Func {
            fmt_decl: format_code(&func.decl, &self.links),
            doc: comment_to_html(&func.doc),
            code,
            examples: claimed.into_iter().map(|e| self.example(e)).collect(),
            ..func.clone()
        }
    }

    fn funcs(&mut self, funcs: &[Func], type_name: &str) -> Vec<Func> {
        funcs.iter().map(|f| self.func(f, type_name)).collect()
    }

    /// Methods claim their examples before the type does, so `T_M`
    /// never ends up on `T`.
    fn type_(&mut self, t: &Type) -> Type {
        let funcs = self.funcs(&t.funcs, "");
        let ifuncs = self.funcs(&t.ifuncs, "");
        let methods = self.funcs(&t.methods, &t.name);
        let imethods = self.funcs(&t.imethods, &t.name);
        let claimed = claim_examples(&mut self.examples, "", &t.name);

        Type {
            name: t.name.clone(),
            doc: comment_to_html(&t.doc),
            decl: t.decl.clone(),
            fmt_decl: format_code(&t.decl, &self.links),
            url: t.url.clone(),
            funcs,
            ifuncs,
            methods,
            imethods,
            examples: claimed.into_iter().map(|e| self.example(e)).collect(),
        }
    }
}

/// Renders `pkg` for display.
///
/// Links cover the package's own types and functions plus one qualifier
/// per import; example code additionally links `<pkgname>.X` to this page.
///
/// # Examples
///
/// ```
/// use gowalker_core::{Func, Package};
/// use gowalker_render::render_package;
///
/// let pkg = Package {
///     import_path: "example.com/demo".into(),
///     funcs: vec![Func {
///         name: "Hello".into(),
///         decl: "func Hello() string".into(),
///         ..Func::default()
///     }],
///     ..Package::default()
/// };
///
/// let page = render_package(&pkg);
/// assert!(page.has_export);
/// assert!(page.funcs[0].fmt_decl.starts_with(r#"<span class="key">func</span>"#));
/// ```
pub fn render_package(pkg: &Package) -> DocPage {
    let links = package_links(pkg);
    let mut example_links = links.clone();
    example_links.push(Link::new(format!("{}.", pkg.base_name()), "", ""));

    let mut examples = pkg.examples.clone();
    for example in &mut examples {
        example.used = false;
    }

    let mut renderer = Renderer {
        links,
        example_links,
        examples,
    };

    let consts = pkg.consts.iter().map(|v| renderer.value(v)).collect();
    let iconsts = pkg.iconsts.iter().map(|v| renderer.value(v)).collect();
    let vars = pkg.vars.iter().map(|v| renderer.value(v)).collect();
    let ivars = pkg.ivars.iter().map(|v| renderer.value(v)).collect();
    let funcs = renderer.funcs(&pkg.funcs, "");
    let ifuncs = renderer.funcs(&pkg.ifuncs, "");
    let types = pkg.types.iter().map(|t| renderer.type_(t)).collect();
    let itypes = pkg.itypes.iter().map(|t| renderer.type_(t)).collect();
    let package_examples: Vec<Example> = claim_examples(&mut renderer.examples, "", "")
        .into_iter()
        .map(|e| renderer.example(e))
        .collect();

    let unclaimed = renderer.examples.iter().filter(|e| !e.used).count();
    if unclaimed > 0 {
        tracing::debug!(path = %pkg.import_path, unclaimed, "examples without a matching declaration");
    }

    DocPage {
        import_path: pkg.import_path.clone(),
        name: pkg.name.clone(),
        project_name: pkg.project_name.clone(),
        project_url: pkg.project_url.clone(),
        view_dir_path: pkg.view_dir_path.clone(),
        tag: pkg.tag.clone(),
        synopsis: pkg.synopsis.clone(),
        doc_html: comment_to_html(&pkg.doc),
        is_cmd: pkg.is_cmd,
        has_export: pkg.has_exports(),
        has_const: !pkg.consts.is_empty(),
        has_var: !pkg.vars.is_empty(),
        has_example: !pkg.examples.is_empty(),
        has_file: !pkg.files.is_empty(),
        has_subdir: !pkg.dirs.is_empty(),
        consts,
        iconsts,
        vars,
        ivars,
        funcs,
        ifuncs,
        types,
        itypes,
        examples: package_examples,
        files: pkg.files.clone(),
        test_files: pkg.test_files.clone(),
        imports: pkg.imports.clone(),
        test_imports: pkg.test_imports.clone(),
        dirs: pkg.dirs.clone(),
        stars: pkg.stars,
        views: pkg.views,
        imported_num: pkg.imported_num,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn example(name: &str, code: &str) -> Example {
        Example {
            name: name.into(),
            code: code.into(),
            ..Example::default()
        }
    }

    fn sample() -> Package {
        Package {
            import_path: "github.com/a/demo".into(),
            name: "demo".into(),
            doc: "Package demo demos.\n".into(),
            types: vec![Type {
                name: "Conn".into(),
                decl: "type Conn struct{}".into(),
                funcs: vec![Func {
                    name: "Dial".into(),
                    decl: "func Dial() *Conn".into(),
                    code: "\n\treturn &Conn{}\n".into(),
                    ..Func::default()
                }],
                methods: vec![Func {
                    name: "Close".into(),
                    decl: "func (c *Conn) Close() error".into(),
                    ..Func::default()
                }],
                ..Type::default()
            }],
            examples: vec![
                example("Conn_Close", "c := demo.Dial()\nc.Close()"),
                example("Conn", "var c demo.Conn"),
                example("", "demo.Dial()"),
            ],
            imports: vec!["io".into()],
            ..Package::default()
        }
    }

    #[test]
    fn test_examples_attached_once() {
        let page = render_package(&sample());
        let conn = &page.types[0];
        assert_eq!(conn.methods[0].examples.len(), 1);
        assert_eq!(conn.methods[0].examples[0].name, "Conn_Close");
        assert_eq!(conn.examples.len(), 1);
        assert_eq!(conn.examples[0].name, "Conn");
        assert_eq!(page.examples.len(), 1);
        assert!(page.has_example);
    }

    #[test]
    fn test_example_code_links_package_qualifier() {
        let page = render_package(&sample());
        let code = &page.examples[0].code;
        assert!(code.contains(r##"href="#Dial">demo.Dial</a>"##), "{}", code);
    }

    #[test]
    fn test_func_code_wrapped_in_braces() {
        let page = render_package(&sample());
        let dial = &page.types[0].funcs[0];
        assert!(dial.code.starts_with('{'));
        assert!(dial.code.ends_with('}'));
        assert!(dial.code.contains(r#"<span class="ret">return</span>"#));
    }

    #[test]
    fn test_type_links_in_declarations() {
        let page = render_package(&sample());
        let dial = &page.types[0].funcs[0];
        assert!(dial.fmt_decl.contains(r##"href="#Conn">Conn</a>"##));
    }

    #[test]
    fn test_flags_and_doc() {
        let page = render_package(&sample());
        assert!(page.has_export);
        assert!(!page.has_const);
        assert!(!page.has_file);
        assert_eq!(page.doc_html, "<p>\nPackage demo demos.\n</p>\n");
    }
}
