//! Page templates.
//!
//! The web front-end owns the real templates; [`BasicTemplate`] is a
//! self-contained default used by the command line tool and in tests.

use crate::escape::escape_html;
use crate::page::DocPage;
use gowalker_core::{Example, Func, Result, Type, Value};

/// Turns a [`DocPage`] into the HTML body that gets sharded.
///
/// Headings should close with `</b>` so the shard writer finds split
/// points between declarations.
pub trait PageTemplate: Send + Sync {
    fn render(&self, page: &DocPage) -> Result<String>;
}

/// Plain HTML layout: overview, index, declarations, examples, files.
#[derive(Debug, Clone, Copy, Default)]
pub struct BasicTemplate;

impl PageTemplate for BasicTemplate {
    fn render(&self, page: &DocPage) -> Result<String> {
        let mut out = String::with_capacity(16 * 1024);
        out.push_str(&format!(
            "<h2 id=\"pkg-overview\">package {}</h2>\n<p><code>import \"{}\"</code></p>\n",
            escape_html(&page.name),
            escape_html(&page.import_path)
        ));
        out.push_str(&page.doc_html);

        if !page.examples.is_empty() {
            examples(&mut out, &page.examples);
        }

        if page.has_export {
            index(&mut out, page);
        }
        if page.has_const {
            out.push_str("<h3 id=\"pkg-constants\"><b>Constants</b></h3>\n");
            values(&mut out, &page.consts);
        }
        if page.has_var {
            out.push_str("<h3 id=\"pkg-variables\"><b>Variables</b></h3>\n");
            values(&mut out, &page.vars);
        }
        for func in &page.funcs {
            func_section(&mut out, "func", func);
        }
        for t in &page.types {
            type_section(&mut out, t);
        }

        if page.has_file {
            out.push_str("<h3 id=\"pkg-files\"><b>Files</b></h3>\n<p>\n");
            for file in &page.files {
                out.push_str(&format!(
                    "<a href=\"{}\" target=\"_blank\">{}</a>\n",
                    escape_html(&file.browse_url),
                    escape_html(&file.name)
                ));
            }
            out.push_str("</p>\n");
        }
        if page.has_subdir {
            out.push_str("<h3 id=\"pkg-subdirectories\"><b>Subdirectories</b></h3>\n<ul>\n");
            for dir in &page.dirs {
                let path = format!("{}/{}", page.import_path, dir);
                out.push_str(&format!(
                    "<li><a href=\"/{}\">{}</a></li>\n",
                    escape_html(&path),
                    escape_html(dir)
                ));
            }
            out.push_str("</ul>\n");
        }
        Ok(out)
    }
}

fn index(out: &mut String, page: &DocPage) {
    out.push_str("<h3 id=\"pkg-index\"><b>Index</b></h3>\n<ul>\n");
    for func in &page.funcs {
        index_entry(out, &func.name, &func.decl);
    }
    for t in &page.types {
        index_entry(out, &t.name, &format!("type {}", t.name));
        for func in &t.funcs {
            index_entry(out, &func.name, &func.decl);
        }
        for method in &t.methods {
            index_entry(out, &format!("{}.{}", t.name, method.name), &method.decl);
        }
    }
    out.push_str("</ul>\n");
}

fn index_entry(out: &mut String, anchor: &str, label: &str) {
    out.push_str(&format!(
        "<li><a href=\"#{}\">{}</a></li>\n",
        escape_html(anchor),
        escape_html(label)
    ));
}

fn values(out: &mut String, values: &[Value]) {
    for value in values {
        out.push_str(&format!("<pre>{}</pre>\n{}", value.fmt_decl, value.doc));
    }
}

fn func_section(out: &mut String, anchor: &str, func: &Func) {
    let id = if anchor == "func" {
        func.name.clone()
    } else {
        format!("{}.{}", anchor, func.name)
    };
    out.push_str(&format!(
        "<h3 id=\"{}\"><b>func {}</b></h3>\n<pre>{}</pre>\n{}",
        escape_html(&id),
        escape_html(&func.name),
        func.fmt_decl,
        func.doc
    ));
    if !func.url.is_empty() {
        out.push_str(&format!(
            "<p><a href=\"{}\" target=\"_blank\">View source</a></p>\n",
            escape_html(&func.url)
        ));
    }
    examples(out, &func.examples);
}

fn type_section(out: &mut String, t: &Type) {
    out.push_str(&format!(
        "<h3 id=\"{0}\"><b>type {0}</b></h3>\n<pre>{1}</pre>\n{2}",
        escape_html(&t.name),
        t.fmt_decl,
        t.doc
    ));
    examples(out, &t.examples);
    for func in &t.funcs {
        func_section(out, "func", func);
    }
    for method in &t.methods {
        func_section(out, &t.name, method);
    }
}

fn examples(out: &mut String, examples: &[Example]) {
    for example in examples {
        let title = if example.name.is_empty() {
            "Example".to_string()
        } else {
            format!("Example ({})", example.name)
        };
        out.push_str(&format!(
            "<div class=\"example\"><b>{}</b>\n{}<pre>{}</pre>\n",
            escape_html(&title),
            example.doc,
            example.code
        ));
        if !example.output.is_empty() {
            out.push_str(&format!("<p>Output:</p>\n<pre>{}</pre>\n", escape_html(&example.output)));
        }
        out.push_str("</div>\n");
    }
}
