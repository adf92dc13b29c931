//! Doc comment to HTML conversion.
//!
//! Follows the Go doc conventions: blank lines separate paragraphs,
//! indented lines form preformatted blocks, and a lone capitalized line
//! between two paragraphs is a heading. Bare URLs become links.

use crate::escape::escape_html;
use once_cell::sync::Lazy;
use regex::Regex;

static URL_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"https?://[^\s<>"']+"#).expect("valid URL regex")
});

#[derive(Debug, PartialEq, Eq)]
enum Block {
    Para(Vec<String>),
    Code(Vec<String>),
    Heading(String),
}

/// Converts plain doc text to HTML.
///
/// # Examples
///
/// ```
/// use gowalker_render::comment_to_html;
///
/// let html = comment_to_html("Intro.\n\n\tcode()\n");
/// assert_eq!(html, "<p>\nIntro.\n</p>\n<pre>code()</pre>\n");
/// ```
pub fn comment_to_html(doc: &str) -> String {
    let mut out = String::new();
    for block in blocks(doc) {
        match block {
            Block::Para(lines) => {
                out.push_str("<p>\n");
                for line in lines {
                    out.push_str(&linkify(&escape_html(&line)));
                    out.push('\n');
                }
                out.push_str("</p>\n");
            }
            Block::Code(lines) => {
                out.push_str("<pre>");
                out.push_str(&escape_html(&lines.join("\n")));
                out.push_str("</pre>\n");
            }
            Block::Heading(text) => {
                out.push_str(&format!(
                    "<h3 id=\"{}\">{}</h3>\n",
                    heading_id(&text),
                    escape_html(&text)
                ));
            }
        }
    }
    out
}

fn is_indented(line: &str) -> bool {
    line.starts_with(' ') || line.starts_with('\t')
}

fn blocks(doc: &str) -> Vec<Block> {
    let mut blocks = Vec::new();
    let mut para: Vec<String> = Vec::new();
    let mut code: Vec<String> = Vec::new();

    for line in doc.lines() {
        if line.trim().is_empty() {
            if !para.is_empty() {
                blocks.push(Block::Para(std::mem::take(&mut para)));
            }
            if !code.is_empty() {
                code.push(String::new());
            }
        } else if is_indented(line) {
            if !para.is_empty() {
                blocks.push(Block::Para(std::mem::take(&mut para)));
            }
            code.push(line.to_string());
        } else {
            if !code.is_empty() {
                blocks.push(Block::Code(unindent(std::mem::take(&mut code))));
            }
            para.push(line.to_string());
        }
    }
    if !para.is_empty() {
        blocks.push(Block::Para(para));
    }
    if !code.is_empty() {
        blocks.push(Block::Code(unindent(code)));
    }

    promote_headings(blocks)
}

/// Drops trailing blank lines and the indentation common to all lines.
fn unindent(mut lines: Vec<String>) -> Vec<String> {
    while lines.last().is_some_and(|l| l.trim().is_empty()) {
        lines.pop();
    }
    let indent = lines
        .iter()
        .filter(|l| !l.trim().is_empty())
        .map(|l| l.len() - l.trim_start().len())
        .min()
        .unwrap_or(0);
    lines
        .into_iter()
        .map(|l| l.get(indent..).unwrap_or("").to_string())
        .collect()
}

fn promote_headings(blocks: Vec<Block>) -> Vec<Block> {
    let is_para = |b: Option<&Block>| matches!(b, Some(Block::Para(_)));
    let heading_at: Vec<bool> = (0..blocks.len())
        .map(|i| {
            let single = matches!(&blocks[i], Block::Para(lines) if lines.len() == 1 && is_heading(&lines[0]));
            single && i > 0 && is_para(blocks.get(i - 1)) && is_para(blocks.get(i + 1))
        })
        .collect();

    blocks
        .into_iter()
        .zip(heading_at)
        .map(|(block, heading)| match block {
            Block::Para(mut lines) if heading => Block::Heading(lines.remove(0)),
            other => other,
        })
        .collect()
}

fn is_heading(line: &str) -> bool {
    let line = line.trim();
    let Some(first) = line.chars().next() else {
        return false;
    };
    let Some(last) = line.chars().next_back() else {
        return false;
    };
    first.is_uppercase()
        && last.is_alphanumeric()
        && !line.contains(|c: char| ",.;:!?+*/=()[]{}_^°&§~%#@<\">\\".contains(c))
}

fn heading_id(text: &str) -> String {
    let id: String = text
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { '_' })
        .collect();
    format!("hdr-{}", id)
}

/// Wraps URLs in escaped text with anchors.
fn linkify(escaped: &str) -> String {
    URL_PATTERN
        .replace_all(escaped, |caps: &regex::Captures<'_>| {
            let url = caps[0].trim_end_matches(['.', ',', ')', ';']);
            let rest = &caps[0][url.len()..];
            format!("<a href=\"{}\">{}</a>{}", url, url, rest)
        })
        .into_owned()
}
