//! Source highlighting with cross-links.
//!
//! [`Tokenizer`] cuts source text into segments with a small state machine:
//! identifier runs (including their terminating character), string
//! literals, and comments. [`format_code`] turns the segments into HTML,
//! marking reserved words and linking names found in a [`Link`] table.

use crate::escape::escape_html;
use crate::links::{Link, find_link};

const TAB: &str = "    ";

/// What a [`Segment`] contains.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentKind {
    /// An identifier run plus the character that ended it, or a lone
    /// punctuation/whitespace character.
    Word,
    Str,
    Comment,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segment<'a> {
    pub kind: SegmentKind,
    pub text: &'a str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Scanning,
    InString(char),
    /// Saw the `/` that opens a comment; the next character decides which.
    CommentOpen,
    InLineComment,
    /// Byte index of the opening `*`.
    InBlockComment(usize),
}

/// Iterator over the highlight segments of `src`.
///
/// Concatenating all segment texts yields `src` again.
///
/// # Examples
///
/// ```
/// use gowalker_render::highlight::{SegmentKind, Tokenizer};
///
/// let kinds: Vec<_> = Tokenizer::new("x := \"a\" // c")
///     .map(|s| s.kind)
///     .collect();
/// assert!(kinds.contains(&SegmentKind::Str));
/// assert_eq!(kinds.last(), Some(&SegmentKind::Comment));
/// ```
#[derive(Debug, Clone)]
pub struct Tokenizer<'a> {
    src: &'a str,
    pos: usize,
}

impl<'a> Tokenizer<'a> {
    pub fn new(src: &'a str) -> Self {
        Self { src, pos: 0 }
    }

    fn prev(&self, i: usize) -> Option<char> {
        self.src[..i].chars().next_back()
    }

    fn next_char(&self, i: usize, c: char) -> Option<char> {
        self.src[i + c.len_utf8()..].chars().next()
    }

    /// A quote is escaped by a single preceding backslash, not by `\\`.
    fn is_escaped(&self, i: usize) -> bool {
        let mut before = self.src[..i].chars().rev();
        before.next() == Some('\\') && before.next() != Some('\\')
    }

    /// Advances the machine by one character. Returns the new state and
    /// whether the segment ends with this character.
    fn step(&self, state: State, i: usize, c: char) -> (State, bool) {
        if c.is_ascii_alphabetic() {
            return (state, false);
        }
        match state {
            State::Scanning => match c {
                '"' | '\'' | '`' => (State::InString(c), false),
                '/' if matches!(self.next_char(i, c), Some('/' | '*')) => {
                    (State::CommentOpen, false)
                }
                '0'..='9' | '.' => (state, false),
                '_' if self.prev(i) != Some(' ') => (state, false),
                _ => (state, true),
            },
            State::InString(quote) => (state, c == quote && !self.is_escaped(i)),
            State::CommentOpen if c == '*' => (State::InBlockComment(i), false),
            State::CommentOpen => (State::InLineComment, false),
            State::InLineComment => (state, c == '\n'),
            State::InBlockComment(star) => (
                state,
                c == '/' && i > star + 1 && self.prev(i) == Some('*'),
            ),
        }
    }
}

impl<'a> Iterator for Tokenizer<'a> {
    type Item = Segment<'a>;

    fn next(&mut self) -> Option<Segment<'a>> {
        if self.pos >= self.src.len() {
            return None;
        }

        let start = self.pos;
        let mut state = State::Scanning;
        let mut end = self.src.len();
        for (offset, c) in self.src[start..].char_indices() {
            let i = start + offset;
            let (next, stop) = self.step(state, i, c);
            state = next;
            if stop {
                end = i + c.len_utf8();
                break;
            }
        }
        self.pos = end;

        let kind = match state {
            State::Scanning => SegmentKind::Word,
            State::InString(_) => SegmentKind::Str,
            State::CommentOpen | State::InLineComment | State::InBlockComment(_) => {
                SegmentKind::Comment
            }
        };
        let src = self.src;
        Some(Segment {
            kind,
            text: &src[start..end],
        })
    }
}

/// CSS class for Go's reserved words and predeclared identifiers.
pub fn keyword_class(word: &str) -> Option<&'static str> {
    match word {
        "return" | "break" => Some("ret"),
        "func" | "range" | "for" | "if" | "else" | "type" | "struct" | "select" | "case"
        | "var" | "const" | "switch" | "default" | "continue" | "chan" | "fallthrough"
        | "go" | "goto" | "import" | "interface" | "map" | "package" => Some("key"),
        "true" | "false" | "nil" => Some("boo"),
        "new" | "append" | "make" | "panic" | "recover" | "len" | "cap" | "copy" | "close"
        | "delete" | "defer" => Some("bui"),
        _ => None,
    }
}

/// Renders `code` as highlighted, cross-linked HTML.
///
/// # Examples
///
/// ```
/// use gowalker_render::{Link, format_code};
///
/// let links = vec![Link::new("Foo", "", "Foo does things.")];
/// let html = format_code("return Foo(x)", &links);
/// assert!(html.starts_with(r#"<span class="ret">return</span> "#));
/// assert!(html.contains(r##"href="#Foo">Foo</a>("##));
/// ```
pub fn format_code(code: &str, links: &[Link]) -> String {
    let mut out = String::with_capacity(code.len() * 2);
    for segment in Tokenizer::new(code) {
        match segment.kind {
            SegmentKind::Comment => push_span(&mut out, "com", segment.text),
            SegmentKind::Str => push_span(&mut out, "str", segment.text),
            SegmentKind::Word => render_word(segment.text, links, &mut out),
        }
    }
    out
}

fn is_word_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '.'
}

fn push_span(out: &mut String, class: &str, text: &str) {
    out.push_str(&format!(r#"<span class="{}">{}</span>"#, class, escape_html(text)));
}

fn push_plain(out: &mut String, text: &str) {
    out.push_str(&escape_html(text).replace('\t', TAB));
}

fn render_word(segment: &str, links: &[Link], out: &mut String) {
    if segment == "\t" {
        out.push_str(TAB);
        return;
    }
    // single-character words are never looked up
    if segment.chars().count() <= 2 {
        push_plain(out, segment);
        return;
    }

    let (word, tail) = match segment.chars().next_back() {
        Some(last) if !is_word_char(last) => segment.split_at(segment.len() - last.len_utf8()),
        _ => (segment, ""),
    };

    if let Some(class) = keyword_class(word) {
        out.push_str(&format!(r#"<span class="{}">{}</span>"#, class, word));
        push_plain(out, tail);
    } else if let Some(link) = find_link(word, links) {
        render_link(&link, out);
        push_plain(out, tail);
    } else if tail == " " {
        let word = escape_html(word);
        out.push_str(&format!(r#"<span id="{0}">{0}</span> "#, word));
    } else {
        push_plain(out, segment);
    }
}

fn render_link(link: &Link, out: &mut String) {
    let name = escape_html(&link.name);
    let title = escape_html(&link.comment);
    let anchor = if link.path.is_empty() {
        format!(r##"<a class="int" title="{}" href="#{}">{}</a>"##, title, name, name)
    } else if link.path.starts_with('#') {
        format!(
            r#"<a class="ext" title="{}" href="{}">{}</a>"#,
            title,
            escape_html(&link.path),
            name
        )
    } else {
        format!(
            r#"<a class="ext" title="{}" target="_blank" href="{}">{}</a>"#,
            title,
            escape_html(&link.path),
            name
        )
    };
    out.push_str(&anchor);
}
