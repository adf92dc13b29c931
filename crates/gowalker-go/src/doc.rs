//! Doc comment text handling.

/// Turns raw comment tokens (`// ...` lines or `/* ... */` blocks) into
/// plain documentation text ending in a newline.
///
/// Tool directives such as `//go:generate` are dropped.
pub fn clean_comment<S: AsRef<str>>(comments: &[S]) -> String {
    let mut lines: Vec<String> = Vec::new();
    for comment in comments {
        let comment = comment.as_ref();
        if let Some(rest) = comment.strip_prefix("//") {
            if is_directive(rest) {
                continue;
            }
            lines.push(rest.strip_prefix(' ').unwrap_or(rest).trim_end().to_string());
        } else if let Some(inner) = comment
            .strip_prefix("/*")
            .and_then(|c| c.strip_suffix("*/"))
        {
            lines.extend(dedent(inner.lines().map(str::trim_end).collect()));
        }
    }

    while lines.first().is_some_and(|l| l.is_empty()) {
        lines.remove(0);
    }
    while lines.last().is_some_and(|l| l.is_empty()) {
        lines.pop();
    }
    if lines.is_empty() {
        return String::new();
    }

    let mut text = lines.join("\n");
    text.push('\n');
    text
}

fn is_directive(rest: &str) -> bool {
    rest.starts_with("go:") || rest.starts_with("line ") || rest.starts_with(" +build")
}

/// Removes the common leading whitespace of all non-blank lines.
fn dedent(lines: Vec<&str>) -> Vec<String> {
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

/// Returns the first sentence of the first paragraph of `doc`, with
/// whitespace collapsed. Copyright and author headers yield an empty
/// synopsis.
///
/// # Examples
///
/// ```
/// use gowalker_go::synopsis;
///
/// let doc = "Package demo provides demos. It is small.\n\nMore text.\n";
/// assert_eq!(synopsis(doc), "Package demo provides demos.");
/// ```
pub fn synopsis(doc: &str) -> String {
    let paragraph: Vec<&str> = doc
        .lines()
        .skip_while(|l| l.trim().is_empty())
        .take_while(|l| !l.trim().is_empty())
        .collect();
    let text = paragraph.join(" ");
    let sentence = &text[..first_sentence_len(&text)];
    let collapsed = sentence.split_whitespace().collect::<Vec<_>>().join(" ");

    let lower = collapsed.to_lowercase();
    if ["copyright", "all rights", "author"]
        .iter()
        .any(|prefix| lower.starts_with(prefix))
    {
        return String::new();
    }
    collapsed
}

/// Length of the first sentence: up to a period followed by whitespace,
/// unless the period ends a single capital letter such as an initial.
fn first_sentence_len(s: &str) -> usize {
    let mut ppp = '\0';
    let mut pp = '\0';
    let mut p = '\0';
    for (i, c) in s.char_indices() {
        let q = if c.is_whitespace() { ' ' } else { c };
        if q == ' ' && p == '.' && (!pp.is_uppercase() || ppp.is_uppercase()) {
            return i;
        }
        if p == '。' || p == '．' {
            return i;
        }
        ppp = pp;
        pp = p;
        p = q;
    }
    s.len()
}
