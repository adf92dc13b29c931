//! `go-import` meta tag discovery for custom import paths.
//!
//! Vanity hosts answer `GET https://<path>?go-get=1` with an HTML page
//! whose head carries `<meta name="go-import" content="root vcs url">`.

use gowalker_core::{HttpFetcher, Result, WalkerError};
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

/// One accepted `go-import` declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GoImport {
    /// Import path prefix of the repository root.
    pub root: String,
    pub vcs: String,
    pub repo: String,
}

impl GoImport {
    /// The repository URL without scheme or `.vcs` suffix, e.g.
    /// `github.com/foo/bar` for `https://github.com/foo/bar.git`.
    pub fn repo_path(&self) -> &str {
        let without_scheme = self
            .repo
            .split_once("://")
            .map_or(self.repo.as_str(), |(_, rest)| rest);
        let suffix = format!(".{}", self.vcs);
        without_scheme
            .strip_suffix(suffix.as_str())
            .unwrap_or(without_scheme)
            .trim_end_matches('/')
    }
}

/// Extracts the `go-import` declaration that applies to `import_path`
/// from an HTML page. Parsing stops at `</head>` or `<body>`, and
/// malformed markup ends the scan instead of failing it.
///
/// # Errors
///
/// `AmbiguousMeta` when two declarations apply, `NotFound` when the
/// repository URL has no scheme.
///
/// # Examples
///
/// ```
/// use gowalker_vcs::meta::parse_go_imports;
///
/// let page = r#"<html><head>
/// <meta name="go-import" content="example.org/pkg git https://github.com/example/pkg">
/// </head></html>"#;
/// let found = parse_go_imports(page.as_bytes(), "example.org/pkg/sub", "https://example.org/pkg/sub")
///     .unwrap()
///     .unwrap();
/// assert_eq!(found.repo_path(), "github.com/example/pkg");
/// ```
pub fn parse_go_imports(body: &[u8], import_path: &str, url: &str) -> Result<Option<GoImport>> {
    let text = String::from_utf8_lossy(body);
    let mut reader = Reader::from_str(&text);
    let config = reader.config_mut();
    config.check_end_names = false;
    config.trim_text(true);

    let mut found: Option<GoImport> = None;
    loop {
        match reader.read_event() {
            Ok(Event::Start(e) | Event::Empty(e)) => {
                let name = e.name();
                let tag = name.as_ref();
                if tag.eq_ignore_ascii_case(b"body") {
                    break;
                }
                if !tag.eq_ignore_ascii_case(b"meta") {
                    continue;
                }
                let Some(candidate) = go_import(&e, import_path) else {
                    continue;
                };
                if found.is_some() {
                    return Err(WalkerError::AmbiguousMeta { url: url.to_string() });
                }
                found = Some(candidate);
            }
            Ok(Event::End(e)) if e.name().as_ref().eq_ignore_ascii_case(b"head") => break,
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => {
                tracing::debug!(url = %url, error = %e, "stopped scanning malformed page");
                break;
            }
        }
    }

    if let Some(import) = &found
        && !import.repo.contains("://")
    {
        return Err(WalkerError::not_found(
            import_path,
            format!("go-import repo {} has no scheme", import.repo),
        ));
    }
    Ok(found)
}

/// Returns the declaration of a `<meta name="go-import">` tag when it has
/// exactly three fields and its root prefixes `import_path` on a path
/// segment boundary.
fn go_import(e: &BytesStart<'_>, import_path: &str) -> Option<GoImport> {
    let mut name = None;
    let mut content = None;
    for attr in e.html_attributes().flatten() {
        let value = attr
            .unescape_value()
            .map(|v| v.into_owned())
            .unwrap_or_else(|_| String::from_utf8_lossy(&attr.value).into_owned());
        let key = attr.key.as_ref();
        if key.eq_ignore_ascii_case(b"name") {
            name = Some(value);
        } else if key.eq_ignore_ascii_case(b"content") {
            content = Some(value);
        }
    }
    if name.as_deref() != Some("go-import") {
        return None;
    }

    let content = content?;
    let fields: Vec<&str> = content.split_whitespace().collect();
    let [root, vcs, repo] = fields.as_slice() else {
        return None;
    };
    let applies = import_path == *root
        || import_path
            .strip_prefix(*root)
            .is_some_and(|rest| rest.starts_with('/'));
    applies.then(|| GoImport {
        root: (*root).to_string(),
        vcs: (*vcs).to_string(),
        repo: (*repo).to_string(),
    })
}

/// Fetches `<scheme>://<import_path>?go-get=1`, preferring HTTPS and
/// retrying once over plain HTTP.
async fn fetch_meta_page(http: &HttpFetcher, import_path: &str) -> Result<(String, Vec<u8>)> {
    let secure = format!("https://{}?go-get=1", import_path);
    match http.get_with_status(&secure).await {
        Ok((status, body)) if status.is_success() => return Ok((secure, body.to_vec())),
        Ok((status, _)) => tracing::debug!(url = %secure, status = status.as_u16(), "retrying over http"),
        Err(e) => tracing::debug!(url = %secure, error = %e, "retrying over http"),
    }

    let plain = format!("http://{}?go-get=1", import_path);
    let (status, body) = http.get_with_status(&plain).await?;
    if !status.is_success() {
        return Err(WalkerError::HttpStatus {
            url: plain,
            status: status.as_u16(),
        });
    }
    Ok((plain, body.to_vec()))
}

async fn fetch_go_import(http: &HttpFetcher, import_path: &str) -> Result<Option<GoImport>> {
    let (url, body) = fetch_meta_page(http, import_path).await?;
    parse_go_imports(&body, import_path, &url)
}

/// Discovers the repository of `import_path` from its meta tags.
///
/// When the declared root differs from `import_path`, the root page must
/// declare the same root and repository.
///
/// # Errors
///
/// `NotFound` when no tag applies, `ProjectRootMismatch` when the root
/// page disagrees, plus the errors of [`parse_go_imports`] and transport
/// errors.
pub async fn discover(http: &HttpFetcher, import_path: &str) -> Result<GoImport> {
    let import = fetch_go_import(http, import_path)
        .await?
        .ok_or_else(|| WalkerError::not_found(import_path, "no go-import meta tag"))?;

    if import.root != import_path {
        let confirmed = fetch_go_import(http, &import.root).await?;
        if confirmed.as_ref() != Some(&import) {
            return Err(WalkerError::ProjectRootMismatch {
                path: import_path.to_string(),
                root: import.root.clone(),
                other: confirmed.map(|c| c.root).unwrap_or_default(),
            });
        }
    }

    tracing::debug!(path = %import_path, root = %import.root, repo = %import.repo, "discovered go-import");
    Ok(import)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(metas: &[&str]) -> String {
        let tags: String = metas
            .iter()
            .map(|c| format!("<meta name=\"go-import\" content=\"{}\">\n", c))
            .collect();
        format!(
            "<!DOCTYPE html>\n<html><head><meta charset=utf-8>\n{}<script async src=x.js></script></head><body>x</body></html>",
            tags
        )
    }

    #[test]
    fn test_single_match() {
        let body = page(&["example.org/a git https://github.com/ex/a"]);
        let found = parse_go_imports(body.as_bytes(), "example.org/a/b", "u").unwrap();
        assert_eq!(
            found,
            Some(GoImport {
                root: "example.org/a".into(),
                vcs: "git".into(),
                repo: "https://github.com/ex/a".into(),
            })
        );
    }

    #[test]
    fn test_ambiguous() {
        let body = page(&[
            "example.org/a git https://github.com/ex/a",
            "example.org/a hg https://bitbucket.org/ex/a",
        ]);
        let err = parse_go_imports(body.as_bytes(), "example.org/a", "u").unwrap_err();
        assert!(matches!(err, WalkerError::AmbiguousMeta { .. }));
    }

    #[test]
    fn test_segment_boundary_and_field_count() {
        let body = page(&[
            "example.org/ab git https://github.com/ex/ab",
            "example.org/a git",
        ]);
        assert_eq!(parse_go_imports(body.as_bytes(), "example.org/a", "u").unwrap(), None);
    }

    #[test]
    fn test_repo_without_scheme() {
        let body = page(&["example.org/a git github.com/ex/a"]);
        let err = parse_go_imports(body.as_bytes(), "example.org/a", "u").unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_stops_at_body() {
        let body = "<html><head></head><body><meta name=\"go-import\" content=\"a.org/x git https://a.org/x\"></body>";
        assert_eq!(parse_go_imports(body.as_bytes(), "a.org/x", "u").unwrap(), None);
    }

    #[test]
    fn test_repo_path() {
        let import = GoImport {
            root: "example.org/a".into(),
            vcs: "git".into(),
            repo: "https://github.com/ex/a.git".into(),
        };
        assert_eq!(import.repo_path(), "github.com/ex/a");
    }
}
