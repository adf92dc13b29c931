//! Predicates over file names and import paths.

/// Reports whether a file contributes to a package's documentation:
/// `.go` sources not starting with `_` or `.`, and README files.
///
/// # Examples
///
/// ```
/// use gowalker_go::is_doc_file;
///
/// assert!(is_doc_file("conn.go"));
/// assert!(is_doc_file("README.md"));
/// assert!(!is_doc_file("_gen.go"));
/// assert!(!is_doc_file("Makefile"));
/// ```
pub fn is_doc_file(name: &str) -> bool {
    let go_source = name.ends_with(".go") && !name.starts_with('_') && !name.starts_with('.');
    go_source || is_readme(name)
}

pub fn is_readme(name: &str) -> bool {
    name.get(..6)
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case("readme"))
}

/// Language code of a README file: `README_ZH.md` is `zh`, anything
/// without a suffix is `en`.
pub fn readme_lang(name: &str) -> String {
    let stem = name.split('.').next().unwrap_or(name);
    match stem.split_once('_') {
        Some((_, lang)) if !lang.is_empty() => lang.to_ascii_lowercase(),
        _ => "en".to_string(),
    }
}

/// Reports whether a directory name should be walked for subpackages.
pub fn is_package_dir(name: &str) -> bool {
    !(name.is_empty() || name.starts_with('.') || name.starts_with('_') || name == "testdata")
}

/// Reports whether `path` names a standard library package: its first
/// element is not a host name.
pub fn is_go_repo_path(path: &str) -> bool {
    let first = path.split('/').next().unwrap_or(path);
    !first.is_empty() && !first.contains('.') && !first.contains(':')
}
