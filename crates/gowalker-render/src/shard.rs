//! Writes rendered pages as `document.write` script shards.
//!
//! Large pages are split so the browser can start drawing before the
//! whole page arrived. Split points sit right after a `/b>` marker so no
//! shard ends inside a tag.

use crate::escape::{escape_html, html_to_js};
use gowalker_core::Result;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Pages shorter than this are written as one file.
pub const SINGLE_SHARD_LIMIT: usize = 80_000;

/// Target size of each shard of a split page.
pub const SHARD_SIZE: usize = 40_000;

const SPLIT_MARKER: &[u8] = b"/b>";

/// Splits `content` into shards. Concatenating the result yields
/// `content` again.
///
/// # Examples
///
/// ```
/// use gowalker_render::split_shards;
///
/// assert_eq!(split_shards("<b>small</b>"), vec!["<b>small</b>"]);
/// ```
pub fn split_shards(content: &str) -> Vec<&str> {
    if content.len() < SINGLE_SHARD_LIMIT {
        return vec![content];
    }

    let bytes = content.as_bytes();
    let mut shards = Vec::new();
    let mut start = 0;
    while content.len() - start > SHARD_SIZE {
        let mut cut = start + SHARD_SIZE;
        while cut < bytes.len() && !bytes[..cut].ends_with(SPLIT_MARKER) {
            cut += 1;
        }
        shards.push(&content[start..cut]);
        start = cut;
    }
    if start < content.len() {
        shards.push(&content[start..]);
    }
    shards
}

/// Path of shard `index` for `doc_path`: `<doc_path>.js` for the first,
/// `<doc_path>-<index>.js` for the rest.
pub fn shard_path(dir: &Path, doc_path: &str, index: usize) -> PathBuf {
    if index == 0 {
        dir.join(format!("{}.js", doc_path))
    } else {
        dir.join(format!("{}-{}.js", doc_path, index))
    }
}

/// Path of the README shard for `lang`.
pub fn readme_path(dir: &Path, doc_path: &str, lang: &str) -> PathBuf {
    dir.join(format!("{}_RM_{}.js", doc_path, lang))
}

fn script(html: &str) -> String {
    format!("document.write(\"{}\")", html_to_js(html))
}

async fn write_file(path: &Path, contents: String) -> Result<()> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(path, contents).await?;
    Ok(())
}

/// Writes `content` as shards under `dir` and removes shards left over
/// from an earlier, longer rendering. Returns the number of shards.
pub async fn write_doc_shards(dir: &Path, doc_path: &str, content: &str) -> Result<usize> {
    let shards = split_shards(content);
    for (index, shard) in shards.iter().enumerate() {
        write_file(&shard_path(dir, doc_path, index), script(shard)).await?;
    }

    let mut stale = shards.len().max(1);
    loop {
        let path = shard_path(dir, doc_path, stale);
        if !tokio::fs::try_exists(&path).await? {
            break;
        }
        tokio::fs::remove_file(&path).await?;
        stale += 1;
    }

    tracing::debug!(path = %doc_path, shards = shards.len(), "wrote doc shards");
    Ok(shards.len())
}

/// Writes one preformatted README shard per language.
pub async fn write_readmes(
    dir: &Path,
    doc_path: &str,
    readmes: &BTreeMap<String, String>,
) -> Result<()> {
    for (lang, text) in readmes {
        let html = format!("<pre>{}</pre>", escape_html(text));
        write_file(&readme_path(dir, doc_path, lang), script(&html)).await?;
    }
    Ok(())
}

/// Whether the first shard of `doc_path` exists.
pub async fn has_doc_shards(dir: &Path, doc_path: &str) -> bool {
    tokio::fs::try_exists(shard_path(dir, doc_path, 0))
        .await
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn unwrap_script(js: &str) -> String {
        let inner = js
            .strip_prefix("document.write(\"")
            .and_then(|s| s.strip_suffix("\")"))
            .unwrap();
        inner
            .replace("\\n", "\n")
            .replace("\\\"", "\"")
            .replace("\\\\", "\\")
    }

    fn large_content() -> String {
        let mut content = "a".repeat(41_000);
        content.push_str("<b>x</b>");
        content.push_str(&"c".repeat(43_992));
        content
    }

    #[test]
    fn test_small_content_single_shard() {
        let content = "x".repeat(SINGLE_SHARD_LIMIT - 1);
        assert_eq!(split_shards(&content).len(), 1);
    }

    #[test]
    fn test_split_moves_forward_to_marker() {
        let content = large_content();
        assert_eq!(content.len(), 85_000);

        let shards = split_shards(&content);
        assert_eq!(shards.len(), 2);
        assert_eq!(shards[0].len(), 41_008);
        assert!(shards[0].ends_with("</b>"));
        assert_eq!(shards.concat(), content);
    }

    #[test]
    fn test_split_without_marker_keeps_rest() {
        let content = "z".repeat(90_000);
        let shards = split_shards(&content);
        assert_eq!(shards, vec![content.as_str()]);
    }

    #[test]
    fn test_shard_paths() {
        let dir = Path::new("/docs");
        assert_eq!(shard_path(dir, "a/b", 0), PathBuf::from("/docs/a/b.js"));
        assert_eq!(shard_path(dir, "a/b", 2), PathBuf::from("/docs/a/b-2.js"));
        assert_eq!(readme_path(dir, "a/b", "zh"), PathBuf::from("/docs/a/b_RM_zh.js"));
    }

    #[tokio::test]
    async fn test_write_and_reassemble() {
        let tmp = TempDir::new().unwrap();
        let content = large_content().replace("<b>x</b>", "<b>\"x\"\n</b>");

        let count = write_doc_shards(tmp.path(), "github.com/a/b", &content)
            .await
            .unwrap();
        assert_eq!(count, 2);

        let mut joined = String::new();
        for index in 0..count {
            let js = std::fs::read_to_string(shard_path(tmp.path(), "github.com/a/b", index)).unwrap();
            joined.push_str(&unwrap_script(&js));
        }
        assert_eq!(joined, content);
        assert!(has_doc_shards(tmp.path(), "github.com/a/b").await);
    }

    #[tokio::test]
    async fn test_stale_shards_removed() {
        let tmp = TempDir::new().unwrap();
        write_doc_shards(tmp.path(), "p", &large_content()).await.unwrap();
        assert!(shard_path(tmp.path(), "p", 1).exists());

        write_doc_shards(tmp.path(), "p", "<b>short</b>").await.unwrap();
        assert!(shard_path(tmp.path(), "p", 0).exists());
        assert!(!shard_path(tmp.path(), "p", 1).exists());
    }

    #[tokio::test]
    async fn test_readmes() {
        let tmp = TempDir::new().unwrap();
        let mut readmes = BTreeMap::new();
        readmes.insert("en".to_string(), "# Title <x>".to_string());
        write_readmes(tmp.path(), "p", &readmes).await.unwrap();

        let js = std::fs::read_to_string(readme_path(tmp.path(), "p", "en")).unwrap();
        assert_eq!(js, "document.write(\"<pre># Title &lt;x&gt;</pre>\")");
    }
}
