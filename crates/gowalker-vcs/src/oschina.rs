//! git.oschina.net: the whole repository comes as one zip archive whose
//! comment holds the commit id.

use crate::groups::MatchGroups;
use crate::service::{FetchedTree, ProjectMeta, Service};
use crate::tree::{dir_prefix, file_name, partition_manifest};
use async_trait::async_trait;
use gowalker_core::{HttpFetcher, Result, Source, WalkerError};
use once_cell::sync::Lazy;
use regex::Regex;
use std::io::{Cursor, Read};
use zip::ZipArchive;

static OSCHINA_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^git\.oschina\.net/(?P<owner>[a-z0-9A-Z_.\-]+)/(?P<repo>[a-z0-9A-Z_.\-]+)(?P<dir>/[a-z0-9A-Z_.\-/]*)?$",
    )
    .expect("valid OSChina pattern")
});

const DEFAULT_BRANCH: &str = "master";

const PROJECT_URL: &str = "{0}/{owner}/{repo}";
const ARCHIVE_URL: &str = "{0}/{owner}/{repo}/repository/archive?ref={1}";
const BLOB_URL: &str = "{0}/{owner}/{repo}/blob/{1}/{2}";
const RAW_URL: &str = "{0}/{owner}/{repo}/raw/{1}/{2}";
const TREE_URL: &str = "{0}/{owner}/{repo}/tree/{1}{dir}";

fn archive_error(e: zip::result::ZipError) -> WalkerError {
    WalkerError::Archive(e.to_string())
}

pub struct OschinaService {
    base_url: String,
}

impl OschinaService {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }
}

impl Default for OschinaService {
    fn default() -> Self {
        Self::new("http://git.oschina.net")
    }
}

#[async_trait]
impl Service for OschinaService {
    fn name(&self) -> &'static str {
        "oschina"
    }

    fn prefix(&self) -> &str {
        "git.oschina.net/"
    }

    fn pattern(&self) -> &Regex {
        &OSCHINA_PATTERN
    }

    async fn fetch_tree(
        &self,
        http: &HttpFetcher,
        groups: &MatchGroups,
        tag: &str,
        saved_revision: &str,
    ) -> Result<FetchedTree> {
        let base = self.base_url.as_str();
        let tag = if tag.is_empty() { DEFAULT_BRANCH } else { tag };
        let encoded_tag = urlencoding::encode(tag);
        let archive_url = groups.expand(ARCHIVE_URL, &[base, encoded_tag.as_ref()]);

        let body = http.get_bytes(&archive_url, None).await?;
        let mut archive = ZipArchive::new(Cursor::new(body)).map_err(archive_error)?;
        let revision = String::from_utf8_lossy(archive.comment()).trim().to_string();
        if revision == saved_revision {
            return Err(WalkerError::NotModified);
        }

        let member_prefix = format!("{}/", groups.repo());
        let members: Vec<String> = archive
            .file_names()
            .filter_map(|name| name.strip_prefix(&member_prefix))
            .filter(|name| !name.ends_with('/'))
            .map(str::to_string)
            .collect();
        let partition = partition_manifest(&members, &dir_prefix(groups.dir()));
        if !partition.has_go_files() && partition.dirs.is_empty() {
            return Err(WalkerError::NoSourceFiles {
                path: groups.import_path().to_string(),
            });
        }

        let mut files = Vec::with_capacity(partition.files.len());
        for path in &partition.files {
            let mut entry = archive
                .by_name(&format!("{}{}", member_prefix, path))
                .map_err(archive_error)?;
            let mut data = Vec::with_capacity(entry.size() as usize);
            entry.read_to_end(&mut data)?;

            let mut source = Source::new(
                file_name(path),
                groups.expand(BLOB_URL, &[base, tag, path]),
                groups.expand(RAW_URL, &[base, tag, path]),
            );
            source.data = data;
            files.push(source);
        }

        tracing::debug!(path = %groups.import_path(), files = files.len(), "read OSChina archive");
        Ok(FetchedTree {
            files,
            dirs: partition.dirs,
            revision,
            project: ProjectMeta {
                root: groups.expand(PROJECT_URL, &["git.oschina.net"]),
                name: groups.repo().to_string(),
                url: groups.expand(PROJECT_URL, &[base]),
                view_dir_path: groups.expand(TREE_URL, &[base, tag]),
                vcs: "git".into(),
            },
            line_anchor: "#L".into(),
            stars: 0,
        })
    }
}
