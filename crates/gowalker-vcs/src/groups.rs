//! Named captures of a resolved import path.

use regex::Captures;
use std::collections::BTreeMap;

/// Values a service pattern captured from an import path (`owner`,
/// `repo`, `dir`, ...) plus `import_path` and `tag`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatchGroups {
    values: BTreeMap<String, String>,
}

impl MatchGroups {
    /// Collects the named captures of `caps`. Groups that did not
    /// participate in the match are stored as empty strings.
    pub fn from_captures(names: regex::CaptureNames<'_>, caps: &Captures<'_>) -> Self {
        let values = names
            .flatten()
            .map(|name| {
                let value = caps.name(name).map_or("", |m| m.as_str());
                (name.to_string(), value.to_string())
            })
            .collect();
        Self { values }
    }

    pub fn get(&self, key: &str) -> &str {
        self.values.get(key).map_or("", String::as_str)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.insert(key.into(), value.into());
    }

    pub fn owner(&self) -> &str {
        self.get("owner")
    }

    pub fn repo(&self) -> &str {
        self.get("repo")
    }

    /// Directory below the repository root, `""` or starting with `/`.
    pub fn dir(&self) -> &str {
        self.get("dir")
    }

    pub fn import_path(&self) -> &str {
        self.get("import_path")
    }

    pub fn tag(&self) -> &str {
        self.get("tag")
    }

    /// Replaces `{name}` with the group value and `{0}`, `{1}`, ... with
    /// `args`. Unknown placeholders are left as they are.
    ///
    /// # Examples
    ///
    /// ```
    /// use gowalker_vcs::MatchGroups;
    ///
    /// let mut groups = MatchGroups::default();
    /// groups.insert("owner", "golang");
    /// groups.insert("repo", "go");
    /// assert_eq!(
    ///     groups.expand("{owner}/{repo}/{0}", &["src"]),
    ///     "golang/go/src"
    /// );
    /// ```
    pub fn expand(&self, template: &str, args: &[&str]) -> String {
        let mut out = String::with_capacity(template.len() + 32);
        let mut rest = template;
        while let Some(open) = rest.find('{') {
            out.push_str(&rest[..open]);
            let after = &rest[open + 1..];
            let Some(close) = after.find('}') else {
                out.push_str(&rest[open..]);
                return out;
            };
            let key = &after[..close];
            match key.parse::<usize>() {
                Ok(i) if i < args.len() => out.push_str(args[i]),
                Ok(_) => out.push_str(&rest[open..=open + close + 1]),
                Err(_) if self.values.contains_key(key) => out.push_str(self.get(key)),
                Err(_) => out.push_str(&rest[open..=open + close + 1]),
            }
            rest = &after[close + 1..];
        }
        out.push_str(rest);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use regex::Regex;

    #[test]
    fn test_from_captures() {
        let re = Regex::new(r"^(?P<owner>\w+)/(?P<repo>\w+)(?P<dir>/.*)?$").unwrap();
        let caps = re.captures("foo/bar").unwrap();
        let groups = MatchGroups::from_captures(re.capture_names(), &caps);
        assert_eq!(groups.owner(), "foo");
        assert_eq!(groups.repo(), "bar");
        assert_eq!(groups.dir(), "");
    }

    #[test]
    fn test_expand() {
        let mut groups = MatchGroups::default();
        groups.insert("owner", "a");
        groups.insert("tag", "v1");
        assert_eq!(groups.expand("{owner}@{tag}", &[]), "a@v1");
        assert_eq!(groups.expand("{missing}/{3}", &["x"]), "{missing}/{3}");
        assert_eq!(groups.expand("open {brace", &[]), "open {brace");
    }
}
