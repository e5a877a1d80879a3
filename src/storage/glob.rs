//! Path glob matching
//!
//! Supports `*` and `?` inside one path segment, `**` across segments and
//! `[...]` character classes (`[!...]` negates).

use crate::error::{Error, Result};
use regex::Regex;

/// A compiled glob over `/`-separated relative paths
#[derive(Debug, Clone)]
pub struct GlobPattern {
    pattern: String,
    regex: Regex,
    prefix: String,
}

impl GlobPattern {
    /// Compile a glob pattern
    pub fn new(pattern: &str) -> Result<Self> {
        let pattern = pattern.trim_matches('/');
        if pattern.is_empty() {
            return Err(Error::config("glob pattern is empty"));
        }

        let regex = Regex::new(&glob_to_regex(pattern)?)
            .map_err(|e| Error::config(format!("Invalid glob '{pattern}': {e}")))?;

        Ok(Self {
            pattern: pattern.to_string(),
            regex,
            prefix: literal_prefix(pattern),
        })
    }

    /// The pattern as written
    pub fn as_str(&self) -> &str {
        &self.pattern
    }

    /// Leading directory segments that contain no wildcard
    ///
    /// Listing can start here instead of at the root.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Check a relative path against the pattern
    pub fn is_match(&self, path: &str) -> bool {
        self.regex.is_match(path.trim_start_matches('/'))
    }
}

impl std::fmt::Display for GlobPattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.pattern)
    }
}

fn has_wildcard(segment: &str) -> bool {
    segment.contains(['*', '?', '['])
}

fn literal_prefix(pattern: &str) -> String {
    let segments: Vec<&str> = pattern.split('/').collect();
    let dirs = &segments[..segments.len().saturating_sub(1)];
    dirs.iter()
        .take_while(|s| !has_wildcard(s))
        .copied()
        .collect::<Vec<_>>()
        .join("/")
}

fn glob_to_regex(pattern: &str) -> Result<String> {
    let chars: Vec<char> = pattern.chars().collect();
    let mut out = String::from("^");
    let mut i = 0;

    while i < chars.len() {
        match chars[i] {
            '*' if chars.get(i + 1) == Some(&'*') => {
                i += 2;
                if chars.get(i) == Some(&'/') {
                    // `**/` also matches zero directories
                    out.push_str("(?:.*/)?");
                    i += 1;
                } else {
                    out.push_str(".*");
                }
                continue;
            }
            '*' => out.push_str("[^/]*"),
            '?' => out.push_str("[^/]"),
            '[' => {
                let start = i + 1;
                let mut end = start;
                if matches!(chars.get(end), Some('!' | '^')) {
                    end += 1;
                }
                // A `]` right after the opening bracket is literal
                if chars.get(end) == Some(&']') {
                    end += 1;
                }
                while end < chars.len() && chars[end] != ']' {
                    end += 1;
                }
                if end >= chars.len() {
                    return Err(Error::config(format!(
                        "Invalid glob '{pattern}': unclosed character class"
                    )));
                }

                out.push('[');
                let mut body: String = chars[start..end].iter().collect();
                if let Some(rest) = body.strip_prefix('!') {
                    body = format!("^{rest}");
                }
                out.push_str(&body.replace('\\', "\\\\").replace('[', "\\["));
                out.push(']');
                i = end;
            }
            c => out.push_str(&regex::escape(&c.to_string())),
        }
        i += 1;
    }

    out.push('$');
    Ok(out)
}
