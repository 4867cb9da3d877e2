//! Read literal `define()` constants out of a site's `wp-config.php`.
//!
//! Only single- or double-quoted string literals are recognised, with PHP's
//! escape rules applied. Constants built from expressions
//! (`WP_CONTENT_DIR . '/mu-plugins'`) or interpolating double-quoted strings
//! are ignored.

use std::path::{Path, PathBuf};

use regex::Regex;

/// Values the tool cares about from `wp-config.php`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WpConfig {
    pub auth_salt: Option<String>,
    pub home: Option<String>,
    pub site_url: Option<String>,
    pub mu_plugin_dir: Option<PathBuf>,
}

impl WpConfig {
    /// Load `wp-config.php` from a WordPress root.
    ///
    /// Like WordPress itself, falls back to the parent directory when the file
    /// is not in the root. Returns `None` if neither location has one.
    pub fn load(wp_root: &Path) -> Option<Self> {
        let candidates = [
            Some(wp_root.join("wp-config.php")),
            wp_root.parent().map(|p| p.join("wp-config.php")),
        ];
        candidates
            .into_iter()
            .flatten()
            .find_map(|path| std::fs::read_to_string(path).ok())
            .map(|source| Self::parse(&source))
    }

    pub fn parse(source: &str) -> Self {
        let auth_salt = define_value(source, "AUTH_SALT");
        if auth_salt.is_none() && has_define(source, "AUTH_SALT") {
            tracing::warn!("AUTH_SALT in wp-config.php is not a plain string literal, ignoring it");
        }
        Self {
            auth_salt: auth_salt.filter(|s| !s.is_empty()),
            home: define_value(source, "WP_HOME"),
            site_url: define_value(source, "WP_SITEURL"),
            mu_plugin_dir: define_value(source, "WPMU_PLUGIN_DIR").map(PathBuf::from),
        }
    }

    /// Front-end base URL: `WP_HOME`, else `WP_SITEURL`.
    pub fn base_url(&self) -> Option<&str> {
        self.home.as_deref().or(self.site_url.as_deref())
    }
}

/// Value of the first `define( 'NAME', '<literal>' )` in `source`.
fn define_value(source: &str, name: &str) -> Option<String> {
    let pattern = format!(
        r#"define\s*\(\s*['"]{}['"]\s*,\s*(?:'((?:[^'\\]|\\.)*)'|"((?:[^"\\]|\\.)*)")\s*\)"#,
        regex::escape(name)
    );
    let Ok(re) = Regex::new(&pattern) else {
        return None;
    };
    source
        .lines()
        .filter(|line| !is_comment(line))
        .find_map(|line| {
            let caps = re.captures(line)?;
            match (caps.get(1), caps.get(2)) {
                (Some(single), _) => Some(unescape_single(single.as_str())),
                (None, Some(double)) => unescape_double(double.as_str()),
                (None, None) => None,
            }
        })
}

/// Whether a non-comment line starts a `define()` of `name`, literal or not.
fn has_define(source: &str, name: &str) -> bool {
    let pattern = format!(r#"define\s*\(\s*['"]{}['"]"#, regex::escape(name));
    let Ok(re) = Regex::new(&pattern) else {
        return false;
    };
    source
        .lines()
        .any(|line| !is_comment(line) && re.is_match(line))
}

/// Single-quoted PHP string: only `\'` and `\\` are escapes.
fn unescape_single(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some(next @ ('\'' | '\\')) => out.push(next),
            Some(next) => {
                out.push('\\');
                out.push(next);
            }
            None => out.push('\\'),
        }
    }
    out
}

/// Double-quoted PHP string. `None` when it interpolates a variable, since the
/// value then depends on runtime state.
fn unescape_double(raw: &str) -> Option<String> {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\\' => match chars.next() {
                Some('n') => out.push('\n'),
                Some('t') => out.push('\t'),
                Some('r') => out.push('\r'),
                Some(next @ ('"' | '\\' | '$')) => out.push(next),
                Some(next) => {
                    out.push('\\');
                    out.push(next);
                }
                None => out.push('\\'),
            },
            '$' if chars
                .peek()
                .is_some_and(|n| *n == '{' || *n == '_' || n.is_ascii_alphabetic()) =>
            {
                return None;
            }
            _ => out.push(c),
        }
    }
    Some(out)
}

fn is_comment(line: &str) -> bool {
    let trimmed = line.trim_start();
    trimmed.starts_with("//") || trimmed.starts_with('#') || trimmed.starts_with('*')
}
