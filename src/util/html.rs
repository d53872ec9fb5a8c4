use std::collections::BTreeSet;

use once_cell::sync::Lazy;
use regex::Regex;

static TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]+>").expect("tag regex"));
static ANCHOR_OPEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)<a(\s[^>]*)?>").expect("anchor regex"));
static LINK_ATTR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)\s+(?:target|rel)\s*=\s*(?:"[^"]*"|'[^']*'|[^\s"'>]+)"#)
        .expect("link attribute regex")
});
static LINE_BREAK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)<br\s*/?>\s*").expect("line break regex"));

pub const DEFAULT_ALLOWED_TAGS: &[&str] = &["b", "strong", "i", "em", "a", "br"];

const SAFE_LINK_ATTRS: &str = r#" target="_blank" rel="noopener noreferrer""#;

/// Allow-list of inline tags that survive sanitization.
///
/// Only the tag markup of disallowed elements is removed; the text between an
/// opening and closing tag is kept. Attributes on allowed tags are left as
/// they are, so an `href="javascript:..."` or `onclick` on an allowed tag is
/// still present in the output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SanitizePolicy {
    allowed: BTreeSet<String>,
}

impl Default for SanitizePolicy {
    fn default() -> Self {
        Self::new(DEFAULT_ALLOWED_TAGS.iter().copied())
    }
}

impl SanitizePolicy {
    pub fn new<I, S>(tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let allowed = tags
            .into_iter()
            .map(|tag| tag.as_ref().trim().to_ascii_lowercase())
            .filter(|tag| !tag.is_empty())
            .collect();
        Self { allowed }
    }

    pub fn allows(&self, tag_name: &str) -> bool {
        self.allowed.contains(&tag_name.to_ascii_lowercase())
    }

    /// Remove every tag whose name is not on the allow-list, opening or
    /// closing, regardless of attributes.
    pub fn strip_disallowed(&self, html: &str) -> String {
        TAG.replace_all(html, |caps: &regex::Captures<'_>| {
            let tag = &caps[0];
            if self.allows(tag_name(tag)) {
                tag.to_string()
            } else {
                String::new()
            }
        })
        .into_owned()
    }

    /// Strip, make anchors safe, then split into trimmed non-empty lines.
    pub fn sanitize_and_split(&self, html: &str) -> Vec<String> {
        let stripped = self.strip_disallowed(html);
        let safe = rewrite_anchors(&stripped);
        split_lines(&safe)
    }
}

/// Name of a tag given its full `<...>` markup. The name ends at whitespace,
/// `/` or the closing bracket, so `<br/>` yields `br` and `</b >` yields `b`.
fn tag_name(tag: &str) -> &str {
    let inner = tag
        .strip_prefix('<')
        .and_then(|rest| rest.strip_suffix('>'))
        .unwrap_or(tag);
    let inner = inner.strip_prefix('/').unwrap_or(inner);
    let end = inner
        .find(|ch: char| ch.is_whitespace() || ch == '/')
        .unwrap_or(inner.len());
    &inner[..end]
}

/// Force every anchor to open in a new browsing context without leaking the
/// opener or referrer. Existing `target`/`rel` attributes are replaced, so
/// the rewrite is idempotent.
pub fn rewrite_anchors(html: &str) -> String {
    ANCHOR_OPEN
        .replace_all(html, |caps: &regex::Captures<'_>| {
            let attrs = caps.get(1).map(|m| m.as_str()).unwrap_or("");
            let cleaned = LINK_ATTR.replace_all(attrs, "");
            let cleaned = without_self_close(cleaned.trim_end());
            format!("<a{cleaned}{SAFE_LINK_ATTRS}>")
        })
        .into_owned()
}

/// Drop a self-closing `/` but never the last character of an unquoted
/// attribute value such as `href=https://x/`.
fn without_self_close(attrs: &str) -> &str {
    match attrs.strip_suffix('/') {
        Some(head)
            if head.is_empty()
                || head.ends_with(char::is_whitespace)
                || head.ends_with('"')
                || head.ends_with('\'') =>
        {
            head.trim_end()
        }
        _ => attrs,
    }
}

/// Split on `<br>`, `<br/>` and `<br />` (any case), trimming each segment
/// and dropping empty ones.
pub fn split_lines(html: &str) -> Vec<String> {
    LINE_BREAK
        .split(html)
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(ToString::to_string)
        .collect()
}
