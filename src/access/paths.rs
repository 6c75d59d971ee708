//! Path-matching helpers used by the access policy.
//!
//! Matching is segment-aware: the prefix `/admin` covers `/admin` and
//! `/admin/users` but not `/administrator`. A prefix written with a trailing
//! slash (`/api/public/`) means the same as one without it.

/// Strips trailing slashes so `/dashboard/` and `/dashboard` classify the
/// same way. The empty path and `/` both normalise to `/`.
pub fn normalize_path(path: &str) -> &str {
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() { "/" } else { trimmed }
}

/// The path a page renderer would actually serve: percent-escapes decoded,
/// runs of `/` collapsed, `.` segments dropped and `..` segments resolved
/// (never above the root). Classification always runs on this form.
pub fn canonical_path(path: &str) -> String {
    let decoded = urlencoding::decode(path)
        .map(|decoded| decoded.into_owned())
        .unwrap_or_else(|_| path.to_string());

    let mut segments: Vec<&str> = Vec::new();
    for segment in decoded.split(['/', '\\']) {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            other => segments.push(other),
        }
    }

    format!("/{}", segments.join("/"))
}

/// Returns true when `path` equals `prefix` or lies beneath it.
pub fn matches_prefix(path: &str, prefix: &str) -> bool {
    let path = normalize_path(path);
    let prefix = normalize_path(prefix);

    if prefix == "/" {
        return true;
    }

    match path.strip_prefix(prefix) {
        Some(rest) => rest.is_empty() || rest.starts_with('/'),
        None => false,
    }
}

/// Returns true when `path` is exactly `target`, ignoring trailing slashes.
pub fn matches_exact(path: &str, target: &str) -> bool {
    normalize_path(path) == normalize_path(target)
}

/// Finds the entry whose prefix is the longest one matching `path`.
pub fn longest_prefix<'a, T, I>(path: &str, entries: I) -> Option<&'a T>
where
    I: IntoIterator<Item = (&'a str, &'a T)>,
{
    entries
        .into_iter()
        .filter(|(prefix, _)| matches_prefix(path, prefix))
        .max_by_key(|(prefix, _)| normalize_path(prefix).len())
        .map(|(_, value)| value)
}

/// The original request target: the raw path plus `?query` when a query is
/// present.
pub fn original_target(path: &str, query: Option<&str>) -> String {
    match query {
        Some(q) if !q.is_empty() => format!("{path}?{q}"),
        _ => path.to_string(),
    }
}

/// Builds `<login_path>?callbackUrl=<percent-encoded original target>`.
///
/// The whole target, including `/`, `?`, `&`, `=` and any existing `%`
/// escapes, is percent-encoded, so decoding the parameter once yields the
/// original path and query byte for byte.
pub fn login_redirect_location(login_path: &str, path: &str, query: Option<&str>) -> String {
    let target = original_target(path, query);
    format!("{login_path}?callbackUrl={}", urlencoding::encode(&target))
}

/// Accepts only same-origin relative targets (`/events/1?tab=results`).
/// Protocol-relative (`//evil.example`) and backslash tricks are refused.
pub fn is_safe_callback(url: &str) -> bool {
    url.starts_with('/')
        && !url.starts_with("//")
        && !url.starts_with("/\\")
        && !url.chars().any(|c| c.is_control())
}
