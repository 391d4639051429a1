use url::Url;

const ASSET_EXTENSIONS: &[&str] = &[
    "jpg", "jpeg", "png", "gif", "webp", "svg", "ico", "bmp", "avif", "css", "js", "mjs", "json",
    "xml", "pdf", "zip", "gz", "tar", "rar", "7z", "mp3", "mp4", "webm", "avi", "mov", "woff",
    "woff2", "ttf", "eot", "doc", "docx", "xls", "xlsx", "ppt", "pptx",
];

/// Canonical form used to deduplicate pages within a run.
///
/// Only http/https URLs survive. The fragment is dropped and a trailing slash
/// is removed from every path except the root.
pub fn normalize_url(raw: &str) -> Option<String> {
    let url = Url::parse(raw).ok()?;
    normalize_parsed(url)
}

fn normalize_parsed(mut url: Url) -> Option<String> {
    if url.scheme() != "http" && url.scheme() != "https" {
        return None;
    }
    url.host_str()?;

    url.set_fragment(None);

    let path = url.path().to_string();
    if path.len() > 1 && path.ends_with('/') {
        let trimmed = path.trim_end_matches('/');
        let trimmed = if trimmed.is_empty() { "/" } else { trimmed };
        url.set_path(trimmed);
    }

    if url.query() == Some("") {
        url.set_query(None);
    }

    Some(url.to_string())
}

/// Resolves an href found on `base` into a normalized absolute URL.
pub fn resolve_url(base: &Url, href: &str) -> Option<String> {
    let href = href.trim();
    if href.is_empty()
        || href.starts_with("javascript:")
        || href.starts_with("mailto:")
        || href.starts_with("tel:")
        || href.starts_with("data:")
        || href.starts_with('#')
    {
        return None;
    }

    let resolved = base.join(href).ok()?;
    normalize_parsed(resolved)
}

fn bare_host(host: &str) -> &str {
    host.strip_prefix("www.").unwrap_or(host)
}

/// Same-host test; a leading `www.` on either side is ignored.
pub fn is_same_host(url: &str, host: &str) -> bool {
    if let Ok(parsed) = Url::parse(url)
        && let Some(candidate) = parsed.host_str()
    {
        return bare_host(candidate).eq_ignore_ascii_case(bare_host(host));
    }
    false
}

/// True for links that clearly point at a non-HTML resource.
pub fn is_asset(url: &str) -> bool {
    let Ok(parsed) = Url::parse(url) else {
        return false;
    };
    let Some(last) = parsed.path_segments().and_then(|mut segments| segments.next_back()) else {
        return false;
    };
    match last.rsplit_once('.') {
        Some((_, ext)) => ASSET_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()),
        None => false,
    }
}
