//! Share-URL recognition for Baidu Pan links
//!
//! Raw input is chat-style text: a pasted link frequently trails off into
//! prose ("提取码: 1234"), and query strings arrive with inconsistent
//! percent-encoding. Recognition locates the share URL inside the noise
//! and re-encodes it canonically before anything touches the network.

use crate::{UrlError, UrlResult};
use url::Url;

/// Scheme-qualified prefixes that mark the start of a share URL, scanned
/// in order (secure variant wins when both appear)
const SHARE_URL_PREFIXES: &[&str] = &["https://pan.baidu.com/s/", "http://pan.baidu.com/s/"];

/// Annotation keywords that commonly follow a pasted link and terminate it
const TRAILING_KEYWORDS: &[&str] = &["提取码", "密码"];

/// Identifier of a share, as embedded in its URL path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShareId {
    /// The identifier exactly as it appears in the URL
    pub full: String,

    /// The identifier with its leading character removed; the listing API
    /// expects this form. Equal to `full` for identifiers of length <= 1.
    pub short: String,
}

impl ShareId {
    fn new(full: String) -> Self {
        // The leading character is a type tag, irrelevant to the listing API
        let short = if full.chars().count() > 1 {
            full.chars().skip(1).collect()
        } else {
            full.clone()
        };
        Self { full, short }
    }
}

/// Extracts and canonically re-encodes the share URL embedded in free-form
/// text.
///
/// The candidate substring runs from the first recognized prefix to the
/// first whitespace character or trailing annotation keyword. The query
/// component is rebuilt (pairs decoded, sorted by key, percent-encoded)
/// so double-encoded or unescaped copy-paste input comes out uniform.
/// Pure function of its input; normalizing an already-normalized URL
/// yields the same string.
pub fn normalize_share_url(input: &str) -> UrlResult<Url> {
    let candidate = locate_share_url(input).ok_or(UrlError::NotRecognized)?;
    let url = Url::parse(candidate).map_err(|e| UrlError::Parse(e.to_string()))?;
    Ok(reencode_query(url))
}

/// Finds the share-URL substring inside noisy text
fn locate_share_url(input: &str) -> Option<&str> {
    let trimmed = input.trim();
    let start = SHARE_URL_PREFIXES
        .iter()
        .find_map(|prefix| trimmed.find(prefix))?;
    let candidate = &trimmed[start..];

    let mut end = candidate.len();
    for (idx, ch) in candidate.char_indices() {
        let rest = &candidate[idx..];
        if ch.is_whitespace() || TRAILING_KEYWORDS.iter().any(|kw| rest.starts_with(kw)) {
            end = idx;
            break;
        }
    }

    Some(&candidate[..end])
}

/// Rebuilds the query component with canonical percent-encoding
fn reencode_query(mut url: Url) -> Url {
    if url.query().is_none() {
        return url;
    }

    let mut pairs: Vec<(String, String)> = url
        .query_pairs()
        .map(|(key, value)| (key.into_owned(), value.into_owned()))
        .collect();

    if pairs.is_empty() {
        url.set_query(None);
        return url;
    }

    // Sorting is stable, so repeated keys keep their relative order
    pairs.sort_by(|a, b| a.0.cmp(&b.0));
    url.query_pairs_mut()
        .clear()
        .extend_pairs(pairs.iter().map(|(key, value)| (key.as_str(), value.as_str())));
    url
}

/// Derives the share identifier from a normalized URL, branching on path
/// shape.
///
/// * `/s/<id>`: the identifier is the path remainder, with a guard that
///   strips a malformed query concatenated into the path.
/// * `/share/init`: the identifier is the `surl` query parameter.
/// * Anything else: `None`, and the caller reports an unrecognized format.
pub fn extract_share_id(url: &Url) -> Option<ShareId> {
    let path = url.path();

    if let Some(rest) = path.strip_prefix("/s/") {
        let id = match rest.find('?') {
            Some(idx) => &rest[..idx],
            None => rest,
        };
        if id.is_empty() {
            return None;
        }
        return Some(ShareId::new(id.to_string()));
    }

    if path.starts_with("/share/init") {
        let surl = url
            .query_pairs()
            .find(|(key, _)| key == "surl")
            .map(|(_, value)| value.into_owned())?;
        if surl.is_empty() {
            return None;
        }
        return Some(ShareId::new(surl));
    }

    None
}

/// Reads the extraction code from the `pwd` query parameter.
///
/// `None` when the parameter is absent or empty: a public share, not an
/// error.
pub fn extraction_code(url: &Url) -> Option<String> {
    url.query_pairs()
        .find(|(key, _)| key == "pwd")
        .map(|(_, value)| value.into_owned())
        .filter(|code| !code.is_empty())
}
