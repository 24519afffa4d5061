// Index parsing - directory listing markup and the manifest file
//
// A directory listing is whatever the static file server renders for a
// directory (Python's http.server, nginx autoindex, ...). We only rely on it
// containing `<a href="...">` links; every link ending in `.json` is a proof.

use regex::Regex;
use serde::Deserialize;

const JSON_SUFFIX: &str = ".json";

/// Matches an anchor's href in any of its three quoting styles
///
/// `href` must start the attribute, so `data-href` and friends are skipped.
const HREF_PATTERN: &str = r#"(?i)<a\s(?:[^>]*?\s)?href\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s>"']+))"#;

/// Proof named by the index, with its timestamp when the index carries one
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexEntry {
    pub id: String,
    pub timestamp: Option<String>,
}

impl IndexEntry {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            timestamp: None,
        }
    }
}

/// Extracts proof ids from directory listing markup
#[derive(Debug, Clone)]
pub struct ListingParser {
    href: Regex,
}

impl ListingParser {
    pub fn new() -> Result<Self, regex::Error> {
        Ok(Self {
            href: Regex::new(HREF_PATTERN)?,
        })
    }

    /// Ids of every `.json` link, in document order
    ///
    /// The manifest file is an index, not a proof, so a link to it is skipped.
    pub fn proof_ids(&self, markup: &str, manifest_name: &str) -> Vec<String> {
        self.href
            .captures_iter(markup)
            .filter_map(|caps| caps.get(1).or_else(|| caps.get(2)).or_else(|| caps.get(3)))
            .map(|m| decode_entities(m.as_str()))
            .filter(|href| href != manifest_name)
            .filter_map(|href| href.strip_suffix(JSON_SUFFIX).map(str::to_string))
            .filter(|id| !id.is_empty())
            .collect()
    }
}

/// Undo the entity escaping listing generators apply to attribute values
fn decode_entities(raw: &str) -> String {
    if !raw.contains('&') {
        return raw.to_string();
    }
    raw.replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&#x27;", "'")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Manifest {
    List(Vec<ManifestEntry>),
    Wrapped { proofs: Vec<ManifestEntry> },
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ManifestEntry {
    Id(String),
    Entry {
        id: String,
        #[serde(default)]
        timestamp: Option<String>,
    },
}

/// Parse a manifest: `["id", ...]`, `[{"id", "timestamp"?}, ...]` or `{"proofs": [...]}`
pub fn parse_manifest(bytes: &[u8]) -> Result<Vec<IndexEntry>, serde_json::Error> {
    let entries = match serde_json::from_slice::<Manifest>(bytes)? {
        Manifest::List(entries) | Manifest::Wrapped { proofs: entries } => entries,
    };

    Ok(entries
        .into_iter()
        .map(|entry| match entry {
            ManifestEntry::Id(id) => IndexEntry::new(id),
            ManifestEntry::Entry { id, timestamp } => IndexEntry {
                id,
                timestamp: timestamp.filter(|t| !t.is_empty()),
            },
        })
        .map(|mut entry| {
            if let Some(stripped) = entry.id.strip_suffix(JSON_SUFFIX) {
                entry.id = stripped.to_string();
            }
            entry
        })
        .filter(|entry| !entry.id.is_empty())
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parser() -> ListingParser {
        ListingParser::new().unwrap()
    }

    #[test]
    fn test_python_http_server_listing() {
        let markup = r#"<!DOCTYPE HTML>
<html lang="en"><head><title>Directory listing for /proofs/</title></head>
<body><h1>Directory listing for /proofs/</h1><hr><ul>
<li><a href="proof_20250115_103000.json">proof_20250115_103000.json</a></li>
<li><a href="notes.txt">notes.txt</a></li>
<li><a href="archive/">archive/</a></li>
<li><a href="proof%20two.json">proof two.json</a></li>
</ul><hr></body></html>"#;
        assert_eq!(
            parser().proof_ids(markup, "index.json"),
            vec!["proof_20250115_103000", "proof%20two"]
        );
    }

    #[test]
    fn test_quoting_styles_and_case() {
        let markup = r#"<A HREF='a.json'>a</A> <a class="x" href=b.json>b</a> <a href="c.JSON">c</a>"#;
        assert_eq!(parser().proof_ids(markup, "index.json"), vec!["a", "b"]);
    }

    #[test]
    fn test_entities_are_decoded_and_manifest_skipped() {
        let markup = r#"<a href="r&amp;d.json">r&d</a><a href="index.json">index</a>"#;
        assert_eq!(parser().proof_ids(markup, "index.json"), vec!["r&d"]);
    }

    #[test]
    fn test_prefixed_href_attributes_are_not_links() {
        let markup = r#"<a data-href="decoy.json" href="real.json">real</a><a data-x=1 href='plain.json'>p</a>"#;
        assert_eq!(parser().proof_ids(markup, "index.json"), vec!["real", "plain"]);
    }

    #[test]
    fn test_listing_without_json_links_is_empty() {
        assert!(parser()
            .proof_ids("<html><body>Nothing here</body></html>", "index.json")
            .is_empty());
    }

    #[test]
    fn test_manifest_shapes() {
        let ids = parse_manifest(br#"["a", "b.json"]"#).unwrap();
        assert_eq!(ids, vec![IndexEntry::new("a"), IndexEntry::new("b")]);

        let entries = parse_manifest(
            br#"{"proofs": [{"id": "x", "timestamp": "2025-01-01T00:00:00Z"}, {"id": "y"}]}"#,
        )
        .unwrap();
        assert_eq!(entries[0].timestamp.as_deref(), Some("2025-01-01T00:00:00Z"));
        assert_eq!(entries[1], IndexEntry::new("y"));
    }

    #[test]
    fn test_invalid_manifest_is_an_error() {
        assert!(parse_manifest(br#"{"not": "a manifest"}"#).is_err());
    }
}
