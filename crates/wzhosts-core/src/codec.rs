//! Record codec for the `wazuh.hosts` list
//!
//! Encodes a host into its canonical text block, builds the anchored pattern
//! that re-finds that block by id, and parses the host list section out of a
//! larger document without touching anything else in it.
//!
//! Canonical block shape (two spaces per level, fixed attribute order):
//!
//! ```text
//!   - internal:
//!       url: https://localhost
//!       port: 55000
//!       user: wazuh
//!       password: wazuh
//! ```

use std::borrow::Cow;
use std::fmt::Write as _;
use std::sync::LazyLock;

use regex::Regex;
use serde_yaml::{Mapping, Value};

use crate::errors::{HostsError, Result};
use crate::model::HostRecord;

/// Top-level key holding the host list
pub const HOSTS_KEY: &str = "wazuh.hosts";

/// Marker line for the host list, including its line terminator
static LIST_MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^wazuh\.hosts[ \t]*:[^\n]*(?:\n|\z)").expect("static marker pattern")
});

/// The compiled list-marker pattern
pub fn list_marker_pattern() -> &'static Regex {
    &LIST_MARKER
}

/// Leading whitespace of a block's item line and attribute lines
///
/// `item` runs up to the id, dash included (`"  - "` in the canonical
/// shape); `attrs` is the indentation of the attribute lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Indentation {
    pub item: String,
    pub attrs: String,
}

impl Indentation {
    /// Two spaces before the dash, six before each attribute
    pub fn canonical() -> Self {
        Self {
            item: "  - ".to_string(),
            attrs: "      ".to_string(),
        }
    }

    /// Indentation used by an existing block, as matched by
    /// `build_match_pattern`
    ///
    /// Falls back to the canonical shape when the block does not start with
    /// a list item followed by an indented attribute line.
    pub fn of_block(block: &str) -> Self {
        let mut lines = block.lines().filter(|l| !l.trim().is_empty());
        let item = lines.next().and_then(item_prefix);
        let attrs = lines.next().map(|l| leading_whitespace(l).to_string());
        match (item, attrs) {
            (Some(item), Some(attrs)) if !attrs.is_empty() => Self { item, attrs },
            _ => Self::canonical(),
        }
    }
}

impl Default for Indentation {
    fn default() -> Self {
        Self::canonical()
    }
}

fn leading_whitespace(line: &str) -> &str {
    &line[..line.len() - line.trim_start_matches([' ', '\t']).len()]
}

/// `"<ws>-<ws>"` of an item line, with at least one space after the dash
fn item_prefix(line: &str) -> Option<String> {
    let lead = leading_whitespace(line);
    let after_dash = line[lead.len()..].strip_prefix('-')?;
    let gap = leading_whitespace(after_dash);
    Some(format!("{}-{}", lead, if gap.is_empty() { " " } else { gap }))
}

/// Encode a host as its canonical block, terminated by a newline
pub fn encode_host(host: &HostRecord) -> String {
    encode_host_with(host, &Indentation::canonical())
}

/// Encode a host with the given indentation, terminated by a newline
pub fn encode_host_with(host: &HostRecord, indent: &Indentation) -> String {
    let mut block = String::new();
    // Writing into a String cannot fail.
    let _ = write!(
        block,
        "{item}{}:\n{attrs}url: {}\n{attrs}port: {}\n{attrs}user: {}\n{attrs}password: {}\n",
        render_scalar(&host.id),
        render_scalar(&host.url),
        host.port,
        render_scalar(&host.username),
        render_scalar(host.password.expose()),
        item = indent.item,
        attrs = indent.attrs,
    );
    block
}

/// Header plus first block, used when the file has no host list yet
pub fn encode_list_block(first: &HostRecord) -> String {
    format!("{}:\n{}", HOSTS_KEY, encode_host(first))
}

/// Build a pattern matching exactly the block of host `id`
///
/// The match runs from the start of the `- id:` line through the end of the
/// `password` line, including its newline. Blank lines and extra spaces a
/// hand editor may have introduced between the lines are tolerated. The id
/// is escaped and must be followed by `:`, so `internal` never matches a
/// block for `internal2`.
///
/// # Errors
///
/// Returns `MalformedRecord` if the id is empty or spans several lines.
pub fn build_match_pattern(id: &str) -> Result<Regex> {
    if id.is_empty() {
        return Err(HostsError::MalformedRecord {
            reason: "host id is empty".to_string(),
        });
    }
    if id.contains(['\n', '\r']) {
        return Err(HostsError::MalformedRecord {
            reason: format!("host id {:?} spans several lines", id),
        });
    }

    let id_forms = [
        regex::escape(id),
        regex::escape(&double_quote(id)),
        regex::escape(&format!("'{}'", id.replace('\'', "''"))),
    ]
    .join("|");

    let gap = r"[ \t]*\r?\n(?:[ \t]*\r?\n)*[ \t]*";
    let pattern = format!(
        r"(?m)^[ \t]*-[ \t]*(?:{ids})[ \t]*:{gap}url[ \t]*:[^\n]*\n(?:[ \t]*\r?\n)*[ \t]*port[ \t]*:[^\n]*\n(?:[ \t]*\r?\n)*[ \t]*user(?:name)?[ \t]*:[^\n]*\n(?:[ \t]*\r?\n)*[ \t]*password[ \t]*:[^\n]*(?:\n|\z)",
        ids = id_forms,
        gap = gap,
    );

    Regex::new(&pattern).map_err(|e| HostsError::MalformedRecord {
        reason: format!("cannot build pattern for host {}: {}", id, e),
    })
}

/// Parse the hosts of the `wazuh.hosts` list, in file order
///
/// Only the marker line and the indented lines under it are handed to the
/// YAML parser, so unrelated content elsewhere in the file may be anything.
/// A missing marker or an empty list yields an empty vector.
///
/// # Errors
///
/// Returns `MalformedHostList` if the section is not a list of
/// `{id: {url, port, user, password}}` items.
pub fn parse_host_list(text: &str) -> Result<Vec<HostRecord>> {
    let Some(section) = host_list_section(text) else {
        return Ok(Vec::new());
    };

    let doc: Value = serde_yaml::from_str(section).map_err(|e| HostsError::MalformedHostList {
        reason: format!("YAML parse error: {}", e),
    })?;

    let items = match doc.get(HOSTS_KEY) {
        None | Some(Value::Null) => return Ok(Vec::new()),
        Some(Value::Sequence(items)) => items,
        Some(_) => {
            return Err(HostsError::MalformedHostList {
                reason: format!("{} is not a list", HOSTS_KEY),
            })
        }
    };

    items.iter().map(parse_item).collect()
}

/// The marker line and the lines belonging to it
///
/// The section ends at the first non-blank line that starts in column 0 and
/// is neither a list item nor a comment.
fn host_list_section(text: &str) -> Option<&str> {
    let start = LIST_MARKER.find(text)?.start();
    let mut end = text.len();
    let mut offset = start;
    for (idx, line) in text[start..].split_inclusive('\n').enumerate() {
        let owned_by_list = idx == 0
            || line.trim().is_empty()
            || line.starts_with([' ', '\t', '-', '#']);
        if !owned_by_list {
            end = offset;
            break;
        }
        offset += line.len();
    }
    Some(&text[start..end])
}

fn parse_item(item: &Value) -> Result<HostRecord> {
    let entry = item
        .as_mapping()
        .filter(|m| m.len() == 1)
        .ok_or_else(|| HostsError::MalformedHostList {
            reason: "each host must be a single-key mapping".to_string(),
        })?;
    let (key, attrs) = entry
        .iter()
        .next()
        .ok_or_else(|| HostsError::MalformedHostList {
            reason: "empty host entry".to_string(),
        })?;

    let id = scalar_to_string(key).ok_or_else(|| HostsError::MalformedHostList {
        reason: format!("host key {:?} is not a scalar", key),
    })?;
    let attrs = attrs
        .as_mapping()
        .ok_or_else(|| HostsError::MalformedHostList {
            reason: format!("host {} has no attributes", id),
        })?;

    let port_text = required(attrs, &id, &["port"])?;
    let port = port_text
        .parse::<u16>()
        .map_err(|_| HostsError::MalformedHostList {
            reason: format!("host {} has invalid port {:?}", id, port_text),
        })?;

    Ok(HostRecord::new(
        id.clone(),
        required(attrs, &id, &["url"])?,
        port,
        required(attrs, &id, &["user", "username"])?,
        required(attrs, &id, &["password"])?,
    ))
}

fn required(attrs: &Mapping, id: &str, keys: &[&str]) -> Result<String> {
    keys.iter()
        .find_map(|key| attrs.get(*key))
        .and_then(scalar_to_string)
        .ok_or_else(|| HostsError::MalformedHostList {
            reason: format!("host {} is missing {}", id, keys[0]),
        })
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Render a value for the block, quoting it when a plain scalar would not
/// read back as the same string
///
/// Values such as `a: b`, `x #y`, `null` or an empty string would otherwise
/// change meaning or break the block grammar.
pub fn render_scalar(value: &str) -> Cow<'_, str> {
    if reads_back_plain(value) {
        Cow::Borrowed(value)
    } else {
        Cow::Owned(double_quote(value))
    }
}

fn reads_back_plain(value: &str) -> bool {
    if value.is_empty() || value.contains(['\n', '\r', '"', '\'']) || value.trim() != value {
        return false;
    }
    serde_yaml::from_str::<Value>(value)
        .ok()
        .and_then(|v| scalar_to_string(&v))
        .is_some_and(|read| read == value)
}

fn double_quote(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c.is_control() => {
                let _ = write!(out, "\\x{:02X}", c as u32);
            }
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn host(id: &str) -> HostRecord {
        HostRecord::new(id, "https://localhost", 55000, "wazuh", "wazuh")
    }

    #[test]
    fn test_encode_canonical_shape() {
        let block = encode_host(&host("default"));
        assert_eq!(
            block,
            "  - default:\n      url: https://localhost\n      port: 55000\n      user: wazuh\n      password: wazuh\n"
        );
    }

    #[test]
    fn test_encode_keeps_numeric_ids_plain() {
        let block = encode_host(&host("1575632428000"));
        assert!(block.starts_with("  - 1575632428000:\n"));
    }

    #[test]
    fn test_encode_quotes_values_that_would_change_meaning() {
        let mut record = host("default");
        record.password = "pa: ss #word".into();
        let block = encode_host(&record);
        assert!(block.contains("      password: \"pa: ss #word\"\n"));
    }

    #[test]
    fn test_render_scalar_cases() {
        assert_eq!(render_scalar("wazuh"), "wazuh");
        assert_eq!(render_scalar("https://localhost"), "https://localhost");
        assert_eq!(render_scalar(""), "\"\"");
        assert_eq!(render_scalar("null"), "\"null\"");
        assert_eq!(render_scalar("~"), "\"~\"");
        assert_eq!(render_scalar("- item"), "\"- item\"");
        assert_eq!(render_scalar("55000"), "55000");
        assert_eq!(render_scalar("say \"hi\""), "\"say \\\"hi\\\"\"");
        assert_eq!(render_scalar("two\nlines"), "\"two\\nlines\"");
    }

    #[test]
    fn test_pattern_matches_only_its_own_block() {
        let text = format!("{}{}", encode_host(&host("internal")), encode_host(&host("internal2")));
        let pattern = build_match_pattern("internal").unwrap();
        let matches: Vec<_> = pattern.find_iter(&text).collect();
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].as_str(), encode_host(&host("internal")));
    }

    #[test]
    fn test_pattern_tolerates_hand_edited_whitespace() {
        let text = "wazuh.hosts:\n-   default :\n\n    url:   https://localhost\n    port: 55000\n\n    user:    wazuh\n    password: wazuh";
        let pattern = build_match_pattern("default").unwrap();
        let found = pattern.find(text).unwrap();
        assert_eq!(found.start(), "wazuh.hosts:\n".len());
        assert_eq!(found.end(), text.len());
    }

    #[test]
    fn test_pattern_escapes_regex_metacharacters() {
        let text = encode_host(&host("a.b"));
        assert!(build_match_pattern("a.b").unwrap().is_match(&text));
        assert!(!build_match_pattern("a.b").unwrap().is_match(&encode_host(&host("aXb"))));
    }

    #[test]
    fn test_pattern_rejects_malformed_ids() {
        assert!(matches!(
            build_match_pattern(""),
            Err(HostsError::MalformedRecord { .. })
        ));
        assert!(matches!(
            build_match_pattern("a\nb"),
            Err(HostsError::MalformedRecord { .. })
        ));
    }

    #[test]
    fn test_parse_ignores_unrelated_content() {
        let text = "# header comment\nhosts:\n  - not: ours\npattern: \"{{ not yaml\n\nwazuh.hosts:\n  - default:\n      url: https://localhost\n      port: 55000\n      user: wazuh\n      password: wazuh\nmonitoring.enabled: true\n";
        let hosts = parse_host_list(text).unwrap();
        assert_eq!(hosts, vec![host("default")]);
    }

    #[test]
    fn test_parse_missing_or_empty_list() {
        assert!(parse_host_list("pattern: wazuh-alerts-*\n").unwrap().is_empty());
        assert!(parse_host_list("wazuh.hosts:\n").unwrap().is_empty());
        assert!(parse_host_list("wazuh.hosts: []\n").unwrap().is_empty());
    }

    #[test]
    fn test_parse_accepts_username_and_numeric_values() {
        let text = "wazuh.hosts:\n- 1575632428000:\n    url: https://localhost\n    port: \"55000\"\n    username: wazuh\n    password: 1234\n";
        let hosts = parse_host_list(text).unwrap();
        assert_eq!(hosts[0].id, "1575632428000");
        assert_eq!(hosts[0].port, 55000);
        assert_eq!(hosts[0].username, "wazuh");
        assert_eq!(hosts[0].password.expose(), "1234");
    }

    #[test]
    fn test_parse_rejects_missing_port() {
        let text = "wazuh.hosts:\n  - default:\n      url: https://localhost\n      user: wazuh\n      password: wazuh\n";
        assert!(matches!(
            parse_host_list(text),
            Err(HostsError::MalformedHostList { .. })
        ));
    }

    #[test]
    fn test_indentation_of_hand_edited_blocks() {
        let column_zero = "- a:\n    url: https://a\n    port: 1\n    user: u\n    password: p\n";
        assert_eq!(
            Indentation::of_block(column_zero),
            Indentation {
                item: "- ".to_string(),
                attrs: "    ".to_string(),
            }
        );

        let spaced = " -   a:\n\n        url: https://a\n";
        let indent = Indentation::of_block(spaced);
        assert_eq!(indent.item, " -   ");
        assert_eq!(indent.attrs, "        ");

        assert_eq!(Indentation::of_block(&encode_host(&host("a"))), Indentation::canonical());
        assert_eq!(Indentation::of_block("garbage"), Indentation::canonical());
    }

    #[test]
    fn test_encode_with_column_zero_indentation_parses_beside_neighbours() {
        let indent = Indentation {
            item: "- ".to_string(),
            attrs: "    ".to_string(),
        };
        let text = format!(
            "wazuh.hosts:\n{}{}",
            encode_host_with(&host("a"), &indent),
            encode_host_with(&host("b"), &indent)
        );
        assert!(text.contains("\n- b:\n    url: https://localhost\n"));
        assert_eq!(parse_host_list(&text).unwrap(), vec![host("a"), host("b")]);
    }

    #[test]
    fn test_list_marker_pattern_consumes_line() {
        let text = "a: 1\nwazuh.hosts:   \nb: 2\n";
        assert_eq!(list_marker_pattern().replace(text, ""), "a: 1\nb: 2\n");
    }
}
