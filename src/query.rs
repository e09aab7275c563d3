//! `application/x-www-form-urlencoded` query strings.

use std::collections::BTreeMap;

use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

/// Query parameters. Ordering is irrelevant to the wire, the map keeps
/// rendering deterministic.
pub type Query = BTreeMap<String, String>;

/// Unreserved characters are left as is, everything else is escaped.
const QUERY_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Parse `a=1&b=two%20words`. Later duplicates replace earlier ones.
pub fn parse(query: &str) -> Query {
    let mut out = Query::new();

    for pair in query.split('&') {
        if pair.is_empty() {
            continue;
        }
        let (k, v) = pair.split_once('=').unwrap_or((pair, ""));
        let k = decode(k);
        if k.is_empty() {
            continue;
        }
        out.insert(k, decode(v));
    }

    out
}

/// Render a query back to a string, without leading `?`.
pub fn serialize(query: &Query) -> String {
    let mut out = String::new();

    for (k, v) in query {
        if !out.is_empty() {
            out.push('&');
        }
        out.extend(utf8_percent_encode(k, QUERY_COMPONENT));
        out.push('=');
        out.extend(utf8_percent_encode(v, QUERY_COMPONENT));
    }

    out
}

fn decode(s: &str) -> String {
    let s = s.replace('+', " ");
    percent_decode_str(&s).decode_utf8_lossy().into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_simple() {
        let q = parse("x=1&y=two");
        assert_eq!(q.len(), 2);
        assert_eq!(q["x"], "1");
        assert_eq!(q["y"], "two");
    }

    #[test]
    fn parse_decodes() {
        let q = parse("name=J%C3%B6rg+M&empty&=skipped&&last=a%26b");
        assert_eq!(q["name"], "Jörg M");
        assert_eq!(q["empty"], "");
        assert_eq!(q["last"], "a&b");
        assert!(!q.contains_key(""));
    }

    #[test]
    fn parse_duplicate_last_wins() {
        let q = parse("a=1&a=2");
        assert_eq!(q["a"], "2");
    }

    #[test]
    fn serialize_escapes() {
        let mut q = Query::new();
        q.insert("b".into(), "a&b c".into());
        q.insert("a".into(), "x-y_z.~".into());
        assert_eq!(serialize(&q), "a=x-y_z.~&b=a%26b%20c");
    }
}
