use std::sync::LazyLock;

use regex::Regex;

static NEXT_LINK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"<([^>]+)>\s*;\s*rel="?next"?"#).expect("static regex compile")
});

/// Extracts the `rel="next"` URL from a GitHub `Link` header.
#[must_use]
pub fn next_page_url(link_header: &str) -> Option<String> {
    link_header
        .split(',')
        .find_map(|part| NEXT_LINK_RE.captures(part).map(|cap| cap[1].to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_next_link_found() {
        let header = r#"<https://api.github.com/repositories/1/pulls/2/files?per_page=100&page=2>; rel="next", <https://api.github.com/repositories/1/pulls/2/files?per_page=100&page=4>; rel="last""#;
        assert_eq!(
            next_page_url(header).as_deref(),
            Some("https://api.github.com/repositories/1/pulls/2/files?per_page=100&page=2")
        );
    }

    #[test]
    fn test_last_page_has_no_next() {
        let header = r#"<https://api.github.com/x?page=1>; rel="first", <https://api.github.com/x?page=3>; rel="prev""#;
        assert_eq!(next_page_url(header), None);
    }

    #[test]
    fn test_next_not_first_in_list() {
        let header = r#"<https://api.github.com/x?page=1>; rel="prev", <https://api.github.com/x?page=3>; rel="next""#;
        assert_eq!(next_page_url(header).as_deref(), Some("https://api.github.com/x?page=3"));
    }
}
