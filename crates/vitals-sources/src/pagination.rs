//! RFC 5988 Link-header pagination, as used by GitHub and Buildkite.

use reqwest::header::{HeaderMap, LINK};

/// Whether the response advertises a further page via `Link: rel="next"`.
pub fn has_next_page(headers: &HeaderMap) -> bool {
    headers
        .get(LINK)
        .and_then(|value| value.to_str().ok())
        .map(|value| value.contains("rel=\"next\""))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::HeaderValue;

    #[test]
    fn test_link_header_next_detection() {
        let mut headers = HeaderMap::new();
        assert!(!has_next_page(&headers), "no header means last page");

        headers.insert(
            LINK,
            HeaderValue::from_static(
                "<https://api.example.com/commits?page=2>; rel=\"next\", \
                 <https://api.example.com/commits?page=9>; rel=\"last\"",
            ),
        );
        assert!(has_next_page(&headers));

        headers.insert(
            LINK,
            HeaderValue::from_static("<https://api.example.com/commits?page=1>; rel=\"prev\""),
        );
        assert!(!has_next_page(&headers));
    }
}
