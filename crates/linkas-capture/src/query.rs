//! Search query extraction from captured result-page URLs

use url::Url;

/// The `q` parameter, or `query` when `q` is absent or empty. Anything that
/// does not parse as a URL yields an empty query.
pub fn extract_search_query(url: &str) -> String {
    let Ok(parsed) = Url::parse(url) else {
        return String::new();
    };

    let param = |name: &str| {
        parsed
            .query_pairs()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.into_owned())
            .filter(|value| !value.is_empty())
    };

    param("q").or_else(|| param("query")).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_google_query_decoded() {
        let q = extract_search_query("https://www.google.com/search?q=%40g+hi&oq=%40g");
        assert_eq!(q, "@g hi");
    }

    #[test]
    fn test_duckduckgo_query_param() {
        let q = extract_search_query("https://duckduckgo.com/?t=h_&query=%40work");
        assert_eq!(q, "@work");

        let q = extract_search_query("https://duckduckgo.com/?q=&query=%40work");
        assert_eq!(q, "@work");
    }

    #[test]
    fn test_missing_or_invalid() {
        assert_eq!(extract_search_query("https://www.bing.com/search?form=QBLH"), "");
        assert_eq!(extract_search_query("not a url"), "");
    }
}
