use url::Url;

const SEARCH_URL: &str = "https://www.linkedin.com/pub/dir";
const SEARCH_TRACKING: &str = "people-guest_people-search-bar_search-submit";

/// People-directory search url for a "first last" keyword. Everything after
/// the first token is treated as the last name.
pub fn build_search_url(keyword: &str) -> String {
    let mut tokens = keyword.split_whitespace();
    let first_name = tokens.next().unwrap_or_default();
    let last_name = tokens.collect::<Vec<&str>>().join(" ");

    match Url::parse_with_params(
        SEARCH_URL,
        &[
            ("firstName", first_name),
            ("lastName", last_name.as_str()),
            ("trk", SEARCH_TRACKING),
        ],
    ) {
        Ok(url) => url.to_string(),
        Err(_) => SEARCH_URL.to_string(),
    }
}

/// File-name friendly form of a keyword: whitespace runs become `-`.
pub fn keyword_slug(keyword: &str) -> String {
    keyword.split_whitespace().collect::<Vec<&str>>().join("-")
}
