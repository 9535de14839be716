use std::collections::BTreeMap;

/// Turn `key==value` CLI tokens into the search filter map.
///
/// The split happens at the first `==`. A token without one becomes a key
/// with an empty value, and a repeated key keeps the last value seen.
pub fn parse_search_filters(tokens: &[String]) -> BTreeMap<String, String> {
    let mut filters = BTreeMap::new();
    for token in tokens {
        match token.split_once("==") {
            Some((key, value)) => filters.insert(key.to_string(), value.to_string()),
            None => filters.insert(token.clone(), String::new()),
        };
    }
    filters
}
