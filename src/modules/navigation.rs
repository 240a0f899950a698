// Pure navigation logic - no Tauri imports allowed.
// Turns whatever the user typed into the address bar into a navigable URL.

use url::Url;
use crate::settings::Settings;
use crate::state::ABOUT_BLANK;

const ALLOWED_SCHEMES: [&str; 5] = ["http", "https", "file", "about", "data"];

/// Normalizes address-bar input into a URL.
///
/// Local string heuristics only, no DNS lookups:
/// 1. Blank input means `about:blank`
/// 2. Bare localhost/IP gets `http://`
/// 3. Input with a known scheme is kept (normalized by `url`)
/// 4. Something that looks like a domain gets `https://` (`http://` when https_only is off)
/// 5. Anything else becomes a search on the configured engine
pub fn get_url_with_prefix(input: &str, settings: &Settings) -> String {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return ABOUT_BLANK.to_string();
    }

    let has_scheme_separator = trimmed.contains("://");
    let is_localhost = trimmed.starts_with("localhost") || trimmed.starts_with("127.0.0.1");
    let is_ip = trimmed.parse::<std::net::IpAddr>().is_ok();

    if (is_localhost || is_ip) && !has_scheme_separator {
        let candidate = format!("http://{}", trimmed);
        if let Ok(u) = Url::parse(&candidate) {
            return u.to_string();
        }
    }

    // "google.com" would otherwise parse with scheme "google"
    if let Ok(u) = Url::parse(trimmed) {
        if ALLOWED_SCHEMES.contains(&u.scheme()) {
            return u.to_string();
        }
    }

    if !trimmed.contains(' ') && trimmed.contains('.') && !trimmed.ends_with('.') {
        let scheme = if settings.https_only { "https" } else { "http" };
        let candidate = format!("{}://{}", scheme, trimmed);
        if let Ok(u) = Url::parse(&candidate) {
            if u.host().is_some() {
                return u.to_string();
            }
        }
    }

    settings.search_engine.query_url(trimmed)
}
