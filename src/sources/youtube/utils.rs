use std::sync::OnceLock;

use regex::Regex;

fn url_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^(?:https?://)?(?:www\.|m\.|music\.)?(?:youtube\.com|youtu\.be|youtube-nocookie\.com)/")
            .expect("static regex")
    })
}

fn id_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[A-Za-z0-9_-]{11}$").expect("static regex"))
}

/// Extracts the 11-character video id from a watch/short/live/embed URL or a
/// bare id. Returns `None` for anything else.
pub fn extract_id(identifier: &str) -> Option<String> {
    let identifier = identifier.trim();
    if id_regex().is_match(identifier) {
        return Some(identifier.to_string());
    }
    if !url_regex().is_match(identifier) {
        return None;
    }

    let candidate = if let Some(rest) = identifier.split("v=").nth(1) {
        rest.split('&').next()
    } else {
        ["youtu.be/", "/shorts/", "/live/", "/embed/"]
            .iter()
            .find_map(|marker| identifier.split(marker).nth(1))
            .and_then(|rest| rest.split(['?', '&', '/']).next())
    }?;

    id_regex()
        .is_match(candidate)
        .then(|| candidate.to_string())
}

pub fn watch_url(video_id: &str) -> String {
    format!("https://www.youtube.com/watch?v={}", video_id)
}
