//! URL construction: joins `api_base` with `api_path`, collapsing a
//! duplicated `/v1` when both sides carry it (§4.2 step 2, invariant 7).

/// Gemini's path carries a `{model}` placeholder since the model name is
/// part of the upstream path rather than the body.
pub fn build_url(api_base: &str, api_path: &str, model_name: &str) -> String {
    let base = api_base.trim_end_matches('/');
    let path = if api_path.starts_with('/') { api_path.to_string() } else { format!("/{api_path}") };
    let path = path.replace("{model}", model_name);

    let joined = if base.ends_with("/v1") && path.starts_with("/v1") {
        format!("{base}{}", &path[3..])
    } else {
        format!("{base}{path}")
    };
    joined
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collapses_duplicated_v1_prefix() {
        let url = build_url("https://api.example.com/v1", "/v1/chat/completions", "gpt-4o");
        assert_eq!(url, "https://api.example.com/v1/chat/completions");
        assert_eq!(url.matches("/v1").count(), 1);
    }

    #[test]
    fn leaves_distinct_paths_untouched() {
        let url = build_url("https://api.openai.com", "/v1/chat/completions", "gpt-4o");
        assert_eq!(url, "https://api.openai.com/v1/chat/completions");
    }

    #[test]
    fn substitutes_model_placeholder() {
        let url = build_url(
            "https://generativelanguage.googleapis.com",
            "/v1beta/models/{model}:generateContent",
            "gemini-1.5-pro",
        );
        assert_eq!(url, "https://generativelanguage.googleapis.com/v1beta/models/gemini-1.5-pro:generateContent");
    }

    #[test]
    fn strips_trailing_slash_on_base() {
        let url = build_url("https://api.example.com/", "/chat", "m");
        assert_eq!(url, "https://api.example.com/chat");
    }
}
