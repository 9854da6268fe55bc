//! The `VendorAdapter` record from §3, and the two tags that select it:
//! the public `api_spec` (5 values, carried on `ModelRecord`) and the
//! richer internal `VendorShape` that the registry's static table resolves
//! vendor tags to. Tagged variants are used rather than a trait object
//! since the vendor set is closed and known at build time (§9).

use std::fmt;

/// The coarse family named on `ModelRecord.api_spec`. When present and
/// recognized, this wins over the vendor tag for translation shape (§4.1,
/// §9).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ApiSpec {
    OpenAi,
    Anthropic,
    Gemini,
    Spark,
    Custom,
}

impl ApiSpec {
    pub fn parse(tag: &str) -> Option<Self> {
        match tag {
            "openai" => Some(ApiSpec::OpenAi),
            "anthropic" => Some(ApiSpec::Anthropic),
            "gemini" => Some(ApiSpec::Gemini),
            "spark" => Some(ApiSpec::Spark),
            "custom" => Some(ApiSpec::Custom),
            _ => None,
        }
    }
}

impl fmt::Display for ApiSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ApiSpec::OpenAi => "openai",
            ApiSpec::Anthropic => "anthropic",
            ApiSpec::Gemini => "gemini",
            ApiSpec::Spark => "spark",
            ApiSpec::Custom => "custom",
        };
        f.write_str(s)
    }
}

/// The translation shape actually used to build/parse a request. A superset
/// of `ApiSpec`: `Qwen`/`QwenOfficial`/`OllamaNative` are reachable only via
/// vendor tag, never via `api_spec`, since the wire dialect the original
/// source speaks for them isn't one of the five recognized `api_spec`
/// values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VendorShape {
    OpenAi,
    Anthropic,
    Gemini,
    Qwen,
    QwenOfficial,
    Spark,
    OllamaNative,
    Custom,
}

impl From<ApiSpec> for VendorShape {
    fn from(spec: ApiSpec) -> Self {
        match spec {
            ApiSpec::OpenAi => VendorShape::OpenAi,
            ApiSpec::Anthropic => VendorShape::Anthropic,
            ApiSpec::Gemini => VendorShape::Gemini,
            ApiSpec::Spark => VendorShape::Spark,
            ApiSpec::Custom => VendorShape::Custom,
        }
    }
}

/// An immutable, process-lifetime entry in the registry (§3: "Ownership:
/// the Registry exclusively owns the adapter objects").
#[derive(Debug, Clone)]
pub struct VendorAdapter {
    pub vendor: &'static str,
    pub default_api_base: &'static str,
    pub default_api_path: &'static str,
    /// The header name carrying the credential, e.g. "Authorization",
    /// "x-api-key", or Gemini's "x-goog-api-key" (§4.2 step 4: "add auth per
    /// adapter — `{auth_format} {key}` when `auth_header` is `Authorization`,
    /// else raw key in the named header").
    pub auth_header: &'static str,
    pub auth_format: &'static str,
    pub stream_support: bool,
    pub shape: VendorShape,
}

impl VendorAdapter {
    pub fn auth_value(&self, api_key: &str) -> String {
        if self.auth_format.is_empty() {
            api_key.to_string()
        } else {
            format!("{} {}", self.auth_format, api_key)
        }
    }
}
