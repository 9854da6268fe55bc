//! The static table of ~20 vendors the registry is populated with at
//! startup, grounded in the original `VENDOR_CONFIGS` mapping.

use crate::types::{VendorAdapter, VendorShape};

pub const VENDOR_TABLE: &[VendorAdapter] = &[
    VendorAdapter {
        vendor: "openai",
        default_api_base: "https://api.openai.com",
        default_api_path: "/v1/chat/completions",
        auth_header: "Authorization",
        auth_format: "Bearer",
        stream_support: true,
        shape: VendorShape::OpenAi,
    },
    VendorAdapter {
        vendor: "qwen",
        default_api_base: "https://dashscope.aliyuncs.com/compatible-mode",
        default_api_path: "/v1/chat/completions",
        auth_header: "Authorization",
        auth_format: "Bearer",
        stream_support: true,
        shape: VendorShape::Qwen,
    },
    VendorAdapter {
        vendor: "qwen_official",
        default_api_base: "https://dashscope.aliyuncs.com",
        default_api_path: "/api/v1/services/aigc/text-generation/generation",
        auth_header: "Authorization",
        auth_format: "Bearer",
        stream_support: false,
        shape: VendorShape::QwenOfficial,
    },
    VendorAdapter {
        vendor: "zhipu",
        default_api_base: "https://open.bigmodel.cn/api/paas",
        default_api_path: "/v4/chat/completions",
        auth_header: "Authorization",
        auth_format: "Bearer",
        stream_support: true,
        shape: VendorShape::OpenAi,
    },
    VendorAdapter {
        vendor: "spark",
        default_api_base: "https://spark-api-open.xf-yun.com",
        default_api_path: "/v1/chat/completions",
        auth_header: "Authorization",
        auth_format: "Bearer",
        stream_support: true,
        shape: VendorShape::Spark,
    },
    VendorAdapter {
        vendor: "hunyuan",
        default_api_base: "https://api.hunyuan.cloud.tencent.com",
        default_api_path: "/v1/chat/completions",
        auth_header: "Authorization",
        auth_format: "Bearer",
        stream_support: true,
        shape: VendorShape::OpenAi,
    },
    VendorAdapter {
        vendor: "doubao",
        default_api_base: "https://ark.cn-beijing.volces.com/api",
        default_api_path: "/v3/chat/completions",
        auth_header: "Authorization",
        auth_format: "Bearer",
        stream_support: true,
        shape: VendorShape::OpenAi,
    },
    VendorAdapter {
        vendor: "claude",
        default_api_base: "https://api.anthropic.com",
        default_api_path: "/v1/messages",
        auth_header: "x-api-key",
        auth_format: "",
        stream_support: true,
        shape: VendorShape::Anthropic,
    },
    VendorAdapter {
        vendor: "gemini",
        default_api_base: "https://generativelanguage.googleapis.com",
        default_api_path: "/v1beta/models/{model}:generateContent",
        auth_header: "x-goog-api-key",
        auth_format: "",
        stream_support: false,
        shape: VendorShape::Gemini,
    },
    VendorAdapter {
        vendor: "mistral",
        default_api_base: "https://api.mistral.ai",
        default_api_path: "/v1/chat/completions",
        auth_header: "Authorization",
        auth_format: "Bearer",
        stream_support: true,
        shape: VendorShape::OpenAi,
    },
    VendorAdapter {
        vendor: "perplexity",
        default_api_base: "https://api.perplexity.ai",
        default_api_path: "/chat/completions",
        auth_header: "Authorization",
        auth_format: "Bearer",
        stream_support: true,
        shape: VendorShape::OpenAi,
    },
    VendorAdapter {
        vendor: "groq",
        default_api_base: "https://api.groq.com/openai",
        default_api_path: "/v1/chat/completions",
        auth_header: "Authorization",
        auth_format: "Bearer",
        stream_support: true,
        shape: VendorShape::OpenAi,
    },
    VendorAdapter {
        vendor: "ollama",
        default_api_base: "http://localhost:11434",
        default_api_path: "/api/chat",
        auth_header: "",
        auth_format: "",
        stream_support: true,
        shape: VendorShape::OllamaNative,
    },
    VendorAdapter {
        vendor: "localai",
        default_api_base: "http://localhost:8080",
        default_api_path: "/v1/chat/completions",
        auth_header: "Authorization",
        auth_format: "Bearer",
        stream_support: true,
        shape: VendorShape::OpenAi,
    },
    VendorAdapter {
        vendor: "lmstudio",
        default_api_base: "http://localhost:1234",
        default_api_path: "/v1/chat/completions",
        auth_header: "Authorization",
        auth_format: "Bearer",
        stream_support: true,
        shape: VendorShape::OpenAi,
    },
    VendorAdapter {
        vendor: "vllm",
        default_api_base: "http://localhost:8000",
        default_api_path: "/v1/chat/completions",
        auth_header: "Authorization",
        auth_format: "Bearer",
        stream_support: true,
        shape: VendorShape::OpenAi,
    },
    VendorAdapter {
        vendor: "minimax",
        default_api_base: "https://api.minimax.chat",
        default_api_path: "/v1/text/chatcompletion_v2",
        auth_header: "Authorization",
        auth_format: "Bearer",
        stream_support: true,
        shape: VendorShape::OpenAi,
    },
    VendorAdapter {
        vendor: "deepseek",
        default_api_base: "https://api.deepseek.com",
        default_api_path: "/v1/chat/completions",
        auth_header: "Authorization",
        auth_format: "Bearer",
        stream_support: true,
        shape: VendorShape::OpenAi,
    },
    VendorAdapter {
        vendor: "moonshot",
        default_api_base: "https://api.moonshot.cn",
        default_api_path: "/v1/chat/completions",
        auth_header: "Authorization",
        auth_format: "Bearer",
        stream_support: true,
        shape: VendorShape::OpenAi,
    },
    VendorAdapter {
        vendor: "stepfun",
        default_api_base: "https://api.stepfun.com",
        default_api_path: "/v1/chat/completions",
        auth_header: "Authorization",
        auth_format: "Bearer",
        stream_support: true,
        shape: VendorShape::OpenAi,
    },
    VendorAdapter {
        vendor: "custom",
        default_api_base: "",
        default_api_path: "/v1/chat/completions",
        auth_header: "Authorization",
        auth_format: "Bearer",
        stream_support: true,
        shape: VendorShape::Custom,
    },
];
