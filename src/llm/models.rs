//! Model catalog, tiers and per-tier generation settings

use super::types::LLMRequest;
use serde::Serialize;

/// Model generation family, which decides the sampling settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ModelTier {
    #[serde(rename = "2.5")]
    Gemini25,
    #[serde(rename = "2.0")]
    Gemini20,
    #[serde(rename = "other")]
    Other,
}

impl ModelTier {
    pub fn of(model: &str) -> Self {
        if model.contains("2.5") {
            ModelTier::Gemini25
        } else if model.contains("2.0") {
            ModelTier::Gemini20
        } else {
            ModelTier::Other
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ModelTier::Gemini25 => "2.5",
            ModelTier::Gemini20 => "2.0",
            ModelTier::Other => "other",
        }
    }
}

/// Sampling settings applied to a request
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct GenerationConfig {
    pub temperature: Option<f32>,
    pub top_p: Option<f32>,
    pub top_k: Option<u32>,
    pub max_tokens: Option<u32>,
}

impl GenerationConfig {
    pub fn for_tier(tier: ModelTier) -> Self {
        match tier {
            ModelTier::Gemini25 => Self {
                temperature: Some(0.1),
                top_p: Some(0.95),
                top_k: Some(40),
                max_tokens: Some(4096),
            },
            ModelTier::Gemini20 => Self {
                temperature: Some(0.2),
                top_p: Some(0.9),
                top_k: Some(50),
                max_tokens: Some(3072),
            },
            ModelTier::Other => Self::default(),
        }
    }

    pub fn for_model(model: &str) -> Self {
        Self::for_tier(ModelTier::of(model))
    }

    /// Copies the set values onto a request
    pub fn apply(&self, mut request: LLMRequest) -> LLMRequest {
        request.temperature = self.temperature.or(request.temperature);
        request.top_p = self.top_p.or(request.top_p);
        request.top_k = self.top_k.or(request.top_k);
        request.max_tokens = self.max_tokens.or(request.max_tokens);
        request
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ModelInfo {
    pub name: &'static str,
    pub tier: ModelTier,
    pub description: &'static str,
}

pub const SUPPORTED_MODELS: &[ModelInfo] = &[
    ModelInfo {
        name: "gemini-2.5-pro",
        tier: ModelTier::Gemini25,
        description: "Most capable, slowest and most quota-constrained",
    },
    ModelInfo {
        name: "gemini-2.5-flash",
        tier: ModelTier::Gemini25,
        description: "Balanced quality and latency",
    },
    ModelInfo {
        name: "gemini-2.5-flash-lite",
        tier: ModelTier::Gemini25,
        description: "Lowest latency of the 2.5 family",
    },
    ModelInfo {
        name: "gemini-2.0-flash",
        tier: ModelTier::Gemini20,
        description: "Previous generation, generous quota",
    },
    ModelInfo {
        name: "gemini-2.0-flash-lite",
        tier: ModelTier::Gemini20,
        description: "Previous generation, cheapest",
    },
];

const SELECTION_PRIORITY: &[&str] = &[
    "gemini-2.5-flash",
    "gemini-2.5-pro",
    "gemini-2.0-flash",
    "gemini-2.5-flash-lite",
    "gemini-2.0-flash-lite",
];

/// Models tried, in order, when the selected model is unavailable
pub const FALLBACK_MODELS: &[&str] = &[
    "gemini-2.5-flash",
    "gemini-2.0-flash",
    "gemini-2.5-flash-lite",
];

pub fn is_supported(model: &str) -> bool {
    SUPPORTED_MODELS.iter().any(|m| m.name == model)
}

pub fn model_info(model: &str) -> Option<&'static ModelInfo> {
    SUPPORTED_MODELS.iter().find(|m| m.name == model)
}

/// Picks the model for a request
///
/// A supported explicit request wins; an unknown name is ignored in favor of
/// the priority list.
pub fn select_model(requested: Option<&str>) -> &'static str {
    if let Some(name) = requested.map(str::trim) {
        if let Some(info) = model_info(name) {
            return info.name;
        }
        tracing::warn!(model = name, "Unsupported model requested, using default");
    }
    SELECTION_PRIORITY[0]
}

/// Next fallback model after `current`, skipping `current` itself
pub fn next_fallback(current: &str) -> Option<&'static str> {
    FALLBACK_MODELS.iter().copied().find(|m| *m != current)
}
