use std::collections::HashMap;
use std::fs;
use std::path::Path;

use serde::Deserialize;

use super::{Candidate, ResourceError};
use crate::unicode::{is_kanji, is_katakana};

/// Auxiliary scoring model applied in the augmentation pass.
///
/// Loaded from TOML:
///
/// ```toml
/// [model]
/// context_weight = 100   # percent applied to the context bias
/// length_weight = 200    # bonus per consumed composing unit
///
/// [bias]
/// "制度" = -1500         # added to the candidate cost
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WeightModel {
    #[serde(default)]
    model: ModelParams,
    #[serde(default)]
    bias: HashMap<String, i64>,
}

#[derive(Debug, Clone, Deserialize)]
struct ModelParams {
    #[serde(default = "default_context_weight")]
    context_weight: i64,
    #[serde(default)]
    length_weight: i64,
}

fn default_context_weight() -> i64 {
    100
}

impl Default for ModelParams {
    fn default() -> Self {
        Self {
            context_weight: default_context_weight(),
            length_weight: 0,
        }
    }
}

impl WeightModel {
    pub fn open(path: &Path) -> Result<Self, ResourceError> {
        let content = fs::read_to_string(path).map_err(|source| ResourceError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&content).map_err(|msg| ResourceError::InvalidWeights {
            path: path.to_path_buf(),
            msg,
        })
    }

    pub fn parse(toml_str: &str) -> Result<Self, String> {
        let model: WeightModel = toml::from_str(toml_str).map_err(|e| e.to_string())?;
        if model.model.context_weight < 0 {
            return Err("model.context_weight must be non-negative".to_string());
        }
        Ok(model)
    }

    /// Cost adjustment for `candidate` given its plain context bias.
    pub fn adjust(&self, candidate: &Candidate, context_bias: i64) -> i64 {
        let bias = self.bias.get(&candidate.text).copied().unwrap_or(0);
        let length = self
            .model
            .length_weight
            .saturating_mul(candidate.corresponding_count as i64);
        let context = context_bias.saturating_mul(self.model.context_weight.saturating_sub(100)) / 100;
        bias.saturating_sub(length).saturating_add(context)
    }
}

/// Bonus (negative cost) for candidates sharing kanji or katakana with the
/// tail of the left-side context. Kana-only candidates get nothing.
pub(crate) fn context_bias(surface: &str, context: &str, window: usize, bonus: i64) -> i64 {
    if context.is_empty() || window == 0 || bonus == 0 {
        return 0;
    }
    let tail: Vec<char> = {
        let chars: Vec<char> = context.chars().collect();
        chars[chars.len().saturating_sub(window)..].to_vec()
    };
    let significant: Vec<char> = surface
        .chars()
        .filter(|&c| is_kanji(c) || is_katakana(c))
        .collect();
    if significant.is_empty() {
        return 0;
    }
    let shared = significant.iter().filter(|c| tail.contains(c)).count() as i64;
    -(bonus.saturating_mul(shared) / significant.len() as i64)
}
