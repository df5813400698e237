use std::path::{Path, PathBuf};

use super::ResourceError;

/// A boundary conversion request, before it is turned into engine options.
#[derive(Debug, Clone, Copy)]
pub struct ConversionRequest<'a> {
    pub context: &'a str,
    pub dictionary_path: &'a str,
    /// Empty disables the scoring-model augmentation pass.
    pub weight_path: &'a str,
}

/// Scoring-model augmentation settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AugmentationOptions {
    pub weight: PathBuf,
    /// Also return candidates that consume only a prefix of the input.
    pub request_rich_candidates: bool,
}

/// Engine-native request options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConvertRequestOptions {
    pub require_japanese_prediction: bool,
    pub require_english_prediction: bool,
    /// The bridge never persists anything between calls.
    pub learning_enabled: bool,
    pub dictionary_resource: PathBuf,
    pub augmentation: Option<AugmentationOptions>,
    pub left_side_context: String,
    pub metadata: String,
}

impl ConversionRequest<'_> {
    /// Build engine options with the bridge's fixed policy: Japanese
    /// prediction on, English prediction off, learning off, augmentation on
    /// whenever a weight path is given.
    pub fn to_options(&self) -> Result<ConvertRequestOptions, ResourceError> {
        let augmentation = if self.weight_path.is_empty() {
            None
        } else {
            Some(AugmentationOptions {
                weight: resolve_resource_path(self.weight_path)?,
                request_rich_candidates: true,
            })
        };
        Ok(ConvertRequestOptions {
            require_japanese_prediction: true,
            require_english_prediction: false,
            learning_enabled: false,
            dictionary_resource: resolve_resource_path(self.dictionary_path)?,
            augmentation,
            left_side_context: self.context.to_string(),
            metadata: concat!("kkc-bridge ", env!("CARGO_PKG_VERSION")).to_string(),
        })
    }
}

/// Resolve `path` against the process working directory unless absolute.
pub(crate) fn resolve_resource_path(path: &str) -> Result<PathBuf, ResourceError> {
    let path = Path::new(path);
    if path.is_absolute() {
        return Ok(path.to_path_buf());
    }
    let cwd = std::env::current_dir().map_err(ResourceError::WorkingDirectory)?;
    Ok(cwd.join(path))
}
