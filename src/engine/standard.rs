use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, debug_span, warn};

use super::lexicon::Lexicon;
use super::scoring::{context_bias, WeightModel};
use super::{
    CancelToken, Candidate, ConversionEngine, ConversionResult, ConvertRequestOptions,
    EngineError, ResourceError,
};
use crate::composing::ComposingSnapshot;
use crate::settings::settings;
use crate::unicode::hiragana_to_katakana;

/// Dictionary-backed engine bundled with the bridge.
///
/// Dictionaries and weight models are loaded on first use and cached per
/// resolved path for the lifetime of the engine. Failed loads are not cached.
#[derive(Default)]
pub struct StandardEngine {
    lexicons: HashMap<PathBuf, Arc<Lexicon>>,
    models: HashMap<PathBuf, Arc<WeightModel>>,
}

impl StandardEngine {
    pub fn new() -> Self {
        Self::default()
    }

    fn lexicon(&mut self, path: &Path) -> Result<Arc<Lexicon>, ResourceError> {
        if let Some(lexicon) = self.lexicons.get(path) {
            return Ok(Arc::clone(lexicon));
        }
        let lexicon = Arc::new(Lexicon::open(path)?);
        debug!(path = %path.display(), readings = lexicon.len(), "dictionary loaded");
        self.lexicons.insert(path.to_path_buf(), Arc::clone(&lexicon));
        Ok(lexicon)
    }

    fn model(&mut self, path: &Path) -> Result<Arc<WeightModel>, ResourceError> {
        if let Some(model) = self.models.get(path) {
            return Ok(Arc::clone(model));
        }
        let model = Arc::new(WeightModel::open(path)?);
        self.models.insert(path.to_path_buf(), Arc::clone(&model));
        Ok(model)
    }
}

impl ConversionEngine for StandardEngine {
    fn request_candidates(
        &mut self,
        input: &ComposingSnapshot,
        options: &ConvertRequestOptions,
        cancel: &CancelToken,
    ) -> Result<ConversionResult, EngineError> {
        let _span = debug_span!("standard_engine", units = input.len()).entered();
        if options.learning_enabled {
            warn!("learning is not supported by the standard engine; ignoring");
        }

        let lexicon = self.lexicon(&options.dictionary_resource)?;
        let model = match &options.augmentation {
            Some(aug) => Some(self.model(&aug.weight)?),
            None => None,
        };
        if input.is_empty() {
            return Ok(ConversionResult::default());
        }

        let mut ranked = Ranking::new(input, &lexicon);
        ranked.best_path();
        ranked.fallbacks();
        if options.require_english_prediction {
            ranked.raw_input();
        }
        let rich = options
            .augmentation
            .as_ref()
            .map_or(true, |aug| aug.request_rich_candidates);
        if rich && !cancel.is_cancelled() {
            ranked.prefix_lookups(cancel);
        }
        if options.require_japanese_prediction && !cancel.is_cancelled() {
            ranked.predictions();
        }

        let mut candidates = ranked.finish();
        rescore(&mut candidates, options, model.as_deref(), cancel);
        candidates.truncate(settings().candidates.max_results);
        debug!(count = candidates.len(), "conversion finished");
        Ok(ConversionResult {
            main_results: candidates,
        })
    }
}

/// Candidate collection for one request.
struct Ranking<'a> {
    input: &'a ComposingSnapshot,
    lexicon: &'a Lexicon,
    candidates: Vec<Candidate>,
}

impl<'a> Ranking<'a> {
    fn new(input: &'a ComposingSnapshot, lexicon: &'a Lexicon) -> Self {
        Self {
            input,
            lexicon,
            candidates: Vec::new(),
        }
    }

    fn push(&mut self, text: String, corresponding_count: usize, cost: i64) {
        self.candidates.push(Candidate {
            text,
            corresponding_count,
            cost,
        });
    }

    /// Cheapest segmentation of the whole input. Units no entry covers are
    /// kept as kana at `unknown_unit_cost`.
    fn best_path(&mut self) {
        let cfg = settings();
        let n = self.input.len();
        // best[end] = (cost, start, surface) of the cheapest path ending at `end`
        let mut best: Vec<Option<(i64, usize, String)>> = vec![None; n + 1];
        best[0] = Some((0, 0, String::new()));

        for end in 1..=n {
            for start in end.saturating_sub(cfg.candidates.max_segment_units)..end {
                let Some((prefix_cost, _, _)) = &best[start] else {
                    continue;
                };
                let reading = self.input.reading(start..end);
                let (segment_cost, surface) =
                    match self.lexicon.lookup(&reading).and_then(<[_]>::first) {
                        Some(e) => (i64::from(e.cost), e.surface.clone()),
                        None if end - start == 1 => (cfg.cost.unknown_unit_cost, reading),
                        None => continue,
                    };
                let total = *prefix_cost + segment_cost + cfg.cost.segment_penalty;
                if best[end].as_ref().map_or(true, |(c, _, _)| total < *c) {
                    best[end] = Some((total, start, surface));
                }
            }
        }

        let Some((total, _, _)) = best[n].clone() else {
            return;
        };
        let mut segments = Vec::new();
        let mut end = n;
        while end > 0 {
            let Some((_, start, surface)) = &best[end] else {
                return;
            };
            segments.push(surface.clone());
            end = *start;
        }
        segments.reverse();
        self.push(segments.concat(), n, total);
    }

    /// Hiragana and katakana renderings of the whole input.
    fn fallbacks(&mut self) {
        let cfg = settings();
        let n = self.input.len();
        let reading = self.input.full_reading();
        let base = cfg.cost.unknown_unit_cost * n as i64;
        self.push(hiragana_to_katakana(&reading), n, base + cfg.cost.katakana_penalty);
        self.push(reading, n, base);
    }

    /// The raw romaji as typed, for the alternate-language path.
    fn raw_input(&mut self) {
        let n = self.input.len();
        let raw = self.input.raw_input().to_string();
        if !raw.is_empty() {
            self.push(raw, n, settings().cost.unknown_unit_cost.saturating_mul(n as i64));
        }
    }

    /// Dictionary entries for every prefix of the input, longest first.
    /// Shorter prefixes pay for the units they leave unconverted as if each
    /// were an unknown segment.
    fn prefix_lookups(&mut self, cancel: &CancelToken) {
        let cfg = settings();
        let n = self.input.len();
        for k in (1..=n.min(cfg.candidates.max_segment_units)).rev() {
            if cancel.is_cancelled() {
                debug!(remaining = k, "prefix lookups stopped");
                return;
            }
            let reading = self.input.reading(0..k);
            let Some(entries) = self.lexicon.lookup(&reading) else {
                continue;
            };
            let leftover = (cfg.cost.unknown_unit_cost + cfg.cost.segment_penalty) * (n - k) as i64;
            for e in entries {
                let cost = i64::from(e.cost) + cfg.cost.segment_penalty + leftover;
                self.push(e.surface.clone(), k, cost);
            }
        }
    }

    /// Words whose reading extends the whole input.
    fn predictions(&mut self) {
        let cfg = settings();
        let n = self.input.len();
        let reading = self.input.full_reading();
        let found: Vec<(String, i64)> = self
            .lexicon
            .predict(&reading, cfg.candidates.max_predictions)
            .into_iter()
            .map(|(_, e)| (e.surface.clone(), i64::from(e.cost) + cfg.cost.prediction_penalty))
            .collect();
        for (surface, cost) in found {
            self.push(surface, n, cost);
        }
    }

    /// Stable sort by cost, keeping the cheapest of each (text, count) pair.
    fn finish(self) -> Vec<Candidate> {
        let mut candidates = self.candidates;
        candidates.sort_by_key(|c| c.cost);
        dedup(&mut candidates);
        candidates
    }
}

fn dedup(candidates: &mut Vec<Candidate>) {
    let mut seen = HashSet::new();
    candidates.retain(|c| seen.insert((c.text.clone(), c.corresponding_count)));
}

/// Apply the left-context bias and, when present, the weight model.
/// A stop request skips the model pass and keeps the plain ranking.
fn rescore(
    candidates: &mut [Candidate],
    options: &ConvertRequestOptions,
    model: Option<&WeightModel>,
    cancel: &CancelToken,
) {
    let cfg = &settings().scoring;
    for candidate in candidates.iter_mut() {
        let bias = context_bias(
            &candidate.text,
            &options.left_side_context,
            cfg.context_window,
            cfg.context_bonus,
        );
        let adjustment = match model {
            Some(model) if !cancel.is_cancelled() => model.adjust(candidate, bias),
            _ => 0,
        };
        candidate.cost = candidate.cost.saturating_add(bias).saturating_add(adjustment);
    }
    candidates.sort_by_key(|c| c.cost);
}
