//! In-progress phonetic input: composed kana units plus a cursor.
//!
//! The cursor counts units, never bytes or raw keystrokes, so every edit
//! operates on whole transliteration results.

use crate::romaji::{transliterate, KanaUnit};

#[derive(Debug, Clone, Default)]
pub struct ComposingText {
    units: Vec<KanaUnit>,
    cursor: usize,
}

impl ComposingText {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    /// Cursor position in units, `0..=len()`.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn units(&self) -> &[KanaUnit] {
        &self.units
    }

    /// Concatenated text of every unit.
    pub fn convert_target(&self) -> String {
        self.units.iter().map(|u| u.text.as_str()).collect()
    }

    /// Raw input characters consumed by the first `units` units.
    pub fn raw_input_len(&self, units: usize) -> usize {
        self.units.iter().take(units).map(KanaUnit::raw_len).sum()
    }

    /// Insert raw romaji (or kana) at the cursor.
    ///
    /// Pending latin units directly before the cursor are re-opened so that
    /// `k` followed by a separate `a` still composes into `か`.
    pub fn insert_at_cursor(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        let start = self.units[..self.cursor]
            .iter()
            .rposition(|u| !u.pending)
            .map_or(0, |i| i + 1);

        let mut raw: String = self.units[start..self.cursor]
            .iter()
            .map(|u| u.raw.as_str())
            .collect();
        raw.push_str(text);

        let inserted = transliterate(&raw);
        let count = inserted.len();
        self.units.splice(start..self.cursor, inserted);
        self.cursor = start + count;
        tracing::trace!(cursor = self.cursor, len = self.units.len(), "insert_at_cursor");
    }

    /// Remove up to `count` units after the cursor. Returns the number removed.
    pub fn delete_forward_from_cursor(&mut self, count: i32) -> usize {
        let Ok(count) = usize::try_from(count) else {
            return 0;
        };
        let removed = count.min(self.units.len() - self.cursor);
        self.units.drain(self.cursor..self.cursor + removed);
        removed
    }

    /// Remove up to `count` units before the cursor and move the cursor back
    /// by the number removed.
    pub fn delete_backward_from_cursor(&mut self, count: i32) -> usize {
        let Ok(count) = usize::try_from(count) else {
            return 0;
        };
        let removed = count.min(self.cursor);
        self.units.drain(self.cursor - removed..self.cursor);
        self.cursor -= removed;
        removed
    }

    /// Move the cursor by `offset` units, clamped to the buffer bounds.
    /// Returns the new cursor position.
    pub fn move_cursor(&mut self, offset: i32) -> usize {
        let magnitude = offset.unsigned_abs() as usize;
        self.cursor = if offset < 0 {
            self.cursor.saturating_sub(magnitude)
        } else {
            self.cursor.saturating_add(magnitude).min(self.units.len())
        };
        self.cursor
    }

    /// Immutable copy handed to the conversion engine.
    ///
    /// A trailing pending `n` is read as `ん`; the unit count never changes.
    pub fn snapshot(&self) -> ComposingSnapshot {
        let last = self.units.len().saturating_sub(1);
        let units = self
            .units
            .iter()
            .enumerate()
            .map(|(i, u)| {
                if i == last && u.pending && u.text == "n" {
                    "ん".to_string()
                } else {
                    u.text.clone()
                }
            })
            .collect();
        let raw = self.units.iter().map(|u| u.raw.as_str()).collect();
        ComposingSnapshot { units, raw }
    }
}

/// Unit texts of a composing buffer at the moment a conversion was requested.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ComposingSnapshot {
    units: Vec<String>,
    raw: String,
}

impl ComposingSnapshot {
    pub fn from_units<S: Into<String>>(units: impl IntoIterator<Item = S>) -> Self {
        Self {
            units: units.into_iter().map(Into::into).collect(),
            raw: String::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    pub fn units(&self) -> &[String] {
        &self.units
    }

    /// Reading covered by `range` of units.
    pub fn reading(&self, range: std::ops::Range<usize>) -> String {
        self.units[range].concat()
    }

    pub fn full_reading(&self) -> String {
        self.units.concat()
    }

    /// Keystrokes behind the units, as typed.
    pub fn raw_input(&self) -> &str {
        &self.raw
    }
}
