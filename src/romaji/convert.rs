use super::trie::{RomajiTrie, TrieLookupResult};

/// One composed unit of phonetic input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KanaUnit {
    /// Text shown for this unit (kana, a symbol, or a pending latin letter).
    pub text: String,
    /// Raw input characters this unit consumed.
    pub raw: String,
    /// Latin letter still waiting for more input, e.g. the `k` of `ka`.
    pub pending: bool,
}

impl KanaUnit {
    fn composed(text: impl Into<String>, raw: &str) -> Self {
        Self {
            text: text.into(),
            raw: raw.to_string(),
            pending: false,
        }
    }

    fn pending(ch: char) -> Self {
        Self {
            text: ch.to_string(),
            raw: ch.to_string(),
            pending: true,
        }
    }

    /// Number of raw input characters this unit consumed.
    pub fn raw_len(&self) -> usize {
        self.raw.chars().count()
    }
}

fn is_vowel(ch: char) -> bool {
    matches!(ch, 'a' | 'i' | 'u' | 'e' | 'o')
}

fn is_sokuon(first: char, second: char) -> bool {
    let doubled =
        first == second && first.is_ascii_alphabetic() && first != 'n' && !is_vowel(first);
    doubled || (first == 't' && second == 'c')
}

/// Transliterate raw input into composed units.
///
/// Input is consumed one character at a time. Sequences that may still grow
/// into a longer match (`n`, `sh`, `ky`) are left as pending units at the end
/// of the output, one per raw letter.
pub fn transliterate(input: &str) -> Vec<KanaUnit> {
    let trie = RomajiTrie::global();
    let mut units = Vec::new();
    let mut pending = String::new();

    for ch in input.chars() {
        pending.push(ch);
        drain(trie, &mut pending, &mut units);
    }

    units.extend(pending.chars().map(KanaUnit::pending));
    units
}

fn drain(trie: &RomajiTrie, pending: &mut String, units: &mut Vec<KanaUnit>) {
    while !pending.is_empty() {
        match trie.lookup(pending) {
            TrieLookupResult::Exact(kana) => {
                units.push(KanaUnit::composed(kana, pending));
                pending.clear();
            }
            // A longer sequence may still match; wait for the next keystroke.
            TrieLookupResult::ExactAndPrefix(_) | TrieLookupResult::Prefix => break,
            TrieLookupResult::None => resolve_no_match(trie, pending, units),
        }
    }
}

/// `pending` has no full match. Emit exactly one unit from its front: the
/// longest mapped sub-prefix, a sokuon/hatsuon, or the first character as-is.
fn resolve_no_match(trie: &RomajiTrie, pending: &mut String, units: &mut Vec<KanaUnit>) {
    let boundaries: Vec<usize> = pending.char_indices().map(|(i, _)| i).skip(1).collect();
    for &end in boundaries.iter().rev() {
        let sub = &pending[..end];
        if let TrieLookupResult::Exact(kana) | TrieLookupResult::ExactAndPrefix(kana) =
            trie.lookup(sub)
        {
            units.push(KanaUnit::composed(kana, sub));
            pending.replace_range(..end, "");
            return;
        }
    }

    let mut chars = pending.chars();
    let Some(first) = chars.next() else {
        return;
    };
    let text = match chars.next() {
        Some(second) if is_sokuon(first, second) => "っ".to_string(),
        Some(second) if first == 'n' && !is_vowel(second) && second != 'n' && second != 'y' => {
            "ん".to_string()
        }
        _ => first.to_string(),
    };
    units.push(KanaUnit::composed(text, &first.to_string()));
    pending.replace_range(..first.len_utf8(), "");
}
