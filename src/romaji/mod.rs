//! Romaji-to-kana transliteration used by the composing buffer.
//!
//! A trie built from the embedded mapping table converts ASCII keystrokes
//! into hiragana units, handling sokuon (っ), hatsuon (ん), and yōon (きゃ).

mod convert;
mod trie;

pub use convert::{transliterate, KanaUnit};
pub use trie::{parse_romaji_toml, RomajiConfigError, RomajiTrie, TrieLookupResult};

pub(crate) const DEFAULT_TOML: &str = include_str!("default_romaji.toml");
