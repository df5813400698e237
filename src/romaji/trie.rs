use std::collections::{BTreeMap, HashMap};
use std::sync::OnceLock;

use serde::Deserialize;

use super::DEFAULT_TOML;

static CUSTOM_TOML: OnceLock<String> = OnceLock::new();
static INSTANCE: OnceLock<RomajiTrie> = OnceLock::new();

#[derive(Debug, thiserror::Error)]
pub enum RomajiConfigError {
    #[error("TOML parse error: {0}")]
    Parse(String),
    #[error("[mappings] table is empty")]
    Empty,
    #[error("key {0:?} is not printable ASCII; keystrokes never produce it")]
    UnreachableKey(String),
    #[error("value for {0:?} is empty or contains NUL")]
    BadValue(String),
    #[error("romaji table already in use")]
    AlreadyInitialized,
}

#[derive(Deserialize)]
struct RomajiTable {
    mappings: BTreeMap<String, String>,
}

/// Parse and check a `[mappings]` table, sorted by romaji.
///
/// Keys are matched byte by byte against ASCII keystrokes, so a key with
/// non-ASCII or control characters could never be completed. Values cross
/// the C ABI as NUL-terminated strings.
pub fn parse_romaji_toml(toml_str: &str) -> Result<BTreeMap<String, String>, RomajiConfigError> {
    let table: RomajiTable =
        toml::from_str(toml_str).map_err(|e| RomajiConfigError::Parse(e.to_string()))?;
    if table.mappings.is_empty() {
        return Err(RomajiConfigError::Empty);
    }
    for (key, value) in &table.mappings {
        if key.is_empty() || !key.bytes().all(|b| b.is_ascii_graphic()) {
            return Err(RomajiConfigError::UnreachableKey(key.clone()));
        }
        if value.is_empty() || value.contains('\0') {
            return Err(RomajiConfigError::BadValue(key.clone()));
        }
    }
    Ok(table.mappings)
}

#[derive(Debug, PartialEq)]
pub enum TrieLookupResult {
    None,
    Prefix,
    Exact(String),
    ExactAndPrefix(String),
}

struct Node {
    children: HashMap<u8, Node>,
    kana: Option<String>,
}

impl Node {
    fn new() -> Self {
        Self {
            children: HashMap::new(),
            kana: None,
        }
    }
}

pub struct RomajiTrie {
    root: Node,
}

impl RomajiTrie {
    /// Build a trie from `(romaji, kana)` pairs.
    pub fn from_mappings<'a>(mappings: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        let mut trie = RomajiTrie { root: Node::new() };
        for (romaji, kana) in mappings {
            trie.insert(romaji, kana);
        }
        trie
    }

    /// Replace the embedded table. Fails once `global()` has been called.
    pub fn init_custom(toml_content: String) -> Result<(), RomajiConfigError> {
        if INSTANCE.get().is_some() {
            return Err(RomajiConfigError::AlreadyInitialized);
        }
        parse_romaji_toml(&toml_content)?;
        CUSTOM_TOML
            .set(toml_content)
            .map_err(|_| RomajiConfigError::AlreadyInitialized)
    }

    /// Get or initialize the global singleton.
    pub fn global() -> &'static RomajiTrie {
        INSTANCE.get_or_init(|| {
            let toml_str = CUSTOM_TOML.get().map_or(DEFAULT_TOML, String::as_str);
            // Custom tables are validated in init_custom, the embedded one in build.rs
            let map = parse_romaji_toml(toml_str).expect("romaji TOML must be valid");
            Self::from_mappings(map.iter().map(|(r, k)| (r.as_str(), k.as_str())))
        })
    }

    pub fn lookup(&self, romaji: &str) -> TrieLookupResult {
        let mut node = &self.root;
        for &b in romaji.as_bytes() {
            match node.children.get(&b) {
                Some(child) => node = child,
                None => return TrieLookupResult::None,
            }
        }
        let has_children = !node.children.is_empty();
        match (&node.kana, has_children) {
            (Some(kana), true) => TrieLookupResult::ExactAndPrefix(kana.clone()),
            (Some(kana), false) => TrieLookupResult::Exact(kana.clone()),
            (None, true) => TrieLookupResult::Prefix,
            (None, false) => TrieLookupResult::None,
        }
    }

    fn insert(&mut self, romaji: &str, kana: &str) {
        let mut node = &mut self.root;
        for &b in romaji.as_bytes() {
            node = node.children.entry(b).or_insert_with(Node::new);
        }
        node.kana = Some(kana.to_string());
    }
}
