use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use super::ResourceError;
use crate::unicode::is_hiragana_reading;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DictEntry {
    pub surface: String,
    pub cost: i16,
}

/// Reading → entries map loaded from Mozc-style TSV.
///
/// Line format: `reading\tleft_id\tright_id\tcost\tsurface`. Entries of one
/// reading are kept sorted by cost, cheapest first.
#[derive(Debug, Default)]
pub struct Lexicon {
    entries: BTreeMap<String, Vec<DictEntry>>,
}

impl Lexicon {
    /// Load a single TSV file, or every `*.tsv` / `dictionary*.txt` file of a
    /// directory in name order.
    pub fn open(path: &Path) -> Result<Self, ResourceError> {
        let io_err = |source| ResourceError::Io {
            path: path.to_path_buf(),
            source,
        };
        let files = if fs::metadata(path).map_err(io_err)?.is_dir() {
            dictionary_files(path).map_err(io_err)?
        } else {
            vec![path.to_path_buf()]
        };

        let mut lexicon = Lexicon::default();
        for file in &files {
            let content = fs::read_to_string(file).map_err(|source| ResourceError::Io {
                path: file.clone(),
                source,
            })?;
            let skipped = lexicon.add_tsv(&content);
            debug!(file = %file.display(), skipped, "loaded dictionary file");
        }

        if lexicon.entries.is_empty() {
            return Err(ResourceError::Empty {
                path: path.to_path_buf(),
            });
        }
        lexicon.sort();
        Ok(lexicon)
    }

    pub fn from_entries<R: Into<String>>(
        entries: impl IntoIterator<Item = (R, Vec<DictEntry>)>,
    ) -> Self {
        let mut lexicon = Lexicon::default();
        for (reading, list) in entries {
            lexicon
                .entries
                .entry(reading.into())
                .or_default()
                .extend(list);
        }
        lexicon.sort();
        lexicon
    }

    /// Parse TSV lines into the map. Returns the number of skipped lines.
    fn add_tsv(&mut self, content: &str) -> usize {
        let mut skipped = 0;
        for line in content.lines() {
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let fields: Vec<&str> = line.split('\t').collect();
            if fields.len() < 5 {
                skipped += 1;
                continue;
            }
            let (reading, surface) = (fields[0], fields[4]);
            let Ok(cost) = fields[3].parse::<i16>() else {
                skipped += 1;
                continue;
            };
            if !is_hiragana_reading(reading) || surface.is_empty() {
                skipped += 1;
                continue;
            }
            self.entries
                .entry(reading.to_string())
                .or_default()
                .push(DictEntry {
                    surface: surface.to_string(),
                    cost,
                });
        }
        skipped
    }

    fn sort(&mut self) {
        for list in self.entries.values_mut() {
            list.sort_by_key(|e| e.cost);
            let mut seen = std::collections::HashSet::new();
            list.retain(|e| seen.insert(e.surface.clone()));
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn lookup(&self, reading: &str) -> Option<&[DictEntry]> {
        self.entries.get(reading).map(Vec::as_slice)
    }

    /// Entries whose reading strictly extends `prefix`, cheapest first.
    pub fn predict(&self, prefix: &str, max_results: usize) -> Vec<(&str, &DictEntry)> {
        if prefix.is_empty() || max_results == 0 {
            return Vec::new();
        }
        let mut found: Vec<(&str, &DictEntry)> = self
            .entries
            .range::<str, _>((
                std::ops::Bound::Excluded(prefix),
                std::ops::Bound::Unbounded,
            ))
            .take_while(|(reading, _)| reading.starts_with(prefix))
            .flat_map(|(reading, list)| list.iter().map(move |e| (reading.as_str(), e)))
            .collect();
        found.sort_by_key(|(_, e)| e.cost);
        found.truncate(max_results);
        found
    }
}

fn dictionary_files(dir: &Path) -> std::io::Result<Vec<PathBuf>> {
    let mut files: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| {
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            name.ends_with(".tsv") || (name.starts_with("dictionary") && name.ends_with(".txt"))
        })
        .collect();
    files.sort();
    Ok(files)
}
