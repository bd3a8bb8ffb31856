use itertools::Itertools;
use log::warn;
use thiserror::Error;

use crate::model::Round;

/// Word data packaged with the crate, in the provider's CSV format.
const BUNDLED_WORDS: &str = include_str!("../../data/words.csv");

const CSV_COLUMNS: usize = 9;

/// Read-only question source consumed at gate start.
pub trait ContentProvider {
    /// Ordered rounds for a gate, normally 5. May be short or empty for an
    /// unknown gate id; the session pads with fallback rounds.
    fn questions_for_gate(&self, gate_id: u32) -> Vec<Round>;

    /// Base DDS for a gate: the first round's value, 1.0 when absent.
    fn dds_for_gate(&self, gate_id: u32) -> f64;

    /// Unique planets present in the content, for the hub listing.
    fn planets(&self) -> Vec<Planet>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Planet {
    pub id: u32,
    pub name: String,
}

#[derive(Debug, Error)]
pub enum ContentError {
    #[error("word data has no header line")]
    MissingHeader,
    #[error("word data header has {0} columns, expected {CSV_COLUMNS}")]
    BadHeader(usize),
}

#[derive(Debug, Clone)]
struct WordEntry {
    planet_id: u32,
    planet_name: String,
    gate_id: u32,
    dds: f64,
    target: String,
    distractors: [String; 3],
}

/// CSV-backed word bank. Malformed lines are skipped with a warning; only a
/// missing or unrecognizable header is an error.
#[derive(Debug, Clone, Default)]
pub struct WordBank {
    entries: Vec<WordEntry>,
}

impl WordBank {
    pub fn bundled() -> Self {
        Self::from_csv(BUNDLED_WORDS).unwrap_or_else(|e| {
            warn!(target: "content", "Bundled word data unusable: {}", e);
            Self::default()
        })
    }

    pub fn from_csv(text: &str) -> Result<Self, ContentError> {
        let mut lines = text.lines();
        let header = lines.next().ok_or(ContentError::MissingHeader)?;
        let column_count = header.split(',').count();
        if column_count != CSV_COLUMNS {
            return Err(ContentError::BadHeader(column_count));
        }

        let mut entries = Vec::new();
        for (line_no, line) in lines.enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            match Self::parse_line(line) {
                Some(entry) => entries.push(entry),
                None => {
                    warn!(target: "content", "Skipping malformed word line {}: {:?}", line_no + 2, line)
                }
            }
        }
        Ok(Self { entries })
    }

    fn parse_line(line: &str) -> Option<WordEntry> {
        let fields: Vec<&str> = line.split(',').collect();
        if fields.len() != CSV_COLUMNS {
            return None;
        }
        Some(WordEntry {
            planet_id: fields[0].parse().ok()?,
            planet_name: fields[1].to_string(),
            gate_id: fields[2].parse().ok()?,
            dds: fields[4].parse().ok()?,
            target: fields[5].to_string(),
            distractors: [
                fields[6].to_string(),
                fields[7].to_string(),
                fields[8].to_string(),
            ],
        })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl ContentProvider for WordBank {
    fn questions_for_gate(&self, gate_id: u32) -> Vec<Round> {
        self.entries
            .iter()
            .filter(|entry| entry.gate_id == gate_id)
            .enumerate()
            .map(|(ordinal, entry)| Round {
                gate_id,
                ordinal,
                target: entry.target.clone(),
                distractors: entry.distractors.clone(),
                base_difficulty: entry.dds,
            })
            .collect()
    }

    fn dds_for_gate(&self, gate_id: u32) -> f64 {
        self.entries
            .iter()
            .find(|entry| entry.gate_id == gate_id)
            .map(|entry| entry.dds)
            .unwrap_or(1.0)
    }

    fn planets(&self) -> Vec<Planet> {
        self.entries
            .iter()
            .unique_by(|entry| entry.planet_id)
            .map(|entry| Planet {
                id: entry.planet_id,
                name: entry.planet_name.clone(),
            })
            .collect()
    }
}
