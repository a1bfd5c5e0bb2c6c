//! Viseme Vocabulary and Map Resolution
//!
//! Dialogue audio drives the mouth through a fixed 9-symbol phoneme-code
//! alphabet (`A`..`H` plus `X`, the silence/rest shape). Which blend shape
//! each code should move depends entirely on the loaded asset, so the
//! mapping is resolved at runtime from the discovered morph vocabulary:
//!
//! 1. Three canonical candidate tables (ARKit-style, Oculus-style, and a
//!    generic-name style) are scored by how many of their 9 targets the
//!    asset actually has.
//! 2. The highest-scoring table wins if it clears a configurable
//!    threshold (default 4 of 9); ties keep ARKit → Oculus → generic
//!    preference order.
//! 3. Otherwise a custom map is synthesized from the asset's
//!    mouth/jaw/viseme-classified names via ordered keyword-priority
//!    lists per code.
//!
//! An asset with no mouth-related morphs at all resolves to an all-null
//! map: lip-sync becomes a deliberate, silent no-op.
//!
//! All candidate tables and keyword lists are pure data, not branching
//! code, so new map styles are additive.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::registry::MorphInventory;

/// One symbol of the mouth-shape alphabet.
///
/// Codes follow the Rhubarb-style convention: `A`..`H` are progressively
/// articulated mouth shapes, `X` is the closed rest shape used for
/// silence.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum PhonemeCode {
    /// Open vowel, as in "trap".
    A,
    /// Closed consonant, as the K in "look".
    B,
    /// Spread vowel, as in "beet".
    C,
    /// Wide open vowel.
    D,
    /// Rounded vowel, as in "lot".
    E,
    /// Puckered vowel, as in "boot".
    F,
    /// Labiodental, as the F in "fluff".
    G,
    /// Dental, as the TH in "thin".
    H,
    /// Silence/rest position.
    #[default]
    X,
}

impl PhonemeCode {
    /// Every code, in canonical table order.
    pub const ALL: [Self; 9] = [
        Self::A,
        Self::B,
        Self::C,
        Self::D,
        Self::E,
        Self::F,
        Self::G,
        Self::H,
        Self::X,
    ];

    /// Position of this code within [`PhonemeCode::ALL`].
    #[must_use]
    pub fn index(self) -> usize {
        self as usize
    }
}

/// One timed mouth-shape cue within a lip-sync track.
///
/// Serialized shape matches the Rhubarb-style JSON the speech pipeline
/// emits: `{"start": 0.0, "end": 0.25, "value": "A"}`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct MouthCue {
    /// Cue start, seconds from the beginning of the utterance.
    pub start: f32,
    /// Cue end, seconds (exclusive).
    pub end: f32,
    /// The mouth shape to hold during the cue.
    pub value: PhonemeCode,
}

/// Timed mouth-shape cues for one utterance.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct LipSyncTrack {
    /// Cues in ascending start order.
    #[serde(rename = "mouthCues", default)]
    pub mouth_cues: Vec<MouthCue>,
}

impl LipSyncTrack {
    /// The code active at `elapsed` seconds, or `X` outside every cue.
    #[must_use]
    pub fn code_at(&self, elapsed: f32) -> PhonemeCode {
        self.mouth_cues
            .iter()
            .find(|cue| elapsed >= cue.start && elapsed < cue.end)
            .map_or(PhonemeCode::X, |cue| cue.value)
    }
}

/// Whether a morph name belongs to the mouth region.
///
/// Mouth/jaw/viseme-classified morphs are written exclusively by the
/// lip-sync path; the expression blender skips them so two components
/// never fight over the same control.
#[must_use]
pub fn is_mouth_related(name: &str) -> bool {
    let lower = name.to_lowercase();
    lower.contains("mouth") || lower.contains("jaw") || lower.contains("viseme")
}

/// How a viseme map was produced.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum MapStrategy {
    /// ARKit / Ready Player Me viseme names.
    ArKit,
    /// Oculus standard viseme names.
    Oculus,
    /// Generic mouth-shape names.
    Generic,
    /// Synthesized from the asset's own mouth-related names.
    Custom,
}

/// A candidate viseme table: a strategy plus its 9 target names.
struct CandidateTable {
    strategy: MapStrategy,
    targets: [&'static str; 9],
}

/// Canonical candidate tables, in tie-breaking preference order.
const CANDIDATE_TABLES: [CandidateTable; 3] = [
    CandidateTable {
        strategy: MapStrategy::ArKit,
        targets: [
            "viseme_aa",  // A
            "viseme_kk",  // B
            "viseme_ee",  // C
            "viseme_aa",  // D
            "viseme_oh",  // E
            "viseme_ou",  // F
            "viseme_ff",  // G
            "viseme_th",  // H
            "viseme_sil", // X
        ],
    },
    CandidateTable {
        strategy: MapStrategy::Oculus,
        targets: [
            "viseme_PP",  // A
            "viseme_CH",  // B
            "viseme_DD",  // C
            "viseme_FF",  // D
            "viseme_kk",  // E
            "viseme_ih",  // F
            "viseme_AA",  // G
            "viseme_E",   // H
            "viseme_sil", // X
        ],
    },
    CandidateTable {
        strategy: MapStrategy::Generic,
        targets: [
            "mouthOpen",    // A
            "mouthClose",   // B
            "mouthSmile",   // C
            "jawOpen",      // D
            "mouthRound",   // E
            "mouthPucker",  // F
            "mouthStretch", // G
            "mouthFunnel",  // H
            "mouthClose",   // X
        ],
    },
];

/// Ordered keyword priorities per code for custom-map synthesis.
const CUSTOM_KEYWORDS: [&[&str]; 9] = [
    &["open", "aa", "ah"],        // A
    &["close", "kk", "k"],        // B
    &["ee", "ih", "smile"],       // C
    &["open", "aa", "ah"],        // D
    &["oh", "o", "round"],        // E
    &["ou", "oo", "pucker"],      // F
    &["ff", "f", "stretch"],      // G
    &["th", "funnel"],            // H
    &["sil", "close", "neutral"], // X
];

/// An immutable phoneme-code → morph-name mapping for one asset.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VisemeMap {
    strategy: MapStrategy,
    targets: [Option<String>; 9],
}

impl VisemeMap {
    /// The morph target bound to a code, if any.
    #[must_use]
    pub fn target(&self, code: PhonemeCode) -> Option<&str> {
        self.targets[code.index()].as_deref()
    }

    /// How this map was produced.
    #[must_use]
    pub fn strategy(&self) -> MapStrategy {
        self.strategy
    }

    /// True when every code maps to null; lip-sync is then a no-op.
    #[must_use]
    pub fn is_silent(&self) -> bool {
        self.targets.iter().all(Option::is_none)
    }

    fn from_table(table: &CandidateTable) -> Self {
        Self {
            strategy: table.strategy,
            targets: table.targets.map(|name| Some(name.to_string())),
        }
    }
}

/// Count how many of a table's 9 per-code targets the asset carries.
///
/// Counted per code, so a name a table uses for two codes counts twice.
fn match_count(targets: &[&'static str; 9], inventory: &MorphInventory) -> usize {
    targets.iter().filter(|name| inventory.contains(name)).count()
}

/// Synthesize a map from the asset's mouth-related names.
fn synthesize_custom(inventory: &MorphInventory) -> VisemeMap {
    let mouth_names: Vec<&String> = inventory
        .names()
        .iter()
        .filter(|name| is_mouth_related(name))
        .collect();

    let targets = CUSTOM_KEYWORDS.map(|keywords| {
        keywords
            .iter()
            .find_map(|keyword| {
                mouth_names
                    .iter()
                    .find(|name| name.to_lowercase().contains(keyword))
                    .map(|name| (*name).clone())
            })
            // Fall back to the first mouth-related name; with none at
            // all the code stays unbound.
            .or_else(|| mouth_names.first().map(|name| (*name).clone()))
    });

    VisemeMap {
        strategy: MapStrategy::Custom,
        targets,
    }
}

/// Resolve the best viseme map for a discovered morph vocabulary.
///
/// `threshold` is the minimum per-code match count a canonical table
/// needs before it is trusted (the default configuration uses 4 of 9).
#[must_use]
pub fn resolve_map(inventory: &MorphInventory, threshold: usize) -> VisemeMap {
    let mut best: Option<(&CandidateTable, usize)> = None;

    for table in &CANDIDATE_TABLES {
        let count = match_count(&table.targets, inventory);
        debug!(strategy = ?table.strategy, count, "viseme table match count");

        // Strictly-greater keeps the earlier table on ties.
        if count >= threshold && best.map_or(true, |(_, top)| count > top) {
            best = Some((table, count));
        }
    }

    match best {
        Some((table, count)) => {
            debug!(strategy = ?table.strategy, count, "selected canonical viseme table");
            VisemeMap::from_table(table)
        }
        None => {
            let map = synthesize_custom(inventory);
            debug!(silent = map.is_silent(), "synthesized custom viseme map");
            map
        }
    }
}

/// Per-asset viseme-map resolution with caching.
///
/// Resolution runs once per asset identity; repeated calls with the same
/// id return the cached map untouched, so the mapping is immutable for
/// the lifetime of the asset.
#[derive(Debug)]
pub struct VisemeResolver {
    threshold: usize,
    cache: HashMap<String, VisemeMap>,
}

impl VisemeResolver {
    /// Create a resolver with the given canonical-table threshold.
    #[must_use]
    pub fn new(threshold: usize) -> Self {
        Self {
            threshold,
            cache: HashMap::new(),
        }
    }

    /// Resolve (or fetch the cached) map for one asset.
    pub fn resolve(&mut self, asset_id: &str, inventory: &MorphInventory) -> &VisemeMap {
        self.cache
            .entry(asset_id.to_string())
            .or_insert_with(|| resolve_map(inventory, self.threshold))
    }

    /// Whether an asset already has a resolved map.
    #[must_use]
    pub fn is_resolved(&self, asset_id: &str) -> bool {
        self.cache.contains_key(asset_id)
    }
}
