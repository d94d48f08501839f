//! Best-candidate selection among the primary translation and alternative
//! matches returned by the API.

use serde::{Deserialize, Serialize};

/// Phrase the free MyMemory tier substitutes for real translations once the
/// daily quota is exhausted. Matched case-insensitively.
const QUOTA_BANNER: &str = "MYMEMORY WARNING";

/// An alternative translation candidate with its quality score in [0, 1].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Match {
    pub segment: String,
    pub translation: String,
    pub score: f32,
}

/// Filtering policy applied to alternative matches before picking a winner.
/// Injected into the client rather than hardcoded so embedders can tune or
/// disable it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchPolicy {
    /// Candidates must score strictly above this to be considered.
    /// `None` considers all candidates.
    pub min_match: Option<f32>,
    /// Candidates whose translation contains any of these phrases
    /// (case-insensitive) are rejected.
    pub denylist: Vec<String>,
}

impl Default for MatchPolicy {
    fn default() -> Self {
        Self {
            min_match: Some(0.75),
            denylist: vec![QUOTA_BANNER.to_string()],
        }
    }
}

impl MatchPolicy {
    /// Policy that considers every candidate.
    pub fn unfiltered() -> Self {
        Self {
            min_match: None,
            denylist: Vec::new(),
        }
    }

    fn admits(&self, candidate: &Match) -> bool {
        if let Some(min) = self.min_match {
            if candidate.score <= min {
                return false;
            }
        }
        let lowered = candidate.translation.to_lowercase();
        !self
            .denylist
            .iter()
            .any(|phrase| lowered.contains(&phrase.to_lowercase()))
    }
}

/// Pick the best translation: the highest-scoring admitted match, ties broken
/// by first-encountered order. Falls back to the primary text when no match
/// survives filtering. Returns the chosen text and the winning score, if an
/// alternative won.
pub fn best_translation(
    primary: &str,
    matches: &[Match],
    policy: &MatchPolicy,
) -> (String, Option<f32>) {
    let mut best: Option<&Match> = None;
    for candidate in matches {
        if !policy.admits(candidate) {
            continue;
        }
        if best.map_or(true, |b| candidate.score > b.score) {
            best = Some(candidate);
        }
    }
    match best {
        Some(m) => (m.translation.clone(), Some(m.score)),
        None => (primary.to_string(), None),
    }
}
