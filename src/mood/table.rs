//! Emotion → candidate artist table.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::emotion::Emotion;

/// Read-only mapping from each supported [`Emotion`] to its candidate
/// artists.
///
/// Serialises as a TOML table keyed by the lowercase emotion name, so the
/// `[moods]` section of `settings.toml` can replace it wholesale.  An
/// emotion without an entry (or with an empty list) is unsupported.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MoodTable(BTreeMap<Emotion, Vec<String>>);

impl MoodTable {
    pub fn new(entries: BTreeMap<Emotion, Vec<String>>) -> Self {
        Self(entries)
    }

    /// Candidate artists for `emotion`, in table order.  Empty when the
    /// emotion is not mapped.
    pub fn candidates(&self, emotion: Emotion) -> &[String] {
        self.0.get(&emotion).map(Vec::as_slice).unwrap_or(&[])
    }

    /// `true` when `emotion` has at least one candidate.
    pub fn supports(&self, emotion: Emotion) -> bool {
        !self.candidates(emotion).is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Default for MoodTable {
    fn default() -> Self {
        let entries: [(Emotion, &[&str]); 7] = [
            (Emotion::Happy, &["Dua Lipa", "Bruno Mars"]),
            (Emotion::Sad, &["Adele", "Billie Eilish"]),
            (Emotion::Angry, &["Rage Against the Machine", "Eminem"]),
            (Emotion::Surprised, &["David Bowie", "ROSALÍA"]),
            (Emotion::Fearful, &["Halsey", "Lorde"]),
            (Emotion::Disgusted, &["Nirvana", "Nine Inch Nails"]),
            (Emotion::Neutral, &["John Mayer", "Ed Sheeran"]),
        ];
        Self(
            entries
                .into_iter()
                .map(|(e, artists)| (e, artists.iter().map(|a| a.to_string()).collect()))
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_covers_every_emotion() {
        let table = MoodTable::default();
        for emotion in Emotion::ALL {
            assert_eq!(table.candidates(emotion).len(), 2, "{emotion}");
        }
    }

    #[test]
    fn missing_entry_has_no_candidates() {
        let table = MoodTable::new(BTreeMap::from([(Emotion::Sad, vec!["Adele".into()])]));
        assert!(table.supports(Emotion::Sad));
        assert!(!table.supports(Emotion::Happy));
        assert!(table.candidates(Emotion::Happy).is_empty());
    }

    #[test]
    fn empty_list_is_unsupported() {
        let table = MoodTable::new(BTreeMap::from([(Emotion::Neutral, Vec::new())]));
        assert!(!table.supports(Emotion::Neutral));
    }

    #[test]
    fn serialises_with_lowercase_keys() {
        let table = MoodTable::new(BTreeMap::from([(
            Emotion::Surprised,
            vec!["David Bowie".into()],
        )]));
        let json = serde_json::to_string(&table).unwrap();
        assert_eq!(json, r#"{"surprised":["David Bowie"]}"#);
    }
}
