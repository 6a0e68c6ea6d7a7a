//! The fixed emotion enumeration and label normalisation.

use serde::{Deserialize, Serialize};

/// Emotions the mood table can be keyed by.
///
/// The serialised (and canonical) form is the lowercase adjective, e.g.
/// `"happy"`, `"surprised"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Emotion {
    Happy,
    Sad,
    Angry,
    Surprised,
    Fearful,
    Disgusted,
    Neutral,
}

impl Emotion {
    /// Every variant, in declaration order.
    pub const ALL: [Emotion; 7] = [
        Emotion::Happy,
        Emotion::Sad,
        Emotion::Angry,
        Emotion::Surprised,
        Emotion::Fearful,
        Emotion::Disgusted,
        Emotion::Neutral,
    ];

    /// Canonical lowercase name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Emotion::Happy => "happy",
            Emotion::Sad => "sad",
            Emotion::Angry => "angry",
            Emotion::Surprised => "surprised",
            Emotion::Fearful => "fearful",
            Emotion::Disgusted => "disgusted",
            Emotion::Neutral => "neutral",
        }
    }

    /// Normalise a classifier label to an [`Emotion`].
    ///
    /// Case and surrounding whitespace are ignored.  Besides the canonical
    /// names, the noun forms used by common classifier vocabularies are
    /// accepted.  Anything else is `None`.
    ///
    /// ```
    /// use mood_player::emotion::Emotion;
    ///
    /// assert_eq!(Emotion::parse("  HAPPY "), Some(Emotion::Happy));
    /// assert_eq!(Emotion::parse("surprise"), Some(Emotion::Surprised));
    /// assert_eq!(Emotion::parse("contempt"), None);
    /// ```
    pub fn parse(label: &str) -> Option<Emotion> {
        let normalized = label.trim().to_lowercase();
        let emotion = match normalized.as_str() {
            "happy" | "happiness" => Emotion::Happy,
            "sad" | "sadness" => Emotion::Sad,
            "angry" | "anger" => Emotion::Angry,
            "surprised" | "surprise" => Emotion::Surprised,
            "fearful" | "fear" => Emotion::Fearful,
            "disgusted" | "disgust" => Emotion::Disgusted,
            "neutral" => Emotion::Neutral,
            _ => return None,
        };
        Some(emotion)
    }
}

impl std::fmt::Display for Emotion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
