use serde::{Deserialize, Serialize};

use crate::access::UNKNOWN_IDENTITY;
use crate::geometry::{center_of, BoundingBox, Point};

/// One person reported by the detection collaborator for a frame.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetectedSubject {
    /// Pixel box (x1, y1, x2, y2).
    pub bbox: BoundingBox,
    /// Recognizer label, or "Unknown" when no enrolled face matched.
    pub identity: String,
    /// Whether the recognizer had an embedding to match against.
    #[serde(default = "default_true")]
    pub embedding_available: bool,
}

fn default_true() -> bool {
    true
}

/// Subject as evaluated by the engine.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Subject {
    pub identity: String,
    pub bbox: BoundingBox,
    pub center: Point,
}

impl From<DetectedSubject> for Subject {
    /// Without an embedding the recognizer never ran, so the label cannot be trusted.
    fn from(detected: DetectedSubject) -> Self {
        let identity = if detected.embedding_available {
            detected.identity
        } else {
            UNKNOWN_IDENTITY.to_string()
        };
        Self {
            identity,
            center: center_of(&detected.bbox),
            bbox: detected.bbox,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subject_derives_center() {
        let subject = Subject::from(DetectedSubject {
            bbox: BoundingBox::new(100, 50, 200, 151),
            identity: "niraj".to_string(),
            embedding_available: true,
        });
        assert_eq!(subject.center, Point::new(150, 100));
        assert_eq!(subject.identity, "niraj");
    }

    #[test]
    fn missing_embedding_becomes_unknown() {
        let subject = Subject::from(DetectedSubject {
            bbox: BoundingBox::new(0, 0, 10, 10),
            identity: "alice".to_string(),
            embedding_available: false,
        });
        assert_eq!(subject.identity, UNKNOWN_IDENTITY);
    }

    #[test]
    fn embedding_flag_defaults_to_true() {
        let detected: DetectedSubject = serde_json::from_str(
            r#"{"bbox":{"x1":0,"y1":0,"x2":4,"y2":4},"identity":"sovit"}"#,
        )
        .unwrap();
        assert!(detected.embedding_available);
    }
}
