use uuid::Uuid;

/// A (person, confidence) pair returned by identify.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Candidate {
    pub person_id: Uuid,
    pub confidence: f64,
}

/// Identify result for one query face.
#[derive(Debug, Clone, PartialEq)]
pub struct IdentifyResult {
    pub face_id: Uuid,
    /// Ordered by descending confidence by the service.
    pub candidates: Vec<Candidate>,
}

impl IdentifyResult {
    /// Highest-confidence candidate, or `None` when nobody matched.
    ///
    /// Does not rely on the service ordering; the first of equal maxima wins.
    pub fn top_candidate(&self) -> Option<&Candidate> {
        self.candidates.iter().fold(None, |best: Option<&Candidate>, c| match best {
            Some(b) if b.confidence >= c.confidence => Some(b),
            _ => Some(c),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VerifyResult {
    pub is_identical: bool,
    pub confidence: f64,
}
