use uuid::Uuid;

/// Identifier of a remote person group.
///
/// Chosen by the caller (the service does not assign it), so a fresh one is
/// generated per run and passed explicitly through the orchestration.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PersonGroupId(String);

impl PersonGroupId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// A fresh random id (UUID v4, hyphenated lowercase).
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for PersonGroupId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A named remote collection of persons, the scope for training and identify.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersonGroup {
    pub id: PersonGroupId,
    pub name: String,
    pub recognition_model: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Person {
    pub person_id: Uuid,
    pub name: String,
    pub persisted_face_ids: Vec<Uuid>,
    pub user_data: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PersistedFace {
    pub persisted_face_id: Uuid,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrainingStatusKind {
    NotStarted,
    Running,
    Succeeded,
    Failed,
}

impl TrainingStatusKind {
    pub fn is_terminal(self) -> bool {
        matches!(self, TrainingStatusKind::Succeeded | TrainingStatusKind::Failed)
    }
}

impl std::fmt::Display for TrainingStatusKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TrainingStatusKind::NotStarted => write!(f, "notstarted"),
            TrainingStatusKind::Running => write!(f, "running"),
            TrainingStatusKind::Succeeded => write!(f, "succeeded"),
            TrainingStatusKind::Failed => write!(f, "failed"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrainingStatus {
    pub status: TrainingStatusKind,
    /// Failure detail; only set by the service when training failed.
    pub message: Option<String>,
}

impl TrainingStatus {
    pub fn new(status: TrainingStatusKind) -> Self {
        Self {
            status,
            message: None,
        }
    }
}
