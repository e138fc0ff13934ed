use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use treadle::WorkItem;
use uuid::Uuid;

/// A training run flowing through the ingest → featurize → index stages.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingJob {
    /// Key under which the workflow state store tracks this run.
    id: String,
    /// Dataset being trained on.
    pub data_path: PathBuf,
}

impl TrainingJob {
    #[must_use]
    pub fn new(id: impl Into<String>, data_path: PathBuf) -> Self {
        Self {
            id: id.into(),
            data_path,
        }
    }

    /// A job with a fresh id, so the workflow state store treats every
    /// training run as new work.
    #[must_use]
    pub fn for_run(data_path: PathBuf) -> Self {
        Self::new(format!("train-{}", Uuid::new_v4()), data_path)
    }
}

impl WorkItem for TrainingJob {
    fn id(&self) -> &str {
        &self.id
    }
}

impl fmt::Display for TrainingJob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "train {}", self.data_path.display())
    }
}
