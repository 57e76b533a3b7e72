use serde::{Deserialize, Serialize};

/// One entry of the static job catalog. Loaded once at startup and immutable
/// thereafter; the core never writes these.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobDescription {
    pub id: String,
    pub title: String,
    pub department: String,
    pub description: String,
    #[serde(default)]
    pub required_skills: Vec<String>,
    #[serde(default)]
    pub preferred_skills: Vec<String>,
    pub experience_level: String,
    pub location: String,
}
