use serde::{Deserialize, Serialize};

/// The structured match report produced by the model and relayed to the
/// client unchanged. Deserializing the model's reply into this struct is the
/// shape validation: all five fields must be present with these types.
/// Extra fields from the model are ignored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisResult {
    /// Percentage as a display string, e.g. "85%".
    pub match_score: String,
    pub matching_strengths: Vec<String>,
    pub missing_skills: Vec<String>,
    pub improvement_suggestions: Vec<String>,
    pub cold_email: String,
}
