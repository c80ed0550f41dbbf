use crate::dataset::{norm_key, normalize_display};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// A mother's submitted form input. Constructed once per submission,
/// passed by value into the matching core, and never persisted. There
/// is no ambient form state anywhere else in the service.
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct MotherProfile {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub suburb: Option<String>,
    #[serde(default)]
    pub age_group: String,
    #[serde(default)]
    pub region: String,
    #[serde(default)]
    pub youngest_child_age: String,
    #[serde(default)]
    pub breastfeeding_status: String,
    #[serde(default)]
    pub outing_frequency: String,
    #[serde(default)]
    pub confidence_level: String,
    #[serde(default)]
    pub challenges: Vec<String>,
    #[serde(default)]
    pub emotions: Vec<String>,
    #[serde(default)]
    pub information_preferences: Vec<String>,
}

fn normalized_tags(tags: Vec<String>) -> Vec<String> {
    tags.iter()
        .map(|tag| normalize_display(tag))
        .filter(|tag| !tag.is_empty())
        .collect()
}

impl MotherProfile {
    /// Apply the same whitespace normalization the dataset ingestion
    /// applies, so profile values and respondent values compare under
    /// one policy.
    pub fn normalized(mut self) -> Self {
        self.name = self
            .name
            .map(|v| normalize_display(&v))
            .filter(|v| !v.is_empty());
        self.suburb = self
            .suburb
            .map(|v| normalize_display(&v))
            .filter(|v| !v.is_empty());
        self.age_group = normalize_display(&self.age_group);
        self.region = normalize_display(&self.region);
        self.youngest_child_age = normalize_display(&self.youngest_child_age);
        self.breastfeeding_status =
            normalize_display(&self.breastfeeding_status);
        self.outing_frequency = normalize_display(&self.outing_frequency);
        self.confidence_level = normalize_display(&self.confidence_level);
        self.challenges = normalized_tags(self.challenges);
        self.emotions = normalized_tags(self.emotions);
        self.information_preferences =
            normalized_tags(self.information_preferences);
        self
    }

    /// Union of the profile's challenge, emotion and information tags
    /// as comparison keys. This is the set the rule table triggers on.
    pub fn combined_tag_keys(&self) -> HashSet<String> {
        self.challenges
            .iter()
            .chain(self.emotions.iter())
            .chain(self.information_preferences.iter())
            .map(|tag| norm_key(tag))
            .collect()
    }
}
