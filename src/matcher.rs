use crate::dataset::{norm_key, RespondentRecord, SurveyDataset};
use crate::profile::MotherProfile;
use serde::Serialize;

const TOP_CHALLENGE_LIMIT: usize = 3;

/// A challenge tag and how many matched respondents reported it. The
/// tag carries the first-encountered display form from the dataset.
#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
pub struct ChallengeCount {
    pub tag: String,
    pub count: usize,
}

/// Transient result of one matching pass, computed per request and
/// discarded after rendering.
#[derive(Debug, Clone, Default)]
pub struct MatchResult {
    pub matched: Vec<RespondentRecord>,
    pub top_challenges: Vec<ChallengeCount>,
}

impl MatchResult {
    pub fn is_empty(&self) -> bool {
        self.matched.is_empty()
    }
}

/// Find respondents whose age group and region both equal the
/// profile's, under the ingestion normalization policy. Zero matches
/// is a defined "no evidence" state, not an error; the caller falls
/// back to general guidance.
pub fn find_similar(
    profile: &MotherProfile,
    dataset: &SurveyDataset,
) -> MatchResult {
    let age_key = norm_key(&profile.age_group);
    let region_key = norm_key(&profile.region);
    if age_key.is_empty() || region_key.is_empty() {
        return MatchResult::default();
    }

    let matched: Vec<RespondentRecord> = dataset
        .records
        .iter()
        .filter(|record| {
            norm_key(&record.age_group) == age_key
                && norm_key(&record.region) == region_key
        })
        .cloned()
        .collect();

    let top_challenges = rank_challenges(&matched);

    MatchResult {
        matched,
        top_challenges,
    }
}

// Challenge tags ranked by descending frequency across the matched
// records, truncated to the top three. Counting groups tags by
// comparison key while reporting the first-encountered display form;
// the stable sort keeps ties in dataset order so output is
// deterministic for a fixed dataset ordering.
fn rank_challenges(matched: &[RespondentRecord]) -> Vec<ChallengeCount> {
    let mut counts: Vec<(String, ChallengeCount)> = Vec::new();
    for record in matched {
        for tag in &record.challenges {
            let key = norm_key(tag);
            if key.is_empty() {
                continue;
            }
            match counts.iter_mut().find(|(k, _)| *k == key) {
                Some((_, entry)) => entry.count += 1,
                None => counts.push((
                    key,
                    ChallengeCount {
                        tag: tag.clone(),
                        count: 1,
                    },
                )),
            }
        }
    }

    counts.sort_by(|a, b| b.1.count.cmp(&a.1.count));
    counts
        .into_iter()
        .take(TOP_CHALLENGE_LIMIT)
        .map(|(_, entry)| entry)
        .collect()
}
