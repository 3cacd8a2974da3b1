use crate::pillars::Pillar;
use rand::seq::SliceRandom;
use rand::Rng;

/// Tags attached to every tweet regardless of pillar, in this order.
pub const PRIMARY_HASHTAGS: [&str; 3] = ["#AIPhotoEditor", "#AIArt", "#PhotoEditing"];

/// Pillar-specific secondary pools, sampled without replacement.
pub fn secondary_pool(pillar: Pillar) -> &'static [&'static str] {
    match pillar {
        Pillar::ProductUpdates => &["#AppUpdate", "#NewFeature", "#MobileApp", "#CreatorTools"],
        Pillar::TutorialContent => &[
            "#PhotoTips",
            "#TutorialTuesday",
            "#PromptEngineering",
            "#EditingTips",
            "#HowTo",
        ],
        Pillar::AiGenerationShowcases => &[
            "#AIGenerated",
            "#GenerativeArt",
            "#DigitalArt",
            "#AIArtCommunity",
        ],
        Pillar::AiEditingShowcases => &[
            "#BeforeAndAfter",
            "#PhotoTransformation",
            "#AIEditing",
            "#Retouching",
        ],
        Pillar::IndustryContent => &[
            "#AITrends",
            "#TechNews",
            "#FutureOfPhotography",
            "#CreativeAI",
        ],
        Pillar::CommunityEngagement => &[
            "#PhotoChallenge",
            "#CreativeCommunity",
            "#ShareYourArt",
            "#Contest",
        ],
    }
}

/// Selects up to `max_count` hashtags: all primary tags in order, then a
/// random sample of the pillar's secondary pool filling the rest.
pub fn select_hashtags<R: Rng>(pillar: Pillar, max_count: usize, rng: &mut R) -> Vec<String> {
    let mut tags: Vec<String> = PRIMARY_HASHTAGS
        .iter()
        .take(max_count)
        .map(|t| t.to_string())
        .collect();

    let remaining = max_count.saturating_sub(tags.len());
    if remaining > 0 {
        let mut pool: Vec<&str> = secondary_pool(pillar).to_vec();
        pool.shuffle(rng);
        tags.extend(pool.into_iter().take(remaining).map(|t| t.to_string()));
    }

    tags
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    #[test]
    fn test_primary_prefix_preserved() {
        let mut rng = SmallRng::seed_from_u64(1);
        for pillar in Pillar::ALL {
            let tags = select_hashtags(pillar, 5, &mut rng);
            assert_eq!(tags.len(), 5);
            assert_eq!(&tags[..3], &PRIMARY_HASHTAGS.map(String::from));
        }
    }

    #[test]
    fn test_max_count_truncates_primary() {
        let mut rng = SmallRng::seed_from_u64(1);
        let tags = select_hashtags(Pillar::TutorialContent, 2, &mut rng);
        assert_eq!(tags, vec!["#AIPhotoEditor", "#AIArt"]);
    }

    #[test]
    fn test_secondary_sample_has_no_duplicates() {
        let mut rng = SmallRng::seed_from_u64(99);
        for _ in 0..100 {
            let tags = select_hashtags(Pillar::IndustryContent, 5, &mut rng);
            let mut sorted = tags.clone();
            sorted.sort();
            sorted.dedup();
            assert_eq!(sorted.len(), tags.len());
            for tag in &tags[3..] {
                assert!(secondary_pool(Pillar::IndustryContent).contains(&tag.as_str()));
            }
        }
    }

    #[test]
    fn test_never_exceeds_max_count() {
        let mut rng = SmallRng::seed_from_u64(3);
        for max in 0..8 {
            let tags = select_hashtags(Pillar::CommunityEngagement, max, &mut rng);
            assert!(tags.len() <= max);
        }
    }
}
