use chrono::{Datelike, NaiveDate, Weekday};
use rand::Rng;
use std::fmt;
use tracing::debug;

/// A content pillar: one named posting category with a weight for the
/// Sunday mixed-content draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Pillar {
    ProductUpdates,
    TutorialContent,
    AiGenerationShowcases,
    AiEditingShowcases,
    IndustryContent,
    CommunityEngagement,
}

impl Pillar {
    /// Declaration order is the tie-break order of the weighted draw.
    pub const ALL: [Pillar; 6] = [
        Pillar::ProductUpdates,
        Pillar::TutorialContent,
        Pillar::AiGenerationShowcases,
        Pillar::AiEditingShowcases,
        Pillar::IndustryContent,
        Pillar::CommunityEngagement,
    ];

    /// Stable key used in the posted-tweet log and on the wire.
    pub fn key(&self) -> &'static str {
        match self {
            Pillar::ProductUpdates => "productUpdates",
            Pillar::TutorialContent => "tutorialContent",
            Pillar::AiGenerationShowcases => "aiGenerationShowcases",
            Pillar::AiEditingShowcases => "aiEditingShowcases",
            Pillar::IndustryContent => "industryContent",
            Pillar::CommunityEngagement => "communityEngagement",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Pillar::ProductUpdates => "Product Updates",
            Pillar::TutorialContent => "Tutorials & Tips",
            Pillar::AiGenerationShowcases => "AI Generation Showcases",
            Pillar::AiEditingShowcases => "AI Editing Showcases",
            Pillar::IndustryContent => "Industry Insights",
            Pillar::CommunityEngagement => "Community Engagement",
        }
    }

    /// Relative weight in the Sunday mixed draw. The weights do not need to
    /// sum to anything in particular; only relative magnitude matters.
    pub fn sunday_weight(&self) -> u32 {
        match self {
            Pillar::ProductUpdates => 15,
            Pillar::TutorialContent => 25,
            Pillar::AiGenerationShowcases => 20,
            Pillar::AiEditingShowcases => 20,
            Pillar::IndustryContent => 10,
            Pillar::CommunityEngagement => 10,
        }
    }

    pub fn from_key(key: &str) -> Option<Pillar> {
        Pillar::ALL.iter().copied().find(|p| p.key() == key)
    }

    /// Short CLI aliases (`post tutorial`, `post editing`, ...).
    pub fn from_cli_alias(alias: &str) -> Option<Pillar> {
        match alias.to_ascii_lowercase().as_str() {
            "product" => Some(Pillar::ProductUpdates),
            "tutorial" => Some(Pillar::TutorialContent),
            "generation" => Some(Pillar::AiGenerationShowcases),
            "editing" => Some(Pillar::AiEditingShowcases),
            "industry" => Some(Pillar::IndustryContent),
            "community" => Some(Pillar::CommunityEngagement),
            _ => None,
        }
    }

    /// Day-of-week content plan: one fixed pillar per weekday, a weighted
    /// mix on Sunday.
    pub fn for_date<R: Rng>(date: NaiveDate, rng: &mut R) -> Pillar {
        let pillar = match date.weekday() {
            Weekday::Mon => Pillar::ProductUpdates,
            Weekday::Tue => Pillar::TutorialContent,
            Weekday::Wed => Pillar::AiGenerationShowcases,
            Weekday::Thu => Pillar::AiEditingShowcases,
            Weekday::Fri => Pillar::IndustryContent,
            Weekday::Sat => Pillar::CommunityEngagement,
            Weekday::Sun => Pillar::weighted_mix(rng),
        };
        debug!(weekday = %date.weekday(), pillar = pillar.key(), "Selected content pillar");
        pillar
    }

    /// Weighted random draw over all pillars in declaration order.
    pub fn weighted_mix<R: Rng>(rng: &mut R) -> Pillar {
        let total: u32 = Pillar::ALL.iter().map(|p| p.sunday_weight()).sum();
        let mut draw = rng.gen_range(0..total) as i64;
        for pillar in Pillar::ALL {
            draw -= pillar.sunday_weight() as i64;
            if draw < 0 {
                return pillar;
            }
        }
        // Unreachable with positive weights; keep the draw total anyway.
        Pillar::ALL[0]
    }
}

impl fmt::Display for Pillar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;
    use std::collections::HashMap;

    #[test]
    fn test_weekdays_are_deterministic() {
        let mut rng = SmallRng::seed_from_u64(7);
        // 2024-01-01 is a Monday.
        let expectations = [
            (1, Pillar::ProductUpdates),
            (2, Pillar::TutorialContent),
            (3, Pillar::AiGenerationShowcases),
            (4, Pillar::AiEditingShowcases),
            (5, Pillar::IndustryContent),
            (6, Pillar::CommunityEngagement),
        ];
        for (day, expected) in expectations {
            let date = NaiveDate::from_ymd_opt(2024, 1, day).unwrap();
            for _ in 0..10 {
                assert_eq!(Pillar::for_date(date, &mut rng), expected);
            }
        }
    }

    #[test]
    fn test_sunday_frequencies_follow_weights() {
        let mut rng = SmallRng::seed_from_u64(42);
        let sunday = NaiveDate::from_ymd_opt(2024, 1, 7).unwrap();
        let draws = 20_000usize;

        let mut counts: HashMap<Pillar, usize> = HashMap::new();
        for _ in 0..draws {
            *counts.entry(Pillar::for_date(sunday, &mut rng)).or_default() += 1;
        }

        let total: u32 = Pillar::ALL.iter().map(|p| p.sunday_weight()).sum();
        for pillar in Pillar::ALL {
            let expected = pillar.sunday_weight() as f64 / total as f64;
            let observed = counts.get(&pillar).copied().unwrap_or(0) as f64 / draws as f64;
            assert!(
                (observed - expected).abs() < 0.02,
                "{}: observed {:.3}, expected {:.3}",
                pillar,
                observed,
                expected
            );
        }
    }

    #[test]
    fn test_key_round_trip() {
        for pillar in Pillar::ALL {
            assert_eq!(Pillar::from_key(pillar.key()), Some(pillar));
        }
        assert_eq!(Pillar::from_key("unknown"), None);
    }

    #[test]
    fn test_cli_aliases() {
        assert_eq!(
            Pillar::from_cli_alias("Tutorial"),
            Some(Pillar::TutorialContent)
        );
        assert_eq!(
            Pillar::from_cli_alias("editing"),
            Some(Pillar::AiEditingShowcases)
        );
        assert_eq!(Pillar::from_cli_alias("daily"), None);
    }
}
