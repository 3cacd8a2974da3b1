use crate::pillars::Pillar;
use crate::templates::default_context;
use regex::Regex;
use std::collections::HashMap;
use tracing::debug;

/// Structured fields recovered from a composed tweet, used as input for
/// image prompting.
#[derive(Debug, Clone)]
pub struct ContentFields {
    /// Original tweet text, untouched.
    pub raw_tweet: String,
    /// Tweet text with emoji and `#tags` stripped, whitespace collapsed.
    pub main_text: String,
    /// The pillar key the tweet was composed for.
    pub content_type: String,
    fields: HashMap<String, String>,
}

impl ContentFields {
    /// A pillar-specific field. Always populated for the pillar's known
    /// fields: extraction degrades to defaults, it never leaves gaps.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(|s| s.as_str())
    }

    pub fn fields(&self) -> &HashMap<String, String> {
        &self.fields
    }
}

struct FieldRule {
    field: &'static str,
    /// Ordered alternatives; the first pattern that matches wins.
    patterns: Vec<Regex>,
}

/// Recovers structured fields from rendered tweet text via ordered regex
/// patterns per pillar, falling back to the pillar defaults on no match.
pub struct ContentExtractor {
    emoji: Regex,
    hashtag: Regex,
    whitespace: Regex,
    rules: HashMap<Pillar, Vec<FieldRule>>,
}

impl Default for ContentExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl ContentExtractor {
    pub fn new() -> Self {
        // Pictograph and symbol blocks only. General punctuation (curly
        // quotes, dashes, ellipsis) is legitimate tweet text and stays,
        // apart from the two pictographic exclamation marks.
        let emoji = Regex::new(
            r"[\x{1F000}-\x{1FAFF}\x{2600}-\x{27BF}\x{2B00}-\x{2BFF}\x{2190}-\x{21FF}\x{FE00}-\x{FE0F}\x{203C}\x{2049}\x{2100}-\x{214F}]",
        )
        .expect("emoji pattern");
        let hashtag = Regex::new(r"#\w+").expect("hashtag pattern");
        let whitespace = Regex::new(r"\s+").expect("whitespace pattern");

        let mut rules = HashMap::new();
        rules.insert(
            Pillar::ProductUpdates,
            vec![
                rule(
                    "feature",
                    &[
                        r"(?i)new in v[0-9.]+:\s*([^!.\n]+)",
                        r"(?i)just shipped:\s*(.+?)\s+our ai",
                        r"(?i)\.\s*([^.!\n]+?)\s+has landed",
                    ],
                ),
                rule(
                    "benefit",
                    &[
                        r"(?i)you can\s+(.+?)\s+(?:with a single tap|in seconds)",
                        r"(?i)helps you\s+([^.!\n]+)",
                    ],
                ),
                rule("version", &[r"(?i)v(?:ersion\s*)?(\d+\.\d+(?:\.\d+)?)"]),
            ],
        );
        rules.insert(
            Pillar::TutorialContent,
            vec![
                rule(
                    "technique",
                    &[
                        r"(?i)master\s+(.+?)\s+in seconds",
                        r"(?i)tutorial:\s*(.+?)\s+made simple",
                        r"(?i)up your edits with\s+([^.!\n]+)",
                    ],
                ),
                rule("prompt", &[r#""([^"]+)""#]),
                rule("formula", &[r"(?i)formula:\s*([^.\n]+)"]),
            ],
        );
        rules.insert(
            Pillar::AiGenerationShowcases,
            vec![
                rule("prompt", &[r#""([^"]+)""#]),
                rule(
                    "imageType",
                    &[
                        r"(?i)a stunning\s+(.+?)\s+generated",
                        r"(?i)became this\s+(.+?)\s+in seconds",
                    ],
                ),
            ],
        );
        rules.insert(
            Pillar::AiEditingShowcases,
            vec![
                rule(
                    "before",
                    &[
                        r"(?i)from\s+(.+?)\s+to\s+.+?\s+with one prompt",
                        r"(?i)before:\s*([^.!\n]+)",
                    ],
                ),
                rule(
                    "after",
                    &[
                        r"(?i)\bto\s+(.+?)\s+with one prompt",
                        r"(?i)after:\s*([^.!\n]+)",
                    ],
                ),
                rule("prompt", &[r#""([^"]+)""#]),
            ],
        );
        rules.insert(
            Pillar::IndustryContent,
            vec![
                rule(
                    "trend",
                    &[
                        r"(?i)trend watch \d{4}:\s*(.+?)\s+is changing",
                        r"(?i)here:\s*(.+?)\s+is defining",
                    ],
                ),
                rule("year", &[r"\b(20\d{2})\b"]),
                rule("fact", &[r"(\d+%[^.!\n]*)"]),
            ],
        );
        rules.insert(
            Pillar::CommunityEngagement,
            vec![
                rule(
                    "challenge",
                    &[
                        r"(?i)show us your\s+(.+?)\s+and win",
                        r"(?i)see your\s+([^.!\n]+)",
                    ],
                ),
                rule("prize", &[r"(?i)wins? a\s+([^.!\n]+)"]),
            ],
        );

        Self {
            emoji,
            hashtag,
            whitespace,
            rules,
        }
    }

    /// Extracts pillar fields from `text`. Never fails: unmatched fields
    /// fall back to the pillar defaults.
    pub fn extract(&self, pillar: Pillar, text: &str) -> ContentFields {
        let cleaned = self.clean(text);

        // Start from the defaults, overwrite with first-match captures.
        let mut fields = default_context(pillar);
        if let Some(rules) = self.rules.get(&pillar) {
            for rule in rules {
                for pattern in &rule.patterns {
                    if let Some(captures) = pattern.captures(&cleaned) {
                        if let Some(value) = captures.get(1) {
                            fields.insert(
                                rule.field.to_string(),
                                value.as_str().trim().to_string(),
                            );
                            break;
                        }
                    }
                }
            }
        }

        debug!(pillar = pillar.key(), fields = ?fields, "Extracted content fields");
        ContentFields {
            raw_tweet: text.to_string(),
            main_text: cleaned,
            content_type: pillar.key().to_string(),
            fields,
        }
    }

    /// Strips emoji and hashtag tokens, collapses whitespace.
    fn clean(&self, text: &str) -> String {
        let without_emoji = self.emoji.replace_all(text, "");
        let without_tags = self.hashtag.replace_all(&without_emoji, "");
        self.whitespace
            .replace_all(&without_tags, " ")
            .trim()
            .to_string()
    }
}

fn rule(field: &'static str, patterns: &[&str]) -> FieldRule {
    FieldRule {
        field,
        patterns: patterns
            .iter()
            .map(|p| Regex::new(p).expect("field pattern"))
            .collect(),
    }
}
