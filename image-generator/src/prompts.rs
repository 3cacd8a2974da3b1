use chrono::{Datelike, Utc};
use content_engine::{ContentFields, Pillar};
use regex::Regex;
use tracing::debug;

/// A demonstrable prompt must carry some substance; anything this short is
/// treated as absent.
const MIN_DEMO_PROMPT_LEN: usize = 5;

/// Concrete stand-ins for the bracketed placeholders that appear in
/// prompt formulas like `[subject] + [style] + [lighting]`.
const PLACEHOLDER_EXAMPLES: [(&str, &str); 14] = [
    ("[subject]", "mountain landscape"),
    ("[object]", "vintage camera"),
    ("[person]", "professional photographer"),
    ("[setting]", "sunset beach"),
    ("[style]", "cinematic"),
    ("[color]", "golden hour"),
    ("[time]", "sunset"),
    ("[weather]", "misty morning"),
    ("[lighting]", "dramatic lighting"),
    ("[mood]", "serene"),
    ("[texture]", "smooth"),
    ("[effect]", "bokeh effect"),
    ("[adjective]", "vibrant"),
    ("[emotion]", "peaceful"),
];

/// Replaces bracketed placeholders with concrete examples, case
/// insensitively. Unknown placeholders collapse to a generic scene.
pub fn concretize_placeholders(formula: &str) -> String {
    let mut concrete = formula.to_string();
    for (placeholder, example) in PLACEHOLDER_EXAMPLES {
        let escaped = regex::escape(placeholder);
        if let Ok(re) = Regex::new(&format!("(?i){}", escaped)) {
            concrete = re.replace_all(&concrete, example).into_owned();
        }
    }
    if concrete.contains('[') && concrete.contains(']') {
        if let Ok(re) = Regex::new(r"\[\w+\]") {
            concrete = re.replace_all(&concrete, "beautiful scene").into_owned();
        }
    }
    concrete
}

/// Builds the image prompt matching one tweet's pillar and extracted fields.
pub fn build_image_prompt(pillar: Pillar, content: &ContentFields) -> String {
    let tweet_prompt = content.get("prompt").unwrap_or("");
    let has_prompt_to_demo = tweet_prompt.len() > MIN_DEMO_PROMPT_LEN;

    // Formulas with bracketed placeholders get turned into a concrete
    // example before they reach the image model.
    let mut demo_prompt = tweet_prompt.to_string();
    let mut formula_demo = None;
    if has_prompt_to_demo && (tweet_prompt.contains('[') || tweet_prompt.contains(']')) {
        let concrete = concretize_placeholders(tweet_prompt);
        debug!("Concretized prompt formula '{}' as '{}'", tweet_prompt, concrete);
        if pillar == Pillar::TutorialContent {
            formula_demo = Some(format!(
                "Create a professional tutorial image demonstrating how to use prompt formulas in photo editing. \
                 Show a visual explanation of the formula: \"{tweet_prompt}\" \
                 Include a split-screen comparison with: \
                 - Left side: A basic photo labeled \"BEFORE\" \
                 - Right side: The same photo edited using the formula, becoming a \"{concrete}\" (labeled \"AFTER\") \
                 Add text explaining how placeholders work, for example: [subject] = mountain landscape. \
                 Make it educational with a clean, tutorial-style design and numbered steps."
            ));
        }
        demo_prompt = concrete;
    }

    match pillar {
        Pillar::ProductUpdates => {
            let feature = content.get("feature").unwrap_or("Advanced Lighting Effects");
            let benefit = content
                .get("benefit")
                .unwrap_or("transform photos with professional lighting");
            let version = content.get("version").unwrap_or("2.5.0");
            format!(
                "Generate a clean, professional image showing a mobile app interface highlighting \
                 the \"{feature}\" feature in AI Photo Editor version {version}. \
                 Show the feature in action with a clear before-after demonstration of how it {benefit}. \
                 Use modern UI design, with a focus on the result. Include subtle app controls and interface elements."
            )
        }
        Pillar::TutorialContent => {
            if has_prompt_to_demo {
                if let Some(formula_demo) = formula_demo {
                    formula_demo
                } else {
                    format!(
                        "Create a visual demonstration of what happens when using the photo editing \
                         prompt \"{demo_prompt}\". \
                         Show a clear before/after split-screen image: \
                         - On the left: A standard photo labeled \"BEFORE\" \
                         - On the right: The same photo with \"{demo_prompt}\" applied, labeled \"AFTER\" \
                         Make the effect of the prompt very visible and impressive. \
                         Include a text overlay showing the prompt: \"{demo_prompt}\" \
                         Style it as a professional tutorial image with clean design."
                    )
                }
            } else {
                let technique = content.get("technique").unwrap_or("prompt engineering");
                let formula = content.get("formula").unwrap_or("");
                let mut prompt = format!(
                    "Create an educational, step-by-step tutorial image showing how to master \
                     {technique} in photo editing."
                );
                if !formula.is_empty() {
                    prompt.push_str(&format!(" Visualize the formula: {formula}."));
                }
                prompt.push_str(
                    " Show before and after results with clear markings of the steps involved. \
                     Make it look like a professional tutorial with numbered steps and annotations.",
                );
                prompt
            }
        }
        Pillar::AiGenerationShowcases => {
            let image_type = content.get("imageType").unwrap_or("AI artwork");
            if has_prompt_to_demo {
                format!(
                    "Generate a stunning {image_type} directly using this prompt: \"{demo_prompt}\". \
                     Create the exact image that would result from this prompt. \
                     Focus on making a high-quality, impressive result that showcases what our AI can create. \
                     Do not include any text annotations or labels in the image itself."
                )
            } else {
                let image_prompt = content
                    .get("prompt")
                    .filter(|p| !p.is_empty())
                    .unwrap_or("Enchanted forest waterfall at sunset, magical lighting");
                format!(
                    "Generate a stunning, detailed {image_type} based exactly on this description: \
                     \"{image_prompt}\". \
                     Create an artistic, professional result that showcases the power of AI image generation. \
                     Make the image vibrant and eye-catching, suitable for a social media showcase."
                )
            }
        }
        Pillar::AiEditingShowcases => {
            let before = content.get("before").unwrap_or("ordinary portrait");
            let after = content.get("after").unwrap_or("fantasy character");
            if has_prompt_to_demo {
                format!(
                    "Create a professional before-and-after comparison showing the transformation \
                     using the exact prompt: \"{demo_prompt}\". \
                     On the left side: Show a {before} image labeled \"BEFORE\" \
                     On the right side: Show the same image transformed into a {after} using the prompt, labeled \"AFTER\" \
                     Make the transformation dramatic and impressive to showcase the exact effects of the prompt. \
                     Include the prompt text \"{demo_prompt}\" subtly at the bottom of the image."
                )
            } else {
                let edit_prompt = content
                    .get("prompt")
                    .filter(|p| !p.is_empty())
                    .unwrap_or("transform to fantasy style");
                format!(
                    "Create a professional before-and-after comparison showing the transformation \
                     of a {before} into a {after}. \
                     The transformation should match this editing prompt: \"{edit_prompt}\". \
                     Split the image with a clear divider, showing \"BEFORE\" on the left and \"AFTER\" on the right. \
                     Make the transformation dramatic and impressive to showcase the power of AI editing."
                )
            }
        }
        Pillar::IndustryContent => {
            let trend = content.get("trend").unwrap_or("Cinematic Hyper-Realism");
            let current_year = Utc::now().year().to_string();
            let year = content.get("year").unwrap_or(&current_year);
            let fact = content.get("fact").unwrap_or("");
            let mut prompt = format!(
                "Create a professional, infographic-style image visualizing the \"{trend}\" trend \
                 in AI photo editing for {year}."
            );
            if !fact.is_empty() {
                prompt.push_str(&format!(" Include this fact: \"{fact}\"."));
            }
            prompt.push_str(
                " Use a modern, tech-inspired design with data points or visual elements that \
                 highlight the trend. \
                 Make it look like a professional industry report or analysis visualization.",
            );
            prompt
        }
        Pillar::CommunityEngagement => {
            let challenge = content.get("challenge").unwrap_or("creative AI-edited photos");
            let prize = content.get("prize").unwrap_or("");
            let mut prompt = format!(
                "Create an engaging, colorful announcement image for a community challenge to \
                 create {challenge}. \
                 Include visual elements suggesting creativity, community, and participation."
            );
            if !prize.is_empty() {
                prompt.push_str(&format!(" Subtly indicate a prize: {prize}."));
            }
            prompt.push_str(
                " Make it exciting and motivational to encourage participation in the challenge. \
                 Use bright colors and dynamic composition that would catch attention on social media.",
            );
            prompt
        }
    }
}

/// Fallback prompt when no pillar fields are available, built from the
/// tweet text itself.
pub fn generic_marketing_prompt(main_text: &str) -> String {
    let mut prompt =
        "Generate a professional marketing image for an AI Photo Editor app.".to_string();
    if !main_text.is_empty() {
        let excerpt: String = main_text.chars().take(100).collect();
        prompt.push_str(&format!(" The image should relate to: \"{excerpt}\"."));
    }
    prompt.push_str(
        " Show impressive photo editing capabilities with beautiful results. \
         Use modern design elements and make it suitable for social media marketing.",
    );
    prompt
}
