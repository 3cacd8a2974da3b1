pub mod gemini;
pub mod prompts;

pub use gemini::{enhance_prompt, GeneratedImage, ImageGenerator};
pub use prompts::{build_image_prompt, concretize_placeholders, generic_marketing_prompt};
