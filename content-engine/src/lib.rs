pub mod extract;
pub mod hashtags;
pub mod pillars;
pub mod render;
pub mod templates;

pub use extract::{ContentExtractor, ContentFields};
pub use hashtags::{select_hashtags, PRIMARY_HASHTAGS};
pub use pillars::Pillar;
pub use render::{render, RenderContext};
pub use templates::{default_context, pick_template, render_pillar_tweet, templates_for};
