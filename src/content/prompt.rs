//! Prompt text for video-script generation.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Style {
    #[default]
    Cinematic,
    Minimalist,
    Futuristic,
}

impl Style {
    pub const ALL: [Style; 3] = [Style::Cinematic, Style::Minimalist, Style::Futuristic];

    pub fn as_str(&self) -> &'static str {
        match self {
            Style::Cinematic => "cinematic",
            Style::Minimalist => "minimalist",
            Style::Futuristic => "futuristic",
        }
    }

    pub fn mood(&self) -> &'static str {
        match self {
            Style::Cinematic => "premium educational transformation, elegant confidence",
            Style::Minimalist => "clean, focused learning environment, pure simplicity",
            Style::Futuristic => "next-generation education, innovative breakthrough",
        }
    }
}

impl fmt::Display for Style {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Style {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Style::ALL
            .into_iter()
            .find(|style| style.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown style '{s}'"))
    }
}

pub fn system_prompt(brand: &str) -> String {
    format!(
        "You are a cinematic advertising director specializing in luxury brand storytelling.
Create detailed VEO3 video generation prompts for {brand}, a premium AI-powered educational service.
Follow the exact JSON structure provided, focusing on visual storytelling without text overlays.
The service transforms traditional education into personalized, intelligent learning experiences."
    )
}

/// The user turn: theme, mood, requirements and the JSON skeleton to fill.
pub fn user_prompt(brand: &str, keyword: &str, style: Style) -> String {
    let mood = style.mood();
    format!(
        r#"Create a premium 8-second VEO3 video prompt for the {brand} educational service.

Theme: {keyword}
Style: {mood}

Requirements:
1. NO TEXT OVERLAYS - visual storytelling only
2. Focus on a transformation/reveal concept
3. Include specific camera movements, lighting, and sound design
4. Make it feel premium and cinematic
5. Educational elements should feel magical/futuristic

Reference structure:
- Scene environment with detailed lighting and mood
- Subject focus with specific object descriptions
- Camera work with precise movements
- Sound design with ambient and focus effects
- Motion descriptions for all elements
- Brand visibility through objects only

Return a JSON object with exactly this structure:

{{
  "prompt_name": "{brand} – [Creative Title Related to {keyword}]",
  "version": 1.0,
  "target_ai_model": "VEO3",
  "core_concept": "[8-second transformation story showing educational evolution]",
  "details": {{
    "scene_environment": {{
      "setting": "[specific location description]",
      "lighting": "[detailed lighting setup]",
      "mood": "{mood}",
      "features": "[environmental details]"
    }},
    "subject_focus": {{
      "object": "[main focus object - tablet/hologram/book transforming]",
      "description": "[detailed visual description]",
      "placement": "[exact positioning]",
      "action": "[transformation sequence]"
    }},
    "elements": ["[visual elements that appear]", "floating knowledge particles", "holographic displays", "AI visualization elements"],
    "action_sequence": [
      {{ "step": 1, "duration": "0-2s", "description": "[opening shot]" }},
      {{ "step": 2, "duration": "2-5s", "description": "[transformation moment]" }},
      {{ "step": 3, "duration": "5-7s", "description": "[reveal of educational magic]" }},
      {{ "step": 4, "duration": "7-8s", "description": "[final elegant frame]" }}
    ],
    "camera_work": {{
      "movement": "[specific camera movements]",
      "lens": "[lens type and focal length]",
      "frame": "[framing details]"
    }},
    "lighting": {{
      "style": "[lighting style]",
      "highlights": "[key light points]",
      "color_palette": "soft blues, warm whites, subtle gold accents"
    }},
    "motion": {{ "[element_name]": "[specific motion description]" }},
    "sound_design": {{
      "ambient": ["[background sound 1]", "[background sound 2]"],
      "focus_fx": [{{ "sound": "[effect]", "timing": "[when]", "style": "[character]" }}],
      "music": "none"
    }},
    "final_frame": {{
      "composition": "[final shot description]",
      "visual_overlay": "none",
      "brand_element": "subtle {brand} logo glow on device/hologram"
    }},
    "aspect_ratio": "9:16",
    "style": "cinematic, premium educational, {style}",
    "color_grading": "cool blues with warm accent highlights"
  }}
}}

Focus on:
- Traditional textbook transforming into holographic knowledge
- Student's desk evolving into futuristic learning space
- AI particles forming educational visualizations
- Knowledge flowing like liquid light"#
    )
}

pub fn summary_system_prompt(language: &str) -> String {
    format!("For a short-video caption: summarize the video prompt in plain {language}.")
}

pub fn summary_user_prompt(core_concept: &str) -> String {
    format!("Summarize the core of this video in 2-3 sentences: {core_concept}")
}

pub fn sample_themes() -> &'static [&'static str] {
    &[
        "AI-Powered Personalized Learning",
        "Knowledge Transformation",
        "Future of Education",
        "Smart Learning Revolution",
        "Intelligent Tutoring System",
        "Educational Innovation",
        "Digital Learning Evolution",
        "Adaptive Education Technology",
    ]
}
