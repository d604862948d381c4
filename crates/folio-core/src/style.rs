//! Content-length levels and writing styles used to build AI prompts.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Target length for generated drafts, on a five-step scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentLength {
    /// ~100 words.
    Brief,
    /// ~250 words.
    Short,
    /// ~500 words.
    #[default]
    Medium,
    /// ~1000 words.
    Long,
    /// ~2000 words.
    Detailed,
}

impl ContentLength {
    /// Every level, shortest first.
    pub const ALL: [Self; 5] = [
        Self::Brief,
        Self::Short,
        Self::Medium,
        Self::Long,
        Self::Detailed,
    ];

    /// Look up a level from 1 to 5. Anything else is a miss.
    pub const fn from_level(level: u8) -> Option<Self> {
        match level {
            1 => Some(Self::Brief),
            2 => Some(Self::Short),
            3 => Some(Self::Medium),
            4 => Some(Self::Long),
            5 => Some(Self::Detailed),
            _ => None,
        }
    }

    /// Position on the 1-5 scale.
    pub const fn level(self) -> u8 {
        match self {
            Self::Brief => 1,
            Self::Short => 2,
            Self::Medium => 3,
            Self::Long => 4,
            Self::Detailed => 5,
        }
    }

    /// Target word count.
    pub const fn target_words(self) -> u32 {
        match self {
            Self::Brief => 100,
            Self::Short => 250,
            Self::Medium => 500,
            Self::Long => 1000,
            Self::Detailed => 2000,
        }
    }

    /// Display label.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Brief => "Brief",
            Self::Short => "Short",
            Self::Medium => "Medium",
            Self::Long => "Long",
            Self::Detailed => "Detailed",
        }
    }
}

impl fmt::Display for ContentLength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (~{} words)", self.label(), self.target_words())
    }
}

/// Tone applied when enhancing existing text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
pub enum WritingStyle {
    /// Formal, research-oriented tone.
    #[default]
    Academic,
    /// Conversational and engaging.
    Blog,
    /// Clear and instructional.
    Educational,
    /// Business-appropriate tone.
    Professional,
    /// Keyword-rich and web-friendly.
    Seo,
}

impl WritingStyle {
    /// Every style, in menu order.
    pub const ALL: [Self; 5] = [
        Self::Academic,
        Self::Blog,
        Self::Educational,
        Self::Professional,
        Self::Seo,
    ];

    /// Stable identifier.
    pub const fn id(self) -> &'static str {
        match self {
            Self::Academic => "academic",
            Self::Blog => "blog",
            Self::Educational => "educational",
            Self::Professional => "professional",
            Self::Seo => "seo",
        }
    }

    /// Display label.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Academic => "Academic",
            Self::Blog => "Blog-style",
            Self::Educational => "Educational",
            Self::Professional => "Professional",
            Self::Seo => "SEO-optimized",
        }
    }

    /// One-line description of the tone.
    pub const fn description(self) -> &'static str {
        match self {
            Self::Academic => "Formal, research-oriented tone",
            Self::Blog => "Conversational and engaging",
            Self::Educational => "Clear and instructional",
            Self::Professional => "Business-appropriate tone",
            Self::Seo => "Keyword-rich and web-friendly",
        }
    }

    /// Style prompt passed to [`crate::ai::AiClient::expand_text`].
    pub fn enhance_prompt(self) -> String {
        format!(
            "Enhance this text using a {lower} writing style.\n\
             Maintain any existing markdown formatting (like *italic* and **bold**) and preserve the original meaning.\n\
             Style notes for {label}:\n\
             {description}",
            lower = self.label().to_lowercase(),
            label = self.label(),
            description = self.description(),
        )
    }
}

impl fmt::Display for WritingStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for WritingStyle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|style| style.id().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown writing style: {s}"))
    }
}
