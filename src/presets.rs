/// Style preset catalog
///
/// A fixed, ordered list of creative styles, each carrying the exact prompt
/// sent to the provider. The catalog is pure data; prompt resolution for a
/// submission happens through `resolve_prompt`.

/// The closed set of edit styles.
///
/// Adding a style means adding a variant here and a `PresetConfig` entry,
/// and the compiler walks every dispatch site.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditMode {
    Ghibli,
    Quality,
    Refine,
    Batman,
    Potter,
    /// Free-text prompt supplied by the user
    Custom,
}

/// Icon shown on a preset button
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PresetIcon {
    Sparkles,
    Sun,
    Wand,
    Ghost,
    Zap,
    Magic,
}

impl PresetIcon {
    /// Glyph rendered inside the button
    pub fn glyph(self) -> &'static str {
        match self {
            PresetIcon::Sparkles => "✨",
            PresetIcon::Sun => "☀",
            PresetIcon::Wand => "🪄",
            PresetIcon::Ghost => "👻",
            PresetIcon::Zap => "⚡",
            PresetIcon::Magic => "🔮",
        }
    }
}

/// One entry of the preset catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PresetConfig {
    pub mode: EditMode,
    pub label: &'static str,
    pub description: &'static str,
    pub icon: PresetIcon,
    pub prompt: &'static str,
}

/// Catalog order is display order
pub const PRESETS: [PresetConfig; 5] = [
    PresetConfig {
        mode: EditMode::Ghibli,
        label: "Ghibli Style",
        description: "Turn into anime art",
        icon: PresetIcon::Sparkles,
        prompt: "Transform this image into a high-quality Studio Ghibli style anime scene. \
                 Maintain the composition and key subjects but render them with the signature \
                 vibrant colors, fluffy clouds, and hand-drawn aesthetic of Ghibli movies.",
    },
    PresetConfig {
        mode: EditMode::Quality,
        label: "Enhance",
        description: "Boost clarity & detail",
        icon: PresetIcon::Sun,
        prompt: "Significantly enhance the quality of this image. Increase resolution, \
                 sharpness, and clarity. Remove noise and artifacts. Make it look like a \
                 professional high-definition photograph.",
    },
    PresetConfig {
        mode: EditMode::Refine,
        label: "Refine Face",
        description: "Smooth & beautify",
        icon: PresetIcon::Wand,
        prompt: "Retouch the facial features in this image. Smooth the skin naturally while \
                 preserving texture and details. Enhance lighting on the face for a \
                 professional portrait look.",
    },
    PresetConfig {
        mode: EditMode::Batman,
        label: "Gotham City",
        description: "Dark cinematic look",
        icon: PresetIcon::Ghost,
        prompt: "Apply a dark, gritty, cinematic Batman-style aesthetic to this image. High \
                 contrast, shadows, rain effects if appropriate, cool color temperature, and \
                 a dramatic, brooding atmosphere.",
    },
    PresetConfig {
        mode: EditMode::Potter,
        label: "Wizard World",
        description: "Magical effects",
        icon: PresetIcon::Zap,
        prompt: "Transform this image with a Harry Potter wizarding world aesthetic. Add \
                 magical glows, floating particles, vintage coloring, and a mysterious, \
                 enchanted atmosphere.",
    },
];

impl EditMode {
    /// The catalog entry for this style, or `None` for `Custom`
    pub fn preset(self) -> Option<&'static PresetConfig> {
        match self {
            EditMode::Ghibli => Some(&PRESETS[0]),
            EditMode::Quality => Some(&PRESETS[1]),
            EditMode::Refine => Some(&PRESETS[2]),
            EditMode::Batman => Some(&PRESETS[3]),
            EditMode::Potter => Some(&PRESETS[4]),
            EditMode::Custom => None,
        }
    }

    /// Display name used in the status line
    pub fn label(self) -> &'static str {
        match self.preset() {
            Some(preset) => preset.label,
            None => "Custom",
        }
    }
}

/// Resolve the prompt text for a submission.
///
/// Presets resolve from the catalog and ignore the user-supplied text;
/// `Custom` uses the trimmed text and yields `None` when it is blank, which
/// the caller must treat as "do not submit".
pub fn resolve_prompt(mode: EditMode, custom_text: &str) -> Option<String> {
    if let Some(preset) = mode.preset() {
        return Some(preset.prompt.to_owned());
    }

    let custom = custom_text.trim();
    if custom.is_empty() {
        None
    } else {
        Some(custom.to_owned())
    }
}
