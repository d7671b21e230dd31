//! Template configuration shapes.
//!
//! [`TemplateConfig`] is the fully resolved configuration handed to renderers:
//! every leaf has a concrete value. [`Customization`] is its deep-partial
//! counterpart, used both for what a user changed and for a template's raw
//! base configuration. Design defaults live in the `Default` impls here.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::section::{self, SectionDescriptor, SectionPatch};

// ---------------------------------------------------------------------------
// Design defaults
// ---------------------------------------------------------------------------

pub const DEFAULT_MAX_WIDTH: &str = "1200px";
pub const DEFAULT_CONTAINER_PADDING: &str = "1.5rem";
pub const DEFAULT_SECTION_SPACING: &str = "4rem";
pub const DEFAULT_BORDER_RADIUS: &str = "0.5rem";

pub const DEFAULT_PRIMARY_COLOR: &str = "#8B7355";
pub const DEFAULT_SECONDARY_COLOR: &str = "#D4AF37";
pub const DEFAULT_ACCENT_COLOR: &str = "#F5E6D3";
pub const DEFAULT_BACKGROUND_COLOR: &str = "#FFFFFF";
pub const DEFAULT_TEXT_COLOR: &str = "#333333";
pub const DEFAULT_TEXT_SECONDARY_COLOR: &str = "#666666";
pub const DEFAULT_BORDER_COLOR: &str = "#E5E5E5";

pub const DEFAULT_HEADING_FONT: &str = "Playfair Display, serif";
pub const DEFAULT_BODY_FONT: &str = "Inter, sans-serif";
pub const DEFAULT_ACCENT_FONT: &str = "Great Vibes, cursive";

/// Font size tokens in ascending order, paired with their default values.
pub const DEFAULT_FONT_SIZES: [(&str, &str); 8] = [
    ("xs", "0.75rem"),
    ("sm", "0.875rem"),
    ("base", "1rem"),
    ("lg", "1.125rem"),
    ("xl", "1.25rem"),
    ("2xl", "1.5rem"),
    ("3xl", "1.875rem"),
    ("4xl", "2.25rem"),
];

pub const DEFAULT_ANIMATION_DURATION_MS: f64 = 800.0;

// ---------------------------------------------------------------------------
// Resolved configuration
// ---------------------------------------------------------------------------

/// Fully resolved configuration for one page instance.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateConfig {
    pub layout: Layout,
    pub colors: Colors,
    pub typography: Typography,
    pub sections: Vec<SectionDescriptor>,
    pub animations: Animations,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Layout {
    pub max_width: String,
    pub container_padding: String,
    pub section_spacing: String,
    pub border_radius: String,
    /// Template-specific keys the core does not interpret.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for Layout {
    fn default() -> Self {
        Self {
            max_width: DEFAULT_MAX_WIDTH.to_string(),
            container_padding: DEFAULT_CONTAINER_PADDING.to_string(),
            section_spacing: DEFAULT_SECTION_SPACING.to_string(),
            border_radius: DEFAULT_BORDER_RADIUS.to_string(),
            extra: Map::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Colors {
    pub primary: String,
    pub secondary: String,
    pub accent: String,
    pub background: String,
    pub text: String,
    pub text_secondary: String,
    pub border: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for Colors {
    fn default() -> Self {
        Self {
            primary: DEFAULT_PRIMARY_COLOR.to_string(),
            secondary: DEFAULT_SECONDARY_COLOR.to_string(),
            accent: DEFAULT_ACCENT_COLOR.to_string(),
            background: DEFAULT_BACKGROUND_COLOR.to_string(),
            text: DEFAULT_TEXT_COLOR.to_string(),
            text_secondary: DEFAULT_TEXT_SECONDARY_COLOR.to_string(),
            border: DEFAULT_BORDER_COLOR.to_string(),
            extra: Map::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Typography {
    pub heading_font: String,
    pub body_font: String,
    pub accent_font: String,
    pub font_size: FontSizes,
}

impl Default for Typography {
    fn default() -> Self {
        Self {
            heading_font: DEFAULT_HEADING_FONT.to_string(),
            body_font: DEFAULT_BODY_FONT.to_string(),
            accent_font: DEFAULT_ACCENT_FONT.to_string(),
            font_size: FontSizes::default(),
        }
    }
}

/// The eight named size tokens.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FontSizes {
    pub xs: String,
    pub sm: String,
    pub base: String,
    pub lg: String,
    pub xl: String,
    #[serde(rename = "2xl")]
    pub xl2: String,
    #[serde(rename = "3xl")]
    pub xl3: String,
    #[serde(rename = "4xl")]
    pub xl4: String,
}

impl FontSizes {
    /// Tokens paired with their values, smallest first.
    pub fn tokens(&self) -> [(&'static str, &str); 8] {
        [
            ("xs", self.xs.as_str()),
            ("sm", self.sm.as_str()),
            ("base", self.base.as_str()),
            ("lg", self.lg.as_str()),
            ("xl", self.xl.as_str()),
            ("2xl", self.xl2.as_str()),
            ("3xl", self.xl3.as_str()),
            ("4xl", self.xl4.as_str()),
        ]
    }
}

impl Default for FontSizes {
    fn default() -> Self {
        let [xs, sm, base, lg, xl, xl2, xl3, xl4] =
            DEFAULT_FONT_SIZES.map(|(_, value)| value.to_string());
        Self {
            xs,
            sm,
            base,
            lg,
            xl,
            xl2,
            xl3,
            xl4,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Animations {
    pub enabled: bool,
    pub fade_in: bool,
    pub parallax: bool,
    /// Transition duration in milliseconds.
    pub duration: f64,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for Animations {
    fn default() -> Self {
        Self {
            enabled: true,
            fade_in: true,
            parallax: false,
            duration: DEFAULT_ANIMATION_DURATION_MS,
            extra: Map::new(),
        }
    }
}

impl TemplateConfig {
    /// Project colors, fonts and layout tokens as CSS custom properties.
    ///
    /// Pure: applying them to a document is the renderer's job.
    pub fn css_variables(&self) -> Vec<(String, String)> {
        let c = &self.colors;
        let t = &self.typography;
        let l = &self.layout;
        let mut vars: Vec<(String, String)> = [
            ("--color-primary", &c.primary),
            ("--color-secondary", &c.secondary),
            ("--color-accent", &c.accent),
            ("--color-background", &c.background),
            ("--color-text", &c.text),
            ("--color-text-secondary", &c.text_secondary),
            ("--color-border", &c.border),
            ("--font-heading", &t.heading_font),
            ("--font-body", &t.body_font),
            ("--font-accent", &t.accent_font),
            ("--layout-max-width", &l.max_width),
            ("--layout-container-padding", &l.container_padding),
            ("--layout-section-spacing", &l.section_spacing),
            ("--layout-border-radius", &l.border_radius),
        ]
        .into_iter()
        .map(|(name, value)| (name.to_string(), value.clone()))
        .collect();

        vars.extend(
            t.font_size
                .tokens()
                .into_iter()
                .map(|(token, value)| (format!("--font-size-{token}"), value.to_string())),
        );
        vars
    }
}

// ---------------------------------------------------------------------------
// Partial configuration
// ---------------------------------------------------------------------------

/// Deserialize an optional leaf, dropping a value of the wrong type instead
/// of failing the whole configuration.
pub(crate) fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let raw = Value::deserialize(deserializer)?;
    if raw.is_null() {
        return Ok(None);
    }
    match serde_json::from_value(raw.clone()) {
        Ok(value) => Ok(Some(value)),
        Err(e) => {
            tracing::warn!(value = %raw, error = %e, "Ignoring mistyped configuration value");
            Ok(None)
        }
    }
}

/// Deep-partial [`TemplateConfig`]: every field at every level is optional.
///
/// `sections` stays raw JSON so both the canonical list shape and the legacy
/// keyed-map shape survive storage untouched; it is normalized at merge time.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Customization {
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub layout: Option<LayoutPatch>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub colors: Option<ColorsPatch>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub typography: Option<TypographyPatch>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub sections: Option<Value>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub animations: Option<AnimationsPatch>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutPatch {
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub max_width: Option<String>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub container_padding: Option<String>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub section_spacing: Option<String>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub border_radius: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColorsPatch {
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub primary: Option<String>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub secondary: Option<String>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub accent: Option<String>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub background: Option<String>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub text_secondary: Option<String>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub border: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypographyPatch {
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub heading_font: Option<String>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub body_font: Option<String>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub accent_font: Option<String>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub font_size: Option<FontSizesPatch>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FontSizesPatch {
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub xs: Option<String>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub sm: Option<String>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub base: Option<String>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub lg: Option<String>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub xl: Option<String>,
    #[serde(rename = "2xl", default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub xl2: Option<String>,
    #[serde(rename = "3xl", default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub xl3: Option<String>,
    #[serde(rename = "4xl", default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub xl4: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnimationsPatch {
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub fade_in: Option<bool>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub parallax: Option<bool>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub duration: Option<f64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

// ---------------------------------------------------------------------------
// Overlaying edit fragments
// ---------------------------------------------------------------------------

fn set_if_some<T>(slot: &mut Option<T>, value: Option<T>) {
    if value.is_some() {
        *slot = value;
    }
}

impl Customization {
    /// Returns `true` when nothing has been customized.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Overlay an edit fragment: every field the fragment sets replaces the
    /// current value, everything else is kept.
    ///
    /// Sections are combined by id: a fragment section updates the matching
    /// section's set fields, unknown ids are appended. The result is always
    /// stored in the canonical list shape.
    pub fn overlay(&mut self, fragment: Customization) {
        if let Some(layout) = fragment.layout {
            self.layout.get_or_insert_with(Default::default).overlay(layout);
        }
        if let Some(colors) = fragment.colors {
            self.colors.get_or_insert_with(Default::default).overlay(colors);
        }
        if let Some(typography) = fragment.typography {
            self.typography
                .get_or_insert_with(Default::default)
                .overlay(typography);
        }
        if let Some(animations) = fragment.animations {
            self.animations
                .get_or_insert_with(Default::default)
                .overlay(animations);
        }
        if let Some(raw) = fragment.sections {
            let incoming = section::normalize_patches(&raw);
            let mut current = self
                .sections
                .as_ref()
                .map(section::normalize_patches)
                .unwrap_or_default();
            for patch in incoming {
                match current.iter_mut().find(|p| p.id == patch.id) {
                    Some(existing) => existing.overlay(patch),
                    None => current.push(patch),
                }
            }
            self.sections = Some(sections_to_value(&current));
        }
    }

    /// Ids of the sections this customization mentions, in list order.
    pub fn section_ids(&self) -> Vec<String> {
        self.sections
            .as_ref()
            .map(section::normalize_patches)
            .unwrap_or_default()
            .into_iter()
            .map(|p| p.id)
            .collect()
    }
}

fn sections_to_value(patches: &[SectionPatch]) -> Value {
    Value::Array(
        patches
            .iter()
            .filter_map(|p| serde_json::to_value(p).ok())
            .collect(),
    )
}

impl LayoutPatch {
    pub fn overlay(&mut self, other: LayoutPatch) {
        set_if_some(&mut self.max_width, other.max_width);
        set_if_some(&mut self.container_padding, other.container_padding);
        set_if_some(&mut self.section_spacing, other.section_spacing);
        set_if_some(&mut self.border_radius, other.border_radius);
        self.extra.extend(other.extra);
    }
}

impl ColorsPatch {
    pub fn overlay(&mut self, other: ColorsPatch) {
        set_if_some(&mut self.primary, other.primary);
        set_if_some(&mut self.secondary, other.secondary);
        set_if_some(&mut self.accent, other.accent);
        set_if_some(&mut self.background, other.background);
        set_if_some(&mut self.text, other.text);
        set_if_some(&mut self.text_secondary, other.text_secondary);
        set_if_some(&mut self.border, other.border);
        self.extra.extend(other.extra);
    }
}

impl TypographyPatch {
    pub fn overlay(&mut self, other: TypographyPatch) {
        set_if_some(&mut self.heading_font, other.heading_font);
        set_if_some(&mut self.body_font, other.body_font);
        set_if_some(&mut self.accent_font, other.accent_font);
        if let Some(sizes) = other.font_size {
            let current = self.font_size.get_or_insert_with(Default::default);
            set_if_some(&mut current.xs, sizes.xs);
            set_if_some(&mut current.sm, sizes.sm);
            set_if_some(&mut current.base, sizes.base);
            set_if_some(&mut current.lg, sizes.lg);
            set_if_some(&mut current.xl, sizes.xl);
            set_if_some(&mut current.xl2, sizes.xl2);
            set_if_some(&mut current.xl3, sizes.xl3);
            set_if_some(&mut current.xl4, sizes.xl4);
        }
    }
}

impl AnimationsPatch {
    pub fn overlay(&mut self, other: AnimationsPatch) {
        set_if_some(&mut self.enabled, other.enabled);
        set_if_some(&mut self.fade_in, other.fade_in);
        set_if_some(&mut self.parallax, other.parallax);
        set_if_some(&mut self.duration, other.duration);
        self.extra.extend(other.extra);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
