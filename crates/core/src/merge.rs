//! Resolution of a base template configuration plus a user customization
//! into a fully populated [`TemplateConfig`].
//!
//! Every leaf field is resolved independently through the same chain:
//! customization value, then base value, then design default. The chain is
//! implemented once in [`Layers::resolve`] and parameterized by a field
//! accessor, so no field can drift to a different precedence rule.

use std::collections::HashSet;

use serde_json::{Map, Value};

use crate::config::{
    Animations, Colors, Customization, FontSizes, Layout, TemplateConfig, Typography,
};
use crate::section::{self, SectionDescriptor, SectionPatch};

// ---------------------------------------------------------------------------
// Layered resolve
// ---------------------------------------------------------------------------

/// Partial configurations ordered from highest to lowest precedence.
#[derive(Debug, Clone, Copy)]
pub struct Layers<'a> {
    layers: [&'a Customization; 2],
}

impl<'a> Layers<'a> {
    pub fn new(custom: &'a Customization, base: &'a Customization) -> Self {
        Self {
            layers: [custom, base],
        }
    }

    /// Resolve one leaf: the first layer that has the field wins, otherwise
    /// `default`. A present empty string counts as set.
    pub fn resolve<T, F>(&self, field: F, default: T) -> T
    where
        T: Clone + 'a,
        F: Fn(&'a Customization) -> Option<&'a T>,
    {
        self.layers
            .iter()
            .find_map(|layer| field(*layer))
            .cloned()
            .unwrap_or(default)
    }

    /// Shallow-merge an open record across all layers, higher layers winning
    /// per key.
    pub fn merge_records<F>(&self, field: F) -> Map<String, Value>
    where
        F: Fn(&'a Customization) -> Option<&'a Map<String, Value>>,
    {
        let mut merged = Map::new();
        for layer in self.layers.iter().rev() {
            if let Some(record) = field(*layer) {
                merged.extend(record.iter().map(|(k, v)| (k.clone(), v.clone())));
            }
        }
        merged
    }
}

// ---------------------------------------------------------------------------
// Section reconciliation
// ---------------------------------------------------------------------------

/// Merge override sections into the base list by id.
///
/// A matched base section keeps its kind and order; its content and style are
/// shallow-merged (override wins per key) and its visibility is replaced only
/// when the override sets it. Overrides without a base match are appended in
/// their own order; those without an explicit order are numbered after every
/// order already present, so they also render last.
pub fn reconcile_sections(
    base: Vec<SectionDescriptor>,
    overrides: Vec<SectionPatch>,
) -> Vec<SectionDescriptor> {
    let mut matched = vec![false; overrides.len()];
    let mut result = Vec::with_capacity(base.len() + overrides.len());

    for mut section in base {
        if let Some(index) = overrides.iter().position(|p| p.id == section.id) {
            matched[index] = true;
            let patch = &overrides[index];
            if let Some(content) = &patch.content {
                section
                    .content
                    .extend(content.iter().map(|(k, v)| (k.clone(), v.clone())));
            }
            if let Some(style) = &patch.style {
                section
                    .style
                    .extend(style.iter().map(|(k, v)| (k.clone(), v.clone())));
            }
            if let Some(visible) = patch.is_visible {
                section.is_visible = visible;
            }
        }
        result.push(section);
    }

    let mut seen: HashSet<String> = result.iter().map(|s| s.id.clone()).collect();
    let mut next_order = result.iter().map(|s| s.order).max().map_or(0, |max| max + 1);

    for (patch, was_matched) in overrides.into_iter().zip(matched) {
        if was_matched || !seen.insert(patch.id.clone()) {
            continue;
        }
        let appended = patch.into_descriptor(next_order);
        next_order = next_order.max(appended.order + 1);
        result.push(appended);
    }

    result
}

// ---------------------------------------------------------------------------
// Merge
// ---------------------------------------------------------------------------

/// Resolve `base` and `custom` into a fully populated configuration.
///
/// A missing base behaves as an empty one. Pure; cheap enough to run on every
/// preview refresh.
pub fn merge(base: Option<&Customization>, custom: &Customization) -> TemplateConfig {
    let empty = Customization::default();
    let base = base.unwrap_or(&empty);
    let layers = Layers::new(custom, base);
    let defaults = TemplateConfig::default();

    let base_sections = base
        .sections
        .as_ref()
        .map(section::normalize)
        .unwrap_or_default();
    let sections = match &custom.sections {
        Some(raw) => reconcile_sections(base_sections, section::normalize_patches(raw)),
        None => base_sections,
    };

    TemplateConfig {
        layout: resolve_layout(&layers, defaults.layout),
        colors: resolve_colors(&layers, defaults.colors),
        typography: resolve_typography(&layers, defaults.typography),
        sections,
        animations: resolve_animations(&layers, defaults.animations),
    }
}

fn resolve_layout(layers: &Layers<'_>, d: Layout) -> Layout {
    Layout {
        max_width: layers.resolve(|c| c.layout.as_ref()?.max_width.as_ref(), d.max_width),
        container_padding: layers.resolve(
            |c| c.layout.as_ref()?.container_padding.as_ref(),
            d.container_padding,
        ),
        section_spacing: layers.resolve(
            |c| c.layout.as_ref()?.section_spacing.as_ref(),
            d.section_spacing,
        ),
        border_radius: layers.resolve(
            |c| c.layout.as_ref()?.border_radius.as_ref(),
            d.border_radius,
        ),
        extra: layers.merge_records(|c| c.layout.as_ref().map(|l| &l.extra)),
    }
}

fn resolve_colors(layers: &Layers<'_>, d: Colors) -> Colors {
    Colors {
        primary: layers.resolve(|c| c.colors.as_ref()?.primary.as_ref(), d.primary),
        secondary: layers.resolve(|c| c.colors.as_ref()?.secondary.as_ref(), d.secondary),
        accent: layers.resolve(|c| c.colors.as_ref()?.accent.as_ref(), d.accent),
        background: layers.resolve(|c| c.colors.as_ref()?.background.as_ref(), d.background),
        text: layers.resolve(|c| c.colors.as_ref()?.text.as_ref(), d.text),
        text_secondary: layers.resolve(
            |c| c.colors.as_ref()?.text_secondary.as_ref(),
            d.text_secondary,
        ),
        border: layers.resolve(|c| c.colors.as_ref()?.border.as_ref(), d.border),
        extra: layers.merge_records(|c| c.colors.as_ref().map(|p| &p.extra)),
    }
}

fn resolve_typography(layers: &Layers<'_>, d: Typography) -> Typography {
    let sizes = d.font_size;
    Typography {
        heading_font: layers.resolve(
            |c| c.typography.as_ref()?.heading_font.as_ref(),
            d.heading_font,
        ),
        body_font: layers.resolve(|c| c.typography.as_ref()?.body_font.as_ref(), d.body_font),
        accent_font: layers.resolve(
            |c| c.typography.as_ref()?.accent_font.as_ref(),
            d.accent_font,
        ),
        font_size: FontSizes {
            xs: layers.resolve(|c| font_sizes(c)?.xs.as_ref(), sizes.xs),
            sm: layers.resolve(|c| font_sizes(c)?.sm.as_ref(), sizes.sm),
            base: layers.resolve(|c| font_sizes(c)?.base.as_ref(), sizes.base),
            lg: layers.resolve(|c| font_sizes(c)?.lg.as_ref(), sizes.lg),
            xl: layers.resolve(|c| font_sizes(c)?.xl.as_ref(), sizes.xl),
            xl2: layers.resolve(|c| font_sizes(c)?.xl2.as_ref(), sizes.xl2),
            xl3: layers.resolve(|c| font_sizes(c)?.xl3.as_ref(), sizes.xl3),
            xl4: layers.resolve(|c| font_sizes(c)?.xl4.as_ref(), sizes.xl4),
        },
    }
}

fn font_sizes(c: &Customization) -> Option<&crate::config::FontSizesPatch> {
    c.typography.as_ref()?.font_size.as_ref()
}

fn resolve_animations(layers: &Layers<'_>, d: Animations) -> Animations {
    Animations {
        enabled: layers.resolve(|c| c.animations.as_ref()?.enabled.as_ref(), d.enabled),
        fade_in: layers.resolve(|c| c.animations.as_ref()?.fade_in.as_ref(), d.fade_in),
        parallax: layers.resolve(|c| c.animations.as_ref()?.parallax.as_ref(), d.parallax),
        duration: layers.resolve(|c| c.animations.as_ref()?.duration.as_ref(), d.duration),
        extra: layers.merge_records(|c| c.animations.as_ref().map(|a| &a.extra)),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
