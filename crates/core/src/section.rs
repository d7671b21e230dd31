//! Section descriptors and normalization of raw template section data.
//!
//! Templates have stored their section list in two shapes over time: an
//! ordered list of descriptors, and (legacy) a map from section type name to
//! a settings record. [`SectionData`] classifies raw JSON into one of the two
//! exactly once; [`normalize`] and [`normalize_patches`] turn either shape
//! into the canonical ordered list.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::config::lenient;
use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Section kinds
// ---------------------------------------------------------------------------

pub const KIND_HERO: &str = "hero";
pub const KIND_STORY: &str = "story";
pub const KIND_EVENT_DETAILS: &str = "event-details";
pub const KIND_RSVP: &str = "rsvp";
pub const KIND_GALLERY: &str = "gallery";
pub const KIND_GUESTBOOK: &str = "guestbook";
pub const KIND_MAP: &str = "map";
pub const KIND_COUNTDOWN: &str = "countdown";
pub const KIND_GIFT: &str = "gift";
pub const KIND_CLOSING: &str = "closing";
pub const KIND_BRIDE_GROOM_DETAILS: &str = "bride-groom-details";
pub const KIND_SACRED_TEXT: &str = "sacred-text";
pub const KIND_WISHES: &str = "wishes";

/// All section kinds the renderers know about.
pub const KNOWN_SECTION_KINDS: &[&str] = &[
    KIND_HERO,
    KIND_STORY,
    KIND_EVENT_DETAILS,
    KIND_RSVP,
    KIND_GALLERY,
    KIND_GUESTBOOK,
    KIND_MAP,
    KIND_COUNTDOWN,
    KIND_GIFT,
    KIND_CLOSING,
    KIND_BRIDE_GROOM_DETAILS,
    KIND_SACRED_TEXT,
    KIND_WISHES,
];

/// The kind of a renderable section.
///
/// Legacy templates derive the kind from the settings-map key, so any string
/// is accepted; unrecognized names are kept verbatim in [`SectionKind::Custom`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum SectionKind {
    Hero,
    Story,
    EventDetails,
    Rsvp,
    Gallery,
    Guestbook,
    Map,
    Countdown,
    Gift,
    Closing,
    BrideGroomDetails,
    SacredText,
    Wishes,
    Custom(String),
}

impl SectionKind {
    pub fn parse(s: &str) -> Self {
        match s {
            KIND_HERO => Self::Hero,
            KIND_STORY => Self::Story,
            KIND_EVENT_DETAILS => Self::EventDetails,
            KIND_RSVP => Self::Rsvp,
            KIND_GALLERY => Self::Gallery,
            KIND_GUESTBOOK => Self::Guestbook,
            KIND_MAP => Self::Map,
            KIND_COUNTDOWN => Self::Countdown,
            KIND_GIFT => Self::Gift,
            KIND_CLOSING => Self::Closing,
            KIND_BRIDE_GROOM_DETAILS => Self::BrideGroomDetails,
            KIND_SACRED_TEXT => Self::SacredText,
            KIND_WISHES => Self::Wishes,
            other => Self::Custom(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Hero => KIND_HERO,
            Self::Story => KIND_STORY,
            Self::EventDetails => KIND_EVENT_DETAILS,
            Self::Rsvp => KIND_RSVP,
            Self::Gallery => KIND_GALLERY,
            Self::Guestbook => KIND_GUESTBOOK,
            Self::Map => KIND_MAP,
            Self::Countdown => KIND_COUNTDOWN,
            Self::Gift => KIND_GIFT,
            Self::Closing => KIND_CLOSING,
            Self::BrideGroomDetails => KIND_BRIDE_GROOM_DETAILS,
            Self::SacredText => KIND_SACRED_TEXT,
            Self::Wishes => KIND_WISHES,
            Self::Custom(name) => name,
        }
    }

    /// Returns `true` for kinds outside [`KNOWN_SECTION_KINDS`].
    pub fn is_custom(&self) -> bool {
        matches!(self, Self::Custom(_))
    }
}

impl From<String> for SectionKind {
    fn from(s: String) -> Self {
        Self::parse(&s)
    }
}

impl From<SectionKind> for String {
    fn from(kind: SectionKind) -> Self {
        kind.as_str().to_string()
    }
}

// ---------------------------------------------------------------------------
// Descriptors
// ---------------------------------------------------------------------------

/// One renderable unit of a page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionDescriptor {
    /// Stable identity, unique within one section list. Merge key.
    pub id: String,
    #[serde(rename = "type")]
    pub kind: SectionKind,
    /// Hidden sections stay in the configuration so they can be re-enabled.
    pub is_visible: bool,
    /// Render sequence. Only compared, never required to be contiguous.
    pub order: i64,
    #[serde(default)]
    pub content: Map<String, Value>,
    #[serde(default)]
    pub style: Map<String, Value>,
}

/// A section as it appears in a partial configuration: everything except
/// the id may be left out.
///
/// Keeping "absent" distinct from "set" matters for reconciliation: an
/// override that does not mention `isVisible` must not reset it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionPatch {
    pub id: String,
    #[serde(rename = "type", default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub kind: Option<SectionKind>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub is_visible: Option<bool>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub order: Option<i64>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub content: Option<Map<String, Value>>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub style: Option<Map<String, Value>>,
}

impl SectionPatch {
    /// Fill every absent field with its default and produce a full descriptor.
    ///
    /// A missing kind falls back to the id (the legacy convention), a missing
    /// visibility to `true`, and a missing order to `fallback_order`.
    pub fn into_descriptor(self, fallback_order: i64) -> SectionDescriptor {
        let kind = self
            .kind
            .unwrap_or_else(|| SectionKind::parse(&self.id));
        SectionDescriptor {
            kind,
            is_visible: self.is_visible.unwrap_or(true),
            order: self.order.unwrap_or(fallback_order),
            content: self.content.unwrap_or_default(),
            style: self.style.unwrap_or_default(),
            id: self.id,
        }
    }

    /// Lay `other` over `self`: fields set in `other` win, record fields are
    /// shallow-merged key by key.
    pub fn overlay(&mut self, other: SectionPatch) {
        if other.kind.is_some() {
            self.kind = other.kind;
        }
        if other.is_visible.is_some() {
            self.is_visible = other.is_visible;
        }
        if other.order.is_some() {
            self.order = other.order;
        }
        if let Some(content) = other.content {
            self.content
                .get_or_insert_with(Map::new)
                .extend(content);
        }
        if let Some(style) = other.style {
            self.style.get_or_insert_with(Map::new).extend(style);
        }
    }
}

impl From<SectionDescriptor> for SectionPatch {
    fn from(d: SectionDescriptor) -> Self {
        Self {
            id: d.id,
            kind: Some(d.kind),
            is_visible: Some(d.is_visible),
            order: Some(d.order),
            content: Some(d.content),
            style: Some(d.style),
        }
    }
}

// ---------------------------------------------------------------------------
// Raw shapes
// ---------------------------------------------------------------------------

/// The two historical shapes of a template's section data.
#[derive(Debug, Clone, PartialEq)]
pub enum SectionData {
    /// Already an ordered list of (possibly partial) descriptors.
    Canonical(Vec<SectionPatch>),
    /// Legacy map from section type name to a settings record.
    Legacy(Map<String, Value>),
}

impl SectionData {
    /// Classify raw JSON. Returns `None` for anything that is neither a list
    /// nor a map (null, numbers, strings, booleans).
    pub fn classify(raw: &Value) -> Option<Self> {
        match raw {
            Value::Array(items) => Some(Self::Canonical(parse_canonical(items))),
            Value::Object(map) => Some(Self::Legacy(map.clone())),
            _ => None,
        }
    }

    /// Convert into the canonical ordered list of patches.
    ///
    /// Legacy entries are visited in the map's key order; entries whose value
    /// is not a record are skipped. Every legacy patch has all fields set.
    pub fn into_patches(self) -> Vec<SectionPatch> {
        match self {
            Self::Canonical(patches) => patches,
            Self::Legacy(map) => {
                let mut order = 0;
                let mut patches = Vec::with_capacity(map.len());
                for (key, value) in map {
                    let Value::Object(settings) = value else {
                        continue;
                    };
                    let enabled = settings.get("enabled") != Some(&Value::Bool(false));
                    patches.push(SectionPatch {
                        kind: Some(SectionKind::parse(&key)),
                        is_visible: Some(enabled),
                        order: Some(order),
                        content: Some(settings),
                        style: Some(Map::new()),
                        id: key,
                    });
                    order += 1;
                }
                patches
            }
        }
    }
}

fn parse_canonical(items: &[Value]) -> Vec<SectionPatch> {
    items
        .iter()
        .enumerate()
        .filter_map(|(index, item)| {
            match serde_json::from_value::<SectionPatch>(item.clone()) {
                Ok(patch) => Some(patch),
                Err(e) => {
                    tracing::warn!(index, error = %e, "Dropping malformed section entry");
                    None
                }
            }
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Normalization
// ---------------------------------------------------------------------------

/// Normalize raw section data into the canonical ordered list of descriptors.
///
/// An ordered list comes back unchanged; a legacy map is converted; anything
/// else yields an empty list. Never fails.
pub fn normalize(raw: &Value) -> Vec<SectionDescriptor> {
    normalize_patches(raw)
        .into_iter()
        .enumerate()
        .map(|(position, patch)| patch.into_descriptor(position as i64))
        .collect()
}

/// Like [`normalize`], but keeps absent fields absent.
pub fn normalize_patches(raw: &Value) -> Vec<SectionPatch> {
    SectionData::classify(raw)
        .map(SectionData::into_patches)
        .unwrap_or_default()
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Validate that section ids are non-empty and unique within one list.
pub fn validate_section_ids<'a, I>(ids: I) -> Result<(), CoreError>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut seen = HashSet::new();
    for id in ids {
        if id.trim().is_empty() {
            return Err(CoreError::Validation(
                "Section id must not be empty".to_string(),
            ));
        }
        if !seen.insert(id) {
            return Err(CoreError::Validation(format!(
                "Duplicate section id '{id}'"
            )));
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
