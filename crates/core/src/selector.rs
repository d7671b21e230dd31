//! Selection of the sections that actually render.

use crate::config::TemplateConfig;
use crate::section::SectionDescriptor;

/// Visible sections of a resolved configuration, ascending by `order`.
///
/// The sort is stable: sections sharing an order keep their list position.
pub fn select(config: &TemplateConfig) -> Vec<&SectionDescriptor> {
    let mut visible: Vec<&SectionDescriptor> =
        config.sections.iter().filter(|s| s.is_visible).collect();
    visible.sort_by_key(|s| s.order);
    visible
}
