pub mod pages;
pub mod sessions;
pub mod templates;

use invite_core::config::Customization;
use invite_core::error::CoreError;
use invite_core::section::validate_section_ids;
use invite_core::store::Template;
use invite_core::types::DbId;

use crate::error::AppResult;
use crate::state::AppState;

/// Fetch a template from the catalog or fail with 404.
pub(crate) async fn ensure_template_exists(state: &AppState, id: DbId) -> AppResult<Template> {
    let template = state
        .catalog
        .get_template(id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "Template",
            id,
        })?;
    Ok(template)
}

/// Reject a customization whose section list repeats or blanks an id.
pub(crate) fn check_sections(customization: &Customization) -> AppResult<()> {
    let ids = customization.section_ids();
    validate_section_ids(ids.iter().map(String::as_str))?;
    Ok(())
}
