//! Provider slug derivation.
//!
//! Publishing and domain management both address the remote project by this
//! slug, so they must go through the same function.

use crate::domain::model::Project;

/// Lower-cases `name` and replaces every ASCII character outside `[a-z0-9-]`
/// with `-`, one for one. Characters outside ASCII have no representation in
/// a slug and are dropped.
///
/// ```
/// use vibe_publish::domain::slug::provider_slug;
///
/// assert_eq!(provider_slug("My Site"), "my-site");
/// assert_eq!(provider_slug("Café 42!"), "caf-42-");
/// ```
pub fn provider_slug(name: &str) -> String {
    name.to_lowercase()
        .chars()
        .filter(char::is_ascii)
        .map(|c| match c {
            'a'..='z' | '0'..='9' | '-' => c,
            _ => '-',
        })
        .collect()
}

/// Slug for a stored project. A name with no ASCII characters at all would
/// give an empty slug, so it falls back to one built from the project id.
pub fn project_slug(project: &Project) -> String {
    let slug = provider_slug(&project.name);
    if slug.is_empty() {
        let id = project.id.0.simple().to_string();
        format!("project-{}", &id[..12])
    } else {
        slug
    }
}
