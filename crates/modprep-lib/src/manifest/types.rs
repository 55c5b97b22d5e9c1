use std::path::{Component, Path};
use url::Url;

/// One download locator from the manifest, in manifest order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ManifestEntry {
    pub locator: Url,
    pub file_name: String,
}

impl ManifestEntry {
    /// Everything after the final `/` of the locator as written.
    pub fn file_name_of(locator: &str) -> &str {
        locator.rsplit('/').next().unwrap_or(locator)
    }

    /// Whether `name` stays inside the directory it is joined onto.
    pub fn is_plain_file_name(name: &str) -> bool {
        if name.contains('\\') {
            return false;
        }
        let mut components = Path::new(name).components();
        matches!(
            (components.next(), components.next()),
            (Some(Component::Normal(_)), None)
        )
    }
}
