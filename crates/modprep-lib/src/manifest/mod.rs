mod loader;
mod types;

pub use loader::{ManifestError, load_manifest, parse_manifest};
pub use types::ManifestEntry;
