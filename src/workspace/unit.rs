//! A cataloged shader unit.

use std::path::{Path, PathBuf};

use smol_str::SmolStr;

use crate::base::SourceTier;

/// One discovered shader file. Identity key is `name` (the file stem),
/// but the catalog may hold several units sharing a name; duplicates are
/// tracked separately from the per-name default.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShaderUnit {
    pub name: SmolStr,
    pub path: PathBuf,
    /// Short path shown in hover and navigation UI.
    pub display_path: String,
    pub tier: SourceTier,
}

impl ShaderUnit {
    pub fn new(path: impl Into<PathBuf>, tier: SourceTier) -> Self {
        let path = path.into();
        let name = SmolStr::new(path.file_stem().and_then(|s| s.to_str()).unwrap_or(""));
        let display_path = display_path_for(&path, tier);
        Self {
            name,
            path,
            display_path,
            tier,
        }
    }
}

/// Workspace files display by file name alone; engine and package files
/// carry their tier so same-named units stay distinguishable in the UI.
fn display_path_for(path: &Path, tier: SourceTier) -> String {
    let file_name = path
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or_default();
    match tier {
        SourceTier::Workspace => file_name.to_string(),
        _ => format!("{}:{}", tier.label(), file_name),
    }
}
