//! Inheritance tree for navigation.

use std::path::PathBuf;

use rustc_hash::FxHashSet;
use smol_str::SmolStr;

use crate::base::SourceTier;
use crate::workspace::{ShaderIndex, ShaderUnit};

/// One node of the recursive inheritance tree.
#[derive(Clone, Debug)]
pub struct InheritanceNode {
    pub name: SmolStr,
    /// Absent when the base was never discovered.
    pub file_path: Option<PathBuf>,
    pub display_path: Option<String>,
    /// Workspace-tier units are the user's own files.
    pub is_local: bool,
    pub children: Vec<InheritanceNode>,
}

/// Build the inheritance tree rooted at a unit. Nodes already on the
/// current descent stop recursion, so cyclic declarations still produce a
/// finite tree.
pub(super) fn inheritance_tree(index: &ShaderIndex, unit: &ShaderUnit) -> InheritanceNode {
    let mut on_path: FxHashSet<SmolStr> = FxHashSet::default();
    build_node(index, &unit.name, &mut on_path)
}

fn build_node(
    index: &ShaderIndex,
    name: &str,
    on_path: &mut FxHashSet<SmolStr>,
) -> InheritanceNode {
    let unit = index.lookup_by_name(name);
    let mut node = InheritanceNode {
        name: SmolStr::new(name),
        file_path: unit.as_ref().map(|u| u.path.clone()),
        display_path: unit.as_ref().map(|u| u.display_path.clone()),
        is_local: unit
            .as_ref()
            .map(|u| u.tier == SourceTier::Workspace)
            .unwrap_or(false),
        children: Vec::new(),
    };

    if !on_path.insert(SmolStr::new(name)) {
        return node;
    }
    if let Some(decl) = index.get_parsed(name) {
        for base in &decl.bases {
            if on_path.contains(&base.base_name) {
                continue;
            }
            node.children
                .push(build_node(index, &base.base_name, on_path));
        }
    }
    on_path.remove(name);
    node
}
