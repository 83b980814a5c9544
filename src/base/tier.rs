/// The provenance root a shader unit was discovered under.
///
/// Tiers rank duplicate names: a workspace shader shadows a package or
/// engine shader of the same name for default lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SourceTier {
    /// Shaders bundled with the engine installation.
    Engine,
    /// Shaders from third-party packages referenced by the project.
    Package,
    /// Shaders in the user's own workspace.
    Workspace,
}

impl SourceTier {
    /// Display label used in hover text and display paths.
    pub fn label(&self) -> &'static str {
        match self {
            SourceTier::Engine => "engine",
            SourceTier::Package => "package",
            SourceTier::Workspace => "workspace",
        }
    }
}
