//! Workspace index and parse cache.
//!
//! Catalogs every discovered shader unit across the three provenance
//! tiers, parses lazily through the parser collaborator, disambiguates
//! duplicate names, and keeps a last-known-good structure alive across
//! failed reparses so editor features never go blank mid-edit.
//!
//! One [`ShaderIndex`] is shared by the foreground request path and the
//! background indexing/pre-parse tasks; all catalog access goes through
//! its internal mutex.

mod discovery;
mod error;
mod index;
mod indexer;
mod unit;

pub use discovery::{DirectoryScanner, ShaderDiscovery, collect_shader_paths};
pub use error::WorkspaceError;
pub use index::ShaderIndex;
pub use indexer::WorkspaceIndexer;
pub use unit::ShaderUnit;
