//! Domain constants shared across the analyzer.

/// File extension for single-shader source files.
pub const SHADER_EXTENSION: &str = "sdsl";

/// File extension for effect files (also contain shader declarations).
pub const EFFECT_EXTENSION: &str = "sdfx";

/// All extensions the discovery scanner recognizes.
pub const SOURCE_EXTENSIONS: &[&str] = &[SHADER_EXTENSION, EFFECT_EXTENSION];

/// Receiver name for inherited-member access inside method bodies.
pub const BASE_RECEIVER: &str = "base";

/// Receiver name for stream-variable access inside method bodies.
pub const STREAMS_RECEIVER: &str = "streams";
