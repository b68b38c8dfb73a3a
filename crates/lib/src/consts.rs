/// Default output root, relative to the project root.
pub const DEFAULT_OUT_DIR: &str = "respack-out";

/// Subdirectory of the output root for intermediate files.
pub const BIN_DIR: &str = "bin";

/// Subdirectory of the output root for final outputs.
pub const GEN_DIR: &str = "gen";

/// `aapt` insists on this exact file name for the manifest.
pub const ANDROID_MANIFEST_XML: &str = "AndroidManifest.xml";

pub const RESOURCE_APK_SUFFIX: &str = ".unsigned.ap_";

/// File written next to the resource archive listing the cacheable outputs.
pub const ARTIFACT_MANIFEST: &str = "artifacts.json";

/// Subdirectory of the unified assets directory holding native libraries.
pub const NATIVE_LIBS_ASSETS_DIR: &str = "lib";

/// Subdirectory of the unified assets directory holding compiled string bundles.
pub const STRING_ASSETS_DIR: &str = "strings";
