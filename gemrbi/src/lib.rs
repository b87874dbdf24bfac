// gemrbi Library
// Extracts type information from a package's runtime image and writes it out
// as an RBI interface file adapted to a given type-checker version.

pub mod capabilities;
pub mod config;
pub mod construct;
pub mod driver;
pub mod error;
pub mod image;
pub mod rbi;
pub mod serializer;
pub mod types;
pub mod version;
pub mod walker;

// Re-export the pieces a caller needs to compile a package.
pub use capabilities::{Capability, CapabilityRegistry, CapabilityRule, CapabilitySet};
pub use config::CompilerConfig;
pub use construct::{ConstructKind, DocumentableConstruct};
pub use driver::{Compiler, InterfaceFile};
pub use error::{GemRbiError, GemRbiResult};
pub use image::{PackageImage, RuntimeType, RuntimeValue};
pub use serializer::TypeSerializer;
pub use types::TypeNode;
pub use version::VersionIdentifier;
pub use walker::SymbolWalker;
