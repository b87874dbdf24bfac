//! Compilation Driver
//!
//! Resolves the capability set for a runtime version once, walks the package
//! image, renders every top-level construct and assembles the interface file.
//! A package either compiles completely or not at all.

use crate::capabilities::{CapabilityRegistry, CapabilitySet};
use crate::config::CompilerConfig;
use crate::error::{GemRbiError, GemRbiResult};
use crate::image::PackageImage;
use crate::rbi::{join_fragments, RbiPrinter};
use crate::serializer::{render_construct, TypeSerializer};
use crate::version::VersionIdentifier;
use crate::walker::SymbolWalker;
use tracing::{debug, info, warn};

/// One generated `.rbi` file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterfaceFile {
    pub package_name: String,
    pub package_version: String,
    pub header_comment: String,
    /// Printed top-level declarations, in discovery order.
    pub body: Vec<String>,
}

impl InterfaceFile {
    pub fn contents(&self) -> String {
        if self.body.is_empty() {
            return format!("{}\n", self.header_comment);
        }
        format!("{}\n\n{}\n", self.header_comment, join_fragments(&self.body))
    }

    /// `<name>@<version>.rbi`
    pub fn relative_path(&self) -> String {
        format!("{}@{}.rbi", self.package_name, self.package_version)
    }
}

pub struct Compiler {
    config: CompilerConfig,
    registry: CapabilityRegistry,
    walker: SymbolWalker,
    printer: RbiPrinter,
    workers: usize,
}

impl Default for Compiler {
    fn default() -> Self {
        Self::new(CompilerConfig::default())
    }
}

impl Compiler {
    pub fn new(config: CompilerConfig) -> Self {
        let registry = config.registry();
        let walker = config.walker();
        Self {
            config,
            registry,
            walker,
            printer: RbiPrinter::default(),
            workers: num_cpus::get(),
        }
    }

    /// Caps the number of threads `compile_batch` uses.
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    pub fn capabilities_for(&self, version: &VersionIdentifier) -> CapabilitySet {
        self.registry.capabilities_for(version)
    }

    pub fn compile(
        &self,
        image: &PackageImage,
        version: &VersionIdentifier,
    ) -> GemRbiResult<InterfaceFile> {
        let caps = self.registry.capabilities_for(version);
        debug!(
            "Compiling {} for {} with capabilities [{}]",
            image.name,
            version,
            caps.iter().map(|c| c.to_string()).collect::<Vec<_>>().join(", ")
        );
        let serializer = TypeSerializer::new(&caps, &self.registry);

        let constructs = self.walker.discover(image);
        debug!(
            "Discovered {} constructs in {}",
            constructs.iter().map(|c| c.flatten().len()).sum::<usize>(),
            image.name
        );
        let body = constructs
            .iter()
            .map(|construct| {
                render_construct(&serializer, construct).map(|node| self.printer.print(&node, 0))
            })
            .collect::<GemRbiResult<Vec<_>>>()?;

        info!(
            "Compiled {}@{} ({} top-level constructs)",
            image.name,
            image.version,
            body.len()
        );
        Ok(InterfaceFile {
            package_name: image.name.clone(),
            package_version: image.version.clone(),
            header_comment: self.config.header_for(&image.name),
            body,
        })
    }

    pub fn compile_version_str(
        &self,
        image: &PackageImage,
        version: &str,
    ) -> GemRbiResult<InterfaceFile> {
        let version: VersionIdentifier = version.parse()?;
        self.compile(image, &version)
    }

    /// Compiles independent packages on scoped worker threads. Results come
    /// back in input order; one failing package does not affect the others.
    pub fn compile_batch(
        &self,
        images: &[PackageImage],
        version: &VersionIdentifier,
    ) -> Vec<GemRbiResult<InterfaceFile>> {
        if images.is_empty() {
            return Vec::new();
        }
        let workers = self.workers.min(images.len()).max(1);
        let chunk_size = images.len().div_ceil(workers);

        let results: Vec<GemRbiResult<InterfaceFile>> = std::thread::scope(|scope| {
            let handles: Vec<_> = images
                .chunks(chunk_size)
                .map(|chunk| {
                    let handle = scope.spawn(move || {
                        chunk
                            .iter()
                            .map(|image| self.compile(image, version))
                            .collect::<Vec<_>>()
                    });
                    (chunk, handle)
                })
                .collect();

            handles
                .into_iter()
                .flat_map(|(chunk, handle)| {
                    handle.join().unwrap_or_else(|_| {
                        chunk
                            .iter()
                            .map(|image| {
                                Err(GemRbiError::assembly(&image.name, "worker thread panicked"))
                            })
                            .collect()
                    })
                })
                .collect()
        });

        for (image, result) in images.iter().zip(&results) {
            if let Err(e) = result {
                warn!("Failed to compile {}: {}", image.name, e);
            }
        }
        results
    }
}
