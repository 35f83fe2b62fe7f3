//! Extension-keyed extractor registry.

use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, RwLock};

use tracing::{debug, warn};

use crate::error::{ExtractError, ExtractResult};
use crate::types::ExtractedContent;
use crate::Extractor;

/// Normalize a file extension to its lower-cased, dot-prefixed form.
///
/// `"PDF"`, `".pdf"` and `" .Pdf "` all normalize to `".pdf"`. An empty
/// input stays empty.
pub fn normalize_extension(extension: &str) -> String {
    let trimmed = extension.trim().to_lowercase();
    if trimmed.is_empty() || trimmed.starts_with('.') {
        trimmed
    } else {
        format!(".{}", trimmed)
    }
}

/// Normalized extension of a path, or an empty string if it has none.
pub fn extension_of(path: &Path) -> String {
    path.extension()
        .map(|ext| normalize_extension(&ext.to_string_lossy()))
        .unwrap_or_default()
}

fn same_instance(a: &Arc<dyn Extractor>, b: &Arc<dyn Extractor>) -> bool {
    Arc::as_ptr(a) as *const () == Arc::as_ptr(b) as *const ()
}

/// Registry binding each normalized file extension to exactly one extractor.
///
/// Lookups take a shared lock; registration takes the exclusive lock for the
/// whole call, so a multi-extension registration is never partially visible.
/// A registration that conflicts on any extension is rejected as a whole and
/// leaves the registry unchanged.
pub struct ExtractorRegistry {
    extractors: RwLock<HashMap<String, Arc<dyn Extractor>>>,
}

impl ExtractorRegistry {
    /// Create new empty registry.
    pub fn new() -> Self {
        Self {
            extractors: RwLock::new(HashMap::new()),
        }
    }

    /// Create registry with all compiled-in extractors.
    pub fn with_defaults() -> ExtractResult<Self> {
        let registry = Self::new();
        for extractor in crate::ExtractorFactory::all() {
            registry.register(extractor)?;
        }
        Ok(registry)
    }

    /// Register an extractor under every extension it declares.
    ///
    /// Re-registering the same extractor instance is a no-op for the
    /// extensions it already owns. Binding an extension that belongs to a
    /// different extractor fails with [`ExtractError::DuplicateExtension`].
    pub fn register(&self, extractor: Arc<dyn Extractor>) -> ExtractResult<()> {
        let mut extensions: Vec<String> = Vec::new();
        for ext in extractor.supported_extensions() {
            let ext = normalize_extension(ext);
            if !ext.is_empty() && !extensions.contains(&ext) {
                extensions.push(ext);
            }
        }

        let mut guard = self
            .extractors
            .write()
            .map_err(|_| ExtractError::RegistryPoisoned)?;

        for ext in &extensions {
            if let Some(existing) = guard.get(ext) {
                if !same_instance(existing, &extractor) {
                    warn!(
                        extension = %ext,
                        existing = existing.name(),
                        rejected = extractor.name(),
                        "Duplicate extractor registration"
                    );
                    return Err(ExtractError::DuplicateExtension {
                        extension: ext.clone(),
                        existing: existing.name().to_string(),
                    });
                }
            }
        }

        for ext in &extensions {
            guard.insert(ext.clone(), Arc::clone(&extractor));
        }

        debug!(
            extractor = extractor.name(),
            extensions = ?extensions,
            "Registered extractor"
        );
        Ok(())
    }

    /// Get the extractor bound to an extension.
    pub fn lookup(&self, extension: &str) -> ExtractResult<Arc<dyn Extractor>> {
        let ext = normalize_extension(extension);
        let guard = self
            .extractors
            .read()
            .map_err(|_| ExtractError::RegistryPoisoned)?;
        guard
            .get(&ext)
            .cloned()
            .ok_or(ExtractError::UnsupportedExtension(ext))
    }

    /// Get the extractor for a file based on its extension.
    pub fn lookup_path(&self, path: &Path) -> ExtractResult<Arc<dyn Extractor>> {
        self.lookup(&extension_of(path))
    }

    /// Extract content from a file with the extractor bound to its extension.
    pub async fn extract(&self, path: &Path) -> ExtractResult<ExtractedContent> {
        let extractor = self.lookup_path(path)?;
        debug!(
            path = %path.display(),
            extractor = extractor.name(),
            "Dispatching extraction"
        );
        extractor.extract(path).await
    }

    /// Check if an extension has a bound extractor.
    pub fn supports(&self, extension: &str) -> bool {
        self.lookup(extension).is_ok()
    }

    /// List all registered extensions, sorted.
    pub fn supported_extensions(&self) -> Vec<String> {
        let mut extensions: Vec<String> = match self.extractors.read() {
            Ok(guard) => guard.keys().cloned().collect(),
            Err(_) => Vec::new(),
        };
        extensions.sort();
        extensions
    }

    /// Get the number of registered extensions.
    pub fn len(&self) -> usize {
        self.extractors.read().map(|g| g.len()).unwrap_or(0)
    }

    /// Check if the registry has no registered extensions.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for ExtractorRegistry {
    fn default() -> Self {
        Self::new()
    }
}
