//! Zip container access for the Office Open XML, ODF and EPUB extractors.

use std::io::{Cursor, Read};

use zip::result::ZipError;
use zip::ZipArchive;

use crate::error::{ExtractError, ExtractResult};

/// Largest decompressed entry read from a container (32 MiB).
pub(crate) const MAX_ENTRY_BYTES: u64 = 32 << 20;

/// An in-memory zip container.
pub(crate) struct Archive {
    format: &'static str,
    inner: ZipArchive<Cursor<Vec<u8>>>,
    entry_limit: u64,
}

impl Archive {
    /// Open a container, reporting failures against `format`.
    pub(crate) fn open(format: &'static str, bytes: Vec<u8>) -> ExtractResult<Self> {
        let inner = ZipArchive::new(Cursor::new(bytes)).map_err(|e| {
            ExtractError::malformed(format, format!("not a valid zip container: {}", e))
        })?;
        Ok(Self {
            format,
            inner,
            entry_limit: MAX_ENTRY_BYTES,
        })
    }

    #[cfg(test)]
    fn with_entry_limit(mut self, limit: u64) -> Self {
        self.entry_limit = limit;
        self
    }

    fn too_large(&self, name: &str) -> ExtractError {
        ExtractError::unsupported_structure(
            self.format,
            format!("{} exceeds {} bytes when decompressed", name, self.entry_limit),
        )
    }

    /// Names of all entries, in archive order.
    pub(crate) fn entry_names(&self) -> Vec<String> {
        self.inner.file_names().map(str::to_string).collect()
    }

    /// Read an entry as UTF-8 text; `None` if the entry is absent.
    pub(crate) fn read_optional(&mut self, name: &str) -> ExtractResult<Option<String>> {
        let mut entry = match self.inner.by_name(name) {
            Ok(entry) => entry,
            Err(ZipError::FileNotFound) => return Ok(None),
            Err(e) => {
                return Err(ExtractError::malformed(
                    self.format,
                    format!("cannot open {}: {}", name, e),
                ))
            }
        };

        // The declared size comes from the upload; never allocate from it.
        let declared = entry.size();
        if declared > self.entry_limit {
            drop(entry);
            return Err(self.too_large(name));
        }

        let mut bytes = Vec::new();
        let read = (&mut entry)
            .take(self.entry_limit + 1)
            .read_to_end(&mut bytes);
        drop(entry);
        read.map_err(|e| {
            ExtractError::malformed(self.format, format!("cannot read {}: {}", name, e))
        })?;
        if bytes.len() as u64 > self.entry_limit {
            return Err(self.too_large(name));
        }
        Ok(Some(String::from_utf8_lossy(&bytes).into_owned()))
    }

    /// Read a required entry as UTF-8 text.
    pub(crate) fn read(&mut self, name: &str) -> ExtractResult<String> {
        self.read_optional(name)?.ok_or_else(|| {
            ExtractError::unsupported_structure(self.format, format!("missing {}", name))
        })
    }
}
