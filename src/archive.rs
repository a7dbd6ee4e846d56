//! Export archive decomposition.
//!
//! The document export arrives as a zip holding one html file plus the images
//! it references by relative name. Everything is read into memory up front;
//! exports are bounded by email attachment limits.

use crate::error::{ArchiveError, PipelineError};
use crate::log;
use std::collections::{BTreeMap, HashSet};
use std::io::{Cursor, Read};

/// Suffix identifying the document entry when nothing else is configured.
pub const DEFAULT_HTML_SUFFIX: &str = ".html";

/// One named blob inside the export archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub name: String,
    pub bytes: Vec<u8>,
}

/// All file entries of an archive, in container order. Names are unique.
#[derive(Debug, Clone, Default)]
pub struct Archive {
    entries: Vec<Entry>,
}

impl Archive {
    /// Decompress every file entry of a zip container.
    ///
    /// Directory entries are skipped. Duplicate names are rejected since
    /// assets are later addressed by name.
    pub fn read(raw: &[u8]) -> Result<Self, PipelineError> {
        let mut zip =
            zip::ZipArchive::new(Cursor::new(raw)).map_err(ArchiveError::Container)?;

        let mut entries = Vec::with_capacity(zip.len());
        let mut seen = HashSet::with_capacity(zip.len());

        for index in 0..zip.len() {
            let mut file = zip
                .by_index(index)
                .map_err(|source| ArchiveError::Open { index, source })?;
            if file.is_dir() {
                continue;
            }

            let name = file.name().to_owned();
            let mut bytes = Vec::with_capacity(file.size() as usize);
            file.read_to_end(&mut bytes)
                .map_err(|source| ArchiveError::Read {
                    name: name.clone(),
                    source,
                })?;

            if !seen.insert(name.clone()) {
                return Err(ArchiveError::DuplicateName(name).into());
            }

            log!("archive"; "file {}: {} ({} bytes)", index, name, bytes.len());
            entries.push(Entry { name, bytes });
        }

        Ok(Self { entries })
    }

    /// Build an archive from already-decoded entries.
    #[allow(unused)]
    pub fn from_entries(entries: Vec<Entry>) -> Result<Self, PipelineError> {
        let mut seen = HashSet::with_capacity(entries.len());
        for entry in &entries {
            if !seen.insert(entry.name.as_str()) {
                return Err(ArchiveError::DuplicateName(entry.name.clone()).into());
            }
        }
        Ok(Self { entries })
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Find the single document entry among the archive's names.
    ///
    /// Zero or several candidates is fatal: later stages assume exactly one
    /// document body and there is no basis for picking one.
    pub fn find_html_entry(&self, suffix: &str) -> Result<&Entry, PipelineError> {
        let mut found: Option<&Entry> = None;
        for entry in &self.entries {
            if !has_suffix(&entry.name, suffix) {
                continue;
            }
            if let Some(first) = found {
                return Err(PipelineError::MultipleHtmlEntries {
                    first: first.name.clone(),
                    second: entry.name.clone(),
                });
            }
            found = Some(entry);
        }
        found.ok_or(PipelineError::NoHtmlEntry)
    }

    /// Classify the archive into its document entry and asset map.
    pub fn classify(self, suffix: &str) -> Result<DocumentBundle, PipelineError> {
        let html_entry = self.find_html_entry(suffix)?.name.clone();
        let assets = self
            .entries
            .into_iter()
            .map(|entry| (entry.name, entry.bytes))
            .collect();
        Ok(DocumentBundle { html_entry, assets })
    }
}

/// ASCII case-insensitive suffix check.
fn has_suffix(name: &str, suffix: &str) -> bool {
    name.len() >= suffix.len()
        && name.is_char_boundary(name.len() - suffix.len())
        && name[name.len() - suffix.len()..].eq_ignore_ascii_case(suffix)
}

/// A classified archive: the document entry name plus every entry's bytes.
///
/// `assets` still contains the document entry itself; consumers that want
/// only the attachments go through [`DocumentBundle::attachments`].
#[derive(Debug, Clone)]
pub struct DocumentBundle {
    pub html_entry: String,
    pub assets: BTreeMap<String, Vec<u8>>,
}

impl DocumentBundle {
    /// Decoded document markup. Invalid UTF-8 is replaced rather than rejected.
    pub fn html(&self) -> String {
        self.assets
            .get(&self.html_entry)
            .map(|bytes| String::from_utf8_lossy(bytes).into_owned())
            .unwrap_or_default()
    }

    /// Names of every entry other than the document itself.
    pub fn asset_names(&self) -> impl Iterator<Item = &str> {
        self.assets
            .keys()
            .map(String::as_str)
            .filter(|name| *name != self.html_entry)
    }

    /// Consume the bundle, keeping only the non-document entries.
    pub fn attachments(mut self) -> BTreeMap<String, Vec<u8>> {
        self.assets.remove(&self.html_entry);
        self.assets
    }
}

// ============================================================================
// Tests
// ============================================================================
