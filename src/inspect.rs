//! The `inspect` command: list archive entries and classify them.

use crate::{archive::Archive, attachment::detect_content_type, config::Config, log};
use anyhow::{Context, Result};
use std::{fs, path::Path};

/// One listed entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryReport {
    pub name: String,
    pub size: usize,
    pub content_type: &'static str,
    pub is_document: bool,
}

/// Read the archive at `path`, log its entries and return them.
///
/// Classification errors are returned after the listing has been logged.
pub fn inspect_archive(path: &Path, config: &Config) -> Result<Vec<EntryReport>> {
    let raw =
        fs::read(path).with_context(|| format!("Failed to read archive `{}`", path.display()))?;
    let archive = Archive::read(&raw)?;
    if archive.is_empty() {
        log!("inspect"; "archive has no file entries");
    }

    let suffix = &config.archive.html_suffix;
    let document = archive.find_html_entry(suffix).map(|entry| entry.name.clone());

    let reports: Vec<_> = archive
        .entries()
        .iter()
        .map(|entry| EntryReport {
            name: entry.name.clone(),
            size: entry.bytes.len(),
            content_type: detect_content_type(&entry.name, &entry.bytes),
            is_document: document.as_ref().is_ok_and(|doc| *doc == entry.name),
        })
        .collect();

    for report in &reports {
        let marker = if report.is_document { " [document]" } else { "" };
        log!("inspect"; "{} ({}, {} bytes){}", report.name, report.content_type, report.size, marker);
    }
    log!("inspect"; "{} entries", archive.len());

    document?;
    Ok(reports)
}
