//! The `convert` command.
//!
//! ```text
//! convert_archive()
//!     │
//!     ├── pipeline::convert() ──► EmailBody
//!     │
//!     ├── write_html()        ──► <dir>/<document file name>
//!     ├── write_asset()       ──► <dir>/<archive name>   (per asset)
//!     └── write_manifest()    ──► <dir>/manifest.json    (if enabled)
//! ```

use crate::{
    attachment::InlineAttachment,
    config::Config,
    log,
    pipeline::{self, EmailBody, PipelineOptions},
    utils::minify::minify,
};
use anyhow::{Context, Result, anyhow, bail};
use std::{
    fs,
    path::{Component, Path, PathBuf},
};

/// File name of the attachment manifest.
pub const MANIFEST_FILE: &str = "manifest.json";

/// Convert the archive at `archive` and write the result into the output dir.
///
/// Pipeline failures are returned unwrapped so the caller can report their
/// category.
pub fn convert_archive(
    archive: &Path,
    config: &Config,
    options: &PipelineOptions,
) -> Result<EmailBody> {
    let raw = fs::read(archive)
        .with_context(|| format!("Failed to read archive `{}`", archive.display()))?;
    log!("archive"; "{} ({} bytes)", archive.display(), raw.len());

    let body = pipeline::convert(&raw, options)?;
    write_body(&body, config)?;
    Ok(body)
}

/// Write the document, its assets and the manifest.
///
/// Every asset path is checked before anything is written.
pub fn write_body(body: &EmailBody, config: &Config) -> Result<()> {
    let dir = &config.output.dir;
    let attachments = body.attachments();
    let paths = attachments
        .iter()
        .map(|attachment| relative_entry_path(&attachment.filename))
        .collect::<Result<Vec<_>>>()?;
    if config.output.manifest
        && let Some(attachment) = attachments
            .iter()
            .zip(&paths)
            .find_map(|(attachment, path)| (path == Path::new(MANIFEST_FILE)).then_some(attachment))
    {
        bail!(
            "Archive entry `{}` collides with the attachment manifest",
            attachment.filename
        );
    }

    fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create output dir `{}`", dir.display()))?;

    let html_path = write_html(body, config)?;
    log!("convert"; "{}", html_path.display());

    for (attachment, path) in attachments.iter().zip(&paths) {
        write_asset(&dir.join(path), attachment)?;
        log!("convert"; "{} ({}, {} bytes)", attachment.filename, attachment.content_type, attachment.size);
    }

    if config.output.manifest {
        write_manifest(dir, &attachments)?;
    }
    Ok(())
}

fn write_html(body: &EmailBody, config: &Config) -> Result<PathBuf> {
    let file_name = Path::new(&body.html_entry)
        .file_name()
        .ok_or_else(|| anyhow!("Document entry `{}` has no file name", body.html_entry))?;
    let path = config.output.dir.join(file_name);

    let html = minify(body.html.as_bytes(), config);
    fs::write(&path, &*html).with_context(|| format!("Failed to write `{}`", path.display()))?;
    Ok(path)
}

fn write_asset(path: &Path, attachment: &InlineAttachment) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, &attachment.bytes)
        .with_context(|| format!("Failed to write `{}`", path.display()))?;
    Ok(())
}

fn write_manifest(dir: &Path, attachments: &[InlineAttachment]) -> Result<()> {
    let path = dir.join(MANIFEST_FILE);
    let json = serde_json::to_string_pretty(attachments)?;
    fs::write(&path, json).with_context(|| format!("Failed to write `{}`", path.display()))?;
    log!("convert"; "{}", path.display());
    Ok(())
}

/// Archive names must stay inside the output dir.
fn relative_entry_path(name: &str) -> Result<PathBuf> {
    let path = Path::new(name);
    let mut relative = PathBuf::new();
    for component in path.components() {
        match component {
            Component::Normal(part) => relative.push(part),
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                bail!("Archive entry `{name}` points outside the output dir")
            }
        }
    }
    if relative.as_os_str().is_empty() {
        bail!("Archive entry `{name}` has no file name");
    }
    Ok(relative)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::archive::tests::zip_bytes;
    use crate::error::PipelineError;
    use tempfile::TempDir;

    const DOC: &str = r#"<html><body><p><span style="font-weight:700">Hi</span><img src="images/image1.png"></p></body></html>"#;

    fn config_in(dir: &Path) -> Config {
        let mut config = Config::default();
        config.output.dir = dir.join("out");
        config
    }

    fn write_archive(dir: &Path, files: &[(&str, &[u8])]) -> PathBuf {
        let path = dir.join("export.zip");
        fs::write(&path, zip_bytes(files)).unwrap();
        path
    }

    #[test]
    fn test_convert_writes_document_assets_and_manifest() {
        let dir = TempDir::new().unwrap();
        let archive = write_archive(
            dir.path(),
            &[
                ("Doc.html", DOC.as_bytes()),
                ("images/image1.png", b"\x89PNG\r\n\x1a\n"),
            ],
        );
        let config = config_in(dir.path());
        let options = PipelineOptions::builtin().unwrap();

        let body = convert_archive(&archive, &config, &options).unwrap();
        assert_eq!(body.html_entry, "Doc.html");

        let out = dir.path().join("out");
        let html = fs::read_to_string(out.join("Doc.html")).unwrap();
        assert!(html.contains(r#"src="cid:images/image1.png""#));
        assert_eq!(
            fs::read(out.join("images/image1.png")).unwrap(),
            b"\x89PNG\r\n\x1a\n"
        );

        let manifest: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(out.join(MANIFEST_FILE)).unwrap()).unwrap();
        assert_eq!(manifest[0]["content_id"], "images/image1.png");
        assert_eq!(manifest[0]["content_type"], "image/png");
        assert_eq!(manifest[0]["disposition"], "inline");
    }

    #[test]
    fn test_convert_without_manifest() {
        let dir = TempDir::new().unwrap();
        let archive = write_archive(dir.path(), &[("Doc.html", DOC.as_bytes())]);
        let mut config = config_in(dir.path());
        config.output.manifest = false;

        convert_archive(&archive, &config, &PipelineOptions::builtin().unwrap()).unwrap();
        assert!(dir.path().join("out/Doc.html").exists());
        assert!(!dir.path().join("out").join(MANIFEST_FILE).exists());
    }

    #[test]
    fn test_convert_nested_document_written_by_file_name() {
        let dir = TempDir::new().unwrap();
        let archive = write_archive(dir.path(), &[("export/Doc.html", DOC.as_bytes())]);
        let config = config_in(dir.path());

        convert_archive(&archive, &config, &PipelineOptions::builtin().unwrap()).unwrap();
        assert!(dir.path().join("out/Doc.html").exists());
    }

    #[test]
    fn test_convert_minified() {
        let dir = TempDir::new().unwrap();
        let archive = write_archive(dir.path(), &[("Doc.html", DOC.as_bytes())]);
        let mut config = config_in(dir.path());
        config.output.minify = true;

        let body = convert_archive(&archive, &config, &PipelineOptions::builtin().unwrap()).unwrap();
        let written = fs::read_to_string(dir.path().join("out/Doc.html")).unwrap();
        assert!(written.len() <= body.html.len());
        assert!(written.contains("Hi"));
    }

    #[test]
    fn test_pipeline_error_is_downcastable() {
        let dir = TempDir::new().unwrap();
        let archive = write_archive(dir.path(), &[("images/image1.png", b"png")]);
        let config = config_in(dir.path());

        let err = convert_archive(&archive, &config, &PipelineOptions::builtin().unwrap())
            .unwrap_err();
        let err = err.downcast_ref::<PipelineError>().unwrap();
        assert_eq!(err.category(), "no-html-entry");
        assert!(!dir.path().join("out").exists());
    }

    #[test]
    fn test_missing_archive_file() {
        let dir = TempDir::new().unwrap();
        let config = config_in(dir.path());
        let err = convert_archive(
            &dir.path().join("missing.zip"),
            &config,
            &PipelineOptions::builtin().unwrap(),
        )
        .unwrap_err();
        assert!(err.to_string().contains("Failed to read archive"));
    }

    #[test]
    fn test_escaping_asset_fails_before_writing() {
        let dir = TempDir::new().unwrap();
        let archive = write_archive(
            dir.path(),
            &[("Doc.html", DOC.as_bytes()), ("../x.png", b"\x89PNG\r\n\x1a\n")],
        );
        let config = config_in(dir.path());

        let err = convert_archive(&archive, &config, &PipelineOptions::builtin().unwrap())
            .unwrap_err();
        assert!(err.to_string().contains("outside the output dir"));
        assert!(!dir.path().join("out").exists());
        assert!(!dir.path().join("x.png").exists());
    }

    #[test]
    fn test_asset_named_like_manifest() {
        let dir = TempDir::new().unwrap();
        let archive = write_archive(
            dir.path(),
            &[("Doc.html", DOC.as_bytes()), ("manifest.json", b"{}")],
        );
        let options = PipelineOptions::builtin().unwrap();

        let config = config_in(dir.path());
        let err = convert_archive(&archive, &config, &options).unwrap_err();
        assert!(err.to_string().contains("collides with the attachment manifest"));
        assert!(!dir.path().join("out").exists());

        let mut config = config_in(dir.path());
        config.output.manifest = false;
        convert_archive(&archive, &config, &options).unwrap();
        assert_eq!(fs::read(dir.path().join("out").join(MANIFEST_FILE)).unwrap(), b"{}");
    }

    #[test]
    fn test_relative_entry_path() {
        assert_eq!(
            relative_entry_path("images/image1.png").unwrap(),
            PathBuf::from("images/image1.png")
        );
        assert_eq!(relative_entry_path("./a.png").unwrap(), PathBuf::from("a.png"));
        assert!(relative_entry_path("../escape.png").is_err());
        assert!(relative_entry_path("/etc/passwd").is_err());
        assert!(relative_entry_path("").is_err());
    }
}
