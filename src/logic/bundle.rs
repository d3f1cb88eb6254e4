// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Alexander Minges

//! Business logic for building the login-page branding extension.
//!
//! Responsibilities:
//! - Write the extension manifest, the optional links fragment and the
//!   translation file into a staging directory.
//! - Package the staging directory into the extension archive the web
//!   application loads from `GUACAMOLE_HOME/extensions`.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Serialize;
use zip::{CompressionMethod, write::FileOptions};

use crate::models::{Branding, LinkPair};

pub const MANIFEST_FILE: &str = "guac-manifest.json";
pub const LINKS_FILE: &str = "links.html";
pub const TRANSLATION_FILE: &str = "translations/en.json";

const EXTENSION_NAME: &str = "Custom Branding";
const EXTENSION_NAMESPACE: &str = "custom-branding";
/// Login-page element the links fragment is inserted after.
const LINKS_ANCHOR_SELECTOR: &str = ".login-ui .login-dialog";

/// Extension descriptor read by the web application.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Manifest {
    guacamole_version: &'static str,
    name: &'static str,
    namespace: &'static str,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    html: Vec<&'static str>,
    translations: Vec<&'static str>,
}

impl Manifest {
    /// The `html` entry is only listed when a links fragment will exist.
    fn for_branding(branding: &Branding) -> Self {
        Self {
            guacamole_version: "*",
            name: EXTENSION_NAME,
            namespace: EXTENSION_NAMESPACE,
            html: if branding.links.is_empty() {
                Vec::new()
            } else {
                vec![LINKS_FILE]
            },
            translations: vec![TRANSLATION_FILE],
        }
    }
}

/// Write every bundle file for `branding` into `dir`.
///
/// `dir` must exist. Returns the paths written, relative to `dir`.
pub fn write_bundle(dir: &Path, branding: &Branding) -> Result<Vec<PathBuf>> {
    let mut written = vec![write_manifest(dir, branding)?];
    if !branding.links.is_empty() {
        written.push(write_links(dir, &branding.links)?);
    }
    written.push(write_brand(dir, &branding.brand)?);
    Ok(written)
}

fn write_manifest(dir: &Path, branding: &Branding) -> Result<PathBuf> {
    let bytes = serde_json::to_vec_pretty(&Manifest::for_branding(branding))?;
    let path = dir.join(MANIFEST_FILE);
    fs::write(&path, bytes).with_context(|| format!("Failed to write manifest {:?}", path))?;
    Ok(PathBuf::from(MANIFEST_FILE))
}

fn write_links(dir: &Path, links: &[LinkPair]) -> Result<PathBuf> {
    let path = dir.join(LINKS_FILE);
    fs::write(&path, render_links(links))
        .with_context(|| format!("Failed to write links fragment {:?}", path))?;
    Ok(PathBuf::from(LINKS_FILE))
}

fn write_brand(dir: &Path, brand: &str) -> Result<PathBuf> {
    let path = dir.join(TRANSLATION_FILE);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create translations directory {:?}", parent))?;
    }
    let translation = serde_json::json!({
        "APP": { "NAME": brand },
    });
    let bytes = serde_json::to_vec_pretty(&translation)?;
    fs::write(&path, bytes).with_context(|| format!("Failed to write translation {:?}", path))?;
    Ok(PathBuf::from(TRANSLATION_FILE))
}

/// Render the HTML patch: one anchor per link, URL and label verbatim.
fn render_links(links: &[LinkPair]) -> String {
    let mut html = format!("<meta name=\"after\" content=\"{LINKS_ANCHOR_SELECTOR}\">\n");
    html.push_str("<div class=\"login-links\">\n");
    for link in links {
        html.push_str(&format!(
            "    <a href=\"{}\">{}</a>\n",
            link.url, link.label
        ));
    }
    html.push_str("</div>\n");
    html
}

/// Zip the contents of `source` into `output`, preserving the directory tree.
///
/// Entry names are relative to `source` and use `/` separators. Parent
/// directories for `output` are created if missing. An existing archive is
/// replaced.
pub fn package_bundle(source: &Path, output: &Path) -> Result<()> {
    // Ensure parent exists so the archive can be written without IO errors.
    if let Some(parent) = output.parent()
        && !parent.exists()
    {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create output directory {:?}", parent))?;
    }

    let file = File::create(output)
        .with_context(|| format!("Failed to write archive file {:?}", output))?;
    let mut zip = zip::ZipWriter::new(file);
    let options: FileOptions<'_, ()> =
        FileOptions::default().compression_method(CompressionMethod::Deflated);

    let mut pending = vec![source.to_path_buf()];
    while let Some(dir) = pending.pop() {
        let mut entries = fs::read_dir(&dir)
            .with_context(|| format!("Failed to list bundle directory {:?}", dir))?
            .collect::<Result<Vec<_>, _>>()
            .with_context(|| format!("Failed to read bundle directory {:?}", dir))?;
        entries.sort_by_key(|e| e.file_name());

        for entry in entries {
            let path = entry.path();
            let name = archive_name(source, &path)?;
            if path.is_dir() {
                zip.add_directory(format!("{name}/"), options)
                    .with_context(|| format!("Failed to add directory {} to archive", name))?;
                pending.push(path);
            } else {
                zip.start_file(name.as_str(), options)
                    .with_context(|| format!("Failed to add file {} to archive", name))?;
                let bytes =
                    fs::read(&path).with_context(|| format!("Failed to read {:?}", path))?;
                zip.write_all(&bytes)
                    .with_context(|| format!("Failed to write {} into archive", name))?;
            }
        }
    }

    zip.finish().context("Failed to finalize archive")?;
    Ok(())
}

fn archive_name(root: &Path, path: &Path) -> Result<String> {
    let relative = path
        .strip_prefix(root)
        .with_context(|| format!("{:?} is outside the bundle directory", path))?;
    Ok(relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join("/"))
}

#[cfg(test)]
mod tests {
    use std::io::Read;

    use serde_json::Value;
    use tempfile::TempDir;
    use zip::ZipArchive;

    use super::*;

    fn branding(links: Vec<LinkPair>) -> Branding {
        Branding {
            brand: "Example Remote".into(),
            links,
        }
    }

    fn link(url: &str, label: &str) -> LinkPair {
        LinkPair {
            url: url.into(),
            label: label.into(),
        }
    }

    fn read_json(path: &Path) -> Value {
        serde_json::from_slice(&fs::read(path).unwrap()).unwrap()
    }

    #[test]
    fn bundle_without_links_has_no_html_reference_or_fragment() {
        let tmp = TempDir::new().unwrap();

        let written = write_bundle(tmp.path(), &branding(Vec::new())).unwrap();

        assert_eq!(
            written,
            [MANIFEST_FILE, TRANSLATION_FILE].map(PathBuf::from).to_vec()
        );
        assert!(!tmp.path().join(LINKS_FILE).exists());
        let manifest = read_json(&tmp.path().join(MANIFEST_FILE));
        assert!(manifest.get("html").is_none());
        assert_eq!(manifest["guacamoleVersion"], "*");
        assert_eq!(manifest["namespace"], EXTENSION_NAMESPACE);
        assert_eq!(manifest["translations"][0], TRANSLATION_FILE);
    }

    #[test]
    fn bundle_with_links_references_fragment() {
        let tmp = TempDir::new().unwrap();

        write_bundle(
            tmp.path(),
            &branding(vec![link("https://help.example.com", "Help")]),
        )
        .unwrap();

        let manifest = read_json(&tmp.path().join(MANIFEST_FILE));
        assert_eq!(manifest["html"], serde_json::json!([LINKS_FILE]));
        assert!(tmp.path().join(LINKS_FILE).is_file());
    }

    // One anchor per configured pair, carrying the literal URL and label.
    #[test]
    fn links_fragment_has_one_anchor_per_pair() {
        let tmp = TempDir::new().unwrap();
        let links = vec![
            link("https://help.example.com/start?a=1", "Getting started"),
            link("https://status.example.com", "Service status"),
        ];

        write_bundle(tmp.path(), &branding(links)).unwrap();

        let html = fs::read_to_string(tmp.path().join(LINKS_FILE)).unwrap();
        assert!(html.starts_with("<meta name=\"after\""));
        assert_eq!(html.matches("<a href=").count(), 2);
        assert!(html.contains(
            "<a href=\"https://help.example.com/start?a=1\">Getting started</a>"
        ));
        assert!(html.contains("<a href=\"https://status.example.com\">Service status</a>"));
        let first = html.find("Getting started").unwrap();
        let second = html.find("Service status").unwrap();
        assert!(first < second);
    }

    #[test]
    fn translation_carries_brand_text_verbatim() {
        let tmp = TempDir::new().unwrap();
        let mut b = branding(Vec::new());
        b.brand = "Ünïcode \"Remote\" Desk".into();

        write_bundle(tmp.path(), &b).unwrap();

        let translation = read_json(&tmp.path().join(TRANSLATION_FILE));
        assert_eq!(translation["APP"]["NAME"], "Ünïcode \"Remote\" Desk");
    }

    #[test]
    fn package_bundle_preserves_tree_and_contents() {
        let tmp = TempDir::new().unwrap();
        let staging = tmp.path().join("staging");
        fs::create_dir(&staging).unwrap();
        write_bundle(&staging, &branding(vec![link("https://a.example", "A")])).unwrap();
        let out = tmp.path().join("home/extensions/branding.jar");

        package_bundle(&staging, &out).unwrap();

        let mut archive = ZipArchive::new(File::open(&out).unwrap()).unwrap();
        let mut names: Vec<_> = archive.file_names().map(str::to_string).collect();
        names.sort();
        assert_eq!(
            names,
            [
                "guac-manifest.json",
                "links.html",
                "translations/",
                "translations/en.json"
            ]
        );

        let mut buf = String::new();
        archive
            .by_name("translations/en.json")
            .unwrap()
            .read_to_string(&mut buf)
            .unwrap();
        let translation: Value = serde_json::from_str(&buf).unwrap();
        assert_eq!(translation["APP"]["NAME"], "Example Remote");
    }

    // A re-run replaces the archive instead of merging old entries into it.
    #[test]
    fn package_bundle_overwrites_previous_archive() {
        let tmp = TempDir::new().unwrap();
        let out = tmp.path().join("branding.jar");

        let first = tmp.path().join("first");
        fs::create_dir(&first).unwrap();
        write_bundle(&first, &branding(vec![link("https://a.example", "A")])).unwrap();
        package_bundle(&first, &out).unwrap();

        let second = tmp.path().join("second");
        fs::create_dir(&second).unwrap();
        write_bundle(&second, &branding(Vec::new())).unwrap();
        package_bundle(&second, &out).unwrap();

        let archive = ZipArchive::new(File::open(&out).unwrap()).unwrap();
        assert!(!archive.file_names().any(|n| n == LINKS_FILE));
    }

    #[test]
    fn package_bundle_fails_for_missing_source() {
        let tmp = TempDir::new().unwrap();
        let result = package_bundle(&tmp.path().join("nope"), &tmp.path().join("out.jar"));
        assert!(result.is_err());
    }
}
