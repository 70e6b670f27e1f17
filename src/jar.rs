//! Archive driver: stub every class of a jar or class directory
//!
//! Classes are stubbed independently, on the rayon pool when the config asks
//! for it. Results land in a `BTreeMap` keyed by entry name, so output never
//! depends on scheduling; a class that fails is reported and skipped while its
//! siblings carry on.

use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{BufReader, Read, Write};
use std::path::{Path, PathBuf};

use rayon::prelude::*;
use sha2::{Digest, Sha256};
use walkdir::WalkDir;
use zip::write::FileOptions;
use zip::{CompressionMethod, DateTime, ZipArchive, ZipWriter};

use crate::common::config::Config;
use crate::common::error::{Error, Result};

const CLASS_SUFFIX: &str = ".class";
const MODULE_INFO: &str = "module-info.class";
const MANIFEST_PATH: &str = "META-INF/MANIFEST.MF";
const MANIFEST: &str = "Manifest-Version: 1.0\r\nCreated-By: stubjar\r\n\r\n";

/// A jar, zip or directory of class files to stub
#[derive(Debug, Clone)]
pub struct StubJar {
    source: PathBuf,
}

/// Outcome of stubbing one archive
#[derive(Debug, Default)]
pub struct StubReport {
    /// Stub bytes by entry name, e.g. `com/example/Api.class`
    pub stubs: BTreeMap<String, Vec<u8>>,
    /// Local and anonymous classes that produced no stub
    pub dropped: Vec<String>,
    pub failures: Vec<(String, Error)>,
}

enum Outcome {
    Stub(Vec<u8>),
    Dropped,
    Failed(Error),
}

impl StubJar {
    pub fn new(source: impl Into<PathBuf>) -> Self {
        Self { source: source.into() }
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    /// Read the class entries of the source, sorted by name
    pub fn class_entries(&self) -> Result<Vec<(String, Vec<u8>)>> {
        let mut entries = if self.source.is_dir() {
            read_directory(&self.source)?
        } else {
            read_archive(&self.source)?
        };
        entries.retain(|(name, _)| {
            let keep = !is_module_info(name);
            if !keep {
                log::debug!("skipping {}", name);
            }
            keep
        });
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        Ok(entries)
    }

    pub fn run(&self, config: &Config) -> Result<StubReport> {
        let entries = self.class_entries()?;
        log::info!("stubbing {} classes from {}", entries.len(), self.source.display());

        let stub_one = |(name, bytes): &(String, Vec<u8>)| {
            let outcome = match crate::stub_class_bytes(bytes) {
                Ok(Some(stub)) => Outcome::Stub(stub),
                Ok(None) => Outcome::Dropped,
                Err(err) => Outcome::Failed(err),
            };
            (name.clone(), outcome)
        };
        let outcomes: Vec<(String, Outcome)> = if config.parallel {
            entries.par_iter().map(stub_one).collect()
        } else {
            entries.iter().map(stub_one).collect()
        };

        let mut report = StubReport::default();
        for (name, outcome) in outcomes {
            match outcome {
                Outcome::Stub(stub) => {
                    report.stubs.insert(name, stub);
                }
                Outcome::Dropped => report.dropped.push(name),
                Outcome::Failed(err) => {
                    log::warn!("failed to stub {}: {}", name, err);
                    report.failures.push((name, err));
                }
            }
        }
        log::info!(
            "{} stubs, {} dropped, {} failed",
            report.stubs.len(),
            report.dropped.len(),
            report.failures.len()
        );
        Ok(report)
    }
}

impl StubReport {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    /// Write a reproducible jar: sorted entries, stored, fixed timestamps
    pub fn write_jar(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let mut zip = ZipWriter::new(File::create(path)?);
        // 1985-02-01 is a valid DOS date, the fallback never applies
        let timestamp = DateTime::from_date_and_time(1985, 2, 1, 0, 0, 0).unwrap_or_default();
        let options = FileOptions::default()
            .compression_method(CompressionMethod::Stored)
            .last_modified_time(timestamp)
            .unix_permissions(0o644);

        zip.start_file(MANIFEST_PATH, options)?;
        zip.write_all(MANIFEST.as_bytes())?;
        for (name, bytes) in &self.stubs {
            zip.start_file(name.as_str(), options)?;
            zip.write_all(bytes)?;
        }
        zip.finish()?;
        log::info!("wrote {} ({} entries)", path.display(), self.stubs.len());
        Ok(())
    }

    /// Write each stub as a loose file under `dir`
    pub fn write_dir(&self, dir: &Path) -> Result<()> {
        for (name, bytes) in &self.stubs {
            let target = dir.join(name);
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(&target, bytes)?;
        }
        log::info!("wrote {} stubs under {}", self.stubs.len(), dir.display());
        Ok(())
    }

    /// Hex SHA-256 over every entry name and its stub bytes, in entry order
    pub fn digest(&self) -> String {
        let mut hasher = Sha256::new();
        for (name, bytes) in &self.stubs {
            hasher.update((name.len() as u64).to_be_bytes());
            hasher.update(name.as_bytes());
            hasher.update((bytes.len() as u64).to_be_bytes());
            hasher.update(bytes);
        }
        hasher.finalize().iter().map(|byte| format!("{:02x}", byte)).collect()
    }
}

fn is_module_info(name: &str) -> bool {
    name == MODULE_INFO || name.ends_with(&format!("/{}", MODULE_INFO))
}

fn read_directory(root: &Path) -> Result<Vec<(String, Vec<u8>)>> {
    let mut entries = Vec::new();
    for entry in WalkDir::new(root).into_iter() {
        let entry = entry.map_err(|err| Error::Io(err.into()))?;
        let path = entry.path();
        if !entry.file_type().is_file() || !path.to_string_lossy().ends_with(CLASS_SUFFIX) {
            continue;
        }
        let relative = path.strip_prefix(root).unwrap_or(path);
        let name = relative
            .components()
            .map(|component| component.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");
        entries.push((name, fs::read(path)?));
    }
    Ok(entries)
}

fn read_archive(path: &Path) -> Result<Vec<(String, Vec<u8>)>> {
    let mut archive = ZipArchive::new(BufReader::new(File::open(path)?))?;
    let mut entries = Vec::new();
    for index in 0..archive.len() {
        let mut entry = archive.by_index(index)?;
        if !entry.is_file() || !entry.name().ends_with(CLASS_SUFFIX) {
            continue;
        }
        let mut bytes = Vec::with_capacity(entry.size() as usize);
        entry.read_to_end(&mut bytes)?;
        entries.push((entry.name().to_string(), bytes));
    }
    Ok(entries)
}
