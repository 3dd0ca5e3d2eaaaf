//! Packing a project directory into a deployable repository archive.
//!
//! Files are selected the way npm selects package contents: `.e2eignore`
//! files (gitignore syntax) apply to the directory they sit in and
//! everything below it, with deeper files taking precedence. Version-control
//! metadata and editor droppings are always left out, and a `package.json`
//! is always kept.
//!
//! Packing is blocking file I/O. Async callers should run it on
//! `tokio::task::spawn_blocking`.

use std::collections::HashMap;
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};

use ignore::Match;
use ignore::gitignore::{Gitignore, GitignoreBuilder};
use serde::Deserialize;
use tracing::{debug, trace};
use walkdir::WalkDir;
use zip::CompressionMethod;
use zip::write::{SimpleFileOptions, ZipWriter};

use crate::error::Error;

/// Per-directory ignore file.
pub const IGNORE_FILE: &str = ".e2eignore";

const MANIFEST: &str = "package.json";

/// Options for [`pack`].
#[derive(Debug, Clone, Default)]
pub struct PackOptions {
    /// Archive path. Defaults to [`archive_name`] in the current directory.
    pub output: Option<PathBuf>,
}

#[derive(Deserialize)]
struct Manifest {
    name: Option<String>,
    version: Option<String>,
}

/// `{name}-{version}.zip`, read from `dir/package.json`.
pub fn archive_name(dir: &Path) -> Result<String, Error> {
    let path = dir.join(MANIFEST);
    let raw = std::fs::read_to_string(&path)
        .map_err(|e| Error::Pack(format!("cannot read {}: {e}", path.display())))?;
    let manifest: Manifest = serde_json::from_str(&raw)
        .map_err(|e| Error::Pack(format!("invalid {}: {e}", path.display())))?;

    match (manifest.name, manifest.version) {
        (Some(name), Some(version)) if !name.is_empty() && !version.is_empty() => {
            Ok(format!("{name}-{version}.zip"))
        }
        _ => Err(Error::Pack(format!(
            "{} must declare both name and version",
            path.display()
        ))),
    }
}

/// Pack `dir` into a zip archive and return the archive path.
pub fn pack(dir: &Path, options: &PackOptions) -> Result<PathBuf, Error> {
    let metadata = std::fs::metadata(dir).map_err(|e| Error::filesystem(dir, e))?;
    if !metadata.is_dir() {
        return Err(Error::filesystem(
            dir,
            io::Error::new(io::ErrorKind::NotADirectory, "not a directory"),
        ));
    }
    let root = dir.canonicalize().map_err(|e| Error::filesystem(dir, e))?;

    // A valid manifest is required even when the archive name is given.
    let name = archive_name(&root)?;
    let output = match &options.output {
        Some(path) => path.clone(),
        None => std::env::current_dir()
            .map_err(|e| Error::filesystem(".", e))?
            .join(name),
    };

    let file = File::create(&output).map_err(|e| Error::filesystem(&output, e))?;
    if let Err(err) = write_archive(&root, &output, file) {
        if let Err(e) = std::fs::remove_file(&output) {
            debug!(output = %output.display(), "cannot remove partial archive: {e}");
        }
        return Err(err);
    }
    Ok(output)
}

fn write_archive(root: &Path, output: &Path, file: File) -> Result<(), Error> {
    let output_abs = output.canonicalize().map_err(|e| Error::filesystem(output, e))?;

    let files = collect_files(root, &output_abs)?;
    debug!(dir = %root.display(), files = files.len(), "packing");

    let mut zip = ZipWriter::new(file);
    let entry_options =
        SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    for (path, name) in &files {
        trace!("adding {name}");
        zip.start_file(name.as_str(), entry_options)
            .map_err(|e| Error::Pack(format!("cannot add {name}: {e}")))?;
        let mut source = File::open(path).map_err(|e| Error::filesystem(path, e))?;
        io::copy(&mut source, &mut zip).map_err(|e| Error::filesystem(path, e))?;
    }
    zip.finish()
        .map_err(|e| Error::Pack(format!("cannot finish {}: {e}", output.display())))?;
    Ok(())
}

/// Files to archive as (absolute path, `/`-separated archive name), sorted.
fn collect_files(root: &Path, output: &Path) -> Result<Vec<(PathBuf, String)>, Error> {
    let mut rules = IgnoreRules::new(root);
    let mut walk_error = None;
    let mut files = Vec::new();

    let walker = WalkDir::new(root)
        .min_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| match rules.keep(entry.path(), entry.file_type().is_dir()) {
            Ok(keep) => keep,
            Err(e) => {
                walk_error.get_or_insert(e);
                false
            }
        });

    for entry in walker {
        let entry = entry.map_err(|e| {
            let path = e.path().map_or_else(|| root.to_path_buf(), Path::to_path_buf);
            Error::filesystem(path, io::Error::from(e))
        })?;
        if !entry.file_type().is_file() || entry.path() == output {
            continue;
        }
        let Ok(relative) = entry.path().strip_prefix(root) else {
            continue;
        };
        let name = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");
        files.push((entry.path().to_path_buf(), name));
    }

    match walk_error {
        Some(e) => Err(e),
        None => Ok(files),
    }
}

/// Names excluded no matter what the ignore files say.
fn always_excluded(name: &str) -> bool {
    if matches!(
        name,
        ".git" | ".lock-wscript" | "CVS" | ".svn" | ".hg" | ".DS_Store" | "npm-debug.log"
    ) {
        return true;
    }
    if name.starts_with("._") {
        return true;
    }
    if name.len() > ".swp".len() && name.starts_with('.') && name.ends_with(".swp") {
        return true;
    }
    name.strip_prefix(".wafpickle-")
        .is_some_and(|n| !n.is_empty() && n.bytes().all(|b| b.is_ascii_digit()))
}

/// Lazily loaded `.e2eignore` matchers, one per directory.
struct IgnoreRules {
    root: PathBuf,
    matchers: HashMap<PathBuf, Option<Gitignore>>,
}

impl IgnoreRules {
    fn new(root: &Path) -> Self {
        Self {
            root: root.to_path_buf(),
            matchers: HashMap::new(),
        }
    }

    fn keep(&mut self, path: &Path, is_dir: bool) -> Result<bool, Error> {
        let name = path.file_name().map(|n| n.to_string_lossy()).unwrap_or_default();
        if !is_dir && name == MANIFEST {
            return Ok(true);
        }
        if always_excluded(&name) {
            return Ok(false);
        }

        // Nearest ignore file with an opinion wins.
        let mut dir = path.parent();
        while let Some(current) = dir {
            if let Some(matcher) = self.matcher(current)? {
                match matcher.matched(path, is_dir) {
                    Match::Ignore(_) => return Ok(false),
                    Match::Whitelist(_) => return Ok(true),
                    Match::None => {}
                }
            }
            if current == self.root {
                break;
            }
            dir = current.parent();
        }
        Ok(true)
    }

    fn matcher(&mut self, dir: &Path) -> Result<Option<&Gitignore>, Error> {
        if !self.matchers.contains_key(dir) {
            let loaded = load_ignore_file(dir)?;
            self.matchers.insert(dir.to_path_buf(), loaded);
        }
        Ok(self.matchers.get(dir).and_then(Option::as_ref))
    }
}

fn load_ignore_file(dir: &Path) -> Result<Option<Gitignore>, Error> {
    let path = dir.join(IGNORE_FILE);
    if !path.is_file() {
        return Ok(None);
    }
    let mut builder = GitignoreBuilder::new(dir);
    if let Some(e) = builder.add(&path) {
        return Err(Error::Pack(format!("invalid {}: {e}", path.display())));
    }
    let matcher = builder
        .build()
        .map_err(|e| Error::Pack(format!("invalid {}: {e}", path.display())))?;
    Ok(Some(matcher))
}
