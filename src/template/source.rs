//! Wildcard file sources.
//!
//! A wildcard name such as `animals/cats` maps to `animals/cats.txt` under
//! the wildcard root. Each line of the file is one candidate replacement.

use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};
use walkdir::WalkDir;

const WILDCARD_EXTENSION: &str = "txt";

/// Read-only lookup of wildcard lines by name.
pub trait WildcardSource: Send + Sync {
    /// All lines of the wildcard `name`, or `None` when it does not exist.
    fn lines(&self, name: &str) -> Option<Vec<String>>;
}

impl<T: WildcardSource + ?Sized> WildcardSource for std::sync::Arc<T> {
    fn lines(&self, name: &str) -> Option<Vec<String>> {
        (**self).lines(name)
    }
}

/// Wildcards stored as `.txt` files under a root directory.
#[derive(Debug, Clone)]
pub struct FsWildcardStore {
    root: PathBuf,
}

impl FsWildcardStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Locate the file for `name`.
    ///
    /// `a/b/name` resolves to `root/a/b/name.txt` and nothing else.
    pub fn path_for(&self, name: &str) -> Option<PathBuf> {
        let segments: Vec<&str> = name.split('/').collect();
        let (file, dirs) = segments.split_last()?;

        if file.is_empty() || segments.iter().any(|s| !is_plain_segment(s)) {
            log::warn!("Rejecting wildcard name {:?}: not a relative path", name);
            return None;
        }

        let file_name = format!("{}.{}", file, WILDCARD_EXTENSION);
        let path = dirs
            .iter()
            .fold(self.root.clone(), |path, dir| path.join(dir))
            .join(file_name);
        path.is_file().then_some(path)
    }

    /// Every wildcard name under the root, sorted.
    pub fn list_names(&self) -> Vec<String> {
        let mut names: Vec<String> = WalkDir::new(&self.root)
            .into_iter()
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().is_file())
            .filter(|entry| {
                entry.path().extension().and_then(|e| e.to_str()) == Some(WILDCARD_EXTENSION)
            })
            .filter_map(|entry| {
                let relative = entry.path().strip_prefix(&self.root).ok()?;
                let stem = relative.with_extension("");
                let parts: Vec<String> = stem
                    .components()
                    .map(|c| c.as_os_str().to_string_lossy().into_owned())
                    .collect();
                Some(parts.join("/"))
            })
            .collect();
        names.sort();
        names
    }
}

impl WildcardSource for FsWildcardStore {
    fn lines(&self, name: &str) -> Option<Vec<String>> {
        let path = self.path_for(name)?;
        match std::fs::read_to_string(&path) {
            Ok(text) => Some(text.lines().map(str::to_string).collect()),
            Err(err) => {
                log::warn!("Failed to read wildcard file {}: {}", path.display(), err);
                None
            }
        }
    }
}

fn is_plain_segment(segment: &str) -> bool {
    let mut components = Path::new(segment).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    )
}

/// Wildcards held in memory, keyed by name.
#[derive(Debug, Clone, Default)]
pub struct InMemoryWildcards {
    files: HashMap<String, Vec<String>>,
}

impl InMemoryWildcards {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a wildcard from file-like text (one candidate per line).
    pub fn insert(&mut self, name: impl Into<String>, text: &str) {
        self.files
            .insert(name.into(), text.lines().map(str::to_string).collect());
    }

    /// Builder form of [`InMemoryWildcards::insert`].
    pub fn with(mut self, name: impl Into<String>, text: &str) -> Self {
        self.insert(name, text);
        self
    }
}

impl WildcardSource for InMemoryWildcards {
    fn lines(&self, name: &str) -> Option<Vec<String>> {
        self.files.get(name).cloned()
    }
}
