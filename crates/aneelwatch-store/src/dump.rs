use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::StoreError;

/// Writes fetched pages to a directory for offline inspection.
#[derive(Debug, Clone)]
pub struct PageDumper {
    dir: PathBuf,
}

impl PageDumper {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Save `content` as `pagina_<term-slug>_<page>.html`, returning the path.
    pub fn dump(&self, term: &str, page: u32, content: &str) -> Result<PathBuf, StoreError> {
        fs::create_dir_all(&self.dir)?;
        let path = self.dir.join(format!("pagina_{}_{page}.html", slug(term)));
        fs::write(&path, content)?;
        debug!(path = %path.display(), bytes = content.len(), "dumped page");
        Ok(path)
    }
}

/// Lowercase ASCII slug: accents stripped, other runs of non-alphanumerics become `-`.
pub fn slug(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars().flat_map(char::to_lowercase) {
        let c = match c {
            'á' | 'à' | 'â' | 'ã' => 'a',
            'é' | 'ê' => 'e',
            'í' => 'i',
            'ó' | 'ô' | 'õ' => 'o',
            'ú' | 'ü' => 'u',
            'ç' => 'c',
            c => c,
        };
        if c.is_ascii_alphanumeric() {
            out.push(c);
        } else if !out.ends_with('-') && !out.is_empty() {
            out.push('-');
        }
    }
    while out.ends_with('-') {
        out.pop();
    }
    if out.is_empty() {
        out.push_str("busca");
    }
    out
}
