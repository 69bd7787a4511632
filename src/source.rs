// =============================================================================
// source.rs - WHERE DOCKET PAGES COME FROM
// =============================================================================
//
// The engine never touches the network. Whoever fetched the pages (a
// browser session, a crawler, a clerk with a USB stick) hands them over
// through `DocketSource`. A failure to load one page is that case's
// problem and nobody else's.
// =============================================================================

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::case_ref::CaseRef;
use crate::error::LedgerError;

/// Supplies the raw HTML of a case's docket page.
pub trait DocketSource: Sync {
    fn load(&self, case: &CaseRef) -> Result<String, LedgerError>;
}

/// Saved pages on disk, one `<case_number>.html` per case.
#[derive(Debug, Clone)]
pub struct DirectorySource {
    dir: PathBuf,
}

impl DirectorySource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Where the page for `case` lives. `<case>.html` is tried first; any
    /// other spelling of the extension (`.HTML`, `.Html`) is found by
    /// listing the directory.
    pub fn path_for(&self, case: &CaseRef) -> io::Result<PathBuf> {
        let direct = self.dir.join(format!("{}.html", case.case_number));
        if direct.is_file() {
            return Ok(direct);
        }
        self.html_pages()?
            .into_iter()
            .find(|(stem, _)| *stem == case.case_number)
            .map(|(_, path)| path)
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, format!("no page for {}", case.case_number)))
    }

    /// Every `*.html` file in the directory, as a case, sorted by name.
    /// File stems are taken verbatim so `load` finds the same file again.
    pub fn discover(&self) -> io::Result<Vec<CaseRef>> {
        let mut cases: Vec<CaseRef> = self
            .html_pages()?
            .into_iter()
            .map(|(stem, _)| CaseRef {
                case_number: stem,
                url: None,
            })
            .collect();
        cases.sort_by(|a, b| a.case_number.cmp(&b.case_number));
        cases.dedup();
        debug!(dir = %self.dir.display(), cases = cases.len(), "Docket pages discovered");
        Ok(cases)
    }

    /// (stem, path) for every file whose extension is `html` in any case.
    fn html_pages(&self) -> io::Result<Vec<(String, PathBuf)>> {
        let mut pages = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let path = entry?.path();
            let is_html = path
                .extension()
                .and_then(|e| e.to_str())
                .map(|e| e.eq_ignore_ascii_case("html"))
                .unwrap_or(false);
            if !is_html {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                pages.push((stem.to_string(), path.to_path_buf()));
            }
        }
        Ok(pages)
    }
}

impl DocketSource for DirectorySource {
    fn load(&self, case: &CaseRef) -> Result<String, LedgerError> {
        self.path_for(case)
            .and_then(fs::read_to_string)
            .map_err(|source| LedgerError::Source {
                case_number: case.case_number.clone(),
                source,
            })
    }
}

/// Pages already held in memory, keyed by case number.
#[derive(Debug, Clone, Default)]
pub struct InMemorySource {
    pages: HashMap<String, String>,
}

impl InMemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, case_number: impl Into<String>, html: impl Into<String>) {
        self.pages.insert(case_number.into(), html.into());
    }
}

impl DocketSource for InMemorySource {
    fn load(&self, case: &CaseRef) -> Result<String, LedgerError> {
        self.pages
            .get(&case.case_number)
            .cloned()
            .ok_or_else(|| LedgerError::Source {
                case_number: case.case_number.clone(),
                source: io::Error::new(io::ErrorKind::NotFound, "no page held for case"),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("docket_ledger_{}_{}", name, std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_directory_source_discovers_and_loads() {
        let dir = scratch_dir("discover");
        fs::write(dir.join("CF-2020-2.html"), "<html>two</html>").unwrap();
        fs::write(dir.join("CF-2020-1.HTML"), "<html>one</html>").unwrap();
        fs::write(dir.join("notes.txt"), "ignore me").unwrap();

        let source = DirectorySource::new(&dir);
        let cases = source.discover().unwrap();
        let numbers: Vec<&str> = cases.iter().map(|c| c.case_number.as_str()).collect();
        assert_eq!(numbers, vec!["CF-2020-1", "CF-2020-2"]);
        assert_eq!(source.load(&cases[0]).unwrap(), "<html>one</html>");
        assert_eq!(source.load(&cases[1]).unwrap(), "<html>two</html>");

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_missing_page_is_a_case_scoped_error() {
        let source = InMemorySource::new();
        let err = source.load(&CaseRef::new("CF-2020-9")).unwrap_err();
        assert!(!err.is_no_data());
        assert_eq!(err.case_number(), "CF-2020-9");
    }
}
