//! VFX archive: index loading, tree queries and path resolution.
//!
//! The tree has no pointers. Entries live in one flat table and a folder
//! owns the half-open index range `[first_file, first_file + num_files)`.
//! Every query is a scan over those ranges.

use std::fs;
use std::ops::Range;
use std::path::{Path, PathBuf};

use vfx_common::VfxGuid;

use crate::entry::{Entry, Package};
use crate::index::parse_index;
use crate::Result;

/// Separator used in archive paths.
pub const PATH_SEPARATOR: char = '\\';

/// A loaded VFX index together with the location of its packages.
///
/// Immutable after construction; extraction opens a fresh package handle
/// per call, so a shared archive can serve concurrent readers.
pub struct VfxArchive {
    /// Index file name
    name: String,
    /// Directory holding the index and its packages
    base_dir: PathBuf,
    content_version: String,
    guid: VfxGuid,
    /// Unused header field, kept verbatim
    reserved: u32,
    packages: Vec<Package>,
    entries: Vec<Entry>,
    /// Indices of all folder entries, in table order
    folders: Vec<usize>,
    /// Parent folder of every entry (None for the root)
    parents: Vec<Option<usize>>,
}

impl VfxArchive {
    /// Load an index file. Packages are resolved relative to its directory.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        log::info!("loading vfx file {}", path.display());

        let data = fs::read(path).inspect_err(|e| {
            log::error!("failed to open {}: {}", path.display(), e);
        })?;

        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("unknown")
            .to_string();
        let base_dir = path.parent().map(Path::to_path_buf).unwrap_or_default();

        Self::parse(&data, base_dir, name)
    }

    /// Parse index bytes already in memory.
    pub fn parse(data: &[u8], base_dir: impl Into<PathBuf>, name: impl Into<String>) -> Result<Self> {
        let index = parse_index(data).inspect_err(|e| log::error!("failed to load vfx: {}", e))?;

        let parents = build_parents(&index.entries, &index.folders);

        log::info!(
            "vfx loaded successfully: {} packages, {} entries, {} folders",
            index.packages.len(),
            index.entries.len(),
            index.folders.len()
        );

        Ok(Self {
            name: name.into(),
            base_dir: base_dir.into(),
            content_version: index.content_version,
            guid: index.guid,
            reserved: index.reserved,
            packages: index.packages,
            entries: index.entries,
            folders: index.folders,
            parents,
        })
    }

    /// Get the index file name.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Directory that package names are resolved against.
    #[inline]
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    #[inline]
    pub fn content_version(&self) -> &str {
        &self.content_version
    }

    #[inline]
    pub fn guid(&self) -> VfxGuid {
        self.guid
    }

    #[inline]
    pub fn reserved(&self) -> u32 {
        self.reserved
    }

    #[inline]
    pub fn packages(&self) -> &[Package] {
        &self.packages
    }

    #[inline]
    pub fn package(&self, index: usize) -> Option<&Package> {
        self.packages.get(index)
    }

    /// All entries in table order.
    #[inline]
    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    #[inline]
    pub fn entry_count(&self) -> usize {
        self.entries.len()
    }

    /// Get entry by index.
    #[inline]
    pub fn entry(&self, index: usize) -> Option<&Entry> {
        self.entries.get(index)
    }

    /// Indices of every folder entry.
    #[inline]
    pub fn folders(&self) -> &[usize] {
        &self.folders
    }

    /// The root folder (entry 0).
    #[inline]
    pub fn root(&self) -> &Entry {
        &self.entries[0]
    }

    /// Entries inside a folder's containment range.
    pub fn children<'a>(&'a self, folder: &Entry) -> impl Iterator<Item = &'a Entry> + 'a {
        self.entries[clamp_range(folder.children(), self.entries.len())].iter()
    }

    /// The folder whose range contains `index`.
    #[inline]
    pub fn parent_folder(&self, index: usize) -> Option<&Entry> {
        self.parents
            .get(index)
            .copied()
            .flatten()
            .map(|p| &self.entries[p])
    }

    /// Resolve a backslash-separated folder path.
    ///
    /// Starts at `in_folder`, or the root when `None`. Matching is exact and
    /// case-sensitive; empty segments are skipped and `.`/`..` have no
    /// special meaning.
    pub fn folder<'a>(&'a self, path: &str, in_folder: Option<&'a Entry>) -> Option<&'a Entry> {
        let mut folder = in_folder.unwrap_or_else(|| self.root());

        for segment in path.split(PATH_SEPARATOR).filter(|s| !s.is_empty()) {
            folder = self
                .children(folder)
                .find(|e| e.is_folder() && e.name == segment)?;
        }

        Some(folder)
    }

    /// Find a file by name, optionally prefixed with a folder path.
    pub fn find_file<'a>(&'a self, path: &str, in_folder: Option<&'a Entry>) -> Option<usize> {
        let (folder, name) = match path.rfind(PATH_SEPARATOR) {
            Some(pos) => (self.folder(&path[..pos], in_folder)?, &path[pos + 1..]),
            None => (in_folder.unwrap_or_else(|| self.root()), path),
        };

        self.children(folder)
            .find(|e| e.is_file() && e.name == name)
            .map(|e| e.index)
    }

    /// Pre-order walk over everything below a folder.
    ///
    /// Yields `(depth, entry)` where direct children have depth 0.
    pub fn walk(&self, folder: usize) -> Walk<'_> {
        let stack = match self.entries.get(folder) {
            Some(entry) => vec![clamp_range(entry.children(), self.entries.len())],
            None => Vec::new(),
        };
        Walk {
            entries: &self.entries,
            stack,
        }
    }

    /// Count file entries below a folder, including subfolders.
    pub fn count_files(&self, folder: usize) -> usize {
        self.walk(folder).filter(|(_, e)| e.is_file()).count()
    }

    /// Collect files below a folder whose names end with `suffix`.
    ///
    /// Results are in pre-order. With `with_subfolders` unset only direct
    /// children are considered.
    pub fn find_files(&self, folder: usize, suffix: &str, with_subfolders: bool) -> Vec<usize> {
        self.walk(folder)
            .filter(|(depth, e)| (with_subfolders || *depth == 0) && e.is_file())
            .filter(|(_, e)| e.name.ends_with(suffix))
            .map(|(_, e)| e.index)
            .collect()
    }

    /// [`find_files`](Self::find_files) on a folder given by path.
    pub fn find_files_in_path(&self, folder: &str, suffix: &str, with_subfolders: bool) -> Vec<usize> {
        match self.folder(folder, None) {
            Some(f) => self.find_files(f.index, suffix, with_subfolders),
            None => Vec::new(),
        }
    }

    /// Full path of an entry from the root, joined with `\`.
    ///
    /// The root itself has an empty path.
    pub fn entry_path(&self, index: usize) -> Option<String> {
        self.entries.get(index)?;

        let mut names = Vec::new();
        let mut current = index;
        while let Some(parent) = self.parents[current] {
            names.push(self.entries[current].name.as_str());
            current = parent;
        }

        names.reverse();
        Some(names.join("\\"))
    }
}

impl std::fmt::Debug for VfxArchive {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VfxArchive")
            .field("name", &self.name)
            .field("content_version", &self.content_version)
            .field("guid", &self.guid)
            .field("packages", &self.packages.len())
            .field("entries", &self.entries.len())
            .finish()
    }
}

/// Pre-order iterator returned by [`VfxArchive::walk`].
pub struct Walk<'a> {
    entries: &'a [Entry],
    stack: Vec<Range<usize>>,
}

impl<'a> Iterator for Walk<'a> {
    type Item = (usize, &'a Entry);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let depth = self.stack.len().checked_sub(1)?;
            let Some(index) = self.stack[depth].next() else {
                self.stack.pop();
                continue;
            };

            let entry = &self.entries[index];
            let children = clamp_range(entry.children(), self.entries.len());
            if !children.is_empty() {
                self.stack.push(children);
            }
            return Some((depth, entry));
        }
    }
}

#[inline]
fn clamp_range(range: Range<usize>, len: usize) -> Range<usize> {
    range.start.min(len)..range.end.min(len)
}

/// Map each entry to the folder whose range holds it. Ranges are disjoint
/// after validation, so each entry has at most one candidate.
fn build_parents(entries: &[Entry], folders: &[usize]) -> Vec<Option<usize>> {
    let mut parents = vec![None; entries.len()];
    for &folder in folders {
        for child in clamp_range(entries[folder].children(), entries.len()) {
            if child != 0 && parents[child].is_none() {
                parents[child] = Some(folder);
            }
        }
    }
    parents
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::{EntryKind, FLAG_FILE};

    fn folder(index: usize, name: &str, first_file: u32, num_files: u16) -> Entry {
        Entry {
            index,
            flags: 0,
            name: name.into(),
            kind: EntryKind::Folder {
                num_files,
                first_file,
            },
        }
    }

    fn file(index: usize, name: &str) -> Entry {
        Entry {
            index,
            flags: FLAG_FILE,
            name: name.into(),
            kind: EntryKind::File {
                package: 0,
                offset: 0,
                size_uncompressed: 16,
                size_compressed: 16,
            },
        }
    }

    /// ```text
    /// 0 <root>
    /// 1   content        -> 4..7
    /// 2   readme.txt
    /// 3   textures       -> 7..9
    /// 4     levels       -> 9..10
    /// 5     config.cfg
    /// 6     textures     (folder sharing a name with a sibling of its parent)
    /// 7     wall.dds
    /// 8     floor.dds
    /// 9       intro.bin
    /// ```
    fn sample() -> VfxArchive {
        let entries = vec![
            folder(0, "", 1, 3),
            folder(1, "content", 4, 3),
            file(2, "readme.txt"),
            folder(3, "textures", 7, 2),
            folder(4, "levels", 9, 1),
            file(5, "config.cfg"),
            folder(6, "textures", 10, 0),
            file(7, "wall.dds"),
            file(8, "floor.dds"),
            file(9, "intro.bin"),
        ];
        let folders: Vec<usize> = entries.iter().filter(|e| e.is_folder()).map(|e| e.index).collect();
        let parents = build_parents(&entries, &folders);

        VfxArchive {
            name: "test.vfx".into(),
            base_dir: PathBuf::new(),
            content_version: "1".into(),
            guid: VfxGuid::EMPTY,
            reserved: 0,
            packages: vec![Package {
                name: "test.upk0".into(),
                levels: Vec::new(),
                chunk: 0,
            }],
            entries,
            folders,
            parents,
        }
    }

    #[test]
    fn test_folder_resolution() {
        let archive = sample();

        assert_eq!(archive.folder("content", None).map(|f| f.index), Some(1));
        assert_eq!(archive.folder("content\\levels", None).map(|f| f.index), Some(4));
        assert_eq!(archive.folder("content\\levels\\", None).map(|f| f.index), Some(4));
        assert_eq!(archive.folder("", None).map(|f| f.index), Some(0));
        assert!(archive.folder("content\\missing", None).is_none());
        assert!(archive.folder("Content", None).is_none());
        assert!(archive.folder("content\\..\\textures", None).is_none());
    }

    #[test]
    fn test_folder_resolution_skips_files() {
        let archive = sample();
        assert!(archive.folder("readme.txt", None).is_none());
    }

    #[test]
    fn test_folder_relative_to_start() {
        let archive = sample();
        let content = archive.folder("content", None).unwrap();

        assert_eq!(archive.folder("textures", Some(content)).map(|f| f.index), Some(6));
        assert_eq!(archive.folder("textures", None).map(|f| f.index), Some(3));
    }

    #[test]
    fn test_find_file() {
        let archive = sample();

        assert_eq!(archive.find_file("readme.txt", None), Some(2));
        assert_eq!(archive.find_file("textures\\wall.dds", None), Some(7));
        assert_eq!(archive.find_file("content\\levels\\intro.bin", None), Some(9));
        assert_eq!(archive.find_file("wall.dds", None), None);
        assert_eq!(archive.find_file("content\\levels", None), None);
        assert_eq!(archive.find_file("nowhere\\wall.dds", None), None);

        let content = archive.folder("content", None);
        assert_eq!(archive.find_file("config.cfg", content), Some(5));
        assert_eq!(archive.find_file("levels\\intro.bin", content), Some(9));
    }

    #[test]
    fn test_parent_folder() {
        let archive = sample();

        assert!(archive.parent_folder(0).is_none());
        assert_eq!(archive.parent_folder(1).map(|f| f.index), Some(0));
        assert_eq!(archive.parent_folder(5).map(|f| f.index), Some(1));
        assert_eq!(archive.parent_folder(8).map(|f| f.index), Some(3));
        assert_eq!(archive.parent_folder(9).map(|f| f.index), Some(4));
        assert!(archive.parent_folder(100).is_none());
    }

    #[test]
    fn test_parent_matches_linear_scan() {
        let archive = sample();
        for index in 1..archive.entry_count() {
            let scanned = archive
                .folders()
                .iter()
                .map(|&f| &archive.entries()[f])
                .find(|f| f.contains(index))
                .map(|f| f.index);
            assert_eq!(archive.parent_folder(index).map(|f| f.index), scanned);
        }
    }

    #[test]
    fn test_count_files() {
        let archive = sample();

        assert_eq!(archive.count_files(0), 5);
        assert_eq!(archive.count_files(1), 2);
        assert_eq!(archive.count_files(3), 2);
        assert_eq!(archive.count_files(6), 0);
        assert_eq!(archive.count_files(7), 0);
    }

    #[test]
    fn test_find_files_by_suffix() {
        let archive = sample();

        assert_eq!(archive.find_files(0, ".dds", true), vec![7, 8]);
        assert_eq!(archive.find_files(0, ".dds", false), Vec::<usize>::new());
        assert_eq!(archive.find_files(0, ".txt", false), vec![2]);
        assert_eq!(archive.find_files(0, "", true), vec![9, 5, 2, 7, 8]);
        assert_eq!(archive.find_files(0, ".DDS", true), Vec::<usize>::new());
        assert_eq!(archive.find_files_in_path("content", ".bin", true), vec![9]);
        assert!(archive.find_files_in_path("missing", ".bin", true).is_empty());
    }

    #[test]
    fn test_walk_is_preorder() {
        let archive = sample();
        let order: Vec<(usize, usize)> = archive.walk(0).map(|(d, e)| (d, e.index)).collect();

        assert_eq!(
            order,
            vec![(0, 1), (1, 4), (2, 9), (1, 5), (1, 6), (0, 2), (0, 3), (1, 7), (1, 8)]
        );
    }

    #[test]
    fn test_entry_path() {
        let archive = sample();

        assert_eq!(archive.entry_path(0).as_deref(), Some(""));
        assert_eq!(archive.entry_path(9).as_deref(), Some("content\\levels\\intro.bin"));
        assert_eq!(archive.entry_path(7).as_deref(), Some("textures\\wall.dds"));
        assert!(archive.entry_path(10).is_none());
    }

    #[test]
    fn test_folder_paths_resolve_to_themselves() {
        let archive = sample();
        for &index in archive.folders() {
            let path = archive.entry_path(index).unwrap();
            assert_eq!(archive.folder(&path, None).map(|f| f.index), Some(index), "{}", path);
        }
    }
}
