use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::error::AssetError;

/// Resolves opaque font identifiers (`arial.ttf`, `impact.ttf`, ...) to
/// parsed fonts.
///
/// Lookup order: the identifier as a path, then faces loaded from the
/// configured directories (in order), then system faces. File names match
/// case-insensitively. Results are cached per identifier, failures included,
/// until the directory list changes.
pub struct FontSystem {
    db: fontdb::Database,
    dirs: Vec<PathBuf>,
    system: bool,
    cache: HashMap<String, Result<Arc<fontdue::Font>, CachedFailure>>,
}

#[derive(Debug, Clone)]
enum CachedFailure {
    NotFound,
    Unreadable(PathBuf, io::ErrorKind),
    Parse(String),
}

/// Where an identifier resolved to.
#[derive(Debug, Clone, Copy)]
enum Located<'a> {
    Path(&'a Path),
    Face(fontdb::ID, &'a Path),
}

impl FontSystem {
    /// Configured directories followed by the system fonts.
    pub fn new(font_dirs: impl IntoIterator<Item = PathBuf>) -> Self {
        Self::build(font_dirs.into_iter().collect(), true)
    }

    /// Exactly `dirs`, without system fonts.
    pub fn with_dirs(dirs: Vec<PathBuf>) -> Self {
        Self::build(dirs, false)
    }

    fn build(dirs: Vec<PathBuf>, system: bool) -> Self {
        let mut db = fontdb::Database::new();
        for dir in &dirs {
            db.load_fonts_dir(dir);
        }
        if system {
            db.load_system_fonts();
        }
        log::debug!("font database: {} faces from {} dirs (system: {system})", db.len(), dirs.len());

        Self { db, dirs, system, cache: HashMap::new() }
    }

    pub fn dirs(&self) -> &[PathBuf] {
        &self.dirs
    }

    /// Replaces the configured directories, reloads the face database and
    /// forgets every cached lookup.
    pub fn set_dirs(&mut self, dirs: Vec<PathBuf>) {
        *self = Self::build(dirs, self.system);
    }

    /// Registers a font from raw bytes under `name`, bypassing the search.
    pub fn load_font(&mut self, name: &str, bytes: &[u8]) -> Result<(), AssetError> {
        let font = parse(name, bytes, 0)?;
        self.cache.insert(name.to_string(), Ok(Arc::new(font)));
        Ok(())
    }

    /// Returns the font for `name`, loading it on first use.
    pub fn font(&mut self, name: &str) -> Result<Arc<fontdue::Font>, AssetError> {
        if !self.cache.contains_key(name) {
            let loaded = self.load(name);
            if let Err(failure) = &loaded {
                log::warn!("font '{name}' unavailable: {failure:?}");
            }
            self.cache.insert(name.to_string(), loaded);
        }

        match self.cache.get(name) {
            Some(Ok(font)) => Ok(Arc::clone(font)),
            Some(Err(failure)) => Err(to_asset_error(name, failure)),
            None => Err(AssetError::FontNotFound(name.to_string())),
        }
    }

    /// Path the identifier resolves to, if any.
    pub fn resolve(&self, name: &str) -> Option<PathBuf> {
        self.locate(name).map(|found| match found {
            Located::Path(path) | Located::Face(_, path) => path.to_path_buf(),
        })
    }

    /// File names of every face in the database, sorted.
    pub fn available_fonts(&self) -> Vec<String> {
        let mut out: Vec<String> = self
            .db
            .faces()
            .filter_map(|face| face_path(face)?.file_name()?.to_str().map(str::to_string))
            .collect();
        out.sort();
        out.dedup();
        out
    }

    fn locate<'a>(&'a self, name: &'a str) -> Option<Located<'a>> {
        let direct = Path::new(name);
        if direct.is_file() {
            return Some(Located::Path(direct));
        }
        let file_name = direct.file_name()?.to_str()?;

        let candidates: Vec<_> = self
            .db
            .faces()
            .filter_map(|face| {
                let path = face_path(face)?;
                let hit = path
                    .file_name()
                    .and_then(|n| n.to_str())
                    .is_some_and(|n| n.eq_ignore_ascii_case(file_name));
                hit.then_some((face, path))
            })
            .collect();
        let configured = self
            .dirs
            .iter()
            .find_map(|dir| candidates.iter().find(|(_, path)| path.starts_with(dir)));

        configured
            .or_else(|| candidates.first())
            .map(|&(face, path)| Located::Face(face.id, path))
    }

    fn load(&self, name: &str) -> Result<Arc<fontdue::Font>, CachedFailure> {
        let font = match self.locate(name).ok_or(CachedFailure::NotFound)? {
            Located::Path(path) => {
                let bytes = fs::read(path).map_err(|e| CachedFailure::Unreadable(path.to_path_buf(), e.kind()))?;
                parse(name, &bytes, 0).map_err(|e| CachedFailure::Parse(e.to_string()))?
            }
            Located::Face(id, path) => self
                .db
                .with_face_data(id, |data, index| parse(name, data, index))
                .ok_or_else(|| CachedFailure::Unreadable(path.to_path_buf(), io::ErrorKind::NotFound))?
                .map_err(|e| CachedFailure::Parse(e.to_string()))?,
        };
        log::debug!("font '{name}' loaded");
        Ok(Arc::new(font))
    }
}

impl Default for FontSystem {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

fn face_path(face: &fontdb::FaceInfo) -> Option<&Path> {
    match &face.source {
        fontdb::Source::File(path) => Some(path),
        _ => None,
    }
}

fn parse(name: &str, bytes: &[u8], collection_index: u32) -> Result<fontdue::Font, AssetError> {
    let settings = fontdue::FontSettings { collection_index, ..fontdue::FontSettings::default() };
    fontdue::Font::from_bytes(bytes, settings).map_err(|reason| AssetError::FontParse {
        name: name.to_string(),
        reason: reason.to_string(),
    })
}

fn to_asset_error(name: &str, failure: &CachedFailure) -> AssetError {
    match failure {
        CachedFailure::NotFound => AssetError::FontNotFound(name.to_string()),
        CachedFailure::Unreadable(path, kind) => AssetError::Io {
            path: path.clone(),
            source: io::Error::from(*kind),
        },
        CachedFailure::Parse(reason) => AssetError::FontParse {
            name: name.to_string(),
            reason: reason.clone(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text::test_fonts::{FIXTURE, FIXTURE_PATH};

    #[test]
    fn missing_font_is_not_found_and_cached() {
        let dir = tempfile::tempdir().unwrap();
        let mut fonts = FontSystem::with_dirs(vec![dir.path().to_path_buf()]);

        assert!(matches!(fonts.font("late.ttf"), Err(AssetError::FontNotFound(_))));
        // Appearing later does not help until the search path changes.
        fs::write(dir.path().join("late.ttf"), FIXTURE).unwrap();
        assert!(matches!(fonts.font("late.ttf"), Err(AssetError::FontNotFound(_))));

        fonts.set_dirs(vec![dir.path().to_path_buf()]);
        assert!(fonts.font("late.ttf").is_ok());
    }

    #[test]
    fn resolves_case_insensitively_in_subdirectories() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("truetype").join("msttcorefonts");
        fs::create_dir_all(&nested).unwrap();
        fs::write(nested.join("Arial.TTF"), FIXTURE).unwrap();

        let mut fonts = FontSystem::with_dirs(vec![dir.path().to_path_buf()]);
        assert_eq!(fonts.resolve("arial.ttf"), Some(nested.join("Arial.TTF")));
        assert_eq!(fonts.available_fonts(), vec!["Arial.TTF".to_string()]);
        assert!(fonts.font("ARIAL.ttf").is_ok());
    }

    #[test]
    fn earlier_directory_wins() {
        let first = tempfile::tempdir().unwrap();
        let second = tempfile::tempdir().unwrap();
        fs::write(first.path().join("brand.ttf"), FIXTURE).unwrap();
        fs::write(second.path().join("brand.ttf"), FIXTURE).unwrap();

        let fonts = FontSystem::with_dirs(vec![second.path().to_path_buf(), first.path().to_path_buf()]);
        assert_eq!(fonts.resolve("brand.ttf"), Some(second.path().join("brand.ttf")));
    }

    #[test]
    fn identifier_may_be_a_path() {
        let mut fonts = FontSystem::with_dirs(Vec::new());
        assert!(fonts.font(FIXTURE_PATH).is_ok());
    }

    #[test]
    fn unparseable_files_are_not_faces() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("junk.ttf"), b"not a font").unwrap();

        let mut fonts = FontSystem::with_dirs(vec![dir.path().to_path_buf()]);
        assert!(fonts.available_fonts().is_empty());
        assert!(matches!(fonts.font("junk.ttf"), Err(AssetError::FontNotFound(_))));
    }

    #[test]
    fn garbage_bytes_are_a_parse_error() {
        let mut fonts = FontSystem::with_dirs(Vec::new());
        let err = fonts.load_font("bad.ttf", b"not a font").unwrap_err();
        assert!(matches!(err, AssetError::FontParse { .. }));
    }
}
