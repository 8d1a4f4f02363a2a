//! The slide deck: an ordered list of slides plus the active selection.
//!
//! Decks persist as pretty-printed JSON (`deck.json` by default):
//!
//! ```json
//! {
//!   "slides": [ { "id": "3f2a9c01b7de", "image_source": "/photos/dawn.jpg", ... } ],
//!   "active": "3f2a9c01b7de"
//! }
//! ```
//!
//! Slide identifiers are the first 12 hex digits of a SHA-256 over the image
//! path and a counter, re-rolled on collision, so adding the same photo twice
//! yields two distinct slides. Identifiers never change after creation; they
//! name the exported files.
//!
//! Saving writes a sibling temp file and renames it over the deck, so an
//! interrupted save leaves the previous deck intact.

use crate::config::SlideDefaults;
use crate::render::is_supported_image;
use crate::types::{Slide, SlideUpdate};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

/// File name used when no `--deck` is given.
pub const DECK_FILENAME: &str = "deck.json";

#[derive(Error, Debug)]
pub enum DeckError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Deck JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Directory walk failed: {0}")]
    Walk(#[from] walkdir::Error),
    #[error("No slide with id '{0}'")]
    UnknownSlide(String),
    #[error("Deck has no slides")]
    Empty,
    #[error("Not a supported image: {0}")]
    Unsupported(PathBuf),
}

/// Ordered slides and the currently selected one.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Deck {
    #[serde(default)]
    pub slides: Vec<Slide>,
    /// Id of the selected slide. Edits without an explicit id apply here.
    #[serde(default)]
    pub active: Option<String>,
}

impl Deck {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a deck. A missing file is an empty deck.
    pub fn load(path: &Path) -> Result<Self, DeckError> {
        let content = match fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::new()),
            Err(e) => return Err(e.into()),
        };
        let mut deck: Deck = serde_json::from_str(&content)?;
        deck.repair_active();
        Ok(deck)
    }

    /// Save atomically (temp file + rename).
    pub fn save(&self, path: &Path) -> Result<(), DeckError> {
        let json = serde_json::to_string_pretty(self)?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let mut partial = path.as_os_str().to_owned();
        partial.push(".part");
        let partial = PathBuf::from(partial);

        fs::write(&partial, json)?;
        if let Err(e) = fs::rename(&partial, path) {
            let _ = fs::remove_file(&partial);
            return Err(e.into());
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.slides.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slides.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Slide> {
        self.slides.iter().find(|s| s.id == id)
    }

    pub fn active_slide(&self) -> Option<&Slide> {
        self.active.as_deref().and_then(|id| self.get(id))
    }

    /// The slide an edit targets: `id` if given, otherwise the active slide.
    pub fn target(&self, id: Option<&str>) -> Result<&Slide, DeckError> {
        match id {
            Some(id) => self
                .get(id)
                .ok_or_else(|| DeckError::UnknownSlide(id.to_string())),
            None => self.active_slide().ok_or(DeckError::Empty),
        }
    }

    /// Make `id` the active slide.
    pub fn select(&mut self, id: &str) -> Result<(), DeckError> {
        if self.get(id).is_none() {
            return Err(DeckError::UnknownSlide(id.to_string()));
        }
        self.active = Some(id.to_string());
        Ok(())
    }

    /// Append a slide for `source`. The first slide becomes active.
    pub fn add_image(&mut self, source: &Path, defaults: &SlideDefaults) -> &Slide {
        let source = source.to_string_lossy().to_string();
        let id = self.unique_id(&source);
        tracing::debug!(slide = %id, source = %source, "added slide");
        self.slides.push(Slide::new(id.clone(), source, defaults));
        if self.active.is_none() {
            self.active = Some(id);
        }
        &self.slides[self.slides.len() - 1]
    }

    /// Merge `update` into the slide with `id`.
    pub fn update(&mut self, id: &str, update: SlideUpdate) -> Result<&Slide, DeckError> {
        let slide = self
            .slides
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or_else(|| DeckError::UnknownSlide(id.to_string()))?;
        slide.apply(update);
        Ok(slide)
    }

    /// Remove a slide. If it was active, the first remaining slide becomes
    /// active (or none, if the deck is now empty).
    pub fn remove(&mut self, id: &str) -> Result<Slide, DeckError> {
        let index = self
            .slides
            .iter()
            .position(|s| s.id == id)
            .ok_or_else(|| DeckError::UnknownSlide(id.to_string()))?;
        let removed = self.slides.remove(index);
        if self.active.as_deref() == Some(id) {
            self.active = self.slides.first().map(|s| s.id.clone());
        }
        Ok(removed)
    }

    fn unique_id(&self, source: &str) -> String {
        (self.slides.len()..)
            .map(|salt| slide_id(source, salt))
            .find(|id| self.get(id).is_none())
            .unwrap_or_default()
    }

    /// Drop a dangling selection, and select the first slide if none is.
    fn repair_active(&mut self) {
        if self.active_slide().is_none() {
            self.active = self.slides.first().map(|s| s.id.clone());
        }
    }
}

/// 12 hex digits of SHA-256 over the source path and a salt.
pub fn slide_id(source: &str, salt: usize) -> String {
    let mut hasher = Sha256::new();
    hasher.update(source.as_bytes());
    hasher.update(b"\0");
    hasher.update(salt.to_le_bytes());
    let hex = format!("{:x}", hasher.finalize());
    hex[..12].to_string()
}

/// Expand files and directories into a sorted list of supported images.
///
/// Directories are walked recursively, skipping hidden entries. Explicitly
/// named files must have a supported extension.
pub fn collect_images(paths: &[PathBuf]) -> Result<Vec<PathBuf>, DeckError> {
    let mut images = Vec::new();
    for path in paths {
        if path.is_dir() {
            let mut found = Vec::new();
            let walker = WalkDir::new(path)
                .follow_links(true)
                .into_iter()
                .filter_entry(|e| e.depth() == 0 || !e.file_name().to_string_lossy().starts_with('.'));
            for entry in walker {
                let entry = entry?;
                if entry.file_type().is_file() && is_supported_image(entry.path()) {
                    found.push(entry.into_path());
                }
            }
            found.sort();
            images.extend(found);
        } else if is_supported_image(path) {
            if !path.is_file() {
                return Err(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    format!("{} does not exist", path.display()),
                )
                .into());
            }
            images.push(path.clone());
        } else {
            return Err(DeckError::Unsupported(path.clone()));
        }
    }
    Ok(images)
}
