//! Project registry: the project index plus one scene file per project.
//!
//! Storage layout inside the registry root:
//!
//! ```text
//! projects.json          index of {id, name, lastModified}
//! <project-id>.json      scene file for each project
//! ```
//!
//! Files are overwritten whole. The registry is the only writer; callers
//! that share it across components pass `&mut ProjectRegistry` around, so
//! two writers cannot exist at once.

use std::fmt;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use chrono::Utc;

use crate::constants::{DEFAULT_JPEG_QUALITY, INDEX_FILENAME, SCENE_EXTENSION};
use crate::format::{DecodeError, SceneFile, decode_index, decode_thumbnail, encode_index};
use crate::model::{Project, ProjectId, Scene};
use crate::store::StoreError;

/// Change notification delivered to subscribers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistryEvent {
    /// A project was added to the index
    Added(ProjectId),
    /// A project's name, timestamp or thumbnail changed
    Updated(ProjectId),
    /// A project and its scene file were removed
    Removed(ProjectId),
}

type Subscriber = Box<dyn FnMut(&RegistryEvent)>;

/// Owns the project index and the scene files it points at.
pub struct ProjectRegistry {
    root: PathBuf,
    projects: Vec<Project>,
    jpeg_quality: u8,
    /// Why the index was discarded on open, if it was.
    index_recovery: Option<DecodeError>,
    subscribers: Vec<Subscriber>,
}

impl ProjectRegistry {
    /// Open (creating if needed) the registry rooted at `root`.
    ///
    /// The index is read once. A missing index is an empty registry. An
    /// unreadable or corrupt index is also treated as empty so the editor
    /// stays usable; the decode error is kept in [`Self::index_recovery`]
    /// for callers that want to report it.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let root = root.into();
        std::fs::create_dir_all(&root)?;

        let index_path = root.join(INDEX_FILENAME);
        let mut index_recovery = None;
        let projects = match std::fs::read(&index_path) {
            Ok(bytes) => match decode_index(&bytes) {
                Ok(projects) => {
                    log::info!("Loaded {} projects from {:?}", projects.len(), index_path);
                    projects
                }
                Err(e) => {
                    log::warn!(
                        "Project index {:?} is corrupt, starting empty: {}",
                        index_path,
                        e
                    );
                    index_recovery = Some(e);
                    Vec::new()
                }
            },
            Err(e) if e.kind() == ErrorKind::NotFound => {
                log::debug!("No project index at {:?}", index_path);
                Vec::new()
            }
            Err(e) => {
                log::warn!("Failed to read project index {:?}: {}", index_path, e);
                Vec::new()
            }
        };

        Ok(Self {
            root,
            projects,
            jpeg_quality: DEFAULT_JPEG_QUALITY,
            index_recovery,
            subscribers: Vec::new(),
        })
    }

    /// Set the JPEG quality (1-100) used for rasters written from now on.
    pub fn with_jpeg_quality(mut self, quality: u8) -> Self {
        self.jpeg_quality = quality.clamp(1, 100);
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn jpeg_quality(&self) -> u8 {
        self.jpeg_quality
    }

    /// The decode error that caused the index to be discarded on open.
    pub fn index_recovery(&self) -> Option<&DecodeError> {
        self.index_recovery.as_ref()
    }

    /// All projects in index order.
    pub fn list(&self) -> &[Project] {
        &self.projects
    }

    pub fn get(&self, id: ProjectId) -> Option<&Project> {
        self.projects.iter().find(|p| p.id == id)
    }

    /// Register a callback for index changes.
    pub fn subscribe(&mut self, callback: impl FnMut(&RegistryEvent) + 'static) {
        self.subscribers.push(Box::new(callback));
    }

    /// Create, add and return a new empty project.
    pub fn create(&mut self, name: impl Into<String>) -> Result<Project, StoreError> {
        let project = Project::new(name);
        self.add(project.clone())?;
        Ok(project)
    }

    /// Append a project to the index and persist it.
    ///
    /// Adding an id that is already indexed replaces that entry in place.
    pub fn add(&mut self, project: Project) -> Result<(), StoreError> {
        let id = project.id;
        let event = match self.projects.iter_mut().find(|p| p.id == id) {
            Some(existing) => {
                *existing = project;
                RegistryEvent::Updated(id)
            }
            None => {
                self.projects.push(project);
                RegistryEvent::Added(id)
            }
        };
        self.save_index()?;
        self.notify(event);
        Ok(())
    }

    /// Rename a project. Returns false for unknown ids.
    pub fn rename(&mut self, id: ProjectId, name: impl Into<String>) -> Result<bool, StoreError> {
        let Some(project) = self.projects.iter_mut().find(|p| p.id == id) else {
            return Ok(false);
        };
        project.name = name.into();
        self.save_index()?;
        self.notify(RegistryEvent::Updated(id));
        Ok(true)
    }

    /// Remove a project and its scene file. Returns false for unknown ids.
    ///
    /// A scene file that is already gone is not an error.
    pub fn delete(&mut self, id: ProjectId) -> Result<bool, StoreError> {
        let Some(index) = self.projects.iter().position(|p| p.id == id) else {
            log::debug!("Delete of unknown project {} ignored", id);
            return Ok(false);
        };
        let project = self.projects.remove(index);

        let path = self.scene_path(id);
        match std::fs::remove_file(&path) {
            Ok(()) => log::debug!("Removed scene file {:?}", path),
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => log::warn!("Failed to remove scene file {:?}: {}", path, e),
        }

        self.save_index()?;
        log::info!("Deleted project '{}' ({})", project.name, id);
        self.notify(RegistryEvent::Removed(id));
        Ok(true)
    }

    /// Path of the scene file for `id`.
    pub fn scene_path(&self, id: ProjectId) -> PathBuf {
        self.root.join(format!("{id}.{SCENE_EXTENSION}"))
    }

    /// Copy a project's scene file to `<id>.json.bak`, replacing any older
    /// backup. Returns the backup path.
    pub fn backup_scene(&self, id: ProjectId) -> Result<PathBuf, StoreError> {
        let path = self.scene_path(id);
        let backup = path.with_extension(format!("{SCENE_EXTENSION}.bak"));
        std::fs::copy(&path, &backup)?;
        log::info!("Backed up scene {:?} to {:?}", path, backup);
        Ok(backup)
    }

    /// Load a project's scene, treating any failure as "no scene".
    ///
    /// Use [`Self::try_load_scene`] to tell a missing scene from a corrupt one.
    pub fn load_scene(&mut self, id: ProjectId) -> Option<Scene> {
        match self.try_load_scene(id) {
            Ok(scene) => scene,
            Err(e) => {
                log::warn!("Could not load scene for project {}: {}", id, e);
                None
            }
        }
    }

    /// Load a project's scene.
    ///
    /// Returns `Ok(None)` for an unknown project or a project that has never
    /// been saved, and [`StoreError::Corrupt`] when the file cannot be
    /// decoded. A successful load refreshes the cached thumbnail.
    pub fn try_load_scene(&mut self, id: ProjectId) -> Result<Option<Scene>, StoreError> {
        if self.get(id).is_none() {
            return Ok(None);
        }

        let path = self.scene_path(id);
        let bytes = match std::fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let scene = SceneFile::from_slice(&bytes)
            .and_then(SceneFile::into_scene)
            .map_err(|source| StoreError::Corrupt {
                path: path.clone(),
                source,
            })?;

        log::info!("Loaded scene with {} items from {:?}", scene.len(), path);

        if let Some(image) = scene.first_photo_image().cloned() {
            if let Some(project) = self.projects.iter_mut().find(|p| p.id == id) {
                project.thumbnail = Some(image);
            }
            self.notify(RegistryEvent::Updated(id));
        }

        Ok(Some(scene))
    }

    /// Write a project's scene and refresh its index entry.
    ///
    /// Encoding failures are returned before anything is written. After the
    /// scene file is written, the index entry gets the current time and,
    /// when the first photo item (in iteration order) has an image, that
    /// image as re-encoded on disk becomes the thumbnail.
    pub fn save_scene(&mut self, id: ProjectId, scene: &Scene) -> Result<(), StoreError> {
        let file = SceneFile::from_scene(scene, self.jpeg_quality)?;
        let bytes = file.to_vec()?;

        let path = self.scene_path(id);
        std::fs::write(&path, &bytes)?;
        log::info!(
            "Saved scene with {} items to {:?} ({} bytes)",
            scene.len(),
            path,
            bytes.len()
        );

        let Some(project) = self.projects.iter_mut().find(|p| p.id == id) else {
            log::warn!("Saved scene for project {} which is not in the index", id);
            return Ok(());
        };
        project.last_modified = Utc::now();
        if let Some(thumbnail) = decode_thumbnail(&file) {
            project.thumbnail = Some(thumbnail);
        }

        self.save_index()?;
        self.notify(RegistryEvent::Updated(id));
        Ok(())
    }

    fn save_index(&self) -> Result<(), StoreError> {
        let path = self.root.join(INDEX_FILENAME);
        std::fs::write(&path, encode_index(&self.projects)?)?;
        log::debug!("Wrote index of {} projects to {:?}", self.projects.len(), path);
        Ok(())
    }

    fn notify(&mut self, event: RegistryEvent) {
        for subscriber in &mut self.subscribers {
            subscriber(&event);
        }
    }
}

impl fmt::Debug for ProjectRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProjectRegistry")
            .field("root", &self.root)
            .field("projects", &self.projects.len())
            .field("jpeg_quality", &self.jpeg_quality)
            .field("index_recovery", &self.index_recovery)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::format::image_codec;
    use crate::model::{ItemKind, Raster, SceneItem};

    fn photo_raster(side: u32) -> Raster {
        Raster::new(image::RgbaImage::from_fn(side, side, |x, y| {
            image::Rgba([(x % 256) as u8, (y % 256) as u8, 90, 255])
        }))
    }

    #[test]
    fn test_open_empty_dir() {
        let dir = tempfile::tempdir().unwrap();
        let registry = ProjectRegistry::open(dir.path()).unwrap();
        assert!(registry.list().is_empty());
        assert!(registry.index_recovery().is_none());
    }

    #[test]
    fn test_corrupt_index_recovers_empty() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(INDEX_FILENAME), b"[{\"id\": 42").unwrap();

        let registry = ProjectRegistry::open(dir.path()).unwrap();
        assert!(registry.list().is_empty());
        assert!(matches!(
            registry.index_recovery(),
            Some(DecodeError::Syntax(_))
        ));
    }

    #[test]
    fn test_index_persists_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let mut registry = ProjectRegistry::open(dir.path()).unwrap();
        let first = registry.create("Beach").unwrap();
        let second = registry.create("Birthday").unwrap();
        assert!(registry.rename(second.id, "Party").unwrap());

        let reopened = ProjectRegistry::open(dir.path()).unwrap();
        let names: Vec<&str> = reopened.list().iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Beach", "Party"]);
        assert_eq!(reopened.list()[0].id, first.id);
        assert_eq!(reopened.list()[0].last_modified, first.last_modified);
    }

    #[test]
    fn test_add_same_id_replaces() {
        let dir = tempfile::tempdir().unwrap();
        let mut registry = ProjectRegistry::open(dir.path()).unwrap();
        let mut project = registry.create("Draft").unwrap();
        project.name = "Final".to_string();
        registry.add(project).unwrap();

        assert_eq!(registry.list().len(), 1);
        assert_eq!(registry.list()[0].name, "Final");
    }

    #[test]
    fn test_delete_removes_entry_and_scene() {
        let dir = tempfile::tempdir().unwrap();
        let mut registry = ProjectRegistry::open(dir.path()).unwrap();
        let project = registry.create("Gone").unwrap();
        registry.save_scene(project.id, &Scene::default()).unwrap();
        assert!(registry.scene_path(project.id).exists());

        assert!(registry.delete(project.id).unwrap());
        assert!(registry.list().is_empty());
        assert!(!registry.scene_path(project.id).exists());
        assert!(registry.load_scene(project.id).is_none());

        // Unknown ids are a no-op
        assert!(!registry.delete(project.id).unwrap());
        assert!(ProjectRegistry::open(dir.path()).unwrap().list().is_empty());
    }

    #[test]
    fn test_delete_without_scene_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut registry = ProjectRegistry::open(dir.path()).unwrap();
        let project = registry.create("Never saved").unwrap();
        assert!(registry.delete(project.id).unwrap());
    }

    #[test]
    fn test_load_missing_scene_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let mut registry = ProjectRegistry::open(dir.path()).unwrap();
        let project = registry.create("Empty").unwrap();

        assert!(matches!(registry.try_load_scene(project.id), Ok(None)));
        assert!(matches!(registry.try_load_scene(ProjectId::new()), Ok(None)));
    }

    #[test]
    fn test_corrupt_scene_is_explicit_but_load_is_silent() {
        let dir = tempfile::tempdir().unwrap();
        let mut registry = ProjectRegistry::open(dir.path()).unwrap();
        let project = registry.create("Broken").unwrap();
        std::fs::write(registry.scene_path(project.id), br#"{"items": 3}"#).unwrap();

        match registry.try_load_scene(project.id) {
            Err(StoreError::Corrupt { source, .. }) => assert_eq!(source.field(), Some("items")),
            other => panic!("expected corrupt scene, got {other:?}"),
        }
        assert!(registry.load_scene(project.id).is_none());
    }

    #[test]
    fn test_backup_copies_scene_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut registry = ProjectRegistry::open(dir.path()).unwrap();
        let project = registry.create("Kept").unwrap();
        assert!(matches!(
            registry.backup_scene(project.id),
            Err(StoreError::Io(_))
        ));

        std::fs::write(registry.scene_path(project.id), b"broken").unwrap();
        let backup = registry.backup_scene(project.id).unwrap();
        assert_eq!(backup, dir.path().join(format!("{}.json.bak", project.id)));
        assert_eq!(std::fs::read(&backup).unwrap(), b"broken");
    }

    #[test]
    fn test_save_updates_timestamp_and_thumbnail() {
        let dir = tempfile::tempdir().unwrap();
        let mut registry = ProjectRegistry::open(dir.path()).unwrap();
        let project = registry.create("Stamp").unwrap();

        let mut scene = Scene::default();
        scene.add_item(SceneItem::new_text()).unwrap();
        let mut first = SceneItem::new_photo(photo_raster(12));
        first.set_z_index(0.0);
        let mut topmost = SceneItem::new_photo(photo_raster(20));
        topmost.set_z_index(99.0);
        scene.add_item(first).unwrap();
        scene.add_item(topmost).unwrap();

        registry.save_scene(project.id, &scene).unwrap();

        let saved = registry.get(project.id).unwrap();
        assert!(saved.last_modified >= project.last_modified);
        let thumbnail = saved.thumbnail.as_ref().unwrap();
        assert_eq!(thumbnail.dimensions(), (12, 12));
        assert_eq!(
            thumbnail,
            &image_codec::reencode(&photo_raster(12), DEFAULT_JPEG_QUALITY).unwrap()
        );
    }

    #[test]
    fn test_save_without_photo_keeps_thumbnail() {
        let dir = tempfile::tempdir().unwrap();
        let mut registry = ProjectRegistry::open(dir.path()).unwrap();
        let project = registry.create("Words").unwrap();

        let mut scene = Scene::default();
        scene.add_item(SceneItem::new_text()).unwrap();
        registry.save_scene(project.id, &scene).unwrap();
        assert!(registry.get(project.id).unwrap().thumbnail.is_none());
    }

    #[test]
    fn test_save_empty_image_fails_before_writing() {
        let dir = tempfile::tempdir().unwrap();
        let mut registry = ProjectRegistry::open(dir.path()).unwrap();
        let project = registry.create("Bad pixels").unwrap();

        let mut scene = Scene::default();
        scene
            .add_item(SceneItem::new_photo(Raster::filled(0, 0, [0; 4])))
            .unwrap();

        assert!(matches!(
            registry.save_scene(project.id, &scene),
            Err(StoreError::Encode(_))
        ));
        assert!(!registry.scene_path(project.id).exists());
    }

    #[test]
    fn test_trip_scenario() {
        let dir = tempfile::tempdir().unwrap();
        let mut registry = ProjectRegistry::open(dir.path()).unwrap();
        let project = registry.create("Trip").unwrap();

        let mut scene = Scene::default();
        scene
            .add_item(SceneItem::new_photo(photo_raster(400)))
            .unwrap();
        let mut text = SceneItem::new_text();
        if let ItemKind::Text(style) = text.kind_mut() {
            style.text = "Hello".to_string();
        }
        scene.add_item(text).unwrap();
        registry.save_scene(project.id, &scene).unwrap();
        let saved_thumbnail = registry.get(project.id).unwrap().thumbnail.clone();

        let mut reopened = ProjectRegistry::open(dir.path()).unwrap();
        assert_eq!(reopened.list().len(), 1);
        assert_eq!(reopened.list()[0].name, "Trip");

        let loaded = reopened.load_scene(project.id).unwrap();
        let kinds: Vec<&str> = loaded.items().iter().map(|i| i.kind_name()).collect();
        assert_eq!(kinds, vec!["photo", "text"]);
        let ItemKind::Text(style) = loaded.items()[1].kind() else {
            panic!("expected text");
        };
        assert_eq!(style.text, "Hello");

        let photo = loaded.items()[0].photo_image().unwrap();
        assert_eq!(photo.dimensions(), (400, 400));
        let thumbnail = reopened.get(project.id).unwrap().thumbnail.as_ref().unwrap();
        assert_eq!(thumbnail, photo);
        assert_eq!(saved_thumbnail.as_ref(), Some(photo));
    }

    #[test]
    fn test_subscribers_see_changes() {
        let dir = tempfile::tempdir().unwrap();
        let mut registry = ProjectRegistry::open(dir.path()).unwrap();
        let events = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&events);
        registry.subscribe(move |event| sink.borrow_mut().push(*event));

        let project = registry.create("Watched").unwrap();
        registry.save_scene(project.id, &Scene::default()).unwrap();
        registry.delete(project.id).unwrap();

        assert_eq!(
            *events.borrow(),
            vec![
                RegistryEvent::Added(project.id),
                RegistryEvent::Updated(project.id),
                RegistryEvent::Removed(project.id),
            ]
        );
    }
}
