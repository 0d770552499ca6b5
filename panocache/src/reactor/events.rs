//! Filesystem event classification.

use std::path::{Component, Path, PathBuf};

use notify::event::{ModifyKind, RemoveKind, RenameMode};
use notify::{Event, EventKind};

use crate::store::is_tile_filename;

/// What a filesystem event asks the reactor to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    /// The challenge map was created or modified
    Config,
    /// A tile file or a cache directory disappeared
    CacheRemoval,
    /// The cache root itself was deleted or moved away, taking its watch along
    CacheRootRemoved,
}

/// Maps raw watcher events to triggers.
///
/// Both paths must be in the form the watcher reports them (canonical).
#[derive(Debug, Clone)]
pub struct EventClassifier {
    challenges: PathBuf,
    cache_root: PathBuf,
}

impl EventClassifier {
    pub fn new(challenges: PathBuf, cache_root: PathBuf) -> Self {
        Self {
            challenges,
            cache_root,
        }
    }

    pub fn classify(&self, event: &Event) -> Option<Trigger> {
        match event.kind {
            EventKind::Create(_) | EventKind::Modify(_)
                if event.paths.iter().any(|p| p == &self.challenges) =>
            {
                Some(Trigger::Config)
            }
            EventKind::Remove(_)
            | EventKind::Modify(ModifyKind::Name(RenameMode::From | RenameMode::Any))
                if event.paths.iter().any(|p| p == &self.cache_root) =>
            {
                Some(Trigger::CacheRootRemoved)
            }
            EventKind::Remove(kind) => event
                .paths
                .iter()
                .any(|p| self.is_cache_removal(p, Some(kind)))
                .then_some(Trigger::CacheRemoval),
            EventKind::Modify(ModifyKind::Name(RenameMode::From)) => event
                .paths
                .iter()
                .any(|p| self.is_cache_removal(p, None))
                .then_some(Trigger::CacheRemoval),
            _ => None,
        }
    }

    fn is_cache_removal(&self, path: &Path, kind: Option<RemoveKind>) -> bool {
        let Ok(relative) = path.strip_prefix(&self.cache_root) else {
            return false;
        };
        if relative.as_os_str().is_empty() || is_hidden(relative) {
            return false;
        }

        let is_tile = path
            .file_name()
            .and_then(|name| name.to_str())
            .is_some_and(is_tile_filename);

        match kind {
            Some(RemoveKind::Folder) => true,
            Some(RemoveKind::File) => is_tile,
            // Backends that can't tell files from folders
            _ => is_tile || path.extension().is_none(),
        }
    }
}

fn is_hidden(relative: &Path) -> bool {
    relative.components().any(|component| match component {
        Component::Normal(name) => name.to_str().is_some_and(|n| n.starts_with('.')),
        _ => false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use notify::event::{CreateKind, DataChange};

    fn classifier() -> EventClassifier {
        EventClassifier::new(
            PathBuf::from("/srv/app/challs.json"),
            PathBuf::from("/srv/app/public/img"),
        )
    }

    fn event(kind: EventKind, path: &str) -> Event {
        Event::new(kind).add_path(PathBuf::from(path))
    }

    #[test]
    fn test_challenge_map_events() {
        let c = classifier();
        assert_eq!(
            c.classify(&event(
                EventKind::Create(CreateKind::File),
                "/srv/app/challs.json"
            )),
            Some(Trigger::Config)
        );
        assert_eq!(
            c.classify(&event(
                EventKind::Modify(ModifyKind::Data(DataChange::Content)),
                "/srv/app/challs.json"
            )),
            Some(Trigger::Config)
        );
        assert_eq!(
            c.classify(&event(
                EventKind::Modify(ModifyKind::Data(DataChange::Content)),
                "/srv/app/other.json"
            )),
            None
        );
        assert_eq!(
            c.classify(&event(
                EventKind::Remove(RemoveKind::File),
                "/srv/app/challs.json"
            )),
            None
        );
    }

    #[test]
    fn test_tile_removal() {
        let c = classifier();
        assert_eq!(
            c.classify(&event(
                EventKind::Remove(RemoveKind::File),
                "/srv/app/public/img/eu/Tower/tile_0_0_1.jpeg"
            )),
            Some(Trigger::CacheRemoval)
        );
        assert_eq!(
            c.classify(&event(
                EventKind::Remove(RemoveKind::File),
                "/srv/app/public/img/eu/Tower/notes.txt"
            )),
            None
        );
    }

    #[test]
    fn test_directory_removal() {
        let c = classifier();
        assert_eq!(
            c.classify(&event(
                EventKind::Remove(RemoveKind::Folder),
                "/srv/app/public/img/eu/Tower"
            )),
            Some(Trigger::CacheRemoval)
        );
        assert_eq!(
            c.classify(&event(
                EventKind::Remove(RemoveKind::Any),
                "/srv/app/public/img/eu"
            )),
            Some(Trigger::CacheRemoval)
        );
        assert_eq!(
            c.classify(&event(
                EventKind::Modify(ModifyKind::Name(RenameMode::From)),
                "/srv/app/public/img/eu/Tower/tile_1_0_1.jpeg"
            )),
            Some(Trigger::CacheRemoval)
        );
    }

    #[test]
    fn test_hidden_and_outside_paths_ignored() {
        let c = classifier();
        assert_eq!(
            c.classify(&event(
                EventKind::Remove(RemoveKind::File),
                "/srv/app/public/img/eu/Tower/.meta"
            )),
            None
        );
        assert_eq!(
            c.classify(&event(
                EventKind::Remove(RemoveKind::Folder),
                "/srv/app/public/img/.trash"
            )),
            None
        );
        assert_eq!(
            c.classify(&event(
                EventKind::Remove(RemoveKind::File),
                "/srv/other/tile_0_0_1.jpeg"
            )),
            None
        );
    }

    #[test]
    fn test_cache_root_removal() {
        let c = classifier();
        for kind in [
            EventKind::Remove(RemoveKind::Folder),
            EventKind::Remove(RemoveKind::Any),
            EventKind::Modify(ModifyKind::Name(RenameMode::From)),
            EventKind::Modify(ModifyKind::Name(RenameMode::Any)),
        ] {
            assert_eq!(
                c.classify(&event(kind, "/srv/app/public/img")),
                Some(Trigger::CacheRootRemoved)
            );
        }
        assert_eq!(
            c.classify(&event(
                EventKind::Create(CreateKind::Folder),
                "/srv/app/public/img"
            )),
            None
        );
    }

    #[test]
    fn test_tile_creation_ignored() {
        let c = classifier();
        assert_eq!(
            c.classify(&event(
                EventKind::Create(CreateKind::File),
                "/srv/app/public/img/eu/Tower/tile_0_0_1.jpeg"
            )),
            None
        );
    }
}
