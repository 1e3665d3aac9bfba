use parking_lot::RwLock;
use std::collections::HashMap;
use tracing::debug;
use zmove_protocol::{FileAttributes, FileHandle};

/// Owner of the mapping between file handles and their remote metadata.
///
/// The transfer engine only reads classifications that operations already
/// carry; everything it learns during execution (objects deleted, renamed,
/// created) flows back through these designated entry points. The store is
/// responsible for serializing concurrent writers; the engine never locks
/// shared local state itself.
pub trait AttributesStore: Send + Sync {
    fn attributes_of(&self, file: &FileHandle) -> Option<FileAttributes>;

    /// Records a newly created remote object.
    fn register(&self, file: &FileHandle, attributes: FileAttributes);

    /// Reflects a confirmed remote deletion in the local representation.
    fn apply_deleted(&self, file: &FileHandle);

    /// Reflects a confirmed remote rename in the local representation.
    fn apply_renamed(&self, file: &FileHandle, new_name: &str);
}

/// Default in-memory store used by embedders and tests.
#[derive(Default)]
pub struct InMemoryAttributesStore {
    entries: RwLock<HashMap<String, FileAttributes>>,
}

impl InMemoryAttributesStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

impl AttributesStore for InMemoryAttributesStore {
    fn attributes_of(&self, file: &FileHandle) -> Option<FileAttributes> {
        self.entries.read().get(&file.path).cloned()
    }

    fn register(&self, file: &FileHandle, attributes: FileAttributes) {
        debug!("registering attributes for {}", file.path);
        self.entries.write().insert(file.path.clone(), attributes);
    }

    fn apply_deleted(&self, file: &FileHandle) {
        debug!("dropping attributes for deleted {}", file.path);
        let mut entries = self.entries.write();
        // A deleted directory takes its descendants with it.
        let prefix = format!("{}/", file.path.trim_end_matches('/'));
        entries.retain(|path, _| path != &file.path && !path.starts_with(&prefix));
    }

    fn apply_renamed(&self, file: &FileHandle, new_name: &str) {
        let mut entries = self.entries.write();
        let Some(mut attributes) = entries.remove(&file.path) else {
            return;
        };
        let new_path = match &mut attributes {
            FileAttributes::Dataset(attrs) => {
                attrs.name = new_name.to_string();
                attrs.name.clone()
            }
            FileAttributes::Member(attrs) => {
                attrs.name = new_name.to_string();
                format!("{}({})", attrs.library.name, attrs.name)
            }
            FileAttributes::Uss(attrs) => {
                let parent = attrs.parent_dir_path().trim_end_matches('/').to_string();
                attrs.path = format!("{}/{}", parent, new_name);
                attrs.path.clone()
            }
        };
        entries.insert(new_path, attributes);
    }
}
