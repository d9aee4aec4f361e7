//! Path Table
//!
//! Ordered mapping from module name to module path, as declared in the
//! loader's `paths` configuration.

use crate::bootstrap::{ConfigObject, ConfigValue};
use crate::error::ExtractionError;
use crate::types::{ModuleName, ModulePath};
use serde::ser::{Serialize, SerializeMap, Serializer};

/// One `{moduleName: modulePath}` record.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct PathEntry {
    pub module: ModuleName,
    pub path: ModulePath,
}

impl PathEntry {
    pub fn new(module: impl Into<ModuleName>, path: impl Into<ModulePath>) -> Self {
        Self {
            module: module.into(),
            path: path.into(),
        }
    }
}

/// Path table with entries in declaration order and unique module names.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathTable {
    entries: Vec<PathEntry>,
}

impl PathTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read a table from the `paths` object of a loader configuration.
    pub fn from_object(object: &ConfigObject) -> Result<Self, ExtractionError> {
        let mut table = PathTable::new();
        for (module, value) in object.iter() {
            if module.is_empty() {
                return Err(ExtractionError::EmptyModuleName);
            }
            match value {
                ConfigValue::String(path) => table.insert(module, path.clone()),
                _ => {
                    return Err(ExtractionError::NonStringPath {
                        module: module.to_string(),
                    });
                }
            }
        }
        Ok(table)
    }

    /// Rebuild a table from a sequence of records; later duplicates overwrite earlier ones.
    pub fn from_entries(entries: impl IntoIterator<Item = PathEntry>) -> Self {
        let mut table = PathTable::new();
        for entry in entries {
            table.insert(entry.module, entry.path);
        }
        table
    }

    /// Records in declaration order, the processing order for fingerprinting.
    pub fn to_entries(&self) -> Vec<PathEntry> {
        self.entries.clone()
    }

    pub fn to_object(&self) -> ConfigObject {
        let mut object = ConfigObject::new();
        for entry in &self.entries {
            object.insert(entry.module.clone(), ConfigValue::String(entry.path.clone()));
        }
        object
    }

    /// Set the path for a module, keeping its position if already present.
    pub fn insert(&mut self, module: impl Into<ModuleName>, path: impl Into<ModulePath>) {
        let module = module.into();
        let path = path.into();
        match self.entries.iter_mut().find(|e| e.module == module) {
            Some(entry) => entry.path = path,
            None => self.entries.push(PathEntry { module, path }),
        }
    }

    pub fn get(&self, module: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|e| e.module == module)
            .map(|e| e.path.as_str())
    }

    pub fn contains(&self, module: &str) -> bool {
        self.get(module).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PathEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Serialize for PathTable {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for entry in &self.entries {
            map.serialize_entry(&entry.module, &entry.path)?;
        }
        map.end()
    }
}
