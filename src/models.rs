// Data shapes returned by the dhokla.net API.
//
// Every endpoint answers with an envelope `{"message": .., "data": ..}`.
// The envelopes are private; callers get the flattened `Directory` and
// `SearchResult` types plus a `FileIndex` for id lookups.

use serde::{Deserialize, Deserializer};
use std::collections::hash_map::{self, HashMap};

/// One remote file or subdirectory. Missing fields decode as empty
/// values; a size of 0 is treated as unknown.
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct File {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub dir: bool,
    #[serde(default, deserialize_with = "zero_as_none")]
    pub size: Option<u64>,
    #[serde(default)]
    pub parent: String,
    #[serde(default)]
    pub mtime: String,
}

/// A directory listing: the directory's own metadata plus its children
/// in server order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Directory {
    pub message: String,
    pub id: String,
    pub name: String,
    pub dir: bool,
    pub parent: String,
    pub mtime: String,
    pub files: Vec<File>,
}

/// Files matching a name search, in server order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchResult {
    pub message: String,
    pub files: Vec<File>,
}

#[derive(Deserialize)]
struct DirectoryEnvelope {
    #[serde(default)]
    message: String,
    data: DirectoryData,
}

#[derive(Deserialize)]
struct DirectoryData {
    #[serde(default)]
    id: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    dir: bool,
    #[serde(default)]
    parent: String,
    #[serde(default)]
    mtime: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    files: Vec<File>,
}

#[derive(Deserialize)]
struct SearchEnvelope {
    #[serde(default)]
    message: String,
    #[serde(deserialize_with = "null_as_empty")]
    data: Vec<File>,
}

/// The API sends `null` instead of `[]` for empty lists.
fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

/// The API omits `size` for empty files and directories, but some
/// responses send an explicit 0.
fn zero_as_none<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<u64>::deserialize(deserializer)?.filter(|size| *size != 0))
}

impl Directory {
    /// Decode a directory envelope.
    pub fn from_json(body: &str) -> serde_json::Result<Self> {
        let env: DirectoryEnvelope = serde_json::from_str(body)?;
        let data = env.data;
        Ok(Directory {
            message: env.message,
            id: data.id,
            name: data.name,
            dir: data.dir,
            parent: data.parent,
            mtime: data.mtime,
            files: data.files,
        })
    }

    /// Flatten the children into an id lookup.
    pub fn into_index(self) -> FileIndex {
        self.files.into_iter().collect()
    }
}

impl SearchResult {
    /// Decode a search envelope.
    pub fn from_json(body: &str) -> serde_json::Result<Self> {
        let env: SearchEnvelope = serde_json::from_str(body)?;
        Ok(SearchResult {
            message: env.message,
            files: env.data,
        })
    }
}

/// Returned by [`FileIndex::lookup`] when the id is not present.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("No file found with the given ID: {0}")]
pub struct LookupMiss(pub String);

/// Mapping from file id to file record. Later inserts replace earlier
/// ones with the same id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileIndex {
    files: HashMap<String, File>,
}

impl FileIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, file: File) {
        self.files.insert(file.id.clone(), file);
    }

    pub fn get(&self, id: &str) -> Option<&File> {
        self.files.get(id)
    }

    pub fn lookup(&self, id: &str) -> Result<&File, LookupMiss> {
        self.get(id).ok_or_else(|| LookupMiss(id.to_string()))
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn iter(&self) -> hash_map::Values<'_, String, File> {
        self.files.values()
    }
}

impl FromIterator<File> for FileIndex {
    fn from_iter<I: IntoIterator<Item = File>>(iter: I) -> Self {
        let mut index = FileIndex::new();
        index.extend(iter);
        index
    }
}

impl Extend<File> for FileIndex {
    fn extend<I: IntoIterator<Item = File>>(&mut self, iter: I) {
        for file in iter {
            self.insert(file);
        }
    }
}
