//! Revisions, modified files and polling results.

use indexmap::IndexMap;
use time::OffsetDateTime;

/// Opaque string map a plugin persists between polls.
///
/// Keys keep the order in which the plugin sent them.
pub type MaterialData = IndexMap<String, String>;

/// How a file changed within a revision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModifiedAction {
    /// The file was created.
    Added,
    /// The file was changed.
    Modified,
    /// The file was removed.
    Deleted,
}

impl ModifiedAction {
    /// Wire names of every action, in declaration order.
    pub const NAMES: &'static [&'static str] = &["added", "modified", "deleted"];

    /// Returns the wire name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Added => "added",
            Self::Modified => "modified",
            Self::Deleted => "deleted",
        }
    }

    /// Parses a wire name. Matching is exact.
    #[must_use]
    pub fn from_wire(name: &str) -> Option<Self> {
        match name {
            "added" => Some(Self::Added),
            "modified" => Some(Self::Modified),
            "deleted" => Some(Self::Deleted),
            _ => None,
        }
    }
}

/// A file touched by a revision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModifiedFile {
    path: String,
    action: ModifiedAction,
}

impl ModifiedFile {
    /// Creates a modified-file record.
    #[must_use]
    pub fn new(path: impl Into<String>, action: ModifiedAction) -> Self {
        Self {
            path: path.into(),
            action,
        }
    }

    /// Returns the file path.
    #[must_use]
    pub const fn path(&self) -> &str {
        self.path.as_str()
    }

    /// Returns the change kind.
    #[must_use]
    pub const fn action(&self) -> ModifiedAction {
        self.action
    }
}

/// A revision reported by a plugin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Revision {
    id: String,
    timestamp: OffsetDateTime,
    author: Option<String>,
    comment: Option<String>,
    data: MaterialData,
    modified_files: Vec<ModifiedFile>,
}

impl Revision {
    /// Creates a revision with no author, comment, data or files.
    #[must_use]
    pub fn new(id: impl Into<String>, timestamp: OffsetDateTime) -> Self {
        Self {
            id: id.into(),
            timestamp,
            author: None,
            comment: None,
            data: MaterialData::new(),
            modified_files: Vec::new(),
        }
    }

    /// Sets the author.
    #[must_use]
    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = Some(author.into());
        self
    }

    /// Sets the commit comment.
    #[must_use]
    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    /// Sets the per-revision data map.
    #[must_use]
    pub fn with_data(mut self, data: MaterialData) -> Self {
        self.data = data;
        self
    }

    /// Sets the modified files.
    #[must_use]
    pub fn with_modified_files(mut self, modified_files: Vec<ModifiedFile>) -> Self {
        self.modified_files = modified_files;
        self
    }

    /// Returns the revision identifier.
    #[must_use]
    pub const fn id(&self) -> &str {
        self.id.as_str()
    }

    /// Returns when the revision was made.
    #[must_use]
    pub const fn timestamp(&self) -> OffsetDateTime {
        self.timestamp
    }

    /// Returns the author, when known.
    #[must_use]
    pub fn author(&self) -> Option<&str> {
        self.author.as_deref()
    }

    /// Returns the commit comment, when known.
    #[must_use]
    pub fn comment(&self) -> Option<&str> {
        self.comment.as_deref()
    }

    /// Returns the per-revision data map.
    #[must_use]
    pub const fn data(&self) -> &MaterialData {
        &self.data
    }

    /// Returns the modified files.
    #[must_use]
    pub const fn modified_files(&self) -> &[ModifiedFile] {
        self.modified_files.as_slice()
    }
}

/// What a poll produced.
///
/// A full poll fills [`PollResult::latest_revision`]; an incremental poll
/// fills [`PollResult::revisions`]. `material_data`, when present, replaces
/// the data persisted for the material.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PollResult {
    latest_revision: Option<Revision>,
    revisions: Option<Vec<Revision>>,
    material_data: Option<MaterialData>,
}

impl PollResult {
    /// Result of a full poll.
    #[must_use]
    pub const fn latest(revision: Revision, material_data: Option<MaterialData>) -> Self {
        Self {
            latest_revision: Some(revision),
            revisions: None,
            material_data,
        }
    }

    /// Result of an incremental poll.
    #[must_use]
    pub const fn since(
        revisions: Option<Vec<Revision>>,
        material_data: Option<MaterialData>,
    ) -> Self {
        Self {
            latest_revision: None,
            revisions,
            material_data,
        }
    }

    /// Returns the latest revision of a full poll.
    #[must_use]
    pub const fn latest_revision(&self) -> Option<&Revision> {
        self.latest_revision.as_ref()
    }

    /// Returns the revisions of an incremental poll, if the plugin sent any
    /// list at all.
    #[must_use]
    pub fn revisions(&self) -> Option<&[Revision]> {
        self.revisions.as_deref()
    }

    /// Returns the replacement material data, if the plugin sent any.
    #[must_use]
    pub const fn material_data(&self) -> Option<&MaterialData> {
        self.material_data.as_ref()
    }

    /// Replaces an absent revision list with an empty one.
    #[must_use]
    pub fn with_revision_list(mut self) -> Self {
        if self.latest_revision.is_none() && self.revisions.is_none() {
            self.revisions = Some(Vec::new());
        }
        self
    }

    /// Returns the material data to persist after this poll.
    ///
    /// Plugin data replaces `persisted` wholesale; without it `persisted` is
    /// kept.
    #[must_use]
    pub fn material_data_after(&self, persisted: &MaterialData) -> MaterialData {
        self.material_data
            .as_ref()
            .unwrap_or(persisted)
            .clone()
    }
}
