//! Indexed file records.
//!
//! An AddonFile is our abstraction over one content file on disk. It
//! records where the file lives, when it last changed, and the typed
//! identifier data its kind carries. Records are sealed per kind: an
//! extractor either produces a complete variant or nothing at all.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// The category a content file belongs to.
///
/// Variant order mirrors the classifier's rule priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileKind {
    /// A pack's `manifest.json`.
    Manifest,
    /// A behavior-side block definition.
    ServerBlock,
    /// The resource-side `blocks.json` manifest.
    ClientBlock,
    /// A behavior-side entity definition.
    ServerEntity,
    /// A resource-side entity definition.
    ClientEntity,
    Item,
    Ui,
    Attachable,
    Animation,
    AnimationController,
    /// A geometry file.
    Model,
    /// An image under a `textures` directory.
    Texture,
    Particle,
    Sound,
    RenderController,
    Fog,
    /// Nothing matched. Never indexed.
    Unknown,
}

impl FileKind {
    /// Every kind that can own index buckets.
    pub const INDEXED: [FileKind; 15] = [
        Self::ServerBlock,
        Self::ClientBlock,
        Self::ServerEntity,
        Self::ClientEntity,
        Self::Item,
        Self::Ui,
        Self::Attachable,
        Self::Animation,
        Self::AnimationController,
        Self::Model,
        Self::Texture,
        Self::Particle,
        Self::Sound,
        Self::RenderController,
        Self::Fog,
    ];

    /// The stable snake_case name used in output and on the command line.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Manifest => "manifest",
            Self::ServerBlock => "server_block",
            Self::ClientBlock => "client_block",
            Self::ServerEntity => "server_entity",
            Self::ClientEntity => "client_entity",
            Self::Item => "item",
            Self::Ui => "ui",
            Self::Attachable => "attachable",
            Self::Animation => "animation",
            Self::AnimationController => "animation_controller",
            Self::Model => "model",
            Self::Texture => "texture",
            Self::Particle => "particle",
            Self::Sound => "sound",
            Self::RenderController => "render_controller",
            Self::Fog => "fog",
            Self::Unknown => "unknown",
        }
    }

    /// Parses the snake_case name back into a kind.
    pub fn from_name(name: &str) -> Option<Self> {
        std::iter::once(Self::Manifest)
            .chain(Self::INDEXED)
            .chain(std::iter::once(Self::Unknown))
            .find(|kind| kind.as_str() == name)
    }

    /// Whether records of this kind live in the index.
    pub fn is_indexed(&self) -> bool {
        !matches!(self, Self::Manifest | Self::Unknown)
    }
}

impl std::fmt::Display for FileKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Identifiers a client entity names in other kinds.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityReferences {
    pub animations: Vec<String>,
    pub geometries: Vec<String>,
    pub textures: Vec<String>,
    pub particles: Vec<String>,
    pub sounds: Vec<String>,
    pub render_controllers: Vec<String>,
}

impl EntityReferences {
    /// The six reference lists paired with the kind they resolve against.
    pub fn by_kind(&self) -> [(FileKind, &[String]); 6] {
        [
            (FileKind::Animation, self.animations.as_slice()),
            (FileKind::Model, self.geometries.as_slice()),
            (FileKind::Texture, self.textures.as_slice()),
            (FileKind::Particle, self.particles.as_slice()),
            (FileKind::Sound, self.sounds.as_slice()),
            (FileKind::RenderController, self.render_controllers.as_slice()),
        ]
    }

    /// Total number of referenced identifiers across all lists.
    pub fn len(&self) -> usize {
        self.by_kind().iter().map(|(_, ids)| ids.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Kind-specific payload of a record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FileData {
    ServerBlock {
        block: String,
    },
    ClientBlock {
        blocks: Vec<String>,
    },
    ServerEntity {
        entity: String,
    },
    ClientEntity {
        entity: String,
        references: EntityReferences,
    },
    Item {
        item: String,
    },
    Ui {
        namespace: String,
    },
    Attachable {
        attachable: String,
    },
    Animation {
        animations: Vec<String>,
    },
    AnimationController {
        controllers: Vec<String>,
    },
    Model {
        geometries: Vec<String>,
    },
    Texture {
        texture: String,
    },
    Particle {
        particle: String,
        texture: Option<String>,
    },
    Sound {
        sounds: Vec<String>,
    },
    /// The referenced geometry/texture/material lists are carried for
    /// forward compatibility and are currently always empty.
    RenderController {
        controllers: Vec<String>,
        geometries: Vec<String>,
        textures: Vec<String>,
        materials: Vec<String>,
    },
    Fog {
        fog: String,
    },
}

impl FileData {
    /// The kind this payload belongs to.
    pub fn kind(&self) -> FileKind {
        match self {
            Self::ServerBlock { .. } => FileKind::ServerBlock,
            Self::ClientBlock { .. } => FileKind::ClientBlock,
            Self::ServerEntity { .. } => FileKind::ServerEntity,
            Self::ClientEntity { .. } => FileKind::ClientEntity,
            Self::Item { .. } => FileKind::Item,
            Self::Ui { .. } => FileKind::Ui,
            Self::Attachable { .. } => FileKind::Attachable,
            Self::Animation { .. } => FileKind::Animation,
            Self::AnimationController { .. } => FileKind::AnimationController,
            Self::Model { .. } => FileKind::Model,
            Self::Texture { .. } => FileKind::Texture,
            Self::Particle { .. } => FileKind::Particle,
            Self::Sound { .. } => FileKind::Sound,
            Self::RenderController { .. } => FileKind::RenderController,
            Self::Fog { .. } => FileKind::Fog,
        }
    }

    /// The identifiers this file defines, in declaration order.
    pub fn identifiers(&self) -> Vec<&str> {
        match self {
            Self::ServerBlock { block: id }
            | Self::ServerEntity { entity: id }
            | Self::ClientEntity { entity: id, .. }
            | Self::Item { item: id }
            | Self::Ui { namespace: id }
            | Self::Attachable { attachable: id }
            | Self::Texture { texture: id }
            | Self::Particle { particle: id, .. }
            | Self::Fog { fog: id } => vec![id.as_str()],
            Self::ClientBlock { blocks: ids }
            | Self::Animation { animations: ids }
            | Self::AnimationController { controllers: ids }
            | Self::Model { geometries: ids }
            | Self::Sound { sounds: ids }
            | Self::RenderController {
                controllers: ids, ..
            } => ids.iter().map(String::as_str).collect(),
        }
    }
}

/// One indexed content file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddonFile {
    /// Path to the file as it was discovered.
    pub path: PathBuf,

    /// Modification time in milliseconds since the Unix epoch, or 0 when
    /// the file system doesn't report one.
    pub last_modified: u64,

    /// The kind-specific identifier data.
    #[serde(flatten)]
    pub data: FileData,
}

impl AddonFile {
    /// Creates a record with no modification time.
    pub fn new(path: impl Into<PathBuf>, data: FileData) -> Self {
        Self {
            path: path.into(),
            last_modified: 0,
            data,
        }
    }

    /// Builder pattern: set modification time.
    pub fn with_modified(mut self, last_modified: u64) -> Self {
        self.last_modified = last_modified;
        self
    }

    pub fn kind(&self) -> FileKind {
        self.data.kind()
    }

    /// The identifiers this file defines.
    pub fn identifiers(&self) -> Vec<&str> {
        self.data.identifiers()
    }

    pub fn is_at(&self, path: &Path) -> bool {
        self.path == path
    }
}
