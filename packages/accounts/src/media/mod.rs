//! Avatar storage capability used during registration.

mod local;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::MediaError;

pub use local::LocalMediaStore;

/// An uploaded file as received from the caller.
#[derive(Debug, Clone, Default)]
pub struct Upload {
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

/// Reference to a stored media asset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Media {
    pub id: String,
}

/// Stores avatar images and hands back a reference to them.
#[async_trait]
pub trait MediaStore: Send + Sync {
    async fn save_avatar(&self, upload: &Upload) -> Result<Media, MediaError>;

    /// Discard an avatar that ended up unreferenced.
    async fn remove_avatar(&self, media: &Media) -> Result<(), MediaError>;
}
