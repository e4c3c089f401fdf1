//! src/services/preview_registry.rs
//!
//! PreviewRegistry: the object URL backend of the CLI. Blobs live in memory
//! under a random UUID and are served by the local preview server at
//! `{base_url}/preview/{uuid}` until released. A released URL answers 404.

use crate::services::{file_backend::Blob, object_urls::ObjectUrlManager};
use chrono::{DateTime, Utc};
use std::{
    collections::HashMap,
    sync::{Arc, PoisonError, RwLock},
};
use tracing::debug;
use uuid::Uuid;

/// A blob registered for preview, with the headers it is served under.
#[derive(Clone, Debug)]
pub struct PreviewObject {
    pub blob: Blob,

    /// Hex MD5 of the content, served as a quoted ETag.
    pub etag: String,

    pub created_at: DateTime<Utc>,
}

#[derive(Clone)]
pub struct PreviewRegistry {
    base_url: String,
    objects: Arc<RwLock<HashMap<Uuid, PreviewObject>>>,
}

impl PreviewRegistry {
    /// `base_url` is the origin the preview server is reachable at,
    /// e.g. `http://127.0.0.1:43121`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            objects: Arc::default(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn get(&self, id: &Uuid) -> Option<PreviewObject> {
        self.objects
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(id)
            .cloned()
    }

    /// Number of URLs created and not yet released.
    pub fn live_count(&self) -> usize {
        self.objects
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    fn id_from_url(&self, url: &str) -> Option<Uuid> {
        let rest = url.strip_prefix(&self.base_url)?.strip_prefix("/preview/")?;
        Uuid::parse_str(rest).ok()
    }
}

impl ObjectUrlManager for PreviewRegistry {
    fn create(&self, blob: Blob) -> String {
        let id = Uuid::new_v4();
        let etag = format!("{:x}", md5::compute(&blob.bytes));
        debug!("registering preview {} ({} bytes, {})", id, blob.len(), blob.mime_type);
        self.objects
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(
                id,
                PreviewObject {
                    blob,
                    etag,
                    created_at: Utc::now(),
                },
            );
        format!("{}/preview/{}", self.base_url, id)
    }

    fn release(&self, url: &str) {
        if url.is_empty() {
            return;
        }
        let Some(id) = self.id_from_url(url) else {
            debug!("ignoring release of foreign url {}", url);
            return;
        };
        let removed = self
            .objects
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&id);
        match removed {
            Some(_) => debug!("released preview {}", id),
            None => debug!("preview {} already released", id),
        }
    }
}
