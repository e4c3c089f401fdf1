//! Short-lived local URLs for in-memory file content.
//!
//! A manager turns a [`Blob`] into a URL that a viewer can open and frees
//! the backing resource on `release`. Callers never hold bare URL strings:
//! [`ScopedObjectUrl`] owns one created URL and releases it exactly once
//! when dropped, so replacing or dropping the owner is the release.

use crate::services::file_backend::Blob;
use std::{fmt, sync::Arc};

pub trait ObjectUrlManager: Send + Sync {
    /// Register `blob` and return a URL serving it.
    fn create(&self, blob: Blob) -> String;

    /// Free the resource behind `url`. Empty and unknown URLs are ignored.
    fn release(&self, url: &str);
}

/// Sole owner of one live object URL.
pub struct ScopedObjectUrl {
    url: String,
    manager: Arc<dyn ObjectUrlManager>,
}

impl ScopedObjectUrl {
    pub fn acquire(manager: &Arc<dyn ObjectUrlManager>, blob: Blob) -> Self {
        let url = manager.create(blob);
        Self {
            url,
            manager: Arc::clone(manager),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.url
    }
}

impl Drop for ScopedObjectUrl {
    fn drop(&mut self) {
        self.manager.release(&self.url);
    }
}

impl fmt::Debug for ScopedObjectUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ScopedObjectUrl").field(&self.url).finish()
    }
}

impl fmt::Display for ScopedObjectUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::CountingUrls;

    #[test]
    fn dropping_the_owner_releases_once() {
        let counting = Arc::new(CountingUrls::default());
        let manager: Arc<dyn ObjectUrlManager> = counting.clone();

        let scoped = ScopedObjectUrl::acquire(&manager, Blob::new(&b"x"[..], "image/png"));
        assert_eq!(counting.live(), 1);
        let url = scoped.as_str().to_string();
        drop(scoped);

        assert_eq!(counting.created(), 1);
        assert_eq!(counting.released(), vec![url]);
        assert_eq!(counting.live(), 0);
    }

    #[test]
    fn replacing_an_owner_releases_the_previous_url_first() {
        let counting = Arc::new(CountingUrls::default());
        let manager: Arc<dyn ObjectUrlManager> = counting.clone();

        let mut slot = Some(ScopedObjectUrl::acquire(&manager, Blob::new(&b"a"[..], "image/png")));
        slot.take();
        slot = Some(ScopedObjectUrl::acquire(&manager, Blob::new(&b"b"[..], "image/png")));

        assert_eq!(counting.max_live(), 1);
        drop(slot);
        assert_eq!(counting.released().len(), 2);
    }
}
