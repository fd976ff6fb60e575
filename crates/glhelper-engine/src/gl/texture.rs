//! Image fetching, decoding and caching for texture upload.
//!
//! Loads are futures driven by the caller's executor. Concurrent and repeated
//! requests for one URL share a single fetch; a failed load is evicted so the
//! next request retries.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;
use std::rc::{Rc, Weak};

use futures::future::{self, LocalBoxFuture, Shared};
use futures::FutureExt;

#[derive(Debug, Clone, PartialEq)]
pub enum TextureError {
    Fetch { url: String, message: String },
    Decode { url: String, message: String },
}

impl fmt::Display for TextureError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TextureError::Fetch { url, message } => write!(f, "failed to fetch {url}: {message}"),
            TextureError::Decode { url, message } => write!(f, "failed to decode {url}: {message}"),
        }
    }
}

impl std::error::Error for TextureError {}

/// RGBA8 pixels, bottom row first (the upload order `UNPACK_FLIP_Y` produces).
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedImage {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

impl DecodedImage {
    pub fn decode(url: &str, bytes: &[u8]) -> Result<Self, TextureError> {
        let img = image::load_from_memory(bytes).map_err(|e| TextureError::Decode {
            url: url.to_owned(),
            message: e.to_string(),
        })?;
        let rgba = img.flipv().to_rgba8();
        Ok(Self { width: rgba.width(), height: rgba.height(), pixels: rgba.into_raw() })
    }
}

/// Resolves a URL to encoded image bytes.
pub trait ImageFetcher {
    fn fetch(&self, url: &str) -> LocalBoxFuture<'static, Result<Vec<u8>, TextureError>>;
}

/// Reads URLs as paths relative to a root directory.
#[derive(Debug, Clone)]
pub struct FileFetcher {
    root: PathBuf,
}

impl FileFetcher {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl Default for FileFetcher {
    fn default() -> Self {
        Self::new(".")
    }
}

impl ImageFetcher for FileFetcher {
    fn fetch(&self, url: &str) -> LocalBoxFuture<'static, Result<Vec<u8>, TextureError>> {
        let path = self.root.join(url.trim_start_matches('/'));
        let result = std::fs::read(&path).map_err(|e| TextureError::Fetch {
            url: url.to_owned(),
            message: format!("{}: {e}", path.display()),
        });
        future::ready(result).boxed_local()
    }
}

pub type ImageResult = Result<Rc<DecodedImage>, TextureError>;
pub type SharedImage = Shared<LocalBoxFuture<'static, ImageResult>>;

type Cache = RefCell<HashMap<String, SharedImage>>;

/// URL-keyed image cache in front of an [`ImageFetcher`].
pub struct TextureLoader {
    fetcher: Rc<dyn ImageFetcher>,
    cache: Rc<Cache>,
}

impl TextureLoader {
    pub fn new(fetcher: impl ImageFetcher + 'static) -> Self {
        Self { fetcher: Rc::new(fetcher), cache: Rc::new(RefCell::new(HashMap::new())) }
    }

    /// Returns the pending or finished load for `url`, starting one if needed.
    pub fn load_image(&self, url: &str) -> SharedImage {
        if let Some(pending) = self.cache.borrow().get(url) {
            return pending.clone();
        }

        let fetch = self.fetcher.fetch(url);
        let cache: Weak<Cache> = Rc::downgrade(&self.cache);
        let key = url.to_owned();

        let load = async move {
            let result = match fetch.await {
                Ok(bytes) => DecodedImage::decode(&key, &bytes).map(Rc::new),
                Err(e) => Err(e),
            };
            match &result {
                Ok(img) => log::debug!("image {key} decoded: {}x{}", img.width, img.height),
                Err(e) => {
                    log::warn!("{e}");
                    if let Some(cache) = cache.upgrade() {
                        cache.borrow_mut().remove(&key);
                    }
                }
            }
            result
        }
        .boxed_local()
        .shared();

        self.cache.borrow_mut().insert(url.to_owned(), load.clone());
        load
    }

    pub fn is_cached(&self, url: &str) -> bool {
        self.cache.borrow().contains_key(url)
    }

    pub fn cached_len(&self) -> usize {
        self.cache.borrow().len()
    }
}

impl Default for TextureLoader {
    fn default() -> Self {
        Self::new(FileFetcher::default())
    }
}

impl fmt::Debug for TextureLoader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TextureLoader").field("cached", &self.cached_len()).finish_non_exhaustive()
    }
}
