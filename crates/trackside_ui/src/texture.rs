//! Texture handles and lazy resolution.
//!
//! The engine never loads assets. It asks a [`TextureResolver`] for an opaque
//! [`TextureHandle`] the first time a node draws, and caches the answer in
//! that node's [`TextureSlot`].

use std::collections::HashMap;

/// Opaque handle to a GPU texture owned by the host.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct TextureHandle(pub u32);

/// Resolves asset keys to texture handles.
///
/// Must be idempotent: the same key always resolves to the same handle (or
/// stays absent until the asset is loaded).
pub trait TextureResolver {
    /// Resolves a key.
    fn resolve(&self, key: &str) -> Option<TextureHandle>;
}

/// Resolver that knows nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullResolver;

impl TextureResolver for NullResolver {
    fn resolve(&self, _key: &str) -> Option<TextureHandle> {
        None
    }
}

/// Static in-memory resolver.
#[derive(Debug, Clone, Default)]
pub struct MapTextureResolver {
    entries: HashMap<String, TextureHandle>,
}

impl MapTextureResolver {
    /// Creates an empty resolver.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a texture.
    pub fn insert(&mut self, key: impl Into<String>, handle: TextureHandle) {
        self.entries.insert(key.into(), handle);
    }

    /// Builder form of [`Self::insert`].
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, handle: TextureHandle) -> Self {
        self.insert(key, handle);
        self
    }

    /// Number of registered textures.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl TextureResolver for MapTextureResolver {
    fn resolve(&self, key: &str) -> Option<TextureHandle> {
        self.entries.get(key).copied()
    }
}

/// Per-node memoized texture lookup.
#[derive(Debug, Clone)]
pub struct TextureSlot {
    key: String,
    handle: Option<TextureHandle>,
    misses: u32,
}

impl TextureSlot {
    /// Creates an unresolved slot.
    #[must_use]
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            handle: None,
            misses: 0,
        }
    }

    /// Asset key.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Cached handle, if resolved.
    #[must_use]
    pub fn handle(&self) -> Option<TextureHandle> {
        self.handle
    }

    /// Number of failed resolution attempts so far.
    #[must_use]
    pub fn misses(&self) -> u32 {
        self.misses
    }

    /// Returns the cached handle or resolves it now.
    ///
    /// A miss is not cached; the next call tries again.
    pub fn resolve(&mut self, resolver: &dyn TextureResolver) -> Option<TextureHandle> {
        if let Some(handle) = self.handle {
            return Some(handle);
        }
        match resolver.resolve(&self.key) {
            Some(handle) => {
                tracing::trace!(key = %self.key, handle = handle.0, "texture resolved");
                self.handle = Some(handle);
                Some(handle)
            }
            None => {
                if self.misses == 0 {
                    tracing::debug!(key = %self.key, "texture missing, drawing nothing");
                }
                self.misses = self.misses.saturating_add(1);
                None
            }
        }
    }

    /// Forgets the cached handle (e.g. after the host reloads assets).
    pub fn invalidate(&mut self) {
        self.handle = None;
        self.misses = 0;
    }
}
