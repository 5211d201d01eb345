use std::path::{Path, PathBuf};

use dashmap::DashMap;

use crate::error::{NameplateError, NameplateResult};
use crate::identity::Identity;
use crate::palette::Rgb;

/// Cache namespace version. Bump on ANY change to the avatar rendering recipe
/// so old and new renders never collide under the same path.
pub const FORMAT_VERSION: u32 = 1;

/// Composite key identifying one renderable artifact.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub letters: String,
    pub color: Rgb,
    pub size: u32,
}

/// Deterministic, collision-free cache path construction for rendered
/// avatars, with compute-once memoization of resolved paths.
///
/// Layout: `<root>/nameplate/<FORMAT_VERSION>/<letters>/<r>_<g>_<b>/<size>.png`.
///
/// The path for a key is a pure function of the key plus the cache root, so
/// entries are never removed or updated. [`AvatarCache::resolve`] creates the
/// destination directory as a side effect; the supplier is idempotent
/// (`create_dir_all` tolerates existing directories), so speculative
/// re-invocation under contention is harmless and every call for the same key
/// observes the identical path.
#[derive(Debug)]
pub struct AvatarCache {
    root: PathBuf,
    resolved: DashMap<CacheKey, PathBuf>,
}

impl AvatarCache {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            resolved: DashMap::new(),
        }
    }

    /// Versioned base directory for all cached avatars.
    pub fn base_path(&self) -> PathBuf {
        self.root.join("nameplate").join(FORMAT_VERSION.to_string())
    }

    /// Pure path construction; touches nothing on disk.
    pub fn path_for(&self, identity: &Identity, size: u32) -> PathBuf {
        self.base_path()
            .join(&identity.letters)
            .join(identity.color.path_segment())
            .join(format!("{size}.png"))
    }

    /// Resolve the cache path for `(identity, size)`, creating the destination
    /// directory on first resolution of the key.
    ///
    /// Idempotent and safe under arbitrary concurrent calls: at most one
    /// directory-creation attempt per key is observable, and repeated calls
    /// always return the same path. Directory creation failure surfaces as a
    /// filesystem error, distinct from render errors.
    pub fn resolve(&self, identity: &Identity, size: u32) -> NameplateResult<PathBuf> {
        let key = CacheKey {
            letters: identity.letters.clone(),
            color: identity.color,
            size,
        };
        let entry = self.resolved.entry(key).or_try_insert_with(|| {
            let path = self.path_for(identity, size);
            if let Some(parent) = path.parent() {
                create_dir_idempotent(parent)?;
            }
            Ok::<_, NameplateError>(path)
        })?;
        Ok(entry.value().clone())
    }

    /// Whether a rendered file already exists for `(identity, size)`.
    ///
    /// Checks the file only; never creates directories, so it is free of side
    /// effects.
    pub fn exists(&self, identity: &Identity, size: u32) -> bool {
        self.path_for(identity, size).is_file()
    }
}

fn create_dir_idempotent(dir: &Path) -> NameplateResult<()> {
    std::fs::create_dir_all(dir).map_err(|e| {
        NameplateError::filesystem(format!(
            "failed to create cache directory '{}': {e}",
            dir.display()
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity() -> Identity {
        Identity {
            letters: "T".to_string(),
            color: Rgb::new(226, 95, 81),
        }
    }

    fn temp_root(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!(
            "nameplate_{name}_{}_{}",
            std::process::id(),
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap()
                .as_nanos()
        ))
    }

    #[test]
    fn path_mapping_is_versioned_and_collision_free() {
        let cache = AvatarCache::new("tmp");
        assert_eq!(
            cache.path_for(&identity(), 64),
            PathBuf::from("tmp/nameplate/1/T/226_95_81/64.png")
        );
    }

    #[test]
    fn resolve_creates_directories_and_is_idempotent() {
        let root = temp_root("resolve");
        let cache = AvatarCache::new(&root);

        let first = cache.resolve(&identity(), 64).unwrap();
        let second = cache.resolve(&identity(), 64).unwrap();
        assert_eq!(first, second);
        assert!(first.parent().unwrap().is_dir());

        std::fs::remove_dir_all(&root).ok();
    }

    #[test]
    fn distinct_sizes_resolve_to_distinct_paths() {
        let root = temp_root("sizes");
        let cache = AvatarCache::new(&root);

        let a = cache.resolve(&identity(), 64).unwrap();
        let b = cache.resolve(&identity(), 128).unwrap();
        assert_ne!(a, b);

        std::fs::remove_dir_all(&root).ok();
    }

    #[test]
    fn exists_checks_the_file_without_creating_directories() {
        let root = temp_root("exists");
        let cache = AvatarCache::new(&root);

        assert!(!cache.exists(&identity(), 64));
        assert!(!root.exists());

        let path = cache.resolve(&identity(), 64).unwrap();
        assert!(!cache.exists(&identity(), 64));
        std::fs::write(&path, b"png").unwrap();
        assert!(cache.exists(&identity(), 64));

        std::fs::remove_dir_all(&root).ok();
    }
}
