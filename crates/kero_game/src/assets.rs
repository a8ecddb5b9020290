use std::fs;
use std::path::{Component, Path, PathBuf};

/// Where level files and images come from. The game only ever asks for a
/// file by its bare name (`001.tmj`, `tileset.png`).
pub trait AssetSource {
    fn read(&self, name: &str) -> Result<Vec<u8>, String>;
}

/// Assets stored as plain files under one directory.
pub struct DirAssets {
    root: PathBuf,
}

impl DirAssets {
    pub fn new(root: impl Into<PathBuf>) -> Result<Self, String> {
        let root = root.into();
        if !root.is_dir() {
            return Err(format!(
                "Asset directory {} does not exist",
                root.display()
            ));
        }
        Ok(Self { root })
    }

    fn resolve(&self, name: &str) -> Result<PathBuf, String> {
        let relative = Path::new(name);
        let escapes = relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
        if name.is_empty() || escapes {
            return Err(format!("Invalid asset name '{name}'"));
        }
        Ok(self.root.join(relative))
    }
}

impl AssetSource for DirAssets {
    fn read(&self, name: &str) -> Result<Vec<u8>, String> {
        let path = self.resolve(name)?;
        log::debug!("Reading asset {}", path.display());
        fs::read(&path).map_err(|e| format!("Failed to read {}: {e}", path.display()))
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::time::{SystemTime, UNIX_EPOCH};

    /// In-memory assets for tests.
    #[derive(Default)]
    pub(crate) struct MemoryAssets {
        pub files: HashMap<String, Vec<u8>>,
    }

    impl MemoryAssets {
        pub(crate) fn insert(&mut self, name: &str, bytes: impl Into<Vec<u8>>) {
            self.files.insert(name.to_string(), bytes.into());
        }
    }

    impl AssetSource for MemoryAssets {
        fn read(&self, name: &str) -> Result<Vec<u8>, String> {
            self.files
                .get(name)
                .cloned()
                .ok_or_else(|| format!("Failed to read {name}: not found"))
        }
    }

    fn temp_dir_path(name_hint: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("system time before unix epoch")
            .as_nanos();
        std::env::temp_dir().join(format!(
            "kero_assets_test_{}_{}_{}",
            name_hint,
            std::process::id(),
            nanos
        ))
    }

    #[test]
    fn dir_assets_reads_files() {
        let dir = temp_dir_path("read");
        fs::create_dir_all(&dir).expect("create temp dir");
        fs::write(dir.join("001.tmj"), b"{}").expect("write asset");

        let assets = DirAssets::new(&dir).expect("dir exists");
        assert_eq!(assets.read("001.tmj").expect("asset readable"), b"{}");
        let err = assets.read("002.tmj").expect_err("missing asset");
        assert!(err.starts_with("Failed to read"));

        let _ = fs::remove_dir_all(dir);
    }

    #[test]
    fn dir_assets_rejects_escaping_names() {
        let dir = temp_dir_path("escape");
        fs::create_dir_all(&dir).expect("create temp dir");
        let assets = DirAssets::new(&dir).expect("dir exists");
        assert!(assets.read("../secret").is_err());
        assert!(assets.read("/etc/passwd").is_err());
        assert!(assets.read("").is_err());
        let _ = fs::remove_dir_all(dir);
    }

    #[test]
    fn missing_root_is_an_error() {
        assert!(DirAssets::new(temp_dir_path("missing")).is_err());
    }
}
