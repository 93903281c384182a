use std::{
    fs,
    path::{Component, Path, PathBuf},
};

use tracing::trace;

use super::{resource_path, Binary, ClassFileLocator};

/// A locator for class files stored below a directory root, such as a compiler output
/// folder.
///
/// `foo.Bar` is looked up as `<root>/foo/Bar.class`.
#[derive(Debug, Clone)]
pub struct FolderLocator {
    root: PathBuf,
}

impl FolderLocator {
    /// Create a locator rooted at `root`. The directory is not required to exist.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        FolderLocator { root: root.into() }
    }

    /// The directory root.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl ClassFileLocator for FolderLocator {
    fn locate(&self, name: &str) -> Binary {
        let relative = resource_path(name);
        let relative = Path::new(&relative);
        if !relative
            .components()
            .all(|component| matches!(component, Component::Normal(_)))
        {
            trace!(name, "class file path leaves the root");
            return Binary::Invalid(name.to_string());
        }

        let path = self.root.join(relative);
        match fs::read(&path) {
            Ok(bytes) => Binary::Valid(bytes.into()),
            Err(error) => {
                trace!(name, path = %path.display(), %error, "class file not readable");
                Binary::Invalid(name.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_nested_path() {
        let root = tempfile::tempdir().unwrap();
        let package = root.path().join("foo/bar");
        fs::create_dir_all(&package).unwrap();
        fs::write(package.join("Baz.class"), [0xCA, 0xFE]).unwrap();

        let locator = FolderLocator::new(root.path());
        assert_eq!(locator.root(), root.path());
        assert_eq!(
            locator.locate("foo.bar.Baz").bytes(),
            Some(&[0xCA_u8, 0xFE][..])
        );
        assert!(!locator.locate("foo.bar.Missing").is_valid());
    }

    #[test]
    fn stays_below_root() {
        let outside = tempfile::tempdir().unwrap();
        fs::write(outside.path().join("Secret.class"), [0xCA, 0xFE]).unwrap();
        let root = outside.path().join("root");
        fs::create_dir_all(&root).unwrap();

        let locator = FolderLocator::new(&root);
        let absolute = format!("{}.Secret", outside.path().display()).replace('/', ".");
        assert!(absolute.starts_with('.'));
        assert!(!locator.locate(&absolute).is_valid());
        assert!(!locator.locate("...Secret").is_valid());
        assert!(!locator.locate("..Secret").is_valid());
    }

    #[test]
    fn missing_root() {
        let locator = FolderLocator::new("/definitely/not/a/class/root");
        assert!(!locator.locate("java.lang.Object").is_valid());
    }
}
