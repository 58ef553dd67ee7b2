use std::path::{Path, PathBuf};

use plfc::{store::STORE_FILENAME, FileStore};

pub const LOG_FILE_NAME: &str = "plfc-register.log";

#[derive(Clone, Debug, PartialEq)]
pub struct DataDirectory(PathBuf);

impl DataDirectory {
    pub fn new(p: PathBuf) -> Self {
        DataDirectory(p)
    }

    pub fn exists(&self) -> bool {
        self.0.as_path().exists()
    }

    pub fn init(&self) -> Result<(), std::io::Error> {
        #[cfg(unix)]
        return {
            use std::fs::DirBuilder;
            use std::os::unix::fs::DirBuilderExt;

            let mut builder = DirBuilder::new();
            builder.mode(0o700).recursive(true).create(self.path())
        };

        #[cfg(not(unix))]
        return { std::fs::create_dir_all(self.path()) };
    }

    pub fn path(&self) -> &Path {
        self.0.as_path()
    }

    pub fn store_file_path(&self) -> PathBuf {
        let mut path = self.0.clone();
        path.push(STORE_FILENAME);
        path
    }

    pub fn log_file_path(&self) -> PathBuf {
        let mut path = self.0.clone();
        path.push(LOG_FILE_NAME);
        path
    }

    /// The local store holding the registration records.
    pub fn store(&self) -> FileStore {
        FileStore::new(self.store_file_path())
    }
}
