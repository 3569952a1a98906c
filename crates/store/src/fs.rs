//! Filesystem-backed table store: `<dir>/<id>.csv`.

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

use table::codec::{self, ReadOptions};
use table::Table;
use tracing::info;
use uuid::Uuid;

use crate::{StoreError, TableStore};

/// Uploaded source files live in `upload_dir`, produced result files in
/// `output_dir`. Both are created on construction.
#[derive(Debug, Clone)]
pub struct FsTableStore {
    upload_dir: PathBuf,
    output_dir: PathBuf,
}

impl FsTableStore {
    pub fn new(
        upload_dir: impl Into<PathBuf>,
        output_dir: impl Into<PathBuf>,
    ) -> Result<FsTableStore, StoreError> {
        let store = FsTableStore {
            upload_dir: upload_dir.into(),
            output_dir: output_dir.into(),
        };
        std::fs::create_dir_all(&store.upload_dir)?;
        std::fs::create_dir_all(&store.output_dir)?;
        Ok(store)
    }

    pub fn upload_path(&self, id: &str) -> PathBuf {
        self.upload_dir.join(format!("{id}.csv"))
    }

    pub fn output_path(&self, id: &str) -> PathBuf {
        self.output_dir.join(format!("{id}.csv"))
    }

    /// Persist uploaded CSV bytes under a fresh upload id.
    pub fn save_upload(&self, bytes: &[u8]) -> Result<String, StoreError> {
        let id = Uuid::new_v4().to_string();
        std::fs::write(self.upload_path(&id), bytes)?;
        info!("saved upload {id} ({} bytes)", bytes.len());
        Ok(id)
    }

    pub fn has_upload(&self, id: &str) -> bool {
        self.upload_path(id).exists()
    }

    pub fn delete_upload(&self, id: &str) -> Result<(), StoreError> {
        let path = self.upload_path(id);
        if !path.exists() {
            return Err(StoreError::NotFound(id.to_string()));
        }
        std::fs::remove_file(path)?;
        info!("deleted upload {id}");
        Ok(())
    }

    fn open(path: &Path, id: &str) -> Result<File, StoreError> {
        if !path.exists() {
            return Err(StoreError::NotFound(id.to_string()));
        }
        Ok(File::open(path)?)
    }
}

impl TableStore for FsTableStore {
    fn read_csv(&self, id: &str, options: &ReadOptions) -> Result<Table, StoreError> {
        let path = self.upload_path(id);
        let file = Self::open(&path, id)?;
        Ok(codec::read_csv(BufReader::new(file), options)?)
    }

    fn write_csv(&self, table: &Table) -> Result<String, StoreError> {
        let id = Uuid::new_v4().to_string();
        let path = self.output_path(&id);
        let file = File::create(&path)?;
        codec::write_csv(BufWriter::new(file), table)?;
        info!("wrote output {id} ({} rows)", table.num_rows());
        Ok(id)
    }
}
