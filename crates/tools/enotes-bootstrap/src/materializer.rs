use crate::error::PersistenceError;
use async_trait::async_trait;
use enotes_types::BootstrapConfigRecord;
use serde::Serialize;
use std::fs;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Mode for a config file that does not exist yet.
#[cfg(unix)]
const NEW_FILE_MODE: u32 = 0o644;

/// Destination for the finished config record.
#[async_trait]
pub trait ConfigWriter: Send + Sync {
    async fn write(&self, record: &BootstrapConfigRecord, path: &Path) -> Result<(), PersistenceError>;
}

/// Writes the record as compact JSON to the local filesystem.
#[derive(Debug, Default, Clone, Copy)]
pub struct FileConfigWriter;

#[async_trait]
impl ConfigWriter for FileConfigWriter {
    async fn write(&self, record: &BootstrapConfigRecord, path: &Path) -> Result<(), PersistenceError> {
        let record = record.clone();
        let target = path.to_path_buf();
        tokio::task::spawn_blocking(move || write_atomic(&record, &target))
            .await
            .map_err(|e| PersistenceError::Interrupted {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?
    }
}

/// Replace `path` with the JSON form of `value` in one rename.
///
/// The data goes to a temp file next to the destination first. If anything
/// fails before the rename the temp file is dropped (and deleted), so the
/// destination keeps whatever it held before. An existing destination keeps
/// its permissions; a new one is created world-readable.
pub fn write_atomic<T: Serialize + ?Sized>(value: &T, path: &Path) -> Result<(), PersistenceError> {
    if path.file_name().is_none() {
        return Err(PersistenceError::InvalidPath {
            path: path.to_path_buf(),
            reason: "no file name".to_string(),
        });
    }
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    let io_err = |source: std::io::Error| PersistenceError::Io {
        path: path.to_path_buf(),
        source,
    };

    fs::create_dir_all(&dir).map_err(io_err)?;

    let tmp = tempfile::Builder::new()
        .prefix(".config-")
        .suffix(".tmp")
        .tempfile_in(&dir)
        .map_err(io_err)?;

    {
        let mut writer = BufWriter::new(tmp.as_file());
        serde_json::to_writer(&mut writer, value).map_err(|source| PersistenceError::Serialization {
            path: path.to_path_buf(),
            source,
        })?;
        writer.flush().map_err(io_err)?;
    }
    if let Some(permissions) = target_permissions(path).map_err(io_err)? {
        tmp.as_file().set_permissions(permissions).map_err(io_err)?;
    }
    tmp.as_file().sync_all().map_err(io_err)?;

    tmp.persist(path).map_err(|e| io_err(e.error))?;
    sync_dir(&dir).map_err(io_err)?;
    tracing::debug!(path = %path.display(), "config persisted");
    Ok(())
}

fn target_permissions(path: &Path) -> std::io::Result<Option<fs::Permissions>> {
    match fs::metadata(path) {
        Ok(meta) => Ok(Some(meta.permissions())),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(default_permissions()),
        Err(e) => Err(e),
    }
}

#[cfg(unix)]
fn default_permissions() -> Option<fs::Permissions> {
    use std::os::unix::fs::PermissionsExt;
    Some(fs::Permissions::from_mode(NEW_FILE_MODE))
}

#[cfg(not(unix))]
fn default_permissions() -> Option<fs::Permissions> {
    None
}

/// Make the rename itself durable.
#[cfg(unix)]
fn sync_dir(dir: &Path) -> std::io::Result<()> {
    fs::File::open(dir)?.sync_all()
}

#[cfg(not(unix))]
fn sync_dir(_dir: &Path) -> std::io::Result<()> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use serde::ser::{Error as _, SerializeMap, Serializer};

    fn record() -> BootstrapConfigRecord {
        BootstrapConfigRecord::new(
            &"CCC".parse().unwrap(),
            &"AAA?version=1".parse().unwrap(),
            &"BBB?version=1".parse().unwrap(),
        )
    }

    /// Emits one entry and then fails, after bytes have reached the writer.
    struct FailsMidway;

    impl Serialize for FailsMidway {
        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            let mut map = serializer.serialize_map(None)?;
            map.serialize_entry("definitions", &"x".repeat(64))?;
            Err(S::Error::custom("injected failure"))
        }
    }

    fn leftovers(dir: &Path) -> Vec<String> {
        fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .filter(|name| name.starts_with(".config-"))
            .collect()
    }

    #[tokio::test]
    async fn writes_compact_json_creating_parents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("src").join("config.json");

        FileConfigWriter.write(&record(), &path).await.unwrap();

        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            r#"{"definitions":{"notes":"ceramic://CCC"},"schemas":{"EncryptedNote":"ceramic://AAA?version=1","NotesList":"ceramic://BBB?version=1"}}"#
        );
        assert!(leftovers(path.parent().unwrap()).is_empty());
    }

    #[test]
    fn replaces_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "{\"old\":true}").unwrap();

        write_atomic(&record(), &path).unwrap();

        let parsed: BootstrapConfigRecord = serde_json::from_slice(&fs::read(&path).unwrap()).unwrap();
        assert_eq!(parsed, record());
    }

    #[test]
    fn failed_write_leaves_no_file_behind() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        assert_matches!(
            write_atomic(&FailsMidway, &path),
            Err(PersistenceError::Serialization { .. })
        );
        assert!(!path.exists());
        assert!(leftovers(dir.path()).is_empty());
    }

    #[test]
    fn failed_write_keeps_previous_contents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "previous").unwrap();

        assert!(write_atomic(&FailsMidway, &path).is_err());
        assert_eq!(fs::read_to_string(&path).unwrap(), "previous");
        assert!(leftovers(dir.path()).is_empty());
    }

    #[cfg(unix)]
    fn mode(path: &Path) -> u32 {
        use std::os::unix::fs::PermissionsExt;
        fs::metadata(path).unwrap().permissions().mode() & 0o777
    }

    #[cfg(unix)]
    #[test]
    fn rewrite_keeps_existing_mode() {
        use std::os::unix::fs::PermissionsExt;
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        for existing in [0o644, 0o640] {
            fs::write(&path, "{}").unwrap();
            fs::set_permissions(&path, fs::Permissions::from_mode(existing)).unwrap();

            write_atomic(&record(), &path).unwrap();
            assert_eq!(mode(&path), existing);
        }
    }

    #[cfg(unix)]
    #[test]
    fn new_file_is_world_readable() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        write_atomic(&record(), &path).unwrap();
        assert_eq!(mode(&path), 0o644);
    }

    #[test]
    fn path_without_file_name_is_invalid() {
        assert_matches!(
            write_atomic(&record(), Path::new("/")),
            Err(PersistenceError::InvalidPath { .. })
        );
    }
}
