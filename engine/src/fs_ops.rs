//! Filesystem operations module.
//!
//! This module provides low-level operations for:
//! - Enumerating the regular files of a directory tree
//! - Copying files with modification-time preservation
//! - Creating directories recursively

use crate::error::SyncError;
use crate::model::{FileEntry, FileState};
use std::fs;
use std::io;
use std::path::Path;
use uuid::Uuid;

/// Enumerate every regular file reachable under `source`.
///
/// Directories do not become entries; each file records its path relative
/// to `source` and the destination path it maps to under
/// `destination_root`. Entry sizes are captured here, so totals computed
/// from the result stay fixed even if the source mutates afterwards.
///
/// # Errors
/// Returns SyncError if any directory in the tree cannot be read. A failed
/// walk aborts the whole enumeration; there is no per-directory recovery.
pub fn enumerate_files(
    source: &Path,
    destination_root: &Path,
) -> Result<Vec<FileEntry>, SyncError> {
    fn recurse(
        path: &Path,
        rel_path: &Path,
        destination_root: &Path,
        entries: &mut Vec<FileEntry>,
    ) -> Result<(), SyncError> {
        let dir = fs::read_dir(path).map_err(|e| SyncError::EnumerationFailed {
            path: path.to_path_buf(),
            source: e,
        })?;

        for entry in dir {
            let entry = entry.map_err(|e| SyncError::EnumerationFailed {
                path: path.to_path_buf(),
                source: e,
            })?;

            let metadata = entry.metadata().map_err(|e| SyncError::EnumerationFailed {
                path: path.to_path_buf(),
                source: e,
            })?;

            let rel_full_path = rel_path.join(entry.file_name());
            let entry_path = entry.path();

            if metadata.is_dir() {
                recurse(&entry_path, &rel_full_path, destination_root, entries)?;
            } else if metadata.is_file() {
                entries.push(FileEntry {
                    id: Uuid::new_v4(),
                    source_path: entry_path,
                    destination_path: destination_root.join(&rel_full_path),
                    relative_path: rel_full_path,
                    size: metadata.len(),
                    state: FileState::Pending,
                    error_code: None,
                    error_message: None,
                });
            }
            // Sockets, fifos and other special files are not copied.
        }
        Ok(())
    }

    let mut entries = Vec::new();
    recurse(source, Path::new(""), destination_root, &mut entries)?;
    Ok(entries)
}

/// Copy a file from source to destination, overwriting unconditionally.
///
/// The destination's parent directory is created if missing, and the
/// source's modification time is carried over on a best-effort basis.
///
/// # Returns
/// Number of bytes copied
///
/// # Errors
/// Returns SyncError if the copy fails
pub fn copy_file(src: &Path, dst: &Path) -> Result<u64, SyncError> {
    ensure_parent_dir_exists(dst)?;

    let mut src_file = fs::File::open(src).map_err(|e| SyncError::ReadError {
        path: src.to_path_buf(),
        source: e,
    })?;

    let src_metadata = src_file.metadata().map_err(|e| SyncError::ReadError {
        path: src.to_path_buf(),
        source: e,
    })?;
    let src_mtime = src_metadata.modified().ok();

    // File::create truncates an existing destination; conflicts are
    // overwritten unconditionally.
    let mut dst_file = fs::File::create(dst).map_err(|e| SyncError::WriteError {
        path: dst.to_path_buf(),
        source: e,
    })?;

    let bytes_copied = io::copy(&mut src_file, &mut dst_file).map_err(|e| {
        if e.kind() == io::ErrorKind::PermissionDenied {
            SyncError::WriteError {
                path: dst.to_path_buf(),
                source: e,
            }
        } else {
            SyncError::ReadError {
                path: src.to_path_buf(),
                source: e,
            }
        }
    })?;

    if let Some(mtime) = src_mtime {
        let _ = filetime::set_file_mtime(dst, filetime::FileTime::from_system_time(mtime));
    }

    Ok(bytes_copied)
}

/// Ensure the parent directory of a path exists, creating it if necessary.
///
/// # Errors
/// Returns SyncError if directory creation fails, or if the parent exists
/// but is not a directory.
pub fn ensure_parent_dir_exists(path: &Path) -> Result<(), SyncError> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => return Ok(()),
    };

    match fs::metadata(parent) {
        Ok(metadata) if metadata.is_dir() => Ok(()),
        Ok(_) => Err(SyncError::DirectoryCreationFailed {
            path: parent.to_path_buf(),
            source: io::Error::new(
                io::ErrorKind::InvalidInput,
                "parent path exists but is not a directory",
            ),
        }),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            fs::create_dir_all(parent).map_err(|e| SyncError::DirectoryCreationFailed {
                path: parent.to_path_buf(),
                source: e,
            })
        }
        Err(e) => Err(SyncError::DirectoryCreationFailed {
            path: parent.to_path_buf(),
            source: e,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_enumerate_flat_directory() {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
        let src = temp_dir.path().join("src");
        fs::create_dir(&src).expect("Failed to create src dir");

        let mut file1 = fs::File::create(src.join("file1.txt")).expect("Failed to create file1");
        file1.write_all(b"test data 1").expect("Failed to write file1");
        drop(file1);

        let mut file2 = fs::File::create(src.join("file2.txt")).expect("Failed to create file2");
        file2.write_all(b"test data 2").expect("Failed to write file2");
        drop(file2);

        let dst = temp_dir.path().join("dst");

        let entries = enumerate_files(&src, &dst).expect("Failed to enumerate");

        assert_eq!(entries.len(), 2, "Expected 2 files, got {}", entries.len());

        let total_size: u64 = entries.iter().map(|e| e.size).sum();
        assert_eq!(total_size, 22, "Expected 22 total bytes, got {}", total_size);
    }

    #[test]
    fn test_enumerate_nested_directory_maps_relative_paths() {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
        let src = temp_dir.path().join("src");
        fs::create_dir(&src).expect("Failed to create src dir");

        let subdir = src.join("subdir");
        fs::create_dir(&subdir).expect("Failed to create subdir");

        let mut file1 = fs::File::create(src.join("file1.txt")).expect("Failed to create file1");
        file1.write_all(b"data1").expect("Failed to write file1");
        drop(file1);

        let mut file2 = fs::File::create(subdir.join("file2.txt")).expect("Failed to create file2");
        file2.write_all(b"data2").expect("Failed to write file2");
        drop(file2);

        let dst = temp_dir.path().join("dst");

        let entries = enumerate_files(&src, &dst).expect("Failed to enumerate");

        // Only the 2 files; the subdirectory is not an entry.
        assert_eq!(entries.len(), 2);

        let nested = entries
            .iter()
            .find(|e| e.relative_path == Path::new("subdir").join("file2.txt"))
            .expect("nested file missing from enumeration");
        assert_eq!(nested.destination_path, dst.join("subdir").join("file2.txt"));
        assert_eq!(nested.size, 5);
        assert_eq!(nested.state, FileState::Pending);
    }

    #[test]
    fn test_enumerate_nonexistent_source() {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
        let src = temp_dir.path().join("nonexistent");
        let dst = temp_dir.path().join("dst");

        let result = enumerate_files(&src, &dst);
        assert!(result.is_err());
    }

    #[test]
    fn test_copy_file() {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
        let src_file = temp_dir.path().join("source.txt");
        let dst_file = temp_dir.path().join("dest.txt");

        let mut file = fs::File::create(&src_file).expect("Failed to create source");
        file.write_all(b"test content").expect("Failed to write source");
        drop(file);

        let bytes = copy_file(&src_file, &dst_file).expect("Failed to copy");
        assert_eq!(bytes, 12);

        let content = fs::read_to_string(&dst_file).expect("Failed to read dest");
        assert_eq!(content, "test content");
    }

    #[test]
    fn test_copy_file_overwrites_existing_destination() {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
        let src_file = temp_dir.path().join("source.txt");
        let dst_file = temp_dir.path().join("dest.txt");

        fs::write(&src_file, b"new").expect("Failed to write source");
        fs::write(&dst_file, b"previous contents").expect("Failed to write dest");

        copy_file(&src_file, &dst_file).expect("Failed to copy");

        let content = fs::read_to_string(&dst_file).expect("Failed to read dest");
        assert_eq!(content, "new");
    }

    #[test]
    fn test_ensure_parent_dir_exists() {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
        let path = temp_dir.path().join("subdir").join("file.txt");

        ensure_parent_dir_exists(&path).expect("Failed to create parent");

        assert!(path.parent().unwrap().exists());
    }

    #[test]
    fn test_ensure_parent_dir_rejects_file_in_the_way() {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
        let blocker = temp_dir.path().join("blocker");
        fs::write(&blocker, b"not a directory").expect("Failed to write blocker");

        let result = ensure_parent_dir_exists(&blocker.join("file.txt"));
        assert!(result.is_err());
    }
}
