use std::fs;
use std::path::{Path, PathBuf};

use multiclient_patcher::client::{TIBIA_770_MULTICLIENT, TIBIA_770_MULTICLIENT_OFFSET};
use multiclient_patcher::patcher::byte::ByteError;
use multiclient_patcher::patcher::file::{backup_path, BackupStatus, FileError, FilePatcher};
use multiclient_patcher::patcher::Patched;
use tempfile::TempDir;

/// Size of the fake client used by the scenarios
const CLIENT_SIZE: usize = 2_000_000;

/// Builds a fake client with `byte` at the patch offset and filler everywhere else
fn client_bytes(byte: u8) -> Vec<u8> {
    let mut data: Vec<u8> = (0..CLIENT_SIZE).map(|i| (i % 251) as u8).collect();
    data[TIBIA_770_MULTICLIENT_OFFSET] = byte;
    data
}

/// Writes a fake client into a fresh temporary directory
fn write_client(byte: u8) -> (TempDir, PathBuf, Vec<u8>) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("Tibia.exe");
    let data = client_bytes(byte);
    fs::write(&path, &data).unwrap();
    (dir, path, data)
}

/// Returns the offsets at which two buffers differ
fn diff(a: &[u8], b: &[u8]) -> Vec<usize> {
    assert_eq!(a.len(), b.len());
    (0..a.len()).filter(|&i| a[i] != b[i]).collect()
}

#[test]
/// A clean client gets a backup and exactly one changed byte
fn test_patch_original() {
    let (_dir, path, original) = write_client(0x7e);
    let patcher = FilePatcher::new(TIBIA_770_MULTICLIENT);

    let report = patcher.patch(&path).unwrap();
    assert_eq!(report.outcome, Patched::Applied);
    assert_eq!(report.backup_status, BackupStatus::Created);
    assert_eq!(report.backup, backup_path(&path));

    let patched = fs::read(&path).unwrap();
    assert_eq!(diff(&original, &patched), [693_596]);
    assert_eq!(patched[693_596], 0xeb);

    // backup holds the content from before the patch
    assert_eq!(fs::read(&report.backup).unwrap(), original);
}

#[test]
/// A second run finds the patch, writes nothing and keeps the backup
fn test_patch_twice() {
    let (_dir, path, original) = write_client(0x7e);
    let patcher = FilePatcher::new(TIBIA_770_MULTICLIENT);

    patcher.patch(&path).unwrap();
    let once = fs::read(&path).unwrap();

    let report = patcher.patch(&path).unwrap();
    assert_eq!(report.outcome, Patched::AlreadyApplied);
    assert_eq!(report.backup_status, BackupStatus::Existing);

    assert_eq!(fs::read(&path).unwrap(), once);
    assert_eq!(fs::read(backup_path(&path)).unwrap(), original);
}

#[test]
/// An unknown byte fails the patch without touching the file
fn test_patch_unknown_byte() {
    let (_dir, path, original) = write_client(0x00);
    let patcher = FilePatcher::new(TIBIA_770_MULTICLIENT);

    let err = patcher.patch(&path).unwrap_err();
    match err {
        FileError::Patch(ByteError::Mismatch {
            offset,
            expected,
            found,
        }) => {
            assert_eq!(offset, 0xa9d5c);
            assert_eq!(expected, 0x7e);
            assert_eq!(found, 0x00);
        }
        other => panic!("unexpected error: {other:?}"),
    }

    assert_eq!(fs::read(&path).unwrap(), original);
}

#[test]
/// Every byte other than the two known opcodes is rejected
fn test_patch_rejects_other_bytes() {
    let patcher = FilePatcher::new(TIBIA_770_MULTICLIENT);

    for byte in [0x00, 0x74, 0x75, 0x7d, 0x7f, 0xe9, 0xff] {
        let (_dir, path, original) = write_client(byte);
        assert!(matches!(
            patcher.patch(&path),
            Err(FileError::Patch(ByteError::Mismatch { found, .. })) if found == byte
        ));
        assert_eq!(fs::read(&path).unwrap(), original);
    }
}

#[test]
/// A missing target is reported before any backup is made
fn test_patch_missing() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("Tibia.exe");
    let patcher = FilePatcher::new(TIBIA_770_MULTICLIENT);

    match patcher.patch(&path) {
        Err(FileError::NotFound(missing)) => assert_eq!(missing, path),
        other => panic!("unexpected result: {other:?}"),
    }
    assert!(!backup_path(&path).exists());
}

#[test]
/// An existing backup is never rewritten, whatever the outcome
fn test_existing_backup_untouched() {
    let stale = b"an older backup".to_vec();
    let patcher = FilePatcher::new(TIBIA_770_MULTICLIENT);

    for byte in [0x7e, 0xeb, 0x00] {
        let (_dir, path, _) = write_client(byte);
        let backup = backup_path(&path);
        fs::write(&backup, &stale).unwrap();

        let _ = patcher.patch(&path);
        assert_eq!(fs::read(&backup).unwrap(), stale);
    }
}

#[test]
/// A file that ends before the patch offset is rejected and left alone
fn test_patch_short_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("Tibia.exe");
    fs::write(&path, [0x7e; 16]).unwrap();
    let patcher = FilePatcher::new(TIBIA_770_MULTICLIENT);

    assert!(matches!(
        patcher.patch(&path),
        Err(FileError::Patch(ByteError::OutOfBounds { len: 16, .. }))
    ));
    assert_eq!(fs::read(&path).unwrap(), [0x7e; 16]);
}

#[test]
/// The backup carries the modification time of the original
fn test_backup_metadata() {
    let (_dir, path, _) = write_client(0x7e);
    let patcher = FilePatcher::new(TIBIA_770_MULTICLIENT);
    let modified = fs::metadata(&path).unwrap().modified().unwrap();

    patcher.patch(&path).unwrap();

    let backup: &Path = &backup_path(&path);
    assert_eq!(fs::metadata(backup).unwrap().modified().unwrap(), modified);
}

#[test]
/// The backup step runs on its own and is recorded before the byte is checked
fn test_backup_then_apply() {
    let (_dir, path, original) = write_client(0x00);
    let patcher = FilePatcher::new(TIBIA_770_MULTICLIENT);

    let backup = patcher.backup(&path).unwrap();
    assert_eq!(backup.status, BackupStatus::Created);
    assert_eq!(backup.path, backup_path(&path));
    assert_eq!(fs::read(&backup.path).unwrap(), original);

    assert!(matches!(
        patcher.apply(&path),
        Err(FileError::Patch(ByteError::Mismatch { found: 0x00, .. }))
    ));
    assert_eq!(patcher.backup(&path).unwrap().status, BackupStatus::Existing);
    assert_eq!(fs::read(&path).unwrap(), original);
}

#[test]
/// Filesystem errors surface as I/O errors and leave nothing behind
fn test_patch_storage_failure() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("Tibia.exe");
    fs::create_dir(&path).unwrap();
    let patcher = FilePatcher::new(TIBIA_770_MULTICLIENT);

    assert!(matches!(patcher.patch(&path), Err(FileError::Io(_))));
    assert!(!backup_path(&path).exists());
}
