use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// The on-disk naming convention for a rotated slot: `<path>.<n>` for
/// `n` in `1..=max_rotations`, oldest last.
pub(crate) fn rotated_path(path: &Path, index: u32) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(format!(".{index}"));
    PathBuf::from(name)
}

/// Rotate `path` if it exists and is at least `max_size_bytes` long.
///
/// Rotation shifts `path.(n-1)` to `path.n` for `n` from `max_rotations`
/// down to `2`, dropping whatever already occupied `path.max_rotations`,
/// then moves `path` itself to `path.1` and lets the caller create a
/// fresh `path`. A missing intermediate slot is not an error: rotation
/// is best-effort per slot, not all-or-nothing.
pub(crate) fn rotate_if_needed(
    path: &Path,
    max_size_bytes: u64,
    max_rotations: u32,
) -> io::Result<()> {
    let needs_rotation = match fs::metadata(path) {
        Ok(meta) => meta.len() >= max_size_bytes,
        Err(e) if e.kind() == io::ErrorKind::NotFound => false,
        Err(e) => return Err(e),
    };
    if !needs_rotation {
        return Ok(());
    }
    rotate(path, max_rotations)
}

fn rotate(path: &Path, max_rotations: u32) -> io::Result<()> {
    if max_rotations == 0 {
        // No history retained; drop the current file outright.
        return match fs::remove_file(path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e),
        };
    }

    let oldest = rotated_path(path, max_rotations);
    match fs::remove_file(&oldest) {
        Ok(()) => {}
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => return Err(e),
    }

    let mut index = max_rotations;
    while index > 1 {
        let from = rotated_path(path, index - 1);
        let to = rotated_path(path, index);
        match fs::rename(&from, &to) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => return Err(e),
        }
        index -= 1;
    }

    fs::rename(path, rotated_path(path, 1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::tempdir;

    fn write_file(path: &Path, contents: &str) {
        let mut file = fs::File::create(path).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
    }

    #[test]
    fn no_rotation_when_file_missing() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("audit.log");
        rotate_if_needed(&path, 10, 3).unwrap();
        assert!(!path.exists());
    }

    #[test]
    fn no_rotation_when_under_threshold() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("audit.log");
        write_file(&path, "short");
        rotate_if_needed(&path, 1024, 3).unwrap();
        assert!(path.exists());
        assert!(!rotated_path(&path, 1).exists());
    }

    #[test]
    fn rotates_at_exact_threshold() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("audit.log");
        write_file(&path, "0123456789");
        rotate_if_needed(&path, 10, 3).unwrap();
        assert!(!path.exists());
        assert!(rotated_path(&path, 1).exists());
    }

    #[test]
    fn rotation_chain_shifts_existing_slots() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("audit.log");
        write_file(&rotated_path(&path, 1), "gen1");
        write_file(&rotated_path(&path, 2), "gen2");
        write_file(&path, "0123456789");

        rotate_if_needed(&path, 10, 3).unwrap();

        assert!(!path.exists());
        assert_eq!(fs::read_to_string(rotated_path(&path, 1)).unwrap(), "0123456789");
        assert_eq!(fs::read_to_string(rotated_path(&path, 2)).unwrap(), "gen1");
        assert_eq!(fs::read_to_string(rotated_path(&path, 3)).unwrap(), "gen2");
    }

    #[test]
    fn oldest_slot_is_dropped_when_full() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("audit.log");
        write_file(&rotated_path(&path, 1), "gen1");
        write_file(&rotated_path(&path, 2), "gen2");
        write_file(&rotated_path(&path, 3), "gen3-should-be-dropped");
        write_file(&path, "0123456789");

        rotate_if_needed(&path, 10, 3).unwrap();

        assert_eq!(fs::read_to_string(rotated_path(&path, 3)).unwrap(), "gen2");
        assert_ne!(
            fs::read_to_string(rotated_path(&path, 3)).unwrap(),
            "gen3-should-be-dropped"
        );
    }

    #[test]
    fn max_rotations_one_keeps_only_current_generation() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("audit.log");
        write_file(&path, "0123456789");

        rotate_if_needed(&path, 10, 1).unwrap();

        assert!(!path.exists());
        assert_eq!(fs::read_to_string(rotated_path(&path, 1)).unwrap(), "0123456789");
        assert!(!rotated_path(&path, 2).exists());
    }

    #[test]
    fn max_rotations_zero_discards_current_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("audit.log");
        write_file(&path, "0123456789");

        rotate_if_needed(&path, 10, 0).unwrap();

        assert!(!path.exists());
        assert!(!rotated_path(&path, 1).exists());
    }
}
