use std::io;
use std::path::{Component, Path, PathBuf};

/// Makes `path` absolute against the current directory and folds `.` and
/// `..` components lexically. Symlinks are not resolved.
pub fn absolutize(path: &Path) -> io::Result<PathBuf> {
    if path.is_absolute() {
        return Ok(normalize(path));
    }
    Ok(normalize(&std::env::current_dir()?.join(path)))
}

fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                // `pop` refuses to climb above the root, like `/..` does.
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}
