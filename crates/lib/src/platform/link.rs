//! Symlink creation.

use std::io;
use std::path::Path;

/// Create a symlink at `link` pointing to the file `target`.
///
/// An existing file or link at `link` is replaced.
pub fn link_file(target: &Path, link: &Path) -> io::Result<()> {
  match std::fs::symlink_metadata(link) {
    Ok(meta) if meta.is_dir() => {
      return Err(io::Error::new(
        io::ErrorKind::AlreadyExists,
        format!("{} is a directory", link.display()),
      ));
    }
    Ok(_) => std::fs::remove_file(link)?,
    Err(e) if e.kind() == io::ErrorKind::NotFound => {}
    Err(e) => return Err(e),
  }

  #[cfg(unix)]
  {
    std::os::unix::fs::symlink(target, link)
  }
  #[cfg(windows)]
  {
    std::os::windows::fs::symlink_file(target, link)
  }
}

#[cfg(test)]
#[cfg(unix)]
mod tests {
  use super::*;
  use tempfile::TempDir;

  #[test]
  fn links_point_at_target() {
    let temp = TempDir::new().unwrap();
    let target = temp.path().join("target.txt");
    std::fs::write(&target, "content").unwrap();
    let link = temp.path().join("link.txt");

    link_file(&target, &link).unwrap();

    assert_eq!(std::fs::read_link(&link).unwrap(), target);
    assert_eq!(std::fs::read_to_string(&link).unwrap(), "content");
  }

  #[test]
  fn existing_link_is_replaced() {
    let temp = TempDir::new().unwrap();
    let first = temp.path().join("first.txt");
    let second = temp.path().join("second.txt");
    std::fs::write(&first, "first").unwrap();
    std::fs::write(&second, "second").unwrap();
    let link = temp.path().join("link.txt");

    link_file(&first, &link).unwrap();
    link_file(&second, &link).unwrap();

    assert_eq!(std::fs::read_to_string(&link).unwrap(), "second");
  }

  #[test]
  fn refuses_to_replace_directory() {
    let temp = TempDir::new().unwrap();
    let target = temp.path().join("target.txt");
    std::fs::write(&target, "content").unwrap();
    let dir = temp.path().join("dir");
    std::fs::create_dir(&dir).unwrap();

    let err = link_file(&target, &dir).unwrap_err();
    assert_eq!(err.kind(), io::ErrorKind::AlreadyExists);
  }
}
