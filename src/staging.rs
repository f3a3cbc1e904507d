//! Staging area for assembling publishable content in isolation: the
//! throwaway directory the staging repository lives in, the recursive
//! artifact copy, and the synthesized redirect document.

use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, error, info};

/// Name of the redirect document written at the staging root.
pub const REDIRECT_FILE_NAME: &str = "index.html";

/// Ephemeral staging directory, exclusively owned by one publish run.
///
/// Creation fails if the path already exists; the directory is removed
/// on drop, so cleanup runs on every exit path of the pipeline,
/// success or failure.
#[derive(Debug)]
pub struct StagingDir {
    path: PathBuf,
}

impl StagingDir {
    pub fn create(path: &Path) -> io::Result<Self> {
        if path.exists() {
            error!(path = %path.display(), "Staging directory already exists");
            return Err(io::Error::new(
                io::ErrorKind::AlreadyExists,
                format!("staging directory {} already exists", path.display()),
            ));
        }
        fs::create_dir_all(path)?;
        info!(path = %path.display(), "Created staging directory");
        Ok(Self {
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for StagingDir {
    fn drop(&mut self) {
        match fs::remove_dir_all(&self.path) {
            Ok(()) => debug!(path = %self.path.display(), "Removed staging directory"),
            Err(e) => {
                // Best-effort: nothing sensible to do beyond reporting.
                error!(
                    error = ?e,
                    path = %self.path.display(),
                    "Failed to remove staging directory"
                );
            }
        }
    }
}

/// A file that could not be copied, naming the offending path.
#[derive(Debug)]
pub struct CopyFailure {
    pub path: PathBuf,
    pub source: io::Error,
}

impl fmt::Display for CopyFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "failed to copy {}: {}", self.path.display(), self.source)
    }
}

impl std::error::Error for CopyFailure {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.source)
    }
}

/// Recursively copies every file under `src` into `dst`, preserving the
/// relative structure. Returns the number of files copied.
pub fn copy_tree(src: &Path, dst: &Path) -> Result<usize, CopyFailure> {
    info!(src = %src.display(), dst = %dst.display(), "Copying output tree into staging area");
    let mut copied = 0usize;
    visit_dir(src, dst, &mut copied)?;
    info!(count = copied, "Copied output tree");
    Ok(copied)
}

fn visit_dir(src: &Path, dst: &Path, copied: &mut usize) -> Result<(), CopyFailure> {
    let entries = fs::read_dir(src).map_err(|e| CopyFailure {
        path: src.to_path_buf(),
        source: e,
    })?;
    for entry_res in entries {
        let entry = entry_res.map_err(|e| CopyFailure {
            path: src.to_path_buf(),
            source: e,
        })?;
        let from = entry.path();
        let to = dst.join(entry.file_name());
        let file_type = entry.file_type().map_err(|e| CopyFailure {
            path: from.clone(),
            source: e,
        })?;
        if file_type.is_dir() {
            fs::create_dir_all(&to).map_err(|e| CopyFailure {
                path: to.clone(),
                source: e,
            })?;
            visit_dir(&from, &to, copied)?;
        } else {
            fs::copy(&from, &to).map_err(|e| {
                error!(error = ?e, path = %from.display(), "Failed to copy file into staging area");
                CopyFailure {
                    path: from.clone(),
                    source: e,
                }
            })?;
            *copied += 1;
            debug!(path = %from.display(), "Copied file");
        }
    }
    Ok(())
}

/// Content of the redirect document: a meta-refresh forwarding the
/// viewer to the primary generated page.
pub fn redirect_content(project_name: &str) -> String {
    format!("<meta http-equiv=\"refresh\" content=\"0; url=./{project_name}/index.html\">\n")
}

/// Writes the redirect document at the staging root.
pub fn write_redirect(staging_root: &Path, project_name: &str) -> io::Result<PathBuf> {
    let path = staging_root.join(REDIRECT_FILE_NAME);
    fs::write(&path, redirect_content(project_name))?;
    info!(path = %path.display(), project_name, "Wrote redirect document");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::write;
    use tempfile::tempdir;

    #[test]
    fn redirect_content_points_at_project_directory() {
        let content = redirect_content("runas");
        assert!(
            content.contains("./runas/"),
            "Redirect must reference ./runas/, got: {content}"
        );
        assert!(content.contains("http-equiv=\"refresh\""));
    }

    #[test]
    fn staging_dir_refuses_existing_path() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("staging");
        fs::create_dir(&path).unwrap();

        let err = StagingDir::create(&path).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::AlreadyExists);
    }

    #[test]
    fn staging_dir_is_removed_on_drop() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("staging");

        let staging = StagingDir::create(&path).unwrap();
        write(staging.path().join("file.html"), "content").unwrap();
        assert!(path.exists());

        drop(staging);
        assert!(!path.exists(), "Staging directory must be gone after drop");
    }

    #[test]
    fn copy_tree_preserves_relative_structure() {
        let tmp = tempdir().unwrap();
        let src = tmp.path().join("src");
        let dst = tmp.path().join("dst");
        fs::create_dir_all(src.join("sub/deeper")).unwrap();
        fs::create_dir(&dst).unwrap();
        write(src.join("index.html"), "top").unwrap();
        write(src.join("sub/page.html"), "nested").unwrap();
        write(src.join("sub/deeper/style.css"), "css").unwrap();

        let copied = copy_tree(&src, &dst).unwrap();

        assert_eq!(copied, 3);
        assert_eq!(fs::read_to_string(dst.join("index.html")).unwrap(), "top");
        assert_eq!(
            fs::read_to_string(dst.join("sub/page.html")).unwrap(),
            "nested"
        );
        assert_eq!(
            fs::read_to_string(dst.join("sub/deeper/style.css")).unwrap(),
            "css"
        );
    }

    #[cfg(unix)]
    #[test]
    fn copy_tree_names_unreadable_file() {
        use std::os::unix::fs::PermissionsExt;

        let tmp = tempdir().unwrap();
        let src = tmp.path().join("src");
        let dst = tmp.path().join("dst");
        fs::create_dir(&src).unwrap();
        fs::create_dir(&dst).unwrap();
        let secret = src.join("secret.html");
        write(&secret, "hidden").unwrap();
        fs::set_permissions(&secret, fs::Permissions::from_mode(0o000)).unwrap();
        if fs::read(&secret).is_ok() {
            // Permission bits are not enforced here (e.g. running as root).
            return;
        }

        let err = copy_tree(&src, &dst).unwrap_err();
        assert_eq!(err.path, secret);
    }
}
