use crate::error::ShellError;
use std::path::{Path, PathBuf};

/// Resolves the `~` and `~/...` shorthands used by `cd`.
#[derive(Clone)]
pub struct PathExpander;

impl Default for PathExpander {
    fn default() -> Self {
        Self::new()
    }
}

impl PathExpander {
    pub fn new() -> Self {
        Self
    }

    pub fn expand(&self, path: &str) -> Result<PathBuf, ShellError> {
        match path.strip_prefix('~') {
            Some("") => self.home_dir(),
            Some(rest) => match rest.strip_prefix('/') {
                Some(stripped) => Ok(stripped
                    .split('/')
                    .filter(|part| !part.is_empty())
                    .fold(self.home_dir()?, |home, part| home.join(part))),
                // "~user" forms are passed through untouched.
                None => Ok(Path::new(path).to_path_buf()),
            },
            None => Ok(Path::new(path).to_path_buf()),
        }
    }

    pub fn home_dir(&self) -> Result<PathBuf, ShellError> {
        dirs::home_dir().ok_or(ShellError::HomeDirNotFound)
    }
}
