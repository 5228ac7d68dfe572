use camino::{Utf8Component, Utf8Path};

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum PathError {
    #[error("{path} is not under {root}")]
    OutsideRoot { path: String, root: String },
    #[error("{0} has no path below the root")]
    Empty(String),
}

pub struct AssetPath;

impl AssetPath {
    /// Path of `path` below `root`, components joined with forward slashes.
    /// This is the wire format appended to the remote base.
    ///
    /// Stripping is done per component, so `/data/images` and `/data/images/`
    /// give the same result and the first segment is never clipped.
    pub fn relative(root: &Utf8Path, path: &Utf8Path) -> Result<String, PathError> {
        let rest = path
            .strip_prefix(root)
            .map_err(|_| PathError::OutsideRoot {
                path: path.to_string(),
                root: root.to_string(),
            })?;

        let parts: Vec<&str> = rest
            .components()
            .filter_map(|c| match c {
                Utf8Component::Normal(s) => Some(s),
                _ => None,
            })
            .collect();

        if parts.is_empty() {
            return Err(PathError::Empty(path.to_string()));
        }
        Ok(parts.join("/"))
    }

    /// `remote_base` + `/` + `rel`, with exactly one separator between them.
    pub fn destination(remote_base: &str, rel: &str) -> String {
        let base = remote_base.trim_end_matches('/');
        let rel = rel.trim_start_matches('/');
        format!("{}/{}", base, rel)
    }

    /// Same shape check the store applies to a remote file argument:
    /// absolute, non-empty and not a directory.
    pub fn verify_destination(dest: &str) -> bool {
        dest.len() > 1 && dest.starts_with('/') && !dest.ends_with('/')
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn destination_trims_base_slash() {
        assert_eq!(AssetPath::destination("/cdn/", "a.jpg"), "/cdn/a.jpg");
        assert_eq!(AssetPath::destination("/cdn", "a.jpg"), "/cdn/a.jpg");
    }

    #[test]
    fn verify_destination_rejects_folders() {
        assert!(AssetPath::verify_destination("/cdn/a.jpg"));
        assert!(!AssetPath::verify_destination("/cdn/"));
        assert!(!AssetPath::verify_destination("cdn/a.jpg"));
        assert!(!AssetPath::verify_destination("/"));
        assert!(!AssetPath::verify_destination(""));
    }
}
