//! Lexical mapping of request paths onto the working directory.
//!
//! Nothing here canonicalises the result: `..` segments and doubled
//! separators pass straight through to the filesystem join, so a request can
//! name files outside the working directory.

use std::path::{Path, PathBuf};

const SEPARATORS: [char; 2] = ['/', '\\'];

#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedTarget {
    pub path: PathBuf,
    pub is_valid: bool,
}

pub fn resolve_target(url_path: &str, working_directory: &Path, home_page: &str) -> ResolvedTarget {
    let path = resolve_path(url_path, working_directory, home_page);
    let is_valid = is_servable(&path);
    ResolvedTarget { path, is_valid }
}

pub fn resolve_path(url_path: &str, working_directory: &Path, home_page: &str) -> PathBuf {
    let local_path = if is_root(url_path) { home_page } else { url_path };
    // A rooted home page would replace the whole path on join.
    let default_file = home_page.trim_start_matches(SEPARATORS);

    match local_path.strip_prefix(SEPARATORS) {
        Some(remainder) if has_extension(Path::new(remainder)) => working_directory.join(remainder),
        Some(remainder) => working_directory.join(remainder).join(default_file),
        None if has_extension(Path::new(local_path)) => PathBuf::from(local_path),
        None => Path::new(local_path).join(default_file),
    }
}

/// A missing file is still servable when it carries an extension other than
/// `html`; the read that follows turns it into a 404.
pub fn is_servable(path: &Path) -> bool {
    if path.is_file() {
        true
    } else if !has_extension(path) {
        false
    } else {
        extension(path) != Some("html")
    }
}

pub fn extension(path: &Path) -> Option<&str> {
    path.extension()
        .and_then(|ext| ext.to_str())
        .filter(|ext| !ext.is_empty())
}

fn has_extension(path: &Path) -> bool {
    path.extension().is_some_and(|ext| !ext.is_empty())
}

fn is_root(url_path: &str) -> bool {
    url_path.is_empty() || url_path == "/" || url_path == "\\"
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "local-web-server-resolver-{}-{}",
            name,
            std::process::id()
        ));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn root_resolves_to_home_page() {
        let wd = Path::new("/srv/www");

        assert_eq!(resolve_path("/", wd, "index.html"), resolve_path("index.html", wd, "index.html"));
        assert_eq!(resolve_path("", wd, "index.html"), PathBuf::from("index.html"));
        assert_eq!(resolve_path("\\", wd, "home.htm"), PathBuf::from("home.htm"));
    }

    #[test]
    fn rooted_home_page_lands_in_working_directory() {
        let wd = Path::new("/srv/www");
        assert_eq!(resolve_path("/", wd, "/index.html"), wd.join("index.html"));
    }

    #[test]
    fn rooted_file_is_joined_with_working_directory() {
        let wd = Path::new("/srv/www");
        assert_eq!(resolve_path("/assets/app.js", wd, "index.html"), wd.join("assets/app.js"));
        assert_eq!(resolve_path("\\style.css", wd, "index.html"), wd.join("style.css"));
    }

    #[test]
    fn rooted_directory_gets_home_page_appended() {
        let wd = Path::new("/srv/www");
        assert_eq!(resolve_path("/docs", wd, "index.html"), wd.join("docs").join("index.html"));
        assert_eq!(resolve_path("/docs/", wd, "start.html"), wd.join("docs").join("start.html"));
    }

    #[test]
    fn rooted_home_page_is_appended_inside_directory() {
        let wd = Path::new("/srv/www");
        assert_eq!(
            resolve_path("/docs", wd, "/index.html"),
            PathBuf::from("/srv/www/docs/index.html")
        );
        assert_eq!(
            resolve_path("pages", wd, "\\start.html"),
            PathBuf::from("pages/start.html")
        );
    }

    #[test]
    fn relative_paths_ignore_working_directory() {
        let wd = Path::new("/srv/www");
        assert_eq!(resolve_path("not_found.html", wd, "index.html"), PathBuf::from("not_found.html"));
        assert_eq!(resolve_path("pages", wd, "index.html"), PathBuf::from("pages/index.html"));
    }

    #[test]
    fn parent_segments_are_not_normalised() {
        let wd = Path::new("/srv/www");
        assert_eq!(resolve_path("/../secret.txt", wd, "index.html"), wd.join("../secret.txt"));
    }

    #[test]
    fn existing_files_are_servable_whatever_the_extension() {
        let dir = scratch_dir("existing");
        for name in ["page.html", "Makefile", "data.bin"] {
            let path = dir.join(name);
            fs::write(&path, b"x").unwrap();
            assert!(is_servable(&path), "{:?}", path);
        }
    }

    #[test]
    fn missing_paths_follow_extension_policy() {
        let dir = scratch_dir("missing");

        assert!(!is_servable(&dir.join("nothing")));
        assert!(!is_servable(&dir.join("nothing.html")));
        assert!(is_servable(&dir.join("nothing.png")));
        assert!(is_servable(&dir.join("nothing.htm")));
    }

    #[test]
    fn directories_are_not_servable() {
        let dir = scratch_dir("directory");
        fs::create_dir_all(dir.join("sub")).unwrap();
        assert!(!is_servable(&dir.join("sub")));
    }

    #[test]
    fn resolve_target_marks_validity() {
        let dir = scratch_dir("target");
        fs::write(dir.join("index.html"), b"home").unwrap();

        let home = resolve_target("/", &dir, "/index.html");
        assert_eq!(home, ResolvedTarget { path: dir.join("index.html"), is_valid: true });

        let missing = resolve_target("/docs", &dir, "index.html");
        assert!(!missing.is_valid);
    }

    #[test]
    fn extension_ignores_trailing_dot() {
        assert_eq!(extension(Path::new("a/b.css")), Some("css"));
        assert_eq!(extension(Path::new("a/b.")), None);
        assert_eq!(extension(Path::new("a/b")), None);
    }
}
