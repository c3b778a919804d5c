//! Path resolution for file references inside a compose document.
//!
//! Pure string arithmetic: a document folder plus a relative (or absolute)
//! file reference becomes a `file://` URI for navigation and a native path
//! for filesystem probes. Callers decide whether to stat the result.
//!
//! Two addressing modes exist. Standard mode joins against the folder and
//! normalizes to forward slashes for the URI. WSL mode addresses files
//! inside a Linux environment from a Windows host through the `\\wsl$\`
//! network share, which maps to `file://wsl%24/...` URIs.

use std::path::{Path, MAIN_SEPARATOR};

/// Joins `folder` and `file` into a `(uri, native path)` pair.
pub fn concatenate(folder: &str, file: &str, wsl_dollar_sign: bool) -> (String, String) {
    if wsl_dollar_sign {
        let joined = join_slash(&folder.replace('\\', "/"), file);
        let uri = format!("file://wsl%24{joined}");
        let native = format!("\\\\wsl${}", joined.replace('/', "\\"));
        return (uri, native);
    }
    let joined = join_slash(&folder.replace('\\', "/"), file);
    let uri = format!("file:///{}", joined.trim_start_matches('/'));
    let native = if MAIN_SEPARATOR == '/' {
        joined
    } else {
        joined.replace('/', "\\")
    };
    (uri, native)
}

/// Like [`concatenate`], but absolute references pass through untouched as
/// the native path. Used for volume bind-mount sources, which may name any
/// host location.
pub fn local_file_link(folder: &str, fs_path: &str, wsl_dollar_sign: bool) -> (String, String) {
    if Path::new(fs_path).is_absolute() {
        let uri = format!(
            "file:///{}",
            fs_path.replace('\\', "/").trim_start_matches('/')
        );
        return (uri, fs_path.to_string());
    }
    concatenate(folder, fs_path, wsl_dollar_sign)
}

/// Slash-joins two path fragments and lexically cleans the result:
/// duplicate separators collapse, `.` segments drop, and `..` segments
/// consume their parent where one exists.
fn join_slash(base: &str, rel: &str) -> String {
    let joined = match (base.is_empty(), rel.is_empty()) {
        (true, _) => rel.to_string(),
        (_, true) => base.to_string(),
        _ => format!("{base}/{rel}"),
    };
    clean_slash(&joined)
}

fn clean_slash(path: &str) -> String {
    let rooted = path.starts_with('/');
    let mut segments: Vec<&str> = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                if segments.last().is_some_and(|s| *s != "..") {
                    segments.pop();
                } else if !rooted {
                    segments.push("..");
                }
            }
            other => segments.push(other),
        }
    }
    let body = segments.join("/");
    if rooted {
        format!("/{body}")
    } else if body.is_empty() {
        ".".to_string()
    } else {
        body
    }
}
