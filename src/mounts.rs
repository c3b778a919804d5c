//! Parsing of compose short-syntax volume mount strings.
//!
//! A `volumes` entry like `./data:/container/data:ro` splits into source,
//! target, and mode. The source decides the mount kind: a path-like source
//! is a bind mount of a host location; anything else names a managed
//! volume (or, with no source at all, an anonymous one). Only bind mounts
//! are ever turned into document links.

/// How a mount's source is provisioned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MountKind {
    /// A host path mapped into the container.
    Bind,
    /// A named or anonymous managed volume.
    Volume,
}

/// A parsed short-syntax mount entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MountSpec {
    pub kind: MountKind,
    pub source: String,
    pub target: String,
    pub mode: Option<String>,
}

/// Parses `[SOURCE:]TARGET[:MODE]`. Returns `None` for empty or
/// over-segmented specs.
pub fn parse_short_mount(spec: &str) -> Option<MountSpec> {
    if spec.is_empty() {
        return None;
    }
    let parts = split_mount(spec);
    match parts.len() {
        1 => Some(MountSpec {
            kind: MountKind::Volume,
            source: String::new(),
            target: parts[0].clone(),
            mode: None,
        }),
        2 | 3 => {
            let source = parts[0].clone();
            let kind = if source.is_empty() || !is_file_path(&source) {
                MountKind::Volume
            } else {
                MountKind::Bind
            };
            Some(MountSpec {
                kind,
                source,
                target: parts[1].clone(),
                mode: parts.get(2).cloned(),
            })
        }
        _ => None,
    }
}

/// Splits on `:` while keeping Windows drive letters (`C:\data`) attached
/// to their path: a colon directly after a single-letter segment is part
/// of the path, not a separator.
fn split_mount(spec: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut buf = String::new();
    for ch in spec.chars() {
        if ch == ':' && !(buf.len() == 1 && buf.as_bytes()[0].is_ascii_alphabetic()) {
            parts.push(std::mem::take(&mut buf));
        } else {
            buf.push(ch);
        }
    }
    parts.push(buf);
    parts
}

fn is_file_path(source: &str) -> bool {
    if source.starts_with('/') || source.starts_with('.') || source.starts_with('~') {
        return true;
    }
    // windows drive letter
    let bytes = source.as_bytes();
    bytes.len() > 1 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':'
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relative_source_is_a_bind_mount() {
        let mount = parse_short_mount("./data:/container/data").unwrap();
        assert_eq!(mount.kind, MountKind::Bind);
        assert_eq!(mount.source, "./data");
        assert_eq!(mount.target, "/container/data");
        assert_eq!(mount.mode, None);
    }

    #[test]
    fn absolute_source_is_a_bind_mount() {
        let mount = parse_short_mount("/var/log:/logs:ro").unwrap();
        assert_eq!(mount.kind, MountKind::Bind);
        assert_eq!(mount.source, "/var/log");
        assert_eq!(mount.mode.as_deref(), Some("ro"));
    }

    #[test]
    fn home_relative_source_is_a_bind_mount() {
        let mount = parse_short_mount("~/data:/data").unwrap();
        assert_eq!(mount.kind, MountKind::Bind);
    }

    #[test]
    fn parent_relative_source_is_a_bind_mount() {
        let mount = parse_short_mount("../shared:/shared").unwrap();
        assert_eq!(mount.kind, MountKind::Bind);
        assert_eq!(mount.source, "../shared");
    }

    #[test]
    fn named_source_is_a_managed_volume() {
        let mount = parse_short_mount("pgdata:/var/lib/postgresql/data").unwrap();
        assert_eq!(mount.kind, MountKind::Volume);
        assert_eq!(mount.source, "pgdata");
    }

    #[test]
    fn target_only_spec_is_an_anonymous_volume() {
        let mount = parse_short_mount("/var/lib/mysql").unwrap();
        assert_eq!(mount.kind, MountKind::Volume);
        assert_eq!(mount.source, "");
        assert_eq!(mount.target, "/var/lib/mysql");
    }

    #[test]
    fn windows_drive_letter_stays_in_the_source() {
        let mount = parse_short_mount("C:\\data:/data").unwrap();
        assert_eq!(mount.kind, MountKind::Bind);
        assert_eq!(mount.source, "C:\\data");
        assert_eq!(mount.target, "/data");
    }

    #[test]
    fn empty_and_oversegmented_specs_are_rejected() {
        assert_eq!(parse_short_mount(""), None);
        assert_eq!(parse_short_mount("/a:/b:ro:extra"), None);
    }
}
