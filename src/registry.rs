//! Decoders for container image and model references.
//!
//! A reference like `ghcr.io/acme/widget:v2` decodes into the text to
//! highlight (the name without its tag) and a browsable web URL. Each known
//! registry has its own URL shape and its own rejection rules; dispatch is
//! an ordered prefix table falling through to Docker Hub.
//!
//! Decoding is deliberately conservative. Values that are ambiguous under a
//! rule — digest references, nested repository paths, colons that read as
//! port markers rather than tags — return `None` and produce no link at
//! all, never a guessed one.

/// A successfully decoded reference: the text to link and its target URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryLink {
    pub text: String,
    pub url: String,
}

type Decoder = fn(&str) -> Option<RegistryLink>;

/// Known image registries, tried in order before the Docker Hub fallback.
static IMAGE_REGISTRIES: &[(&str, Decoder)] = &[
    ("ghcr.io", decode_ghcr),
    ("mcr.microsoft.com", decode_mcr),
    ("quay.io", decode_quay),
];

/// Decodes a `services.*.image` value.
pub fn decode_image_ref(value: &str) -> Option<RegistryLink> {
    if rejected_outright(value) {
        return None;
    }
    for (prefix, decode) in IMAGE_REGISTRIES {
        if value.starts_with(prefix) {
            return decode(value);
        }
    }
    decode_docker_hub(value)
}

/// Decodes a `models.*.model` value. Hugging Face references are the only
/// registry-specific form; everything else follows the Docker Hub rules.
pub fn decode_model_ref(value: &str) -> Option<RegistryLink> {
    if rejected_outright(value) {
        return None;
    }
    if value.starts_with("hf.co") {
        return decode_hugging_face(value);
    }
    decode_docker_hub(value)
}

/// Rejections shared by every registry: empty values and digest references
/// (`repo@sha256:...`) are never linked.
fn rejected_outright(value: &str) -> bool {
    value.is_empty() || value.contains('@')
}

/// A tag colon must lie after the last slash; anything else reads as a port
/// marker or a path oddity.
fn tag_colon(value: &str) -> Option<Option<usize>> {
    let colon = value.rfind(':');
    let last_slash = value.rfind('/');
    match (colon, last_slash) {
        (Some(c), Some(s)) if c <= s => None,
        (colon, _) => Some(colon),
    }
}

/// ghcr.io and quay.io share one shape: exactly
/// `registry/namespace/repository[:tag]`. `skip` strips the registry host
/// from the web path where the registry's web UI wants only the remainder.
fn decode_path_registry(
    value: &str,
    prefix: &str,
    url_prefix: &str,
    skip: usize,
) -> Option<RegistryLink> {
    if value.len() <= prefix.len() + 1 {
        return None;
    }
    if value.matches('/').count() != 2 {
        return None;
    }
    let colon = tag_colon(value)?;
    let link = match colon {
        None => RegistryLink {
            text: value.to_string(),
            url: format!("{url_prefix}{}", &value[skip..]),
        },
        Some(c) => RegistryLink {
            text: value[..c].to_string(),
            url: format!("{url_prefix}{}", &value[skip..c]),
        },
    };
    Some(link)
}

fn decode_ghcr(value: &str) -> Option<RegistryLink> {
    decode_path_registry(value, "ghcr.io", "https://", 0)
}

fn decode_quay(value: &str) -> Option<RegistryLink> {
    decode_path_registry(value, "quay.io", "https://quay.io/repository/", "quay.io/".len())
}

const MCR: &str = "mcr.microsoft.com";

/// mcr artifacts may be a single path segment (`mcr.microsoft.com/windows`),
/// so the shape check is looser than ghcr/quay: reject only the forms that
/// read as a bare host, a port marker, or an empty repository segment.
fn decode_mcr(value: &str) -> Option<RegistryLink> {
    if value.len() <= MCR.len() + 1 {
        return None;
    }
    if value[MCR.len()..].starts_with(':') {
        return None;
    }
    if let Some(c) = value.rfind(':') {
        if value.rfind('/') == Some(c - 1) {
            return None;
        }
    }
    let colon = tag_colon(value)?;
    let remainder = MCR.len() + 1;
    let link = match colon {
        None => RegistryLink {
            text: value.to_string(),
            url: format!(
                "https://mcr.microsoft.com/artifact/mar/{}",
                &value[remainder..]
            ),
        },
        Some(c) => RegistryLink {
            text: value[..c].to_string(),
            url: format!(
                "https://mcr.microsoft.com/artifact/mar/{}",
                &value[remainder..c]
            ),
        },
    };
    Some(link)
}

/// `hf.co/org/model[:tag]` links straight to the model page; the tag is
/// dropped from both the text and the URL.
fn decode_hugging_face(value: &str) -> Option<RegistryLink> {
    if value.len() <= "hf.co/".len() {
        return None;
    }
    let link = match tag_colon(value)? {
        None => RegistryLink {
            text: value.to_string(),
            url: format!("https://{value}"),
        },
        Some(c) => RegistryLink {
            text: value[..c].to_string(),
            url: format!("https://{}", &value[..c]),
        },
    };
    Some(link)
}

/// The implicit registry: a bare name is an official image under `_/`, a
/// single `user/repo` pair lives under `r/`. Deeper paths are not Hub
/// references and are rejected.
fn decode_docker_hub(value: &str) -> Option<RegistryLink> {
    if value.matches('/').count() > 1 {
        return None;
    }
    let colon = tag_colon(value)?;
    let name = match colon {
        Some(c) => &value[..c],
        None => value,
    };
    if name.is_empty() {
        return None;
    }
    let url = if value.contains('/') {
        format!("https://hub.docker.com/r/{name}")
    } else {
        format!("https://hub.docker.com/_/{name}")
    };
    Some(RegistryLink {
        text: name.to_string(),
        url,
    })
}
