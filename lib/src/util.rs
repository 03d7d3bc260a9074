use std::path::Path;
use std::sync::Arc;

/// The logical key for a path relative to the source root: components joined
/// by `/` regardless of the host separator.
pub fn key_for(relative: &Path) -> Arc<str> {
    let mut key = String::new();
    for component in relative.components() {
        if !key.is_empty() {
            key.push('/');
        }

        key.push_str(&component.as_os_str().to_string_lossy());
    }

    key.into()
}

/// The extension of a key's final segment, including the dot, if any.
pub fn extension(key: &str) -> Option<&str> {
    let name = key.rsplit_once('/').map_or(key, |(_, name)| name);
    name.rfind('.').map(|i| &name[i..])
}

/// Replaces (or appends) the extension of a key's final segment. `ext`
/// includes the leading dot.
pub fn with_extension(key: &str, ext: &str) -> Arc<str> {
    match extension(key) {
        Some(old) => format!("{}{ext}", &key[..key.len() - old.len()]).into(),
        None => format!("{key}{ext}").into(),
    }
}

/// Returns `true` if `input` is likely to contain a template.
pub fn is_template(input: &str) -> bool {
    let mut slice = input.as_bytes();
    while let Some(i) = memchr::memchr(b'{', slice) {
        match slice.get(i + 1) {
            Some(b'{') | Some(b'%') => return true,
            Some(_) => slice = &slice[(i + 1)..],
            None => return false,
        }
    }

    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_use_forward_slashes() {
        let path: std::path::PathBuf = ["posts", "2024", "a.md"].iter().collect();
        assert_eq!(&*key_for(&path), "posts/2024/a.md");
    }

    #[test]
    fn extension_ignores_dots_in_directories() {
        assert_eq!(extension("a.b/c"), None);
        assert_eq!(extension("a.b/c.md"), Some(".md"));
        assert_eq!(extension("style.scss"), Some(".scss"));
    }

    #[test]
    fn with_extension_replaces_or_appends() {
        assert_eq!(&*with_extension("style.scss", ".css"), "style.css");
        assert_eq!(&*with_extension("posts/page.md", ".html"), "posts/page.html");
        assert_eq!(&*with_extension("README", ".html"), "README.html");
    }

    #[test]
    fn template_detection() {
        assert!(is_template("hello {{ name }}"));
        assert!(is_template("{% for x in xs %}"));
        assert!(!is_template("function() { return 1; }"));
        assert!(!is_template("plain text"));
    }
}
