//! Path helpers shared by the resolver and the CLI.

use std::path::{Component, Path, PathBuf};

/// Check whether the trailing components of `dir` spell out `name`.
///
/// `name` is split on both `/` and `\`, so `@scope/pkg` matches a directory
/// ending in `.../@scope/pkg` on every platform. Comparison is per component,
/// which keeps `my-pkg` from matching a directory named `not-my-pkg`.
/// On Windows the comparison ignores ASCII case.
#[must_use]
pub fn ends_with_segments(dir: &Path, name: &str) -> bool {
    let wanted: Vec<&str> = name
        .split(['/', '\\'])
        .filter(|s| !s.is_empty())
        .collect();
    if wanted.is_empty() {
        return false;
    }

    let actual: Vec<&str> = dir
        .components()
        .filter_map(|c| match c {
            Component::Normal(s) => s.to_str(),
            _ => None,
        })
        .collect();
    if actual.len() < wanted.len() {
        return false;
    }

    actual[actual.len() - wanted.len()..]
        .iter()
        .zip(&wanted)
        .all(|(a, w)| segment_eq(a, w))
}

fn segment_eq(a: &str, b: &str) -> bool {
    if cfg!(windows) {
        a.eq_ignore_ascii_case(b)
    } else {
        a == b
    }
}

/// Render a path with `/` separators, as used in module requests.
#[must_use]
pub fn to_slash_lossy(path: &Path) -> String {
    let s = path.to_string_lossy();
    if cfg!(windows) {
        s.replace('\\', "/")
    } else {
        s.into_owned()
    }
}

/// Make `path` absolute against `base`, dropping `.` and folding `..`
/// lexically. Symlinks are left alone.
#[must_use]
pub fn absolutize_from(base: &Path, path: &Path) -> PathBuf {
    let joined = if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    };

    let mut out = PathBuf::new();
    for component in joined.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                // Never pops past the root
                if matches!(out.components().next_back(), Some(Component::Normal(_))) {
                    out.pop();
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// [`absolutize_from`] against the process working directory.
///
/// Falls back to the path as given when the working directory is unknown.
#[must_use]
pub fn absolutize(path: &Path) -> PathBuf {
    if path.is_absolute() {
        return absolutize_from(Path::new(""), path);
    }
    match std::env::current_dir() {
        Ok(cwd) => absolutize_from(&cwd, path),
        Err(_) => path.to_path_buf(),
    }
}
