//! Path helpers for import strings
//!
//! Import paths are strings first and paths second: classification is done
//! on their shape, and joins are lexical so that nothing here touches the
//! filesystem.

use path_absolutize::Absolutize;
use std::path::{Component, Path, PathBuf, MAIN_SEPARATOR};

/// Directory holding package artifacts under the working directory
pub const NODE_MODULES: &str = "node_modules";

/// Rewrite `/` separators to the host separator
pub fn normalize_separators(import_path: &str) -> String {
    if MAIN_SEPARATOR == '/' {
        import_path.to_string()
    } else {
        import_path.replace('/', &MAIN_SEPARATOR.to_string())
    }
}

/// `./foo` style imports, written with either separator
pub fn is_explicit_relative(import_path: &str) -> bool {
    let mut chars = import_path.chars();
    chars.next() == Some('.') && matches!(chars.next(), Some(c) if c == '/' || c == MAIN_SEPARATOR)
}

/// True when the import path carries a `.json` extension
pub fn has_json_extension(import_path: &str) -> bool {
    Path::new(import_path)
        .extension()
        .map(|ext| ext == "json")
        .unwrap_or(false)
}

/// File a package JSON import refers to
///
/// Bare imports are rooted under `node_modules` in the working directory;
/// explicit `./` imports are taken relative to the working directory itself.
pub fn package_json_path(working_directory: &Path, import_path: &str) -> PathBuf {
    if is_explicit_relative(import_path) {
        join_lexically(working_directory, Path::new(import_path))
    } else {
        join_lexically(&working_directory.join(NODE_MODULES), Path::new(import_path))
    }
}

/// Rewrite an absolute path under `working_directory` as `./<rest>`
///
/// This is string surgery on the raw prefix, not a canonical relative path.
pub fn relative_to_working_directory(working_directory: &Path, import_path: &str) -> String {
    let root = working_directory.to_string_lossy();
    let rest = import_path
        .strip_prefix(root.as_ref())
        .unwrap_or(import_path)
        .trim_start_matches(|c: char| c == '/' || c == MAIN_SEPARATOR);
    format!(".{}{}", MAIN_SEPARATOR, rest)
}

/// Artifact file for `contract_name` inside `search_directory`
///
/// The name comes from artifact content, so only its plain segments are
/// kept and the result always stays under `search_directory`.
pub fn artifact_file(search_directory: &Path, contract_name: &str) -> PathBuf {
    let file = format!("{}.json", contract_name);
    let inner: PathBuf = Path::new(&file)
        .components()
        .filter(|c| matches!(c, Component::Normal(_)))
        .collect();
    search_directory.join(inner)
}

/// Last path segment with a trailing `.sol` removed
pub fn fallback_contract_name(source_path: &str) -> String {
    let name = Path::new(source_path)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    match name.strip_suffix(".sol") {
        Some(stem) if !stem.is_empty() => stem.to_string(),
        _ => name,
    }
}

/// Directory part of a path, `.` when there is none
pub fn dirname(path: &str) -> PathBuf {
    match Path::new(path).parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => {
            if Path::new(path).has_root() {
                PathBuf::from(MAIN_SEPARATOR.to_string())
            } else {
                PathBuf::from(".")
            }
        }
    }
}

/// Join `relative` onto `base` and fold `.` and `..` segments
///
/// Unlike [`Path::join`], an absolute `relative` is appended rather than
/// replacing `base`.
pub fn join_lexically(base: &Path, relative: &Path) -> PathBuf {
    let tail: PathBuf = relative
        .components()
        .filter(|c| !matches!(c, Component::RootDir | Component::Prefix(_)))
        .collect();
    normalize_lexically(&base.join(tail))
}

/// Fold `.` and `..` segments without consulting the filesystem
pub fn normalize_lexically(path: &Path) -> PathBuf {
    let mut out: Vec<Component<'_>> = Vec::new();

    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match out.last().copied() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => out.push(component),
            },
            other => out.push(other),
        }
    }

    if out.is_empty() {
        return PathBuf::from(".");
    }
    out.into_iter().collect()
}

/// Candidate for `import_path` relative to the file that imported it
pub fn importer_relative_candidate(import_path: &str, imported_from: &str) -> String {
    join_lexically(&dirname(imported_from), Path::new(import_path))
        .to_string_lossy()
        .into_owned()
}

/// Absolute path of `dependency_path` as imported from `import_path`
///
/// Pure: `.` and `..` are resolved lexically, and a relative result is made
/// absolute against the current directory.
pub fn resolve_dependency_path(import_path: &str, dependency_path: &str) -> PathBuf {
    let joined = join_lexically(&dirname(import_path), Path::new(dependency_path));
    match joined.absolutize() {
        Ok(absolute) => absolute.into_owned(),
        Err(e) => {
            tracing::debug!("Could not absolutize {}: {}", joined.display(), e);
            joined
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_relative() {
        assert!(is_explicit_relative("./A.sol"));
        assert!(!is_explicit_relative("../A.sol"));
        assert!(!is_explicit_relative("pkg/A.json"));
        assert!(!is_explicit_relative("/abs/A.sol"));
    }

    #[test]
    fn test_json_extension() {
        assert!(has_json_extension("pkg/build/Token.json"));
        assert!(!has_json_extension("contracts/Token.sol"));
        assert!(!has_json_extension("contracts/Token"));
    }

    #[test]
    fn test_package_json_path() {
        let root = Path::new("/proj");
        assert_eq!(
            package_json_path(root, "pkg/build/Token.json"),
            PathBuf::from("/proj/node_modules/pkg/build/Token.json")
        );
        assert_eq!(
            package_json_path(root, "./local/Token.json"),
            PathBuf::from("/proj/local/Token.json")
        );
    }

    #[test]
    fn test_relative_to_working_directory() {
        let root = Path::new("/proj");
        assert_eq!(
            relative_to_working_directory(root, "/proj/contracts/A.sol"),
            "./contracts/A.sol"
        );
    }

    #[test]
    fn test_artifact_file_stays_in_directory() {
        let dir = Path::new("/proj/build/contracts");
        assert_eq!(artifact_file(dir, "Token"), dir.join("Token.json"));
        assert_eq!(artifact_file(dir, "/etc/Secret"), dir.join("etc/Secret.json"));
        assert_eq!(artifact_file(dir, "../../Leak"), dir.join("Leak.json"));
        assert_eq!(artifact_file(dir, "./nested/Lib"), dir.join("nested/Lib.json"));
    }

    #[test]
    fn test_fallback_contract_name() {
        assert_eq!(fallback_contract_name("missing.sol"), "missing");
        assert_eq!(fallback_contract_name("./contracts/Token.sol"), "Token");
        assert_eq!(fallback_contract_name("/a/b/Lib.t.sol"), "Lib.t");
        assert_eq!(fallback_contract_name("contracts/Token"), "Token");
    }

    #[test]
    fn test_dirname() {
        assert_eq!(dirname("/proj/contracts/A.sol"), PathBuf::from("/proj/contracts"));
        assert_eq!(dirname("A.sol"), PathBuf::from("."));
        assert_eq!(dirname(""), PathBuf::from("."));
        assert_eq!(dirname("/A.sol"), PathBuf::from("/"));
    }

    #[test]
    fn test_normalize_lexically() {
        assert_eq!(
            normalize_lexically(Path::new("/proj/contracts/../lib/./B.sol")),
            PathBuf::from("/proj/lib/B.sol")
        );
        assert_eq!(
            normalize_lexically(Path::new("../x/../../y")),
            PathBuf::from("../../y")
        );
        assert_eq!(normalize_lexically(Path::new("/../a")), PathBuf::from("/a"));
        assert_eq!(normalize_lexically(Path::new("./")), PathBuf::from("."));
    }

    #[test]
    fn test_importer_relative_candidate() {
        assert_eq!(
            importer_relative_candidate("./B.sol", "/proj/contracts/A.sol"),
            "/proj/contracts/B.sol"
        );
        assert_eq!(
            importer_relative_candidate("../lib/C.sol", "/proj/contracts/A.sol"),
            "/proj/lib/C.sol"
        );
        assert_eq!(importer_relative_candidate("./B.sol", ""), "B.sol");
    }

    #[test]
    fn test_resolve_dependency_path() {
        assert_eq!(
            resolve_dependency_path("/proj/contracts/A.sol", "../lib/B.sol"),
            PathBuf::from("/proj/lib/B.sol")
        );
        assert_eq!(
            resolve_dependency_path("/proj/contracts/A.sol", "./B.sol"),
            PathBuf::from("/proj/contracts/B.sol")
        );
    }

    #[test]
    fn test_resolve_dependency_path_relative_is_absolute() {
        let resolved = resolve_dependency_path("contracts/A.sol", "./B.sol");
        assert!(resolved.is_absolute());
        assert!(resolved.ends_with("contracts/B.sol"));
    }
}
