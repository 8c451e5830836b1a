//! Android target path resolution.

use std::path::Path;

use crate::model::Role;

/// Root of Kotlin sources inside the Android project.
pub const SOURCE_ROOT: &str = "app/src/main/java";

/// Package-relative directory for a role.
///
/// Roles without a dedicated directory (including `test`, which is never
/// converted) land at the package root.
#[must_use]
pub const fn role_dir(role: Role) -> Option<&'static str> {
    match role {
        Role::Model => Some("model"),
        Role::ViewModel => Some("viewmodel"),
        Role::View => Some("ui/screens"),
        Role::Service => Some("data/repository"),
        Role::Extension | Role::Utility => Some("util"),
        Role::Test | Role::Other => None,
    }
}

/// `com.example.app` -> `com/example/app`.
#[must_use]
pub fn package_dir(package_name: &str) -> String {
    package_name.replace('.', "/")
}

/// Resolve the Android-relative path for an iOS file.
///
/// `Sources/Models/Profile.swift` as a model in `com.example.app` becomes
/// `app/src/main/java/com/example/app/model/Profile.kt`. Only the file stem
/// of the iOS path is kept.
#[must_use]
pub fn resolve(relative_path: &str, role: Role, package_name: &str) -> String {
    let stem = Path::new(relative_path)
        .file_stem()
        .map_or_else(|| relative_path.to_string(), |s| s.to_string_lossy().into_owned());
    let pkg = package_dir(package_name);

    match role_dir(role) {
        Some(dir) => format!("{SOURCE_ROOT}/{pkg}/{dir}/{stem}.kt"),
        None => format!("{SOURCE_ROOT}/{pkg}/{stem}.kt"),
    }
}

/// Kotlin package declared by a file at `target_path`.
///
/// Derived from the directory under [`SOURCE_ROOT`]. A mapping that was moved
/// outside the source root by hand falls back to `package_name`.
#[must_use]
pub fn package_for(target_path: &str, package_name: &str) -> String {
    let Some(rest) = target_path
        .strip_prefix(SOURCE_ROOT)
        .and_then(|r| r.strip_prefix('/'))
    else {
        return package_name.to_string();
    };

    match rest.rsplit_once('/') {
        Some((dir, _file)) if !dir.is_empty() => dir.replace('/', "."),
        _ => package_name.to_string(),
    }
}
