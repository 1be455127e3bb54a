//! core::naming
//!
//! Patch and patch-branch naming rules.
//!
//! Generated names have the form `<NNNN>-<slug>`: a four-digit zero-padded
//! ordinal, a dash, and a slug of the description. Parsing is tolerant: any
//! run of decimal digits before the first `-` is an ordinal.

use crate::core::error::PlyError;
use crate::core::types::{BranchName, Ordinal};

/// Upper bound on slug length.
const MAX_SLUG_LEN: usize = 50;

/// Generate a slug from a free-form description.
///
/// Uses the first line only. ASCII alphanumerics are lowercased and kept,
/// every other run of characters collapses into a single `-`.
///
/// # Example
///
/// ```
/// use ply::core::naming::slugify;
///
/// assert_eq!(slugify("Add user authentication"), "add-user-authentication");
/// assert_eq!(slugify("Fix bug #123"), "fix-bug-123");
/// assert_eq!(slugify("already-slugged"), "already-slugged");
/// ```
pub fn slugify(description: &str) -> String {
    let first_line = description.lines().next().unwrap_or("");

    let mut slug = String::with_capacity(first_line.len());
    let mut pending_dash = false;
    for c in first_line.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c.to_ascii_lowercase());
        } else {
            pending_dash = true;
        }
    }

    if slug.len() > MAX_SLUG_LEN {
        slug.truncate(MAX_SLUG_LEN);
        while slug.ends_with('-') {
            slug.pop();
        }
    }
    slug
}

/// Extract the ordinal prefix of a patch file or branch name.
///
/// The prefix is everything before the first `-`, or the whole name when
/// there is no dash. A `.patch` suffix is ignored.
///
/// # Example
///
/// ```
/// use ply::core::naming::ordinal_prefix;
/// use ply::core::types::Ordinal;
///
/// assert_eq!(ordinal_prefix("0005-fix-build.patch").unwrap(), Ordinal::new(5));
/// assert_eq!(ordinal_prefix("12-thing").unwrap(), Ordinal::new(12));
/// assert!(ordinal_prefix("main").is_err());
/// ```
pub fn ordinal_prefix(name: &str) -> Result<Ordinal, PlyError> {
    let stem = name.strip_suffix(".patch").unwrap_or(name);
    let prefix = stem.split_once('-').map_or(stem, |(prefix, _)| prefix);

    prefix
        .parse::<Ordinal>()
        .map_err(|_| PlyError::MalformedPatchName {
            name: name.to_string(),
        })
}

/// Name of the topic branch for a new patch.
///
/// # Example
///
/// ```
/// use ply::core::naming::patch_branch_name;
/// use ply::core::types::Ordinal;
///
/// let branch = patch_branch_name(Ordinal::new(3), "Add logging").unwrap();
/// assert_eq!(branch.as_str(), "0003-add-logging");
/// ```
pub fn patch_branch_name(ordinal: Ordinal, description: &str) -> Result<BranchName, PlyError> {
    let slug = slugify(description);
    let name = if slug.is_empty() {
        ordinal.padded()
    } else {
        format!("{}-{}", ordinal.padded(), slug)
    };
    BranchName::new(name.clone()).map_err(|_| PlyError::MalformedPatchName { name })
}

/// File name of a generated patch, as `git format-patch` would produce it.
pub fn patch_file_name(ordinal: Ordinal, subject: &str) -> String {
    let slug = slugify(subject);
    if slug.is_empty() {
        format!("{}.patch", ordinal.padded())
    } else {
        format!("{}-{}.patch", ordinal.padded(), slug)
    }
}
