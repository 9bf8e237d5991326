use crate::build::Build;
use crate::dbd::{DatabaseDefinitions, VersionDefinition};
use crate::diagnostics::{Diagnostic, DiagnosticCode};

/// Picks the version block to compile for `build`.
///
/// The first block (in declaration order) whose builds or ranges cover `build`
/// wins. Without a match, or without a build, the last declared block is used.
/// The chosen block must carry at least one layout hash.
pub fn resolve_version<'a>(
    defs: &'a DatabaseDefinitions,
    build: Option<&Build>,
) -> Result<&'a VersionDefinition, Diagnostic> {
    let matched = build.and_then(|b| defs.versions.iter().find(|v| v.applies_to(b)));
    if let (Some(b), None) = (build, matched) {
        log::info!("no version block covers build {b}; falling back to the last declared one");
    }

    let Some(version) = matched.or_else(|| defs.versions.last()) else {
        return Err(Diagnostic::error(
            DiagnosticCode::D2C0100UnresolvedVersion,
            "definition has no version blocks",
        ));
    };
    if version.layout_hashes.is_empty() {
        let which = match build {
            Some(b) => format!("build {b}"),
            None => "the latest version".to_string(),
        };
        return Err(Diagnostic::error(
            DiagnosticCode::D2C0100UnresolvedVersion,
            format!("version block selected for {which} has no LAYOUT hash"),
        ));
    }
    Ok(version)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::build::BuildRange;

    fn version(hash: &str, builds: &[&str], ranges: &[&str]) -> VersionDefinition {
        VersionDefinition {
            layout_hashes: if hash.is_empty() {
                Vec::new()
            } else {
                vec![hash.to_string()]
            },
            builds: builds.iter().map(|b| b.parse().unwrap()).collect(),
            build_ranges: ranges
                .iter()
                .map(|r| r.parse::<BuildRange>().unwrap())
                .collect(),
            ..VersionDefinition::default()
        }
    }

    fn defs(versions: Vec<VersionDefinition>) -> DatabaseDefinitions {
        DatabaseDefinitions::new(versions)
    }

    #[test]
    fn selects_covering_block_over_last_declared() {
        let d = defs(vec![
            version("00000001", &["9.2.7.45745"], &[]),
            version("00000002", &[], &["10.0.2.45000-10.0.2.46000"]),
            version("00000003", &["10.0.5.47000"], &[]),
        ]);
        let b: Build = "10.0.2.45969".parse().unwrap();
        let v = resolve_version(&d, Some(&b)).expect("resolve");
        assert_eq!(v.canonical_layout_hash(), Some("00000002"));
    }

    #[test]
    fn exact_build_match() {
        let d = defs(vec![
            version("00000001", &["9.2.7.45745"], &[]),
            version("00000002", &["10.0.5.47000"], &[]),
        ]);
        let b: Build = "9.2.7.45745".parse().unwrap();
        let v = resolve_version(&d, Some(&b)).expect("resolve");
        assert_eq!(v.canonical_layout_hash(), Some("00000001"));
    }

    #[test]
    fn falls_back_to_last_declared_not_highest_build() {
        let d = defs(vec![
            version("00000001", &["10.0.5.47000"], &[]),
            version("00000002", &["9.2.7.45745"], &[]),
        ]);
        let b: Build = "11.0.0.1".parse().unwrap();
        let v = resolve_version(&d, Some(&b)).expect("resolve");
        assert_eq!(v.canonical_layout_hash(), Some("00000002"));
        let v = resolve_version(&d, None).expect("resolve");
        assert_eq!(v.canonical_layout_hash(), Some("00000002"));
    }

    #[test]
    fn missing_layout_hash_is_unresolved() {
        let d = defs(vec![
            version("00000001", &["9.2.7.45745"], &[]),
            version("", &["10.0.5.47000"], &[]),
        ]);
        let err = resolve_version(&d, None).expect_err("no hash");
        assert_eq!(err.code, DiagnosticCode::D2C0100UnresolvedVersion);
    }

    #[test]
    fn no_versions_is_unresolved() {
        let err = resolve_version(&defs(Vec::new()), None).expect_err("empty");
        assert_eq!(err.code, DiagnosticCode::D2C0100UnresolvedVersion);
    }
}
