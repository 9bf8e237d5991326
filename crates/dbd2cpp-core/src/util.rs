use sha2::{Digest, Sha256};

/// Lower-case hex SHA-256 of a definition document, recorded alongside the
/// generated artifacts so regenerated output can be traced to its source.
pub(crate) fn document_sha256(bytes: &[u8]) -> String {
    let digest = Sha256::digest(bytes);
    digest.iter().map(|b| format!("{b:02x}")).collect()
}
