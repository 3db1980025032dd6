use serde::Serialize;
use sha2::{Sha256, Digest};
use shared::types::Snapshot;

/// Only the fields that describe reachability. `checked_at` moves on every
/// pass and would make the fingerprint useless for change detection.
#[derive(Serialize)]
struct HashView<'a> {
    name: &'a str,
    host: &'a str,
    port: u16,
    reachable: bool,
}

/// SHA-256 over the stable fields of a snapshot, hex encoded.
/// Results are already ordered by name, so equal content hashes equal.
pub fn compute_hash(snapshot: &Snapshot) -> String {
    let views: Vec<HashView<'_>> = snapshot
        .results
        .values()
        .map(|r| HashView {
            name: &r.name,
            host: &r.host,
            port: r.port,
            reachable: r.reachable,
        })
        .collect();

    let json = serde_json::to_string(&views)
        .expect("Failed to serialize snapshot for hashing");

    let hash = Sha256::digest(json.as_bytes());
    hex::encode(hash)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use shared::types::ResolvedAddress;

    fn outcome(name: &str, reachable: bool) -> (String, ResolvedAddress, bool) {
        let address = ResolvedAddress { host: format!("{}.example", name), port: 443 };
        (name.to_string(), address, reachable)
    }

    #[test]
    fn test_hash_independent_of_probe_order() {
        let now = Utc::now();
        let a = Snapshot::from_outcomes(now, vec![outcome("a", true), outcome("b", false)]);
        let b = Snapshot::from_outcomes(now, vec![outcome("b", false), outcome("a", true)]);

        assert_eq!(compute_hash(&a), compute_hash(&b));
    }

    #[test]
    fn test_hash_changes_when_reachability_changes() {
        let now = Utc::now();
        let up = Snapshot::from_outcomes(now, vec![outcome("a", true)]);
        let down = Snapshot::from_outcomes(now, vec![outcome("a", false)]);

        assert_ne!(compute_hash(&up), compute_hash(&down));
    }

    #[test]
    fn test_hash_stable_across_passes() {
        let first = Snapshot::from_outcomes(Utc::now(), vec![outcome("a", true)]);
        let later = Snapshot::from_outcomes(
            Utc::now() + chrono::Duration::seconds(60),
            vec![outcome("a", true)],
        );

        assert_eq!(compute_hash(&first), compute_hash(&later));
    }
}
