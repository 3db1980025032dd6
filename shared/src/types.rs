use std::collections::BTreeMap;
use chrono::{DateTime, Utc};
use serde::{Serialize, Deserialize};

/// A configured endpoint to probe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Destination {
    /// Display identifier, unique within the registry
    pub name: String,

    /// Bare service name, or an external hostname when `namespace` is unset
    pub service: String,

    /// Cluster namespace; switches the address to in-cluster DNS
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,

    /// Explicit port; defaulted from `namespace` when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
}

/// A connectable address derived from a [`Destination`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedAddress {
    pub host: String,
    pub port: u16,
}

/// Outcome of checking one destination during a probe pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProbeResult {
    pub name: String,
    pub host: String,
    pub port: u16,
    pub reachable: bool,

    /// Shared by every result of the same pass
    pub checked_at: DateTime<Utc>,
}

/// The complete result of one probe pass, keyed by destination name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    /// When the pass started
    pub checked_at: DateTime<Utc>,

    pub results: BTreeMap<String, ProbeResult>,
}

impl Snapshot {
    /// Assemble a snapshot from per-destination outcomes of a single pass.
    /// A repeated name replaces the earlier entry.
    pub fn from_outcomes<I>(checked_at: DateTime<Utc>, outcomes: I) -> Self
    where
        I: IntoIterator<Item = (String, ResolvedAddress, bool)>,
    {
        let results = outcomes
            .into_iter()
            .map(|(name, address, reachable)| {
                let result = ProbeResult {
                    name: name.clone(),
                    host: address.host,
                    port: address.port,
                    reachable,
                    checked_at,
                };
                (name, result)
            })
            .collect();

        Self { checked_at, results }
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn reachable_count(&self) -> usize {
        self.results.values().filter(|r| r.reachable).count()
    }
}
