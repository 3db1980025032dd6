use shared::protocol::{CLUSTER_DOMAIN, DEFAULT_CLUSTER_PORT, DEFAULT_EXTERNAL_PORT};
use shared::types::{Destination, ResolvedAddress};

/// Turn a destination into the host and port to connect to.
///
/// A namespaced destination is addressed through cluster DNS and defaults to
/// the in-cluster service port; anything else is taken as an external host
/// and defaults to HTTPS. An explicit port always wins. Names are passed
/// through unvalidated.
pub fn resolve(destination: &Destination) -> ResolvedAddress {
    match destination.namespace.as_deref().filter(|ns| !ns.is_empty()) {
        Some(namespace) => ResolvedAddress {
            host: format!("{}.{}.{}", destination.service, namespace, CLUSTER_DOMAIN),
            port: destination.port.unwrap_or(DEFAULT_CLUSTER_PORT),
        },
        None => ResolvedAddress {
            host: destination.service.clone(),
            port: destination.port.unwrap_or(DEFAULT_EXTERNAL_PORT),
        },
    }
}
