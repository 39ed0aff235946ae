// DNS lookup adapter
//
// Resolves A, MX, NS, and TXT records independently. A failure on one
// record type yields an empty list for that type only; the call as a
// whole only fails if the resolver cannot be driven at all.

use std::time::Duration;

use async_trait::async_trait;
use hickory_resolver::config::{ResolverConfig, ResolverOpts};
use hickory_resolver::TokioAsyncResolver;
use tracing::debug;

use super::{AdapterError, DnsLookup, DnsRecords};

pub struct HickoryDnsLookup {
    resolver: TokioAsyncResolver,
}

impl HickoryDnsLookup {
    pub fn new(timeout_secs: u64) -> Self {
        let mut opts = ResolverOpts::default();
        opts.timeout = Duration::from_secs(timeout_secs);
        let resolver = TokioAsyncResolver::tokio(ResolverConfig::default(), opts);
        Self { resolver }
    }
}

#[async_trait]
impl DnsLookup for HickoryDnsLookup {
    async fn resolve(&self, domain: &str) -> Result<DnsRecords, AdapterError> {
        let (a, mx, ns, txt) = tokio::join!(
            self.resolver.lookup_ip(domain),
            self.resolver.mx_lookup(domain),
            self.resolver.ns_lookup(domain),
            self.resolver.txt_lookup(domain),
        );

        let a = match a {
            Ok(lookup) => lookup.iter().map(|ip| ip.to_string()).collect(),
            Err(e) => {
                debug!("A lookup failed for {}: {}", domain, e);
                Vec::new()
            },
        };
        let mx = match mx {
            Ok(lookup) => lookup.iter().map(|mx| mx.to_string()).collect(),
            Err(e) => {
                debug!("MX lookup failed for {}: {}", domain, e);
                Vec::new()
            },
        };
        let ns = match ns {
            Ok(lookup) => lookup.iter().map(|ns| ns.to_string()).collect(),
            Err(e) => {
                debug!("NS lookup failed for {}: {}", domain, e);
                Vec::new()
            },
        };
        let txt = match txt {
            Ok(lookup) => lookup.iter().map(|txt| txt.to_string()).collect(),
            Err(e) => {
                debug!("TXT lookup failed for {}: {}", domain, e);
                Vec::new()
            },
        };

        Ok(DnsRecords { a, mx, ns, txt })
    }
}
