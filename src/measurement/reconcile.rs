//! Probe population reconciliation between result sets.

use crate::dns::ProbeId;
use crate::error::{Error, Result};
use crate::measurement::types::{IpVersion, MeasurementSet};
use std::collections::BTreeSet;

/// Probe populations of one or two result sets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reconciliation {
    /// Probes present in every set.
    pub common: BTreeSet<ProbeId>,
    /// Probes present in any set.
    pub all: BTreeSet<ProbeId>,
    /// Address family used for ASN and address columns.
    pub ip_version: IpVersion,
    /// The sets were measured over different address families.
    pub family_mismatch: bool,
}

impl Reconciliation {
    /// Probes to report: every probe, or only those common to both sets.
    #[must_use]
    pub fn probes(&self, all_probes: bool) -> &BTreeSet<ProbeId> {
        if all_probes {
            &self.all
        } else {
            &self.common
        }
    }
}

/// Reconcile the probe populations of `sets` (one or two).
///
/// # Errors
///
/// Returns [`Error::NoCommonProbes`] when two sets share no probe and
/// [`Error::NoDataSources`] when `sets` is empty.
pub fn reconcile(sets: &[MeasurementSet]) -> Result<Reconciliation> {
    match sets {
        [] => Err(Error::NoDataSources),
        [only] => Ok(Reconciliation {
            common: only.probe_ids.clone(),
            all: only.probe_ids.clone(),
            ip_version: only.ip_version,
            family_mismatch: false,
        }),
        [a, b, ..] => {
            let common: BTreeSet<ProbeId> =
                a.probe_ids.intersection(&b.probe_ids).copied().collect();
            if common.is_empty() {
                return Err(Error::NoCommonProbes {
                    set_a: a.probe_ids.iter().map(ToString::to_string).collect(),
                    set_b: b.probe_ids.iter().map(ToString::to_string).collect(),
                });
            }

            let all = a.probe_ids.union(&b.probe_ids).copied().collect();
            let family_mismatch = a.ip_version != b.ip_version;
            let ip_version = if family_mismatch {
                tracing::warn!(
                    "comparing an {} measurement with an {} measurement; showing IPv4 probe details",
                    a.ip_version,
                    b.ip_version
                );
                IpVersion::V4
            } else {
                a.ip_version
            };

            Ok(Reconciliation {
                common,
                all,
                ip_version,
                family_mismatch,
            })
        }
    }
}
