//! Primary-cell selection.
//!
//! Turns the platform's cell list into a [`CellReport`] with one effective
//! primary and the remaining registered cells as alternates, in input order.

use crate::core::normalize::normalize;
use crate::core::report::CellReport;
use crate::platform::types::{PlatformTier, RawCellReading};

/// Build a report from a raw cell list.
///
/// Only registered readings take part. The first serving sample wins; when
/// none is serving, the first alternate with loaded data is promoted, or the
/// first alternate if none has data. A promoted alternate keeps
/// `primary == false`. `tier` decides how connection status is read.
pub fn select_primary(readings: &[Option<RawCellReading>], tier: PlatformTier) -> CellReport {
    tracing::trace!(?tier, "selecting primary from {} reading(s)", readings.len());

    let mut report = CellReport::empty();

    for reading in readings.iter().flatten().filter(|r| r.registered) {
        let mut sample = normalize(Some(reading), tier);
        if report.primary.is_none() && sample.primary {
            report.primary = Some(sample);
        } else {
            sample.primary = false;
            report.alternates.push(sample);
        }
    }

    if report.primary.is_none() && !report.alternates.is_empty() {
        let index = report
            .alternates
            .iter()
            .position(|s| s.data_loaded)
            .unwrap_or(0);
        let mut promoted = report.alternates.remove(index);
        promoted.primary = false;
        report.primary = Some(promoted);
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::report::{ConnectionStatus, Technology};
    use crate::platform::types::{
        RawCellSignal, RawStrength, CONNECTION_NONE, CONNECTION_PRIMARY_SERVING,
        CONNECTION_SECONDARY_SERVING,
    };

    fn reading(signal: RawCellSignal, registered: bool, status: i32) -> Option<RawCellReading> {
        Some(RawCellReading::new(signal, registered, Some(status)))
    }

    const TIER: PlatformTier = PlatformTier::Standard;

    fn strength(dbm: i32) -> RawStrength {
        RawStrength { dbm, level: 2 }
    }

    #[test]
    fn test_primary_with_alternates() {
        let input = vec![
            reading(
                RawCellSignal::Lte(strength(-85)),
                true,
                CONNECTION_PRIMARY_SERVING,
            ),
            reading(
                RawCellSignal::Gsm(strength(-100)),
                true,
                CONNECTION_SECONDARY_SERVING,
            ),
            reading(RawCellSignal::Wcdma(strength(-95)), false, CONNECTION_NONE),
        ];

        let report = select_primary(&input, TIER);
        let primary = report.primary.unwrap();
        assert_eq!(primary.technology, Technology::Lte);
        assert_eq!(primary.dbm, -85);
        assert!(primary.primary);

        assert_eq!(report.alternates.len(), 1);
        assert_eq!(report.alternates[0].technology, Technology::Gsm);
        assert!(!report.alternates[0].primary);
    }

    #[test]
    fn test_fallback_prefers_loaded_alternate() {
        let input = vec![
            reading(RawCellSignal::Unrecognized, true, CONNECTION_NONE),
            reading(RawCellSignal::Lte(strength(-101)), true, CONNECTION_NONE),
        ];

        let report = select_primary(&input, TIER);
        let primary = report.primary.unwrap();
        assert_eq!(primary.technology, Technology::Lte);
        assert!(!primary.primary);
        assert_eq!(report.alternates.len(), 1);
        assert_eq!(report.alternates[0].technology, Technology::Unknown);
    }

    #[test]
    fn test_fallback_without_loaded_data_takes_first() {
        let input = vec![
            reading(RawCellSignal::Unrecognized, true, CONNECTION_NONE),
            reading(RawCellSignal::Unrecognized, true, CONNECTION_NONE),
        ];

        let report = select_primary(&input, TIER);
        assert!(report.primary.is_some());
        assert_eq!(report.alternates.len(), 1);
        assert_eq!(report.sample_count(), 2);
    }

    #[test]
    fn test_empty_and_unregistered_input() {
        assert_eq!(select_primary(&[], TIER), CellReport::empty());

        let input = vec![
            None,
            reading(RawCellSignal::Gsm(strength(-70)), false, CONNECTION_NONE),
        ];
        assert_eq!(select_primary(&input, TIER), CellReport::empty());
    }

    #[test]
    fn test_only_first_serving_cell_is_primary() {
        let input = vec![
            reading(RawCellSignal::Nr(strength(-80)), true, CONNECTION_NONE),
            reading(
                RawCellSignal::Lte(strength(-90)),
                true,
                CONNECTION_SECONDARY_SERVING,
            ),
            reading(
                RawCellSignal::Lte(strength(-91)),
                true,
                CONNECTION_PRIMARY_SERVING,
            ),
        ];

        let report = select_primary(&input, TIER);
        assert_eq!(report.primary_dbm(), Some(-90));
        let dbms: Vec<i32> = report.alternates.iter().map(|s| s.dbm).collect();
        assert_eq!(dbms, vec![-80, -91]);
        assert!(report.alternates.iter().all(|s| !s.primary));
    }

    #[test]
    fn test_selection_is_deterministic() {
        let input = vec![
            reading(RawCellSignal::Cdma(strength(-99)), true, CONNECTION_NONE),
            reading(RawCellSignal::Gsm(strength(-98)), true, CONNECTION_NONE),
            None,
        ];
        assert_eq!(select_primary(&input, TIER), select_primary(&input, TIER));
    }

    #[test]
    fn test_legacy_tier_reads_registration_as_serving() {
        let input = vec![
            reading(RawCellSignal::Gsm(strength(-97)), true, CONNECTION_NONE),
            reading(RawCellSignal::Lte(strength(-88)), true, CONNECTION_NONE),
        ];

        let report = select_primary(&input, PlatformTier::Legacy);
        let primary = report.primary.unwrap();
        assert_eq!(primary.technology, Technology::Gsm);
        assert!(primary.primary);
        assert_eq!(primary.connection_status, ConnectionStatus::PrimaryServing);
        assert_eq!(report.alternates.len(), 1);
        assert!(!report.alternates[0].primary);

        // The same input on a tier with status codes takes the fallback path.
        let report = select_primary(&input, TIER);
        assert!(!report.primary.unwrap().primary);
    }
}
