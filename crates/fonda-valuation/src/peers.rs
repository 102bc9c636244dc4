//! Peer aggregation.

use fonda_core::CompanySnapshot;

use crate::multiples::{MultipleKind, Multiples};

/// Median of each multiple across peer snapshots.
///
/// Peers missing a multiple are skipped for that multiple; a multiple no peer
/// reports has no median.
#[must_use]
pub fn peer_medians(peers: &[CompanySnapshot]) -> Multiples {
    let peer_multiples: Vec<Multiples> = peers.iter().map(Multiples::compute).collect();
    MultipleKind::ALL
        .iter()
        .map(|kind| {
            let values: Vec<f64> = peer_multiples
                .iter()
                .filter_map(|multiples| multiples.get(*kind))
                .collect();
            (*kind, median(values))
        })
        .collect()
}

/// Median of a sample; the mean of the two middle values for even sizes.
#[must_use]
pub fn median(mut values: Vec<f64>) -> Option<f64> {
    values.retain(|v| v.is_finite());
    if values.is_empty() {
        return None;
    }
    values.sort_by(f64::total_cmp);
    let mid = values.len() / 2;
    Some(if values.len() % 2 == 0 {
        (values[mid - 1] + values[mid]) / 2.0
    } else {
        values[mid]
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use fonda_core::Facts;

    fn peer(symbol: &str, pe: f64, pb: Option<f64>) -> CompanySnapshot {
        let mut info = Facts::new().with("trailingPE", pe);
        if let Some(pb) = pb {
            info.insert("priceToBook", pb);
        }
        CompanySnapshot::new(symbol).with_info(info)
    }

    #[test]
    fn test_median() {
        assert_eq!(median(vec![3.0, 1.0, 2.0]), Some(2.0));
        assert_eq!(median(vec![4.0, 1.0, 3.0, 2.0]), Some(2.5));
        assert_eq!(median(vec![f64::NAN]), None);
        assert_eq!(median(Vec::new()), None);
    }

    #[test]
    fn test_peer_medians_skip_missing() {
        let peers = [
            peer("A", 10.0, Some(1.0)),
            peer("B", 20.0, None),
            peer("C", 30.0, Some(3.0)),
        ];
        let medians = peer_medians(&peers);
        assert_eq!(medians.get(MultipleKind::Pe), Some(20.0));
        assert_eq!(medians.get(MultipleKind::Pb), Some(2.0));
        assert_eq!(medians.get(MultipleKind::EvEbitda), None);
    }

    #[test]
    fn test_no_peers() {
        assert!(peer_medians(&[]).is_empty());
    }
}
