//! History reconstruction and remediation detection.
//!
//! Groups raw finding records by (resource, check), orders each group
//! chronologically, and derives one immutable `RemediationRecord` per group:
//! first/last seen, current state, collapsed status history, and the first
//! FAIL -> PASS transition if one exists.

use std::collections::BTreeMap;

use remtrack_core::{FindingRecord, RemediationRecord, StatusChange};

/// Reconstruct per-(resource, check) remediation history from a flat set of
/// finding records.
///
/// Pure function of its input. Records with an empty `resource_id` or no
/// timestamp are skipped; groups with fewer than two timestamped
/// observations carry no history and are excluded. Ties on timestamp keep
/// their original ingestion order (stable sort), and output is ordered by
/// (resource_id, check_id) so repeated runs over permutations of the same
/// input yield identical results.
pub fn reconstruct(records: &[FindingRecord]) -> Vec<RemediationRecord> {
    let mut groups: BTreeMap<(&str, &str), Vec<&FindingRecord>> = BTreeMap::new();
    for record in records {
        if record.resource_id.trim().is_empty() {
            continue;
        }
        if record.timestamp.is_none() {
            continue;
        }
        groups
            .entry((record.resource_id.as_str(), record.check_id.as_str()))
            .or_default()
            .push(record);
    }

    let mut out = Vec::with_capacity(groups.len());
    for ((resource_id, check_id), mut group) in groups {
        // Stable: equal timestamps preserve ingestion order.
        group.sort_by_key(|r| r.timestamp);

        if group.len() < 2 {
            continue;
        }

        let timestamps: Vec<_> = group.iter().map(|r| r.timestamp.expect("filtered")).collect();
        let statuses: Vec<_> = group.iter().map(|r| &r.status).collect();

        let first_detected = timestamps[0];
        let last_checked = *timestamps.last().expect("len >= 2");
        let current_status = (*statuses.last().expect("len >= 2")).clone();

        // Collapse consecutive repeats into a status history, remembering the
        // index of the last change for days_in_current_state.
        let mut status_history = Vec::new();
        let mut last_change_idx = None;
        for (i, status) in statuses.iter().enumerate() {
            if i == 0 || *status != statuses[i - 1] {
                status_history.push(StatusChange {
                    status: (*status).clone(),
                    at: timestamps[i],
                });
                if i > 0 {
                    last_change_idx = Some(i);
                }
            }
        }

        // First FAIL -> PASS adjacent transition wins; later regressions do
        // not clear it (current_status still reflects the final observation).
        let mut remediation_date = None;
        for i in 1..statuses.len() {
            if statuses[i - 1].is_fail() && statuses[i].is_pass() {
                remediation_date = Some(timestamps[i]);
                break;
            }
        }
        let days_to_remediate = remediation_date
            .map(|d| d.signed_duration_since(first_detected).num_days());

        let days_in_current_state = match last_change_idx {
            Some(i) => last_checked
                .signed_duration_since(timestamps[i])
                .num_days(),
            None => 0,
        };

        let earliest = group[0];
        out.push(RemediationRecord {
            resource_id: resource_id.to_string(),
            check_id: check_id.to_string(),
            severity: earliest.severity,
            first_detected,
            last_checked,
            current_status,
            was_remediated: remediation_date.is_some(),
            remediation_date,
            days_to_remediate,
            days_in_current_state,
            status_history,
            check_title: first_some(&group, |r| r.check_title.as_ref()),
            resource_type: first_some(&group, |r| r.resource_type.as_ref()),
            resource_name: first_some(&group, |r| r.resource_name.as_ref()),
            region: first_some(&group, |r| r.region.as_ref()),
            account_id: first_some(&group, |r| r.account_id.as_ref()),
            remediation_text: first_some(&group, |r| r.remediation_text.as_ref()),
        });
    }
    out
}

/// Earliest non-empty value of a metadata field within an ordered group.
fn first_some<F>(group: &[&FindingRecord], field: F) -> Option<String>
where
    F: Fn(&FindingRecord) -> Option<&String>,
{
    group.iter().find_map(|r| field(r).cloned())
}
