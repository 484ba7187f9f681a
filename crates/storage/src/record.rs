use serde::{Deserialize, Serialize};

use crate::ulid;

/// One lab test outcome as returned by the result store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LabResult {
    pub id: i64,
    pub ulid: String,
    pub lab_id: i64,
    pub nif: String,
    pub patient_name: String,
    /// Milliseconds since the Unix epoch.
    pub date: i64,
    pub data: String,
    /// Free-form status label, usually "Pendiente", "En Proceso",
    /// "Finalizado" or "Crítico". Not validated.
    pub status: String,
}

impl LabResult {
    /// Creation time encoded in the ULID, in milliseconds since the epoch.
    ///
    /// `None` if the store handed back a malformed ULID.
    pub fn created_at(&self) -> Option<u64> {
        ulid::timestamp_ms(&self.ulid)
    }
}

/// Payload for creating (or fully replacing) a result.
///
/// The store assigns `id` and `ulid`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewResult {
    pub lab_id: i64,
    pub nif: String,
    pub patient_name: String,
    pub data: String,
    pub status: String,
    /// Milliseconds since the Unix epoch.
    pub date: i64,
}

impl NewResult {
    /// Attach store-assigned identity to this payload.
    pub fn into_result(self, id: i64, ulid: String) -> LabResult {
        LabResult {
            id,
            ulid,
            lab_id: self.lab_id,
            nif: self.nif,
            patient_name: self.patient_name,
            date: self.date,
            data: self.data,
            status: self.status,
        }
    }
}

/// A laboratory as published by the lab directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Lab {
    pub id: i64,
    pub ulid: String,
    pub key_name: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
}

impl Lab {
    pub fn created_at(&self) -> Option<u64> {
        ulid::timestamp_ms(&self.ulid)
    }
}

/// Payload for creating or updating a lab.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LabParams {
    pub key_name: String,
    pub name: String,
    pub description: String,
}

/// Multi-criteria result filter.
///
/// Unset fields do not constrain the match. Empty strings are treated as
/// unset, matching how the filter is serialized to query parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultFilter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lab_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nif: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub patient_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<i64>,
}

impl ResultFilter {
    /// Query parameters for the set, non-empty criteria, in declaration order.
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(lab_id) = self.lab_id {
            pairs.push(("labId", lab_id.to_string()));
        }
        if let Some(nif) = non_empty(&self.nif) {
            pairs.push(("nif", nif.to_string()));
        }
        if let Some(name) = non_empty(&self.patient_name) {
            pairs.push(("patientName", name.to_string()));
        }
        if let Some(status) = non_empty(&self.status) {
            pairs.push(("status", status.to_string()));
        }
        if let Some(start) = self.start_date {
            pairs.push(("startDate", start.to_string()));
        }
        if let Some(end) = self.end_date {
            pairs.push(("endDate", end.to_string()));
        }
        pairs
    }

    /// Whether `result` satisfies every set criterion.
    ///
    /// `lab_id`, `nif` and `status` match exactly, `patient_name` is a
    /// case-insensitive substring match, and the date bounds are inclusive.
    pub fn matches(&self, result: &LabResult) -> bool {
        if self.lab_id.is_some_and(|id| id != result.lab_id) {
            return false;
        }
        if non_empty(&self.nif).is_some_and(|nif| nif != result.nif) {
            return false;
        }
        if non_empty(&self.status).is_some_and(|status| status != result.status) {
            return false;
        }
        if let Some(name) = non_empty(&self.patient_name) {
            if !result
                .patient_name
                .to_lowercase()
                .contains(&name.to_lowercase())
            {
                return false;
            }
        }
        if self.start_date.is_some_and(|start| result.date < start) {
            return false;
        }
        if self.end_date.is_some_and(|end| result.date > end) {
            return false;
        }
        true
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(lab_id: i64, nif: &str, name: &str, date: i64, status: &str) -> LabResult {
        LabResult {
            id: 1,
            ulid: "01ARZ3NDEKTSV4RRFFQ69G5FAV".to_string(),
            lab_id,
            nif: nif.to_string(),
            patient_name: name.to_string(),
            date,
            data: "hemograma".to_string(),
            status: status.to_string(),
        }
    }

    #[test]
    fn lab_result_uses_camel_case_on_the_wire() {
        let r = result(3, "12345678-9", "Ana", 1_700_000_000_000, "Pendiente");
        let json = serde_json::to_value(r).unwrap();
        assert_eq!(json["labId"], 3);
        assert_eq!(json["patientName"], "Ana");
        assert!(json.get("lab_id").is_none());
    }

    #[test]
    fn lab_without_description_deserializes() {
        let lab: Lab = serde_json::from_value(serde_json::json!({
            "id": 1, "ulid": "01ARZ3NDEKTSV4RRFFQ69G5FAV", "keyName": "LAB-HEM-01", "name": "Hematología"
        }))
        .unwrap();
        assert_eq!(lab.key_name, "LAB-HEM-01");
        assert_eq!(lab.description, "");
    }

    #[test]
    fn created_at_reads_ulid_timestamp() {
        let r = result(1, "1", "Ana", 0, "Pendiente");
        assert_eq!(r.created_at(), Some(1_469_922_850_259));
    }

    #[test]
    fn empty_filter_matches_everything() {
        let filter = ResultFilter::default();
        assert!(filter.matches(&result(1, "1", "Ana", 0, "Pendiente")));
        assert!(filter.query_pairs().is_empty());
    }

    #[test]
    fn filter_query_pairs_skip_empty_strings() {
        let filter = ResultFilter {
            lab_id: Some(2),
            nif: Some(String::new()),
            patient_name: Some("ana".to_string()),
            end_date: Some(99),
            ..Default::default()
        };
        assert_eq!(
            filter.query_pairs(),
            vec![
                ("labId", "2".to_string()),
                ("patientName", "ana".to_string()),
                ("endDate", "99".to_string()),
            ]
        );
    }

    #[test]
    fn filter_patient_name_is_case_insensitive_substring() {
        let filter = ResultFilter {
            patient_name: Some("PACIENTE 1".to_string()),
            ..Default::default()
        };
        assert!(filter.matches(&result(1, "1", "Paciente 1-3", 0, "Pendiente")));
        assert!(!filter.matches(&result(1, "1", "Paciente 2-3", 0, "Pendiente")));
    }

    #[test]
    fn filter_date_bounds_are_inclusive() {
        let filter = ResultFilter {
            start_date: Some(10),
            end_date: Some(20),
            ..Default::default()
        };
        assert!(filter.matches(&result(1, "1", "Ana", 10, "Pendiente")));
        assert!(filter.matches(&result(1, "1", "Ana", 20, "Pendiente")));
        assert!(!filter.matches(&result(1, "1", "Ana", 21, "Pendiente")));
        assert!(!filter.matches(&result(1, "1", "Ana", 9, "Pendiente")));
    }

    #[test]
    fn filter_combines_criteria() {
        let filter = ResultFilter {
            lab_id: Some(1),
            status: Some("Finalizado".to_string()),
            ..Default::default()
        };
        assert!(filter.matches(&result(1, "1", "Ana", 0, "Finalizado")));
        assert!(!filter.matches(&result(2, "1", "Ana", 0, "Finalizado")));
        assert!(!filter.matches(&result(1, "1", "Ana", 0, "Pendiente")));
    }
}
