//! A fabrication job as stored by the tracker.

use super::RecordId;
use serde::{Deserialize, Serialize};

/// A job tracked through the fabrication stages.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: RecordId,
    pub project_no: String,
    #[serde(default)]
    pub drawing_date: Option<String>,
    #[serde(default)]
    pub customer: Option<String>,
    #[serde(default)]
    pub po_payment: Option<String>,
    #[serde(default)]
    pub requested_delivery: Option<String>,
    #[serde(default)]
    pub remarks: Option<String>,
}

impl Project {
    /// Payment is confirmed when the PO field reads `OK` in any case.
    pub fn is_payment_ok(&self) -> bool {
        self.po_payment
            .as_deref()
            .is_some_and(|p| p.trim().eq_ignore_ascii_case("ok"))
    }

    pub fn payment_label(&self) -> &str {
        match self.po_payment.as_deref() {
            Some(p) if !p.trim().is_empty() => p,
            _ => "Pending",
        }
    }
}

/// Fields sent when creating a project or partially updating one.
/// Unset fields are omitted from the body.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProjectDraft {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_no: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub drawing_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub po_payment: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub requested_delivery: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remarks: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_camel_case_fields() {
        let raw = r#"{"id":3,"projectNo":"17408","customer":"Acme","poPayment":"ok"}"#;
        let project: Project = serde_json::from_str(raw).unwrap();
        assert_eq!(project.project_no, "17408");
        assert!(project.is_payment_ok());
        assert_eq!(project.remarks, None);
    }

    #[test]
    fn missing_payment_reads_as_pending() {
        let raw = r#"{"id":"p1","projectNo":"1","poPayment":""}"#;
        let project: Project = serde_json::from_str(raw).unwrap();
        assert!(!project.is_payment_ok());
        assert_eq!(project.payment_label(), "Pending");
    }

    #[test]
    fn draft_omits_unset_fields() {
        let draft = ProjectDraft {
            remarks: Some("rush".into()),
            ..Default::default()
        };
        assert_eq!(serde_json::to_string(&draft).unwrap(), r#"{"remarks":"rush"}"#);
    }
}
