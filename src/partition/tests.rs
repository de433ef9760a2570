//! Tests for partition module

use super::*;
use crate::loader::{load_endpoints_from_str, EndpointDefinition, EndpointMetadata};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use test_case::test_case;

// ============================================================================
// Identifier Tests
// ============================================================================

fn sdwan_fields() -> IdFields {
    IdFields::new(&[
        "id",
        "definitionId",
        "parcelId",
        "policyId",
        "templateId",
        "deviceId",
        "name",
    ])
}

#[test_case(json!({"id": "a", "name": "b"}), Some("a") ; "id wins")]
#[test_case(json!({"definitionId": "d", "name": "n"}), Some("d") ; "definition id")]
#[test_case(json!({"templateId": "t", "deviceId": "x"}), Some("t") ; "template before device")]
#[test_case(json!({"name": "only-name"}), Some("only-name") ; "name fallback")]
#[test_case(json!({"id": 42}), Some("42") ; "integer id")]
#[test_case(json!({"id": null, "name": "n"}), Some("n") ; "null id skipped")]
#[test_case(json!({"id": {"nested": 1}}), None ; "object id rejected")]
#[test_case(json!({"other": 1}), None ; "no candidate")]
fn test_get_id_value_sdwan(item: Value, expected: Option<&str>) {
    assert_eq!(get_id_value(&item, &sdwan_fields()).as_deref(), expected);
}

#[test]
fn test_get_id_value_nested_rule() {
    let fields = IdFields::new(&["id", "rule.id", "name"]);
    let item = json!({"rule": {"id": "r-1", "name": "Default"}});
    assert_eq!(get_id_value(&item, &fields).as_deref(), Some("r-1"));
}

#[test]
fn test_id_fields_override() {
    let fields = IdFields::new(&["id", "name"]).with_override(Some("serial"));
    assert_eq!(fields.candidates(), &["serial", "id", "name"]);

    let fields = IdFields::new(&["id", "name"]).with_override(Some("name"));
    assert_eq!(fields.candidates(), &["name", "id"]);

    let unchanged = IdFields::new(&["id"]).with_override(None);
    assert_eq!(unchanged, IdFields::single("id"));
}

#[test]
fn test_single_field_does_not_fall_back() {
    let fields = IdFields::single("serial");
    assert_eq!(get_id_value(&json!({"id": "x"}), &fields), None);
}

// ============================================================================
// Child URL Tests
// ============================================================================

#[test_case("/organizations", "1", "/networks", "/organizations/1/networks" ; "appended")]
#[test_case("/parent", "2", "/parent/%v/child", "/parent/2/child" ; "placeholder")]
#[test_case("/policy-set", "abc", "", "/policy-set/abc" ; "empty template")]
fn test_resolve_child_url(parent: &str, id: &str, template: &str, expected: &str) {
    assert_eq!(resolve_child_url(parent, id, template), expected);
}

// ============================================================================
// Parent Condition Tests
// ============================================================================

fn child_with(types: Option<&[&str]>, models: Option<&[&str]>) -> EndpointDefinition {
    EndpointDefinition::new("child", "/child").with_metadata(EndpointMetadata {
        allowed_device_types: types.map(|t| t.iter().map(ToString::to_string).collect()),
        allowed_device_models: models.map(|m| m.iter().map(ToString::to_string).collect()),
        ..EndpointMetadata::default()
    })
}

#[test]
fn test_conditions_from_device_item() {
    let device = EndpointDefinition::new("device", "/devices");
    let conditions = ParentConditions::default()
        .inherit(&device, &json!({"productType": "camera", "model": "MV12"}));

    assert_eq!(conditions.device_type.as_deref(), Some("camera"));
    assert_eq!(conditions.device_model.as_deref(), Some("MV12"));
}

#[test]
fn test_conditions_inherited_through_other_items() {
    let conditions = ParentConditions {
        device_type: Some("switch".into()),
        device_model: None,
    };
    let port = EndpointDefinition::new("switch_port", "/switch/ports");
    assert_eq!(conditions.inherit(&port, &json!({"productType": "x"})), conditions);
}

#[test]
fn test_skip_by_device_type() {
    let conditions = ParentConditions {
        device_type: Some("camera".into()),
        device_model: None,
    };
    let reason = conditions.skip_reason(&child_with(Some(&["switch"]), None));
    assert_eq!(
        reason.as_deref(),
        Some("the endpoint is not applicable for device type camera")
    );
    assert!(conditions
        .skip_reason(&child_with(Some(&["switch", "camera"]), None))
        .is_none());
}

#[test]
fn test_skip_by_device_model_prefix() {
    let conditions = ParentConditions {
        device_type: Some("switch".into()),
        device_model: Some("MS220-8P".into()),
    };
    assert!(conditions
        .skip_reason(&child_with(Some(&["switch"]), Some(&["MS3", "MS4"])))
        .is_some());
    assert!(conditions
        .skip_reason(&child_with(None, Some(&["MS2"])))
        .is_none());
}

#[test]
fn test_missing_attribute_never_skips() {
    let conditions = ParentConditions::default();
    assert!(conditions
        .skip_reason(&child_with(Some(&["switch"]), Some(&["MS"])))
        .is_none());
}

// ============================================================================
// Domain Router Tests
// ============================================================================

#[test]
fn test_domain_router_expands_in_order() {
    let defs = load_endpoints_from_str(
        r"
- name: domains
  endpoint: /api/fmc_platform/v1/info/domain
- name: hosts
  endpoint: /api/fmc_config/v1/domain/{DOMAIN_UUID}/object/hosts
",
    )
    .unwrap();

    let router = DomainRouter::new(vec!["d1".into(), "d2".into()]);
    let expanded = router.expand(defs);

    let endpoints: Vec<_> = expanded.iter().map(|d| d.endpoint.as_str()).collect();
    assert_eq!(
        endpoints,
        vec![
            "/api/fmc_platform/v1/info/domain",
            "/api/fmc_config/v1/domain/d1/object/hosts",
            "/api/fmc_config/v1/domain/d2/object/hosts",
        ]
    );
    assert_eq!(expanded[1].name, "hosts");
    assert_eq!(expanded[2].name, "hosts");
}

#[test]
fn test_domain_router_without_domains_drops_scoped() {
    let defs = vec![
        EndpointDefinition::new("plain", "/x"),
        EndpointDefinition::new("scoped", "/domain/{DOMAIN_UUID}/y"),
    ];
    let expanded = DomainRouter::default().expand(defs);
    assert_eq!(expanded.len(), 1);
    assert_eq!(expanded[0].name, "plain");
}
