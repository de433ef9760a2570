//! Tests for the controller adapters

use super::*;
use crate::config::CollectorConfig;
use crate::error::Error;
use crate::loader::{load_endpoints_from_str, EndpointDefinition};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use test_case::test_case;
use wiremock::matchers::{body_json, header, method, path, query_param, query_param_is_missing};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn config(solution: Solution, server: &MockServer) -> CollectorConfig {
    CollectorConfig::new(solution, server.uri(), "admin", "secret")
}

fn defs(yaml: &str) -> Vec<EndpointDefinition> {
    load_endpoints_from_str(yaml).unwrap()
}

async fn collect(adapter: &dyn ControllerAdapter, defs: &[EndpointDefinition]) -> Value {
    adapter.authenticate().await.unwrap();
    adapter.collect(defs).await.to_json().unwrap()
}

// ============================================================================
// Factory
// ============================================================================

#[test_case(Solution::Sdwan)]
#[test_case(Solution::Ise)]
#[test_case(Solution::Ndo)]
#[test_case(Solution::Catalystcenter)]
#[test_case(Solution::Fmc)]
#[test_case(Solution::Meraki)]
fn test_make_adapter_selects_solution(solution: Solution) {
    let config = CollectorConfig::new(solution, "https://controller.example.com", "admin", "secret");
    let adapter = make_adapter(&config).unwrap();
    assert_eq!(adapter.solution(), solution);
}

#[test]
fn test_make_adapter_requires_username() {
    let config = CollectorConfig::new(Solution::Ise, "https://ise.example.com", "", "secret");
    assert!(matches!(
        make_adapter(&config),
        Err(Error::MissingConfigField { .. })
    ));
}

#[test]
fn test_make_adapter_requires_meraki_key() {
    let config = CollectorConfig::new(Solution::Meraki, MERAKI_TEST_URL, "", "");
    assert!(make_adapter(&config).is_err());
}

const MERAKI_TEST_URL: &str = "https://api.meraki.com/api/v1";

#[test_case("/ers/config/networkdevice", "/ers/config/networkdevice?size=100")]
#[test_case("/api/x?expanded=true", "/api/x?expanded=true&size=100")]
fn test_append_query(url: &str, expected: &str) {
    assert_eq!(append_query(url, "size", 100), expected);
}

#[test]
fn test_credential_field_mapping() {
    assert_eq!(credential_field("credentials_cli"), Some("cliCredential"));
    assert_eq!(credential_field("credentials_https_write"), Some("httpsWrite"));
    assert_eq!(credential_field("sites"), None);
}

// ============================================================================
// Meraki
// ============================================================================

#[tokio::test]
async fn test_meraki_pages_filters_organizations_and_records_import_ids() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/organizations"))
        .and(query_param_is_missing("startingAfter"))
        .and(header("Authorization", "Bearer secret"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header(
                    "Link",
                    format!("<{}/organizations?startingAfter=2>; rel=next", server.uri()).as_str(),
                )
                .set_body_json(json!([{"id": "1", "name": "one"}, {"id": "2", "name": "two"}])),
        )
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/organizations"))
        .and(query_param("startingAfter", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"id": "3", "name": "three"}])))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/organizations/1/admins"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"id": "a1"}])))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/organizations/3/admins"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let config = config(Solution::Meraki, &server)
        .with_meraki_requests_per_second(100)
        .with_meraki_org_ids(Some(vec!["1".to_string(), "3".to_string()]));
    let adapter = MerakiAdapter::new(&config).unwrap();

    let defs = defs(
        r"
- name: organization
  endpoint: /organizations
  has_own_id: true
  children:
    - name: admin
      endpoint: /admins
",
    );

    let tree = collect(&adapter, &defs).await;

    assert_eq!(
        tree,
        json!({
            "organization": [
                {
                    "data": {"id": "1", "name": "one"},
                    "endpoint": "/organizations/1",
                    "children": {
                        "admin": [
                            {
                                "data": {"id": "a1"},
                                "endpoint": "/organizations/1/admins",
                                "terraform_import_ids": ["1"]
                            }
                        ]
                    },
                    "terraform_import_ids": ["1"]
                },
                {
                    "data": {"id": "3", "name": "three"},
                    "endpoint": "/organizations/3",
                    "children": {"admin": []},
                    "terraform_import_ids": ["3"]
                }
            ]
        })
    );
}

#[tokio::test]
async fn test_meraki_singleton_stays_single_record() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/organizations/1/snmp"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"v2cEnabled": false})))
        .mount(&server)
        .await;

    let config = config(Solution::Meraki, &server).with_meraki_requests_per_second(100);
    let adapter = MerakiAdapter::new(&config).unwrap();
    let defs = defs("- name: snmp\n  endpoint: /organizations/1/snmp\n");

    let tree = collect(&adapter, &defs).await;

    assert_eq!(
        tree,
        json!({"snmp": {"data": {"v2cEnabled": false}, "endpoint": "/organizations/1/snmp", "terraform_import_ids": []}})
    );
}

// ============================================================================
// FMC
// ============================================================================

#[tokio::test]
async fn test_fmc_expands_domains_and_follows_pages() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/fmc_platform/v1/auth/generatetoken"))
        .respond_with(
            ResponseTemplate::new(204)
                .insert_header("X-auth-access-token", "access")
                .insert_header("X-auth-refresh-token", "refresh")
                .insert_header("DOMAINS", r#"[{"name":"Global","uuid":"d1"}]"#),
        )
        .expect(1)
        .mount(&server)
        .await;

    let hosts = "/api/fmc_config/v1/domain/d1/object/hosts";
    Mock::given(method("GET"))
        .and(path(hosts))
        .and(query_param("expanded", "true"))
        .and(query_param("limit", "1000"))
        .and(query_param_is_missing("offset"))
        .and(header("X-auth-access-token", "access"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [
                {"id": "h1", "metadata": {"domain": {"id": "d1"}}},
                {"id": "h2", "metadata": {"domain": {"id": "inherited"}}}
            ],
            "paging": {"next": [format!("https://fmc.example.com{hosts}?offset=2&limit=2&expanded=true")]}
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path(hosts))
        .and(query_param("offset", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [{"id": "h3"}],
            "paging": {}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let adapter = FmcAdapter::new(&config(Solution::Fmc, &server)).unwrap();
    let defs = defs("- name: hosts\n  endpoint: /api/fmc_config/v1/domain/{DOMAIN_UUID}/object/hosts\n");

    let tree = collect(&adapter, &defs).await;

    assert_eq!(
        tree,
        json!({
            "hosts": [
                {"data": {"id": "h1", "metadata": {"domain": {"id": "d1"}}}, "endpoint": format!("{hosts}/h1")},
                {"data": {"id": "h3"}, "endpoint": format!("{hosts}/h3")}
            ]
        })
    );
}

// ============================================================================
// ISE
// ============================================================================

#[tokio::test]
async fn test_ise_search_result_pages_and_details() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/admin/API/NetworkAccessConfig/ERS"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/ers/config/networkdevice"))
        .and(query_param("size", "100"))
        .and(query_param_is_missing("page"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "SearchResult": {
                "total": 2,
                "resources": [
                    {"id": "n1", "link": {"href": "https://ise.example.com/ers/config/networkdevice/n1"}}
                ],
                "nextPage": {"href": "https://ise.example.com/ers/config/networkdevice?size=100&page=2"}
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/ers/config/networkdevice"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "SearchResult": {
                "total": 2,
                "resources": [
                    {"id": "n2", "link": {"href": "https://ise.example.com/ers/config/networkdevice/n2"}}
                ]
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    for (id, name) in [("n1", "switch-1"), ("n2", "switch-2")] {
        Mock::given(method("GET"))
            .and(path(format!("/ers/config/networkdevice/{id}")))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"NetworkDevice": {"id": id, "name": name}})),
            )
            .expect(1)
            .mount(&server)
            .await;
    }

    let adapter = IseAdapter::new(&config(Solution::Ise, &server)).unwrap();
    let defs = defs("- name: network_device\n  endpoint: /ers/config/networkdevice\n");

    let tree = collect(&adapter, &defs).await;

    assert_eq!(
        tree,
        json!({
            "network_device": [
                {"data": {"id": "n1", "name": "switch-1"}, "endpoint": "/ers/config/networkdevice/n1"},
                {"data": {"id": "n2", "name": "switch-2"}, "endpoint": "/ers/config/networkdevice/n2"}
            ]
        })
    );
}

#[tokio::test]
async fn test_ise_response_envelope_and_nested_rule_id() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/admin/API/NetworkAccessConfig/ERS"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/v1/policy/network-access/policy-set/p1/authentication"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "response": [{"rule": {"id": "r1", "name": "Default"}}]
        })))
        .mount(&server)
        .await;

    let adapter = IseAdapter::new(&config(Solution::Ise, &server)).unwrap();
    let defs = defs(
        "- name: authentication_rules\n  endpoint: /api/v1/policy/network-access/policy-set/p1/authentication\n",
    );

    let tree = collect(&adapter, &defs).await;

    assert_eq!(
        tree["authentication_rules"][0]["endpoint"],
        "/api/v1/policy/network-access/policy-set/p1/authentication/r1"
    );
}

// ============================================================================
// NDO
// ============================================================================

#[tokio::test]
async fn test_ndo_named_envelope_key_merge_and_placeholder() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/login"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"token": "t"})))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/mso/api/v1/schemas"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "schemas": [{"id": "s1", "displayName": "A", "templates": [{"name": "x"}]}]
        })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/mso/api/v1/schemas/list-identity"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "schemas": [{"id": "s1", "templates": [{"name": "y"}]}, {"id": "s2"}]
        })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/mso/api/v1/templates/summaries"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([{"templateId": "tp1", "templateName": "T"}])),
        )
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/mso/api/v1/templates/tp1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "templateId": "tp1",
            "displayName": "T"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let adapter = NdoAdapter::new(&config(Solution::Ndo, &server)).unwrap();
    let defs = defs(
        r"
- name: schemas
  endpoint: /mso/api/v1/schemas
  key: id
- name: schemas
  endpoint: /mso/api/v1/schemas/list-identity
  key: id
- name: templates
  endpoint: /mso/api/v1/templates/summaries
- name: template_details
  endpoint: /mso/api/v1/templates/%v
",
    );

    let tree = collect(&adapter, &defs).await;

    assert_eq!(
        tree,
        json!({
            "schemas": [
                {
                    "data": {"id": "s1", "displayName": "A", "templates": [{"name": "x"}, {"name": "y"}]},
                    "endpoint": "/mso/api/v1/schemas/s1"
                },
                {"data": {"id": "s2"}, "endpoint": "/mso/api/v1/schemas/list-identity/s2"}
            ],
            "templates": [
                {
                    "data": {"templateId": "tp1", "templateName": "T"},
                    "endpoint": "/mso/api/v1/templates/summaries/tp1",
                    "children": {
                        "template_details": [
                            {"data": {"templateId": "tp1", "displayName": "T"}, "endpoint": "/mso/api/v1/templates/tp1"}
                        ]
                    }
                }
            ]
        })
    );
}

// ============================================================================
// Catalyst Center
// ============================================================================

#[tokio::test]
async fn test_catalystcenter_token_and_credential_mapping() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/dna/system/api/v1/auth/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"Token": "dnac"})))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/dna/intent/api/v2/global-credential"))
        .and(header("X-Auth-Token", "dnac"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "response": {
                "cliCredential": [{"id": "c1", "username": "netadmin"}],
                "snmpV3": []
            }
        })))
        .expect(2)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/dna/intent/api/v1/site"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "response": [{"id": "s1", "name": "Global"}]
        })))
        .mount(&server)
        .await;

    let adapter = CatalystCenterAdapter::new(&config(Solution::Catalystcenter, &server)).unwrap();
    let defs = defs(
        r"
- name: sites
  endpoint: /dna/intent/api/v1/site
- name: credentials_cli
  endpoint: /dna/intent/api/v2/global-credential
- name: credentials_snmpv3
  endpoint: /dna/intent/api/v2/global-credential
",
    );

    let tree = collect(&adapter, &defs).await;

    assert_eq!(
        tree,
        json!({
            "sites": [{"data": {"id": "s1", "name": "Global"}, "endpoint": "/dna/intent/api/v1/site/s1"}],
            "credentials_cli": [
                {
                    "data": {"id": "c1", "username": "netadmin"},
                    "endpoint": "/dna/intent/api/v2/global-credential/c1"
                }
            ],
            "credentials_snmpv3": []
        })
    );
}

// ============================================================================
// SD-WAN
// ============================================================================

async fn mount_sdwan_login(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/j_security_check"))
        .respond_with(
            ResponseTemplate::new(200).insert_header("Set-Cookie", "JSESSIONID=s1; Path=/"),
        )
        .expect(1)
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/dataservice/client/token"))
        .respond_with(ResponseTemplate::new(200).set_body_string("xsrf"))
        .expect(1)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_sdwan_feature_templates_are_fetched_per_template() {
    let server = MockServer::start().await;
    mount_sdwan_login(&server).await;

    Mock::given(method("GET"))
        .and(path("/dataservice/template/feature"))
        .and(header("X-XSRF-TOKEN", "xsrf"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{"templateId": "t1"}, {"templateId": "t2"}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    for id in ["t1", "t2"] {
        Mock::given(method("GET"))
            .and(path(format!("/dataservice/template/feature/object/{id}")))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"templateId": id, "templateType": "cisco_system"})),
            )
            .expect(1)
            .mount(&server)
            .await;
    }

    let adapter = SdwanAdapter::new(&config(Solution::Sdwan, &server)).unwrap();
    let defs = defs("- name: feature_template\n  endpoint: /template/feature/object/%i\n");

    let tree = collect(&adapter, &defs).await;

    assert_eq!(
        tree,
        json!({
            "feature_template": [
                {
                    "data": {"templateId": "t1", "templateType": "cisco_system"},
                    "endpoint": "/template/feature/object/t1"
                },
                {
                    "data": {"templateId": "t2", "templateType": "cisco_system"},
                    "endpoint": "/template/feature/object/t2"
                }
            ]
        })
    );
}

#[tokio::test]
async fn test_sdwan_device_templates_post_attached_devices() {
    let server = MockServer::start().await;
    mount_sdwan_login(&server).await;

    Mock::given(method("GET"))
        .and(path("/dataservice/template/device/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [
                {"templateId": "d1", "devicesAttached": 2},
                {"templateId": "d2", "devicesAttached": 0}
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/dataservice/template/device/config/attached/d1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{"uuid": "u1"}, {"uuid": "u2"}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/dataservice/template/device/config/attached/d2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": []})))
        .expect(0)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/dataservice/template/device/config/input/"))
        .and(body_json(json!({
            "templateId": "d1",
            "deviceIds": ["u1", "u2"],
            "isEdited": false,
            "isMasterEdited": false
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{"deviceId": "u1", "csv-host-name": "edge-1"}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let adapter = SdwanAdapter::new(&config(Solution::Sdwan, &server)).unwrap();
    let defs = defs("- name: cli_device_template\n  endpoint: /template/device/\n");

    let tree = collect(&adapter, &defs).await;

    assert_eq!(
        tree,
        json!({
            "cli_device_template": [
                {
                    "data": {"deviceId": "u1", "csv-host-name": "edge-1"},
                    "endpoint": "/template/device/u1"
                }
            ]
        })
    );
}

#[tokio::test]
async fn test_sdwan_device_template_failure_keeps_other_templates() {
    let server = MockServer::start().await;
    mount_sdwan_login(&server).await;

    Mock::given(method("GET"))
        .and(path("/dataservice/template/device/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [
                {"templateId": "d1", "devicesAttached": 1},
                {"templateId": "d2", "devicesAttached": 1}
            ]
        })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/dataservice/template/device/config/attached/d1"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"data": [{"uuid": "u1"}]})),
        )
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/dataservice/template/device/config/attached/d2"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/dataservice/template/device/config/input/"))
        .and(body_json(json!({
            "templateId": "d1",
            "deviceIds": ["u1"],
            "isEdited": false,
            "isMasterEdited": false
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{"deviceId": "u1", "csv-host-name": "edge-1"}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let adapter = SdwanAdapter::new(&config(Solution::Sdwan, &server)).unwrap();
    let defs = defs("- name: cli_device_template\n  endpoint: /template/device/\n");

    let tree = collect(&adapter, &defs).await;

    assert_eq!(
        tree,
        json!({
            "cli_device_template": [
                {
                    "data": {"deviceId": "u1", "csv-host-name": "edge-1"},
                    "endpoint": "/template/device/u1"
                }
            ]
        })
    );
}

#[tokio::test]
async fn test_sdwan_feature_template_honors_id_name() {
    let server = MockServer::start().await;
    mount_sdwan_login(&server).await;

    Mock::given(method("GET"))
        .and(path("/dataservice/template/feature"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"data": [{"templateId": "t1"}]})),
        )
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/dataservice/template/feature/object/t1"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"templateId": "t1", "templateName": "system-default"})),
        )
        .mount(&server)
        .await;

    let adapter = SdwanAdapter::new(&config(Solution::Sdwan, &server)).unwrap();
    let defs = defs(
        "- name: feature_template\n  endpoint: /template/feature/object/%i\n  id_name: templateName\n",
    );

    let tree = collect(&adapter, &defs).await;

    assert_eq!(
        tree["feature_template"][0]["endpoint"],
        "/template/feature/object/system-default"
    );
}

#[tokio::test]
async fn test_sdwan_feature_profiles_collect_parcels() {
    let server = MockServer::start().await;
    mount_sdwan_login(&server).await;

    let base = "/dataservice/v1/feature-profile/sdwan/system/";
    Mock::given(method("GET"))
        .and(path(base))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"profileId": "p1"}])))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path(format!("{base}p1")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "profileId": "p1",
            "associatedProfileParcels": [{"parcelType": "aaa", "parcelId": "a1"}]
        })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path(format!("{base}p1/aaa/a1")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "parcelId": "a1",
            "payload": {"name": "aaa"}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let adapter = SdwanAdapter::new(&config(Solution::Sdwan, &server)).unwrap();
    let defs = defs("- name: system_profile\n  endpoint: /v1/feature-profile/sdwan/system/\n");

    let tree = collect(&adapter, &defs).await;

    assert_eq!(
        tree,
        json!({
            "system_profile": [
                {
                    "data": {"parcelId": "a1", "payload": {"name": "aaa"}},
                    "endpoint": "/v1/feature-profile/sdwan/system/p1/aaa/a1/a1"
                }
            ]
        })
    );
}

#[tokio::test]
async fn test_sdwan_failed_endpoint_becomes_error_record() {
    let server = MockServer::start().await;
    mount_sdwan_login(&server).await;

    Mock::given(method("GET"))
        .and(path("/dataservice/template/policy/list/site"))
        .respond_with(ResponseTemplate::new(404).set_body_string("not found"))
        .mount(&server)
        .await;

    let adapter = SdwanAdapter::new(&config(Solution::Sdwan, &server)).unwrap();
    let defs = defs("- name: site_list\n  endpoint: /template/policy/list/site\n");

    let tree = collect(&adapter, &defs).await;

    assert_eq!(tree["site_list"]["error"]["status_code"], 404);
    assert_eq!(tree["site_list"]["endpoint"], "/template/policy/list/site");
}
