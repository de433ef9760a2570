//! Integration tests using mock HTTP server
//!
//! Tests the full end-to-end flow: config → adapter → authenticate →
//! traversal → serialized tree

use nac_collector::{
    load_endpoints_from_str, make_adapter, resolve_endpoints, CollectorConfig, Solution,
};
use pretty_assertions::assert_eq;
use serde_json::json;
use std::time::{Duration, Instant};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn mount_json(server: &MockServer, at: &str, body: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path(at))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .expect(1)
        .mount(server)
        .await;
}

// ============================================================================
// End-to-end Collection
// ============================================================================

#[tokio::test]
async fn test_meraki_organization_tree() {
    let server = MockServer::start().await;
    mount_json(&server, "/organizations", json!([{"id": "o1", "name": "Org"}])).await;
    mount_json(&server, "/organizations/o1/admins", json!([])).await;
    mount_json(&server, "/organizations/o1/networks", json!([{"id": "N1"}])).await;
    mount_json(&server, "/networks/N1/appliance/vlans", json!([{"id": 10, "subnet": "10.0.0.0/24"}])).await;

    let config = CollectorConfig::new(Solution::Meraki, server.uri(), "", "api-key")
        .with_meraki_requests_per_second(50);
    let adapter = make_adapter(&config).unwrap();

    let defs = load_endpoints_from_str(
        r"
- name: organization
  endpoint: /organizations
  has_own_id: true
  children:
    - name: admin
      endpoint: /admins
    - name: network
      endpoint: /networks
      has_own_id: true
      root: true
      children:
        - name: appliance_vlan
          endpoint: /appliance/vlans
          has_own_id: true
",
    )
    .unwrap();

    adapter.authenticate().await.unwrap();
    let (tree, stats) = adapter.collect_with_stats(&defs).await;

    assert_eq!(
        tree.to_json().unwrap(),
        json!({
            "organization": [
                {
                    "data": {"id": "o1", "name": "Org"},
                    "endpoint": "/organizations/o1",
                    "children": {
                        "admin": [],
                        "network": [
                            {
                                "data": {"id": "N1"},
                                "endpoint": "/organizations/o1/networks/N1",
                                "children": {
                                    "appliance_vlan": [
                                        {
                                            "data": {"id": 10, "subnet": "10.0.0.0/24"},
                                            "endpoint": "/networks/N1/appliance/vlans/10",
                                            "terraform_import_ids": ["N1", "10"]
                                        }
                                    ]
                                },
                                "terraform_import_ids": ["o1", "N1"]
                            }
                        ]
                    },
                    "terraform_import_ids": ["o1"]
                }
            ]
        })
    );
    assert_eq!(stats.fetches, 4);
    assert_eq!(stats.failures, 0);
}

#[tokio::test]
async fn test_rate_limited_request_waits_retry_after() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/admin/API/NetworkAccessConfig/ERS"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/v1/license/system/tier-state"))
        .respond_with(ResponseTemplate::new(429).insert_header("Retry-After", "5"))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/v1/license/system/tier-state"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"name": "ESSENTIAL"}])))
        .expect(1)
        .mount(&server)
        .await;

    let config = CollectorConfig::new(Solution::Ise, server.uri(), "admin", "secret");
    let adapter = make_adapter(&config).unwrap();
    let defs =
        load_endpoints_from_str("- name: license_tier\n  endpoint: /api/v1/license/system/tier-state\n")
            .unwrap();

    adapter.authenticate().await.unwrap();
    let start = Instant::now();
    let tree = adapter.collect(&defs).await.to_json().unwrap();

    // The header wins over the 60 second default
    let elapsed = start.elapsed();
    assert!(elapsed >= Duration::from_secs(5));
    assert!(elapsed < Duration::from_secs(10));
    assert_eq!(tree["license_tier"][0]["data"]["name"], "ESSENTIAL");
}

#[tokio::test]
async fn test_expired_session_reauthenticates_silently() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/dna/system/api/v1/auth/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"Token": "fresh"})))
        .expect(2)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/dna/intent/api/v1/site"))
        .respond_with(ResponseTemplate::new(401))
        .up_to_n_times(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/dna/intent/api/v1/site"))
        .and(header("X-Auth-Token", "fresh"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"response": [{"id": "s1", "name": "Global"}]})),
        )
        .mount(&server)
        .await;

    let config = CollectorConfig::new(Solution::Catalystcenter, server.uri(), "admin", "secret");
    let adapter = make_adapter(&config).unwrap();
    let defs = load_endpoints_from_str("- name: sites\n  endpoint: /dna/intent/api/v1/site\n").unwrap();

    adapter.authenticate().await.unwrap();
    let tree = adapter.collect(&defs).await.to_json().unwrap();

    assert_eq!(tree["sites"][0]["endpoint"], "/dna/intent/api/v1/site/s1");
}

#[tokio::test]
async fn test_rejected_credentials_are_fatal() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let config = CollectorConfig::new(Solution::Ise, server.uri(), "admin", "wrong");
    let adapter = make_adapter(&config).unwrap();

    let err = adapter.authenticate().await.unwrap_err();
    assert!(err.is_fatal());
}

// ============================================================================
// Packaged Endpoints
// ============================================================================

#[test]
fn test_packaged_endpoints_resolve_for_every_solution() {
    for solution in Solution::ALL {
        let defs = resolve_endpoints(solution, None).unwrap();
        assert!(!defs.is_empty(), "{solution} has no packaged endpoints");
    }
}

#[test]
fn test_packaged_fmc_endpoints_are_domain_scoped() {
    let defs = resolve_endpoints(Solution::Fmc, None).unwrap();
    assert!(defs.iter().any(nac_collector::EndpointDefinition::is_domain_scoped));
}
