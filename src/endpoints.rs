//! Packaged endpoint definitions embedded in the binary
//!
//! Every solution ships a default endpoint set, so a run only needs
//! `--endpoints-file` to collect something other than the defaults.

use crate::types::Solution;
use std::collections::HashMap;
use std::sync::LazyLock;

/// Packaged endpoint YAML per solution
pub static BUILTIN_ENDPOINTS: LazyLock<HashMap<Solution, &'static str>> = LazyLock::new(|| {
    let mut m = HashMap::new();

    m.insert(Solution::Sdwan, include_str!("../endpoints/sdwan.yaml"));
    m.insert(Solution::Ise, include_str!("../endpoints/ise.yaml"));
    m.insert(Solution::Ndo, include_str!("../endpoints/ndo.yaml"));
    m.insert(
        Solution::Catalystcenter,
        include_str!("../endpoints/catalystcenter.yaml"),
    );
    m.insert(Solution::Fmc, include_str!("../endpoints/fmc.yaml"));
    m.insert(Solution::Meraki, include_str!("../endpoints/meraki.yaml"));

    m
});

/// Get the packaged endpoint YAML for a solution
pub fn get_builtin(solution: Solution) -> Option<&'static str> {
    BUILTIN_ENDPOINTS.get(&solution).copied()
}

/// Check if a solution ships packaged endpoints
pub fn is_builtin(solution: Solution) -> bool {
    BUILTIN_ENDPOINTS.contains_key(&solution)
}

/// List solutions with packaged endpoints, in display order
pub fn list_builtin() -> Vec<Solution> {
    Solution::ALL
        .into_iter()
        .filter(|solution| is_builtin(*solution))
        .collect()
}

/// Solution metadata for display
#[derive(Debug, Clone)]
pub struct SolutionInfo {
    /// Solution
    pub solution: Solution,
    /// Product name
    pub description: &'static str,
    /// How the collector authenticates
    pub auth: &'static str,
    /// Whether `--username` is required
    pub needs_username: bool,
}

/// Get display info about every solution
pub fn list_builtin_info() -> Vec<SolutionInfo> {
    vec![
        SolutionInfo {
            solution: Solution::Sdwan,
            description: "Catalyst SD-WAN Manager (vManage)",
            auth: "form login, session cookie and XSRF token",
            needs_username: true,
        },
        SolutionInfo {
            solution: Solution::Ise,
            description: "Identity Services Engine",
            auth: "basic auth",
            needs_username: true,
        },
        SolutionInfo {
            solution: Solution::Ndo,
            description: "Nexus Dashboard Orchestrator",
            auth: "JSON login, session cookie",
            needs_username: true,
        },
        SolutionInfo {
            solution: Solution::Catalystcenter,
            description: "Catalyst Center",
            auth: "token (X-Auth-Token)",
            needs_username: true,
        },
        SolutionInfo {
            solution: Solution::Fmc,
            description: "Secure Firewall Management Center",
            auth: "access and refresh tokens, tenant domains",
            needs_username: true,
        },
        SolutionInfo {
            solution: Solution::Meraki,
            description: "Meraki Dashboard",
            auth: "API key (pass as --password)",
            needs_username: false,
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::load_endpoints_from_str;

    #[test]
    fn test_every_solution_is_packaged() {
        assert_eq!(list_builtin(), Solution::ALL.to_vec());
        assert_eq!(list_builtin_info().len(), Solution::ALL.len());
    }

    #[test]
    fn test_packaged_endpoints_parse_and_validate() {
        for solution in Solution::ALL {
            let yaml = get_builtin(solution).unwrap();
            let defs = load_endpoints_from_str(yaml)
                .unwrap_or_else(|e| panic!("{solution}: {e}"));
            assert!(!defs.is_empty(), "{solution} has no endpoints");
        }
    }
}
