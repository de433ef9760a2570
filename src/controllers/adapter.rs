//! Controller adapter trait
//!
//! An adapter knows how one controller family authenticates, wraps its
//! payloads and names its identifiers. The traversal engine drives any
//! adapter through this trait.

use crate::decode::Payload;
use crate::engine::{CollectStats, CollectedItem, ResultTree, Traversal, TraversalConfig};
use crate::error::{Error, Result};
use crate::http::HttpClient;
use crate::loader::{DetailKind, EndpointDefinition, EndpointKind};
use crate::partition::{get_id_value, IdFields};
use crate::types::Solution;
use async_trait::async_trait;
use serde_json::Value;

/// Per-controller authentication and response normalization
#[async_trait]
pub trait ControllerAdapter: Send + Sync {
    /// Controller family
    fn solution(&self) -> Solution;

    /// HTTP client every request goes through
    fn client(&self) -> &HttpClient;

    /// Run the login handshake; failure is fatal for the run
    async fn authenticate(&self) -> Result<()> {
        self.client().authenticate().await
    }

    /// Fetch one concrete URL and normalize the response
    async fn fetch_data(&self, def: &EndpointDefinition, path: &str) -> Result<Payload>;

    /// Identifier candidates for items of `def`
    fn id_fields(&self, def: &EndpointDefinition) -> IdFields;

    /// Identifier of one item of `def`
    fn get_id_value(&self, item: &Value, def: &EndpointDefinition) -> Option<String> {
        get_id_value(item, &self.id_fields(def))
    }

    /// How the engine treats `def`
    fn classify(&self, def: &EndpointDefinition) -> EndpointKind {
        def.default_kind()
    }

    /// Rewrite the definitions once before traversal
    async fn prepare(&self, defs: Vec<EndpointDefinition>) -> Vec<EndpointDefinition> {
        defs
    }

    /// Collect a multi-step endpoint
    async fn fetch_multi_step(
        &self,
        def: &EndpointDefinition,
        kind: DetailKind,
    ) -> Result<Vec<CollectedItem>> {
        Err(Error::endpoint(
            &def.name,
            format!("{kind:?} endpoints are not supported by {}", self.solution()),
        ))
    }

    /// Whether item endpoints get `/{id}` appended
    fn appends_id(&self, _def: &EndpointDefinition) -> bool {
        true
    }

    /// Traversal settings for this controller
    fn traversal_config(&self) -> TraversalConfig {
        TraversalConfig::default()
    }
}

impl dyn ControllerAdapter + '_ {
    /// Collect every definition into a result tree
    pub async fn collect(&self, defs: &[EndpointDefinition]) -> ResultTree {
        self.collect_with_stats(defs).await.0
    }

    /// Collect every definition, returning the statistics as well
    pub async fn collect_with_stats(
        &self,
        defs: &[EndpointDefinition],
    ) -> (ResultTree, CollectStats) {
        Traversal::new(self).run(defs).await
    }
}
