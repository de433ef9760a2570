//! Traversal engine module
//!
//! Depth-first endpoint traversal and result tree assembly.
//!
//! # Overview
//!
//! The engine module provides:
//! - `Traversal` - Walks an endpoint definition forest through an adapter
//! - `ResultTree` / `ResultEntry` / `CollectedItem` - The owned result tree
//! - `TraversalConfig` - Sequential or concurrent fan-out, import ids
//!
//! Every subtree is built bottom-up and attached to its parent item only once
//! complete, so concurrent branches never share a result slot.

mod types;

pub use types::{
    CollectStats, CollectedItem, ErrorRecord, FanOut, ResultEntry, ResultTree, SkippedFetch,
    TraversalConfig,
};

use crate::controllers::ControllerAdapter;
use crate::decode::Payload;
use crate::loader::{find_placeholder_parent, EndpointDefinition, EndpointKind};
use crate::partition::{resolve_child_url, ParentConditions};
use futures::future::{join_all, BoxFuture};
use serde_json::Value;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Context handed from a parent item to its children
#[derive(Debug, Clone, Default)]
struct Ancestry {
    /// Identifiers of the items above, outermost first
    ids: Vec<String>,
    /// Conditions observed on the items above
    conditions: ParentConditions,
}

/// A pending child fetch, placed by parent item and child position
struct ChildFetch<'d> {
    item: usize,
    position: usize,
    child: &'d EndpointDefinition,
    uri: String,
    ancestry: Ancestry,
}

/// Walks endpoint definitions through one controller adapter
pub struct Traversal<'a> {
    adapter: &'a dyn ControllerAdapter,
    config: TraversalConfig,
}

impl<'a> Traversal<'a> {
    /// Create a traversal using the adapter's configuration
    pub fn new(adapter: &'a dyn ControllerAdapter) -> Self {
        Self {
            adapter,
            config: adapter.traversal_config(),
        }
    }

    /// Set traversal configuration
    #[must_use]
    pub fn with_config(mut self, config: TraversalConfig) -> Self {
        self.config = config;
        self
    }

    /// Collect every definition, in definition order
    ///
    /// Failures are recorded in the tree; the run itself never fails.
    pub async fn run(&self, defs: &[EndpointDefinition]) -> (ResultTree, CollectStats) {
        let start = Instant::now();
        let defs = self.adapter.prepare(defs.to_vec()).await;

        let mut tree = ResultTree::new();
        let mut stats = CollectStats::new();
        let mut deferred = Vec::new();

        for def in &defs {
            match self.adapter.classify(def) {
                EndpointKind::ParentPlaceholder => deferred.push(def),
                EndpointKind::DomainFanout => {
                    warn!(endpoint = %def.endpoint, "Domain endpoint was not expanded, skipping");
                    stats.add_skipped(&def.endpoint, "no tenant domain to expand into");
                }
                EndpointKind::MultiStepDetail(kind) => {
                    info!(name = %def.name, "Processing endpoint");
                    stats.add_fetch();
                    let entry = match self.adapter.fetch_multi_step(def, kind).await {
                        Ok(items) => {
                            stats.add_items(items.len());
                            ResultEntry::Items(items)
                        }
                        Err(e) => {
                            warn!(name = %def.name, error = %e, "Endpoint failed");
                            stats.add_failure();
                            ResultEntry::error(&e, &def.endpoint)
                        }
                    };
                    tree.insert(&def.name, entry, def.metadata.key.as_deref());
                }
                EndpointKind::Plain | EndpointKind::WithChildren => {
                    info!(name = %def.name, "Processing endpoint");
                    let (entry, sub) = self
                        .collect_endpoint(def, def.endpoint.clone(), Ancestry::default())
                        .await;
                    stats.merge(sub);
                    tree.insert(&def.name, entry, def.metadata.key.as_deref());
                }
            }
        }

        for def in deferred {
            info!(name = %def.name, "Processing placeholder endpoint");
            let sub = self.resolve_placeholder(&defs, def, &mut tree).await;
            stats.merge(sub);
        }

        stats.set_duration(start.elapsed().as_millis() as u64);
        info!(
            fetches = stats.fetches,
            items = stats.items,
            failures = stats.failures,
            skipped = stats.skipped.len(),
            duration_ms = stats.duration_ms,
            "Collection complete"
        );
        (tree, stats)
    }

    /// Fetch one endpoint at a concrete URL, then its subtree
    fn collect_endpoint<'s>(
        &'s self,
        def: &'s EndpointDefinition,
        uri: String,
        ancestry: Ancestry,
    ) -> BoxFuture<'s, (ResultEntry, CollectStats)> {
        Box::pin(async move {
            let mut stats = CollectStats::new();
            stats.add_fetch();

            let payload = match self.adapter.fetch_data(def, &uri).await {
                Ok(payload) => payload,
                Err(e) => {
                    warn!(name = %def.name, endpoint = %uri, error = %e, "Endpoint failed");
                    stats.add_failure();
                    return (ResultEntry::error(&e, uri), stats);
                }
            };

            stats.add_items(payload.len());
            let mut entry = match payload {
                Payload::Items(items) => ResultEntry::Items(
                    items
                        .into_iter()
                        .map(|data| self.make_item(def, &uri, data, &ancestry, true))
                        .collect(),
                ),
                Payload::Single(data) if self.config.keep_singletons => ResultEntry::Single(
                    Box::new(self.make_item(def, &uri, data, &ancestry, false)),
                ),
                Payload::Single(data) => {
                    ResultEntry::Items(vec![self.make_item(def, &uri, data, &ancestry, false)])
                }
                Payload::Empty => ResultEntry::Items(Vec::new()),
            };

            if def.has_children() {
                match entry.items_mut() {
                    Some(items) => {
                        let sub = self.resolve_children(def, &uri, items, &ancestry).await;
                        stats.merge(sub);
                    }
                    None => debug!(
                        name = %def.name,
                        endpoint = %uri,
                        "Skipping children of a single resource"
                    ),
                }
            }

            (entry, stats)
        })
    }

    /// Build an item, deriving its endpoint and import identifiers
    ///
    /// A list member lives at `{uri}/{id}`; a single resource at `uri`.
    fn make_item(
        &self,
        def: &EndpointDefinition,
        uri: &str,
        data: Value,
        ancestry: &Ancestry,
        member: bool,
    ) -> CollectedItem {
        let id = self.adapter.get_id_value(&data, def);

        let endpoint = match &id {
            Some(id) if member && self.adapter.appends_id(def) => format!("{uri}/{id}"),
            _ => uri.to_string(),
        };

        let import_ids = if !self.config.import_ids {
            None
        } else if def.metadata.has_own_id {
            id.map(|id| {
                let mut ids = ancestry.ids.clone();
                ids.push(id);
                ids
            })
        } else {
            Some(ancestry.ids.clone())
        };

        CollectedItem::new(data, endpoint).with_import_ids(import_ids)
    }

    /// Fetch every child definition for every parent item and attach the
    /// results
    async fn resolve_children(
        &self,
        def: &EndpointDefinition,
        uri: &str,
        items: &mut [CollectedItem],
        ancestry: &Ancestry,
    ) -> CollectStats {
        let mut stats = CollectStats::new();

        // A root parent starts a new URL base and import id chain
        let (base_uri, base_ids) = if def.metadata.root {
            (def.endpoint.as_str(), Vec::new())
        } else {
            (uri, ancestry.ids.clone())
        };

        let mut parents = Vec::new();
        for (index, item) in items.iter().enumerate() {
            match self.adapter.get_id_value(&item.data, def) {
                Some(id) => {
                    let conditions = ancestry.conditions.inherit(def, &item.data);
                    parents.push((index, id, conditions));
                }
                None => debug!(
                    name = %def.name,
                    endpoint = %item.endpoint,
                    "Item has no identifier, skipping its children"
                ),
            }
        }

        let children: Vec<(usize, &EndpointDefinition)> = match self.config.fan_out {
            FanOut::Sequential => def.children.iter().enumerate().collect(),
            FanOut::Concurrent => sort_children_first(&def.children),
        };

        let mut fetches = Vec::new();
        for (position, child) in children {
            for (index, id, conditions) in &parents {
                let child_uri = resolve_child_url(base_uri, id, &child.endpoint);

                if let Some(reason) = conditions.skip_reason(child) {
                    info!(name = %child.name, endpoint = %child_uri, reason = %reason, "Skipping fetch");
                    stats.add_skipped(child_uri, reason);
                    continue;
                }

                let mut ids = base_ids.clone();
                ids.push(id.clone());
                fetches.push(ChildFetch {
                    item: *index,
                    position,
                    child,
                    uri: child_uri,
                    ancestry: Ancestry {
                        ids,
                        conditions: conditions.clone(),
                    },
                });
            }
        }

        let mut results = Vec::with_capacity(fetches.len());
        match self.config.fan_out {
            FanOut::Sequential => {
                for fetch in fetches {
                    let (entry, sub) = self
                        .collect_endpoint(fetch.child, fetch.uri, fetch.ancestry)
                        .await;
                    results.push((fetch.item, fetch.position, fetch.child, entry, sub));
                }
            }
            FanOut::Concurrent => {
                let pending = fetches.into_iter().map(|fetch| async move {
                    let (entry, sub) = self
                        .collect_endpoint(fetch.child, fetch.uri, fetch.ancestry)
                        .await;
                    (fetch.item, fetch.position, fetch.child, entry, sub)
                });
                results = join_all(pending).await;
            }
        }

        // Attach in definition order regardless of completion order
        results.sort_by_key(|(item, position, ..)| (*item, *position));
        for (item, _, child, entry, sub) in results {
            stats.merge(sub);
            items[item].attach(&child.name, entry);
        }

        stats
    }

    /// Resolve a root-level `%v` definition once per item of its parent
    /// collection, nesting non-empty results under those items
    async fn resolve_placeholder(
        &self,
        defs: &[EndpointDefinition],
        def: &EndpointDefinition,
        tree: &mut ResultTree,
    ) -> CollectStats {
        let mut stats = CollectStats::new();

        let (Some(parent), Some(prefix)) =
            (find_placeholder_parent(defs, def), def.placeholder_parent())
        else {
            warn!(name = %def.name, "No parent collection for placeholder endpoint");
            return stats;
        };
        let nested = format!("{prefix}/");

        let targets: Vec<(usize, String)> = match tree.get(&parent.name).and_then(ResultEntry::items) {
            Some(items) => items
                .iter()
                .enumerate()
                .filter(|(_, item)| item.endpoint.starts_with(&nested))
                .filter_map(|(index, item)| {
                    self.adapter
                        .get_id_value(&item.data, parent)
                        .map(|id| (index, id))
                })
                .collect(),
            None => {
                debug!(name = %def.name, parent = %parent.name, "Parent collection has no items");
                return stats;
            }
        };

        let mut results = Vec::with_capacity(targets.len());
        for (index, id) in targets {
            let uri = resolve_child_url(prefix, &id, &def.endpoint);
            let ancestry = Ancestry {
                ids: vec![id],
                conditions: ParentConditions::default(),
            };
            let (entry, sub) = self.collect_endpoint(def, uri, ancestry).await;
            stats.merge(sub);
            results.push((index, entry));
        }

        if let Some(items) = tree.get_mut(&parent.name).and_then(ResultEntry::items_mut) {
            for (index, entry) in results {
                if entry.is_empty() || entry.is_error() {
                    continue;
                }
                if let Some(item) = items.get_mut(index) {
                    item.attach(&def.name, entry);
                }
            }
        }

        stats
    }
}

/// Definitions with children first, each group in definition order, paired
/// with their positions
pub fn sort_children_first(defs: &[EndpointDefinition]) -> Vec<(usize, &EndpointDefinition)> {
    let (mut with, without): (Vec<_>, Vec<_>) =
        defs.iter().enumerate().partition(|(_, def)| def.has_children());
    with.extend(without);
    with
}
