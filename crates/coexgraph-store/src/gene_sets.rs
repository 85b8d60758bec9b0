//! Named gene sets saved per user.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use coexgraph_common::context::SessionContext;
use coexgraph_common::entities::GeneId;
use coexgraph_common::error::{CoexError, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::kv::KeyValueStore;

const KEY_PREFIX: &str = "genesets";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedGeneSet {
    pub name: String,
    pub gene_ids: Vec<GeneId>,
    #[serde(default)]
    pub description: Option<String>,
    pub saved_at: DateTime<Utc>,
}

pub struct GeneSetStore {
    store: Arc<dyn KeyValueStore>,
}

impl GeneSetStore {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    fn prefix(ctx: &SessionContext) -> String {
        format!("{KEY_PREFIX}/{}/", ctx.namespace())
    }

    fn key(ctx: &SessionContext, name: &str) -> String {
        format!("{}{name}", Self::prefix(ctx))
    }

    /// Save or overwrite a set under the session's namespace.
    pub async fn save(
        &self,
        ctx: &SessionContext,
        name: &str,
        gene_ids: &[GeneId],
        description: Option<&str>,
    ) -> Result<SavedGeneSet> {
        let name = name.trim();
        if name.is_empty() || name.contains('/') {
            return Err(CoexError::Store(format!("invalid gene set name: {name:?}")));
        }
        if gene_ids.is_empty() {
            return Err(CoexError::NoGenesSelected);
        }
        let max = ctx.settings.graph.max_gene_ids_per_query;
        if gene_ids.len() > max {
            return Err(CoexError::TooManyGenes { requested: gene_ids.len(), max });
        }

        let set = SavedGeneSet {
            name: name.to_string(),
            gene_ids: gene_ids.to_vec(),
            description: description.map(str::to_string),
            saved_at: Utc::now(),
        };
        self.store.set(&Self::key(ctx, name), serde_json::to_value(&set)?).await?;
        info!(user = ctx.namespace(), name, genes = gene_ids.len(), "Saved gene set");
        Ok(set)
    }

    pub async fn get(&self, ctx: &SessionContext, name: &str) -> Result<Option<SavedGeneSet>> {
        match self.store.get(&Self::key(ctx, name)).await? {
            Some(value) => Ok(Some(serde_json::from_value(value)?)),
            None => Ok(None),
        }
    }

    /// All sets in the session's namespace, by name.
    pub async fn list(&self, ctx: &SessionContext) -> Result<Vec<SavedGeneSet>> {
        let mut sets = Vec::new();
        for key in self.store.list(&Self::prefix(ctx)).await? {
            if let Some(value) = self.store.get(&key).await? {
                sets.push(serde_json::from_value::<SavedGeneSet>(value)?);
            }
        }
        sets.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(sets)
    }

    pub async fn remove(&self, ctx: &SessionContext, name: &str) -> Result<bool> {
        let removed = self.store.remove(&Self::key(ctx, name)).await?;
        if removed {
            info!(user = ctx.namespace(), name, "Removed gene set");
        }
        Ok(removed)
    }
}
