//! Subcommand implementations. Each returns the text to print.

use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context};
use clap::ValueEnum;
use coexgraph_common::context::SessionContext;
use coexgraph_common::entities::{GeneId, SearchResponse};
use coexgraph_common::settings::CoexSettings;
use coexgraph_engine::engine::CoexpressionGraphEngine;
use coexgraph_engine::filter::filter_by_stringency;
use coexgraph_engine::graph::build_graph;
use coexgraph_engine::query_set::OverflowPolicy;
use coexgraph_export::graphml::write_graphml;
use coexgraph_export::tsv::{write_table, ExportPreamble};
use coexgraph_search::pipeline::{SearchOutcome, SearchPipeline};
use coexgraph_search::service::SearchService;
use coexgraph_store::gene_sets::GeneSetStore;
use tracing::{info, warn};

use crate::text::TextRenderer;

/// Options shared by the graph-drawing commands.
#[derive(Debug, Clone, Default)]
pub struct GraphOptions {
    pub genes: Vec<GeneId>,
    pub stringency: u32,
    pub query_genes_only: bool,
    /// Genes to extend the graph with, one round each.
    pub extend: Vec<GeneId>,
    /// Drop the oldest query genes when an extension overflows the cap.
    pub truncate: bool,
    pub overlay: Vec<GeneId>,
    pub plain: bool,
}

pub struct GraphSession {
    pub engine: CoexpressionGraphEngine,
    pub output: String,
}

pub async fn read_response(path: &Path) -> anyhow::Result<SearchResponse> {
    let content = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let response = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse search results in {}", path.display()))?;
    Ok(response)
}

/// Run an initial search and any extensions, rendering after each round.
pub async fn run_graph(
    settings: &CoexSettings,
    service: Arc<dyn SearchService>,
    opts: &GraphOptions,
) -> anyhow::Result<GraphSession> {
    let mut engine = CoexpressionGraphEngine::new(settings.graph.clone());
    engine.set_query_genes_only(opts.query_genes_only);
    let pipeline = SearchPipeline::new(service);
    let mut renderer = TextRenderer::new(settings.style.clone())
        .with_degree_emphasis(!opts.plain)
        .with_overlay(opts.overlay.clone());
    let mut output = String::new();

    let plan = engine.plan_search(&opts.genes, opts.stringency)?;
    let outcome = pipeline.run(&mut engine, plan, &mut renderer).await?;
    describe(&outcome, &renderer, &mut output);
    if matches!(outcome, SearchOutcome::NoData(_)) {
        return Ok(GraphSession { engine, output });
    }

    for &gene_id in &opts.extend {
        let policy = if opts.truncate { OverflowPolicy::TruncateOldest } else { OverflowPolicy::Reject };
        let plan = match engine.extend_with_genes(&[gene_id], policy) {
            Ok(plan) => plan,
            Err(e) if e.is_size_violation() => {
                warn!("Extension of gene {gene_id} refused: {e}");
                bail!("{e}. Pass --truncate to drop the oldest query genes");
            }
            Err(e) => return Err(e.into()),
        };
        let outcome = pipeline.run(&mut engine, plan, &mut renderer).await?;
        if outcome == SearchOutcome::NoNewResults {
            output.push_str(&format!("No more results found for gene {gene_id}\n"));
        } else {
            describe(&outcome, &renderer, &mut output);
        }
    }

    if let Some(note) = engine.display_info() {
        output.push_str(&format!("Note: {note}\n"));
    }
    Ok(GraphSession { engine, output })
}

fn describe(outcome: &SearchOutcome, renderer: &TextRenderer, output: &mut String) {
    match outcome {
        SearchOutcome::Rendered(_) => {
            if let Some(frame) = renderer.last_frame() {
                output.push_str(frame);
            }
        }
        SearchOutcome::NoNewResults => output.push_str("No more results found\n"),
        SearchOutcome::NoData(reason) => output.push_str(&format!("No data: {reason}\n")),
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum ExportFormat {
    /// Tab-separated download table
    #[default]
    Tsv,
    /// Visible graph as GraphML
    Graphml,
}

#[derive(Debug, Clone, Default)]
pub struct ExportOptions {
    /// Keep only links with at least this support.
    pub stringency: Option<u32>,
    pub query_genes_only: bool,
    pub preamble: bool,
    pub format: ExportFormat,
}

/// Write saved results as a download table or as the visible graph.
pub fn export(settings: &CoexSettings, response: &SearchResponse, opts: &ExportOptions) -> anyhow::Result<String> {
    match opts.format {
        ExportFormat::Tsv => {
            let results: Vec<_> = response
                .known_gene_results
                .iter()
                .filter(|r| opts.stringency.map_or(true, |s| r.support() >= s))
                .cloned()
                .collect();
            let preamble = opts.preamble.then(|| ExportPreamble::now("coexgraph"));
            info!(rows = results.len(), "Exporting results");
            Ok(write_table(&results, opts.query_genes_only, preamble.as_ref())?)
        }
        ExportFormat::Graphml => {
            let limits = &settings.graph;
            let stringency = opts.stringency.unwrap_or(limits.min_stringency);
            if stringency < limits.min_stringency {
                bail!("Stringency must be at least {}", limits.min_stringency);
            }
            let query_ids: HashSet<GeneId> = response.query_genes.iter().map(|g| g.id).collect();
            let graph = build_graph(
                &response.query_genes,
                &response.known_gene_results,
                &query_ids,
                limits.tooltip_max_len,
            );
            let query_genes_only = opts.query_genes_only && query_ids.len() >= 2;
            let visible = filter_by_stringency(&graph, &query_ids, stringency, query_genes_only);
            info!(nodes = visible.node_ids.len(), edges = visible.edge_keys.len(), "Exporting graph");
            Ok(write_graphml(&graph, &visible)?)
        }
    }
}

// ── Saved gene sets ─────────────────────────────────────────────────────────

pub async fn sets_list(store: &GeneSetStore, ctx: &SessionContext) -> anyhow::Result<String> {
    let sets = store.list(ctx).await?;
    if sets.is_empty() {
        return Ok(format!("No saved gene sets for {}\n", ctx.namespace()));
    }
    let mut out = String::new();
    for set in sets {
        out.push_str(&format!(
            "{:<20} {:>4} genes  {}  {}\n",
            set.name,
            set.gene_ids.len(),
            set.saved_at.format("%Y-%m-%d %H:%M"),
            set.description.unwrap_or_default()
        ));
    }
    Ok(out)
}

pub async fn sets_show(store: &GeneSetStore, ctx: &SessionContext, name: &str) -> anyhow::Result<String> {
    match store.get(ctx, name).await? {
        Some(set) => {
            let ids: Vec<String> = set.gene_ids.iter().map(|id| id.to_string()).collect();
            Ok(format!("{}\n", ids.join(",")))
        }
        None => bail!("No gene set named {name:?}"),
    }
}

/// Gene ids from `--genes`, or from a saved set when `--set` is given.
pub async fn resolve_genes(
    store: &GeneSetStore,
    ctx: &SessionContext,
    genes: Vec<GeneId>,
    set: Option<&str>,
) -> anyhow::Result<Vec<GeneId>> {
    match set {
        Some(name) => match store.get(ctx, name).await? {
            Some(saved) => Ok(saved.gene_ids),
            None => bail!("No gene set named {name:?}"),
        },
        None => Ok(genes),
    }
}
