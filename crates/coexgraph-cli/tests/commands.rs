use std::sync::Arc;

use coexgraph_cli::commands::{self, ExportFormat, ExportOptions, GraphOptions};
use coexgraph_common::context::SessionContext;
use coexgraph_common::settings::CoexSettings;
use coexgraph_search::service::InMemorySearchService;
use coexgraph_store::gene_sets::GeneSetStore;
use coexgraph_store::kv::JsonFileStore;
use coexgraph_test_utils::{link, response_file, ribosomal_response, three_gene_scenario};
use pretty_assertions::assert_eq;

fn opts(genes: &[i64], stringency: u32) -> GraphOptions {
    GraphOptions { genes: genes.to_vec(), stringency, ..Default::default() }
}

#[tokio::test]
async fn test_graph_from_saved_results() {
    let service = Arc::new(InMemorySearchService::from_response(&three_gene_scenario()));
    let session = commands::run_graph(&CoexSettings::default(), service, &opts(&[1, 2], 3))
        .await
        .unwrap();
    assert!(session.output.starts_with("3 of 3 genes, 1 of 2 links shown"));
    assert_eq!(session.engine.query_gene_ids(), &[1, 2]);
}

#[tokio::test]
async fn test_extension_without_new_genes_reports_it() {
    let service = Arc::new(InMemorySearchService::from_response(&three_gene_scenario()));
    let mut o = opts(&[1, 2], 2);
    o.extend = vec![3];
    let session = commands::run_graph(&CoexSettings::default(), service, &o).await.unwrap();
    assert!(session.output.contains("No more results found for gene 3"));
    assert_eq!(session.engine.query_gene_ids(), &[1, 2]);
}

#[tokio::test]
async fn test_extension_over_cap_needs_truncate() {
    let mut settings = CoexSettings::default();
    settings.graph.max_gene_ids_per_query = 2;
    let service = Arc::new(
        InMemorySearchService::from_response(&three_gene_scenario()).with(link(3, 4, 5, 0)),
    );
    let mut o = opts(&[1, 2], 2);
    o.extend = vec![3];
    let err = commands::run_graph(&settings, service.clone(), &o).await.err().unwrap();
    assert!(err.to_string().contains("--truncate"));

    o.truncate = true;
    let session = commands::run_graph(&settings, service, &o).await.unwrap();
    assert_eq!(session.engine.query_gene_ids(), &[2, 3]);
    assert!(session.engine.current_node_gene_ids().contains(&4));
}

#[tokio::test]
async fn test_export_filters_by_stringency() {
    let file = response_file(&ribosomal_response());
    let response = commands::read_response(file.path()).await.unwrap();
    let opts = ExportOptions { stringency: Some(5), ..Default::default() };
    let table = commands::export(&CoexSettings::default(), &response, &opts).unwrap();
    let lines: Vec<&str> = table.lines().collect();
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[1], "RPL3\t6122\tRPL4\t6124\t0.31\t14\t0\t52");
}

#[tokio::test]
async fn test_export_graphml_keeps_visible_graph() {
    let file = response_file(&ribosomal_response());
    let response = commands::read_response(file.path()).await.unwrap();
    let opts = ExportOptions { stringency: Some(5), format: ExportFormat::Graphml, ..Default::default() };
    let xml = commands::export(&CoexSettings::default(), &response, &opts).unwrap();
    assert!(xml.contains("<node id=\"6122\">"));
    assert!(xml.contains("<node id=\"6124\">"));
    assert!(!xml.contains("<node id=\"60\">"));
    assert_eq!(xml.matches("<edge ").count(), 1);

    let too_low = ExportOptions { stringency: Some(1), format: ExportFormat::Graphml, ..Default::default() };
    assert!(commands::export(&CoexSettings::default(), &response, &too_low).is_err());
}

#[tokio::test]
async fn test_saved_set_resolves_genes() {
    let dir = tempfile::tempdir().unwrap();
    let store = GeneSetStore::new(Arc::new(JsonFileStore::new(dir.path().join("sets.json"))));
    let ctx = SessionContext::default().with_user("ada");
    store.save(&ctx, "pair", &[1, 2], None).await.unwrap();

    let genes = commands::resolve_genes(&store, &ctx, vec![], Some("pair")).await.unwrap();
    assert_eq!(genes, vec![1, 2]);
    assert!(commands::resolve_genes(&store, &ctx, vec![], Some("missing")).await.is_err());

    let listing = commands::sets_list(&store, &ctx).await.unwrap();
    assert!(listing.starts_with("pair"));
    assert_eq!(commands::sets_show(&store, &ctx, "pair").await.unwrap(), "1,2\n");
}
