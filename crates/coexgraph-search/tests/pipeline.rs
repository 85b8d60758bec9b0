use std::sync::Arc;

use coexgraph_common::settings::GraphLimits;
use coexgraph_engine::{CoexpressionGraphEngine, SnapshotRenderer};
use coexgraph_search::{InMemorySearchService, SearchOutcome, SearchPipeline};
use coexgraph_test_utils::{link, three_gene_scenario};
use pretty_assertions::assert_eq;

fn service() -> Arc<InMemorySearchService> {
    Arc::new(InMemorySearchService::from_response(&three_gene_scenario()).with(link(3, 4, 12, 0)))
}

#[tokio::test]
async fn test_extend_round_grows_graph() {
    let service = service();
    let pipeline = SearchPipeline::new(service.clone());
    let mut engine = CoexpressionGraphEngine::new(GraphLimits::default());
    let mut renderer = SnapshotRenderer::default();

    let plan = engine.plan_search(&[1, 2], 2).unwrap();
    pipeline.run(&mut engine, plan, &mut renderer).await.unwrap();
    assert!(!engine.current_node_gene_ids().contains(&4));

    let plan = engine.extend_with_gene(3).unwrap();
    let outcome = pipeline.run(&mut engine, plan, &mut renderer).await.unwrap();
    assert!(matches!(outcome, SearchOutcome::Rendered(_)));
    assert_eq!(engine.query_gene_ids(), &[1, 2, 3]);
    assert!(engine.current_node_gene_ids().contains(&4));
    assert_eq!(renderer.frames, 2);

    // extending again through a gene with no unseen partners changes nothing
    let plan = engine.extend_with_gene(4).unwrap();
    let outcome = pipeline.run(&mut engine, plan, &mut renderer).await.unwrap();
    assert_eq!(outcome, SearchOutcome::NoNewResults);
    assert_eq!(engine.query_gene_ids(), &[1, 2, 3]);
    assert_eq!(renderer.frames, 2);
}

#[tokio::test]
async fn test_lowering_stringency_refetches() {
    let service = service();
    let pipeline = SearchPipeline::new(service.clone());
    let mut engine = CoexpressionGraphEngine::new(GraphLimits::default());
    let mut renderer = SnapshotRenderer::default();

    let plan = engine.plan_search(&[3], 12).unwrap();
    pipeline.run(&mut engine, plan, &mut renderer).await.unwrap();
    assert_eq!(engine.results_stringency(), 9);
    let before = service.requests().len();

    // at or above the loaded floor: local refilter
    pipeline.apply_stringency(&mut engine, 10, &mut renderer).await.unwrap();
    assert_eq!(service.requests().len(), before);

    // below it: one query-genes-only search
    let outcome = pipeline.apply_stringency(&mut engine, 3, &mut renderer).await.unwrap();
    let requests = service.requests();
    assert_eq!(requests.len(), before + 1);
    assert!(requests.last().unwrap().query_genes_only);
    assert_eq!(engine.display_stringency(), 3);
    assert!(matches!(outcome, SearchOutcome::Rendered(_)));
}

#[tokio::test]
async fn test_server_error_keeps_previous_graph() {
    let pipeline = SearchPipeline::new(service());
    let mut engine = CoexpressionGraphEngine::new(GraphLimits::default());
    let mut renderer = SnapshotRenderer::default();
    let plan = engine.plan_search(&[1, 2], 2).unwrap();
    pipeline.run(&mut engine, plan, &mut renderer).await.unwrap();
    let nodes = engine.current_node_gene_ids().to_vec();

    let failing = SearchPipeline::new(Arc::new(InMemorySearchService::new().with_error_state("unavailable")));
    let plan = engine.plan_search(&[9], 2).unwrap();
    let outcome = failing.run(&mut engine, plan, &mut renderer).await.unwrap();
    assert_eq!(outcome, SearchOutcome::NoData("unavailable".into()));
    assert_eq!(engine.current_node_gene_ids(), nodes.as_slice());
}
