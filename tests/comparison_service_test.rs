//! Integration tests for ComparisonService over a JSON snapshot on disk.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tempfile::TempDir;

use wbs_compare::application::services::ComparisonService;
use wbs_compare::application::ApplicationError;
use wbs_compare::domain::{DomainError, Highlight, UNNAMED_CONTRACTOR};
use wbs_compare::infrastructure::snapshot::JsonSnapshotStore;
use wbs_compare::infrastructure::traits::RealFileSystem;
use wbs_compare::util::testing;

const FIXTURE: &str = "tests/resources/snapshots/obra.json";

fn copy_fixture(dir: &Path) -> PathBuf {
    let target = dir.join("snapshot.json");
    fs::copy(FIXTURE, &target).expect("copy fixture");
    target
}

fn service(path: &Path) -> ComparisonService {
    let store = JsonSnapshotStore::open(Arc::new(RealFileSystem), path).expect("open snapshot");
    ComparisonService::new(Arc::new(store))
}

fn root_ids(service: &ComparisonService, filtered: bool) -> Vec<String> {
    let comparison = if filtered {
        service.load().unwrap()
    } else {
        service.load_unfiltered().unwrap()
    };
    comparison
        .tree
        .root_nodes()
        .map(|n| n.id.clone())
        .collect()
}

// ============================================================
// Tree loading
// ============================================================

#[test]
fn given_snapshot_when_load_then_totals_roll_up_to_roots() {
    testing::init_test_setup();
    let dir = TempDir::new().unwrap();
    let path = copy_fixture(dir.path());

    let comparison = service(&path).load().unwrap();
    let tree = &comparison.tree;

    let infra = tree.find("e1").expect("e1 kept");
    assert_eq!(infra.total("P1"), 1000.0);
    assert_eq!(infra.total("P2"), 1200.0);
    assert_eq!(infra.total("P3"), 900.0);
    assert!(infra.values["P1"].items.is_empty(), "items stay on the leaf");

    let estacas = tree.find("e111").expect("e111 kept");
    assert_eq!(estacas.values["P1"].items.len(), 1);

    let structure = tree.find("e2").expect("e2 kept");
    assert_eq!(structure.total("P1"), 800.0);
    assert_eq!(structure.total("P2"), 700.0);
    assert_eq!(structure.total("P3"), 0.0);
}

#[test]
fn given_snapshot_when_load_then_zero_branches_pruned() {
    let dir = TempDir::new().unwrap();
    let path = copy_fixture(dir.path());

    let comparison = service(&path).load().unwrap();
    let tree = &comparison.tree;

    assert!(tree.find("e12").is_none(), "only a hidden item linked");
    assert!(tree.find("e3").is_none());
    assert!(tree.find("e31").is_none());
    assert_eq!(tree.len(), 6);
}

#[test]
fn given_unknown_parent_when_load_then_node_becomes_root_in_input_order() {
    let dir = TempDir::new().unwrap();
    let path = copy_fixture(dir.path());
    let service = service(&path);

    assert_eq!(root_ids(&service, true), vec!["e1", "e2", "e9"]);
    assert_eq!(root_ids(&service, false), vec!["e1", "e2", "e3", "e9"]);
}

#[test]
fn given_unfiltered_load_when_inspecting_then_every_proposal_has_a_record() {
    let dir = TempDir::new().unwrap();
    let path = copy_fixture(dir.path());

    let comparison = service(&path).load_unfiltered().unwrap();

    assert_eq!(comparison.tree.len(), 9);
    let electric = comparison.tree.find("e31").unwrap();
    for pid in ["P1", "P2", "P3"] {
        let record = &electric.values[pid];
        assert!(record.items.is_empty());
        assert_eq!(record.total, 0.0);
    }
}

#[test]
fn given_null_contractor_when_load_then_default_name() {
    let dir = TempDir::new().unwrap();
    let path = copy_fixture(dir.path());

    let comparison = service(&path).load().unwrap();

    assert_eq!(comparison.proposals[2].contractor_name, UNNAMED_CONTRACTOR);
    assert_eq!(comparison.tree.proposals(), ["P1", "P2", "P3"]);
}

#[test]
fn given_leaf_row_when_ranking_then_lowest_and_highest_flagged() {
    let dir = TempDir::new().unwrap();
    let path = copy_fixture(dir.path());

    let comparison = service(&path).load().unwrap();
    let idx = comparison.tree.index_of("e111").unwrap();
    let row = comparison.row(idx).unwrap();

    assert_eq!(row.highlight(900.0), Highlight::Lowest);
    assert_eq!(row.highlight(1200.0), Highlight::Highest);
    assert_eq!(row.highlight(1000.0), Highlight::Intermediate);
}

// ============================================================
// Node detail
// ============================================================

#[test]
fn given_node_when_detail_then_columns_in_proposal_order_with_highlight() {
    let dir = TempDir::new().unwrap();
    let path = copy_fixture(dir.path());

    let detail = service(&path).detail("e21").unwrap();

    let ids: Vec<_> = detail.columns.iter().map(|c| c.proposal_id.as_str()).collect();
    assert_eq!(ids, vec!["P1", "P2", "P3"]);

    let alfa = detail.column("P1").unwrap();
    assert_eq!(alfa.total, 800.0);
    assert_eq!(alfa.highlight, Highlight::Highest);

    let beta = detail.column("P2").unwrap();
    assert_eq!(beta.highlight, Highlight::Lowest);
    assert!((beta.share_of_max - 87.5).abs() < 1e-9);

    let unnamed = detail.column("P3").unwrap();
    assert_eq!(unnamed.items.len(), 1, "null subtotal item is still listed");
    assert_eq!(unnamed.total, 0.0);
    assert_eq!(unnamed.highlight, Highlight::Empty);
}

#[test]
fn given_hidden_item_when_detail_then_not_listed() {
    let dir = TempDir::new().unwrap();
    let path = copy_fixture(dir.path());

    let detail = service(&path).detail("e12").unwrap();

    assert!(detail.columns.iter().all(|c| c.items.is_empty()));
}

#[test]
fn given_unknown_node_when_detail_then_node_not_found() {
    let dir = TempDir::new().unwrap();
    let path = copy_fixture(dir.path());

    let result = service(&path).detail("nope");

    assert!(matches!(
        result,
        Err(ApplicationError::Domain(DomainError::NodeNotFound(id))) if id == "nope"
    ));
}

// ============================================================
// Failure modes
// ============================================================

#[test]
fn given_cyclic_wbs_when_load_then_cycle_detected() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("snapshot.json");
    fs::write(
        &path,
        r#"{
            "wbs_nodes": [
                {"id": "A", "caminho": "1", "item": "A", "nivel": 1, "parent_id": "B"},
                {"id": "B", "caminho": "2", "item": "B", "nivel": 1, "parent_id": "A"}
            ],
            "proposals": [{"id": "P1", "construtora_nome": "Alfa", "valor_total": 0}],
            "proposal_items": [],
            "linkages": []
        }"#,
    )
    .unwrap();

    let result = service(&path).load();

    assert!(matches!(
        result,
        Err(ApplicationError::Domain(DomainError::CycleDetected(id))) if id == "A"
    ));
}

#[test]
fn given_malformed_snapshot_when_load_then_operation_failed() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("snapshot.json");
    fs::write(&path, "{ broken").unwrap();

    let result = service(&path).load();

    assert!(matches!(result, Err(ApplicationError::OperationFailed { .. })));
}

#[test]
fn given_empty_snapshot_when_load_then_empty_tree() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("snapshot.json");
    fs::write(&path, "{}").unwrap();

    let comparison = service(&path).load().unwrap();

    assert!(comparison.tree.is_empty());
    assert!(comparison.proposals.is_empty());
}
