//! End-to-end tests: corpus loading, training, querying, persistence.

use poincare_embed::{io, PoincareConfig, PoincareModel, RelationCorpus};

/// WordNet-style taxonomy fragment. "mammal" and "bird" share the parent
/// "animal"; leaves hang off "mammal".
fn taxonomy() -> Vec<(&'static str, &'static str)> {
    vec![
        ("animal", "entity"),
        ("mammal", "animal"),
        ("bird", "animal"),
        ("dog", "mammal"),
        ("cat", "mammal"),
        ("sparrow", "bird"),
        ("terrier", "dog"),
        ("plant", "entity"),
        ("tree", "plant"),
    ]
}

fn trained_taxonomy(epochs: usize) -> PoincareModel {
    let corpus = RelationCorpus::from_pairs(taxonomy());
    let config = PoincareConfig::default()
        .with_dim(10)
        .with_negative_samples(3)
        .with_burn_in_epochs(5)
        .with_seed(7)
        .with_workers(2);
    let mut model = PoincareModel::new(corpus, config).unwrap();
    model.train(epochs).unwrap();
    model
}

#[test]
fn train_produces_finite_loss_and_valid_table() {
    let model = trained_taxonomy(30);
    assert!(model.state().running_loss.is_finite());
    assert!(model.state().running_loss >= 0.0);
    assert_eq!(model.state().epochs_done, 30);

    let limit = 1.0 - model.config().boundary_eps;
    for idx in 0..model.table().len() {
        assert!(model.table().norm(idx) <= limit + 1e-12);
    }
}

#[test]
fn distance_to_self_is_zero() {
    let model = trained_taxonomy(10);
    assert_eq!(model.index().distance("dog", "dog").unwrap(), 0.0);
}

#[test]
fn most_similar_on_trained_table() {
    let model = trained_taxonomy(30);
    let index = model.index();

    let similar = index.most_similar("dog", 2).unwrap();
    assert_eq!(similar.len(), 2);
    assert!(similar.iter().all(|(label, _)| label != "dog"));
    assert!(similar[0].1 <= similar[1].1);

    // Repeated calls on the same table are identical, tie-break included.
    assert_eq!(similar, index.most_similar("dog", 2).unwrap());
}

#[test]
fn rank_agrees_with_nodes_closer_than_and_most_similar() {
    let model = trained_taxonomy(30);
    let index = model.index();
    let labels: Vec<String> = model.corpus().vocab().labels().map(String::from).collect();

    for u in &labels {
        for v in &labels {
            if u == v {
                continue;
            }
            let rank = index.rank(u, v).unwrap();
            let closer = index.nodes_closer_than(u, v).unwrap();
            assert_eq!(rank - 1, closer.len(), "u={u} v={v}");

            let similar = index.most_similar(u, labels.len()).unwrap();
            assert_eq!(&similar[rank - 1].0, v, "u={u} v={v}");
        }
    }
}

#[test]
fn hierarchy_chains_are_monotone_in_norm() {
    let model = trained_taxonomy(50);
    let index = model.index();

    for start in ["entity", "animal", "dog", "terrier"] {
        let mut prev = index.norm(start).unwrap();
        for node in index.descendants(start, 10).unwrap() {
            let norm = index.norm(&node).unwrap();
            assert!(norm > prev, "descendants of {start} must increase norm");
            prev = norm;
        }

        let mut prev = index.norm(start).unwrap();
        for node in index.ancestors(start, 10).unwrap() {
            let norm = index.norm(&node).unwrap();
            assert!(norm < prev, "ancestors of {start} must decrease norm");
            prev = norm;
        }
    }
}

#[test]
fn hierarchy_depth_emerges_from_training() {
    // With enough epochs the root of the taxonomy should sit closer to
    // the origin than the deepest leaf. Small data keeps this
    // probabilistic, so assert only the extreme pair and log the rest.
    let model = trained_taxonomy(200);
    let index = model.index();

    for label in ["entity", "animal", "mammal", "dog", "terrier"] {
        eprintln!("norm({label}) = {:.4}", index.norm(label).unwrap());
    }
    assert!(
        index.difference_in_hierarchy("entity", "terrier").unwrap() > 0.0,
        "root should be higher in the hierarchy than the deepest leaf"
    );
}

#[test]
fn corpus_from_delimited_text_with_malformed_lines() {
    let text = "dog\tmammal\nmammal\tanimal\nbroken_line\ncat\tmammal\n";
    let corpus = RelationCorpus::from_reader(text.as_bytes(), b'\t').unwrap();
    assert_eq!(corpus.len(), 3);
    assert_eq!(corpus.skipped(), 1);

    let mut model = PoincareModel::new(
        corpus,
        PoincareConfig::default()
            .with_dim(5)
            .with_negative_samples(2)
            .with_burn_in_epochs(0),
    )
    .unwrap();
    let loss = model.train(5).unwrap();
    assert!(loss.is_finite() && loss >= 0.0);
}

#[test]
fn resumed_training_continues_the_schedule() {
    let corpus = RelationCorpus::from_pairs(taxonomy());
    let config = PoincareConfig::default()
        .with_dim(5)
        .with_negative_samples(2)
        .with_burn_in_epochs(1)
        .with_workers(1);
    let mut model = PoincareModel::new(corpus, config).unwrap();

    model.train(1).unwrap();
    assert_eq!(model.state().epochs_done, 1);
    // Burn-in of one epoch is spent; the second call runs at the main rate.
    assert_eq!(model.current_lr(), model.config().lr);

    model.train(1).unwrap();
    assert_eq!(model.state().epochs_done, 2);
}

#[test]
fn snapshot_then_vectors_export_roundtrip() {
    let model = trained_taxonomy(20);
    let dir = tempfile::tempdir().unwrap();

    let snapshot_path = dir.path().join("taxonomy.json");
    io::save_snapshot(&snapshot_path, &model).unwrap();
    let restored = io::load_snapshot(&snapshot_path).unwrap();
    assert_eq!(restored.table().vectors(), model.table().vectors());
    assert_eq!(restored.state(), model.state());

    let mut exported = Vec::new();
    io::export_vectors(&mut exported, model.corpus().vocab(), model.table()).unwrap();
    let (vocab, table) = io::import_vectors(exported.as_slice()).unwrap();
    assert_eq!(vocab.len(), model.corpus().vocab().len());

    // Distances computed over imported vectors match the original index.
    let from_import = poincare_embed::VectorIndex::new(&vocab, &table);
    let original = model.index();
    let d0 = original.distance("dog", "cat").unwrap();
    let d1 = from_import.distance("dog", "cat").unwrap();
    assert!((d0 - d1).abs() < 1e-12);
}
