//! Property-based tests for the hyperbolic metric and training invariants.
//!
//! The metric axioms must hold for any pair of points inside the open
//! ball, not just the ones training happens to produce, so they are
//! checked over generated vectors.

use proptest::prelude::*;

/// Generate a vector of dimension `dim` with norm at most 0.9, safely
/// inside the open ball.
fn arb_ball_vector(dim: usize) -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(-1.0f64..1.0, dim).prop_map(|mut v| {
        let norm: f64 = v.iter().map(|x| x * x).sum::<f64>().sqrt();
        if norm > 0.9 {
            let scale = 0.9 / norm;
            for x in &mut v {
                *x *= scale;
            }
        }
        v
    })
}

mod metric_props {
    use super::*;
    use poincare_embed::vector_distance;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(200))]

        #[test]
        fn distance_is_non_negative(
            x in arb_ball_vector(5),
            y in arb_ball_vector(5),
        ) {
            let d = vector_distance(&x, &y).unwrap();
            prop_assert!(d >= 0.0, "d = {}", d);
            prop_assert!(d.is_finite());
        }

        #[test]
        fn distance_to_self_is_zero(x in arb_ball_vector(5)) {
            prop_assert_eq!(vector_distance(&x, &x).unwrap(), 0.0);
        }

        #[test]
        fn distance_is_symmetric(
            x in arb_ball_vector(5),
            y in arb_ball_vector(5),
        ) {
            let xy = vector_distance(&x, &y).unwrap();
            let yx = vector_distance(&y, &x).unwrap();
            prop_assert!((xy - yx).abs() < 1e-9, "xy = {}, yx = {}", xy, yx);
        }

        #[test]
        fn triangle_inequality_holds(
            x in arb_ball_vector(5),
            y in arb_ball_vector(5),
            z in arb_ball_vector(5),
        ) {
            let xz = vector_distance(&x, &z).unwrap();
            let xy = vector_distance(&x, &y).unwrap();
            let yz = vector_distance(&y, &z).unwrap();
            prop_assert!(
                xz <= xy + yz + 1e-9,
                "triangle violated: {} > {} + {}",
                xz, xy, yz
            );
        }

        #[test]
        fn distinct_points_have_positive_distance(
            x in arb_ball_vector(5),
            y in arb_ball_vector(5),
        ) {
            // Points closer than float precision are "equal" for this
            // property; gamma saturates at exactly 1 there.
            prop_assume!(x.iter().zip(&y).any(|(a, b)| (a - b).abs() > 1e-6));
            prop_assert!(vector_distance(&x, &y).unwrap() > 0.0);
        }

        #[test]
        fn batch_matches_single(
            x in arb_ball_vector(4),
            others in prop::collection::vec(arb_ball_vector(4), 1..6),
        ) {
            let batch = poincare_embed::vector_distance_batch(&x, &others).unwrap();
            prop_assert_eq!(batch.len(), others.len());
            for (b, o) in batch.iter().zip(&others) {
                prop_assert_eq!(*b, vector_distance(&x, o).unwrap());
            }
        }
    }
}

mod training_props {
    use super::*;
    use poincare_embed::{PoincareConfig, PoincareModel, RelationCorpus};

    /// Generate small random relation lists over a bounded label set.
    fn arb_relations() -> impl Strategy<Value = Vec<(String, String)>> {
        prop::collection::vec(("[a-f]", "[a-f]"), 1..12)
    }

    proptest! {
        // Training is the expensive part, keep the case count modest.
        #![proptest_config(ProptestConfig::with_cases(16))]

        #[test]
        fn ball_invariant_survives_training(relations in arb_relations()) {
            let corpus = RelationCorpus::from_pairs(
                relations.iter().map(|(c, p)| (c.as_str(), p.as_str())),
            );
            let config = PoincareConfig::default()
                .with_dim(3)
                .with_negative_samples(2)
                .with_burn_in_epochs(1)
                .with_workers(1);
            let limit = 1.0 - config.boundary_eps;

            let mut model = PoincareModel::new(corpus, config).unwrap();
            let loss = model.train(3).unwrap();

            prop_assert!(loss.is_finite() && loss >= 0.0);
            for idx in 0..model.table().len() {
                prop_assert!(model.table().norm(idx) <= limit + 1e-12);
            }
        }
    }
}
