//! Edge case tests for kdscan.
//!
//! Tests unusual inputs and boundary conditions that could cause failures.

use kdscan::{
    cosine_distance, squared_l2, squared_l2_simd, DistanceKernel, ExecPolicy, Layout,
    LinearScanIndex, RetrieveError, SearchConfig, Vector, VectorIndex,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::StandardNormal;

#[cfg(feature = "kdtree")]
use kdscan::{KDTreeIndex, KDTreeStats};

fn gaussian_vectors(n: usize, dim: usize, seed: u64) -> Vec<Vector> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..n)
        .map(|_| (0..dim).map(|_| rng.sample::<f32, _>(StandardNormal)).collect())
        .collect()
}

fn all_configs() -> Vec<SearchConfig> {
    let mut configs = Vec::new();
    for distance in [DistanceKernel::ScalarL2, DistanceKernel::SimdL2] {
        for exec in [ExecPolicy::Sequential, ExecPolicy::Parallel] {
            for layout in [Layout::RowMajor, Layout::ColumnMajor] {
                configs.push(
                    SearchConfig::default()
                        .with_distance(distance)
                        .with_exec(exec)
                        .with_layout(layout),
                );
            }
        }
    }
    configs
}

fn linear_from(data: &[Vector], config: SearchConfig) -> LinearScanIndex {
    let dim = data.first().map_or(1, |v| v.dim());
    let mut index = LinearScanIndex::new(dim, config).expect("Failed to create");
    for v in data {
        index.add(v).expect("Failed to add");
    }
    index
}

fn corners() -> Vec<Vector> {
    vec![
        Vector::from([0.0, 0.0]),
        Vector::from([1.0, 0.0]),
        Vector::from([0.0, 1.0]),
        Vector::from([5.0, 5.0]),
    ]
}

// =============================================================================
// Concrete scenarios
// =============================================================================

#[test]
fn corners_top_two_linear_scan() {
    for cfg in all_configs() {
        let index = linear_from(&corners(), cfg);
        let results = index.search(&[0.0, 0.0], 2).expect("Search failed");
        // (1,0) and (0,1) tie at 1.0; the lower id wins.
        assert_eq!(results, vec![(0, 0.0), (1, 1.0)], "{cfg:?}");
    }
}

#[cfg(feature = "kdtree")]
#[test]
fn corners_top_two_kd_tree() {
    let tree = KDTreeIndex::from_dataset(2, corners()).expect("Failed to build");
    let results = tree.search(&[0.0, 0.0], 2).expect("Search failed");
    assert_eq!(results, vec![(0, 0.0), (1, 1.0)]);
}

#[test]
fn sequential_and_parallel_identical_on_100k() {
    let data = gaussian_vectors(100_000, 4, 7);
    let queries = gaussian_vectors(5, 4, 8);

    let seq = linear_from(&data, SearchConfig::default());
    let par = linear_from(&data, SearchConfig::default().with_exec(ExecPolicy::Parallel));
    let par_pool = linear_from(
        &data,
        SearchConfig::default()
            .with_exec(ExecPolicy::Parallel)
            .with_num_threads(3),
    );

    for q in &queries {
        let expected = seq.search(q, 10).expect("Search failed");
        assert_eq!(expected.len(), 10);
        assert_eq!(par.search(q, 10).expect("Search failed"), expected);
        assert_eq!(par_pool.search(q, 10).expect("Search failed"), expected);
    }
}

#[test]
fn simd_parallel_matches_simd_sequential() {
    let data = gaussian_vectors(20_000, 19, 11);
    let q = &gaussian_vectors(1, 19, 12)[0];
    let simd = SearchConfig::default().with_distance(DistanceKernel::SimdL2);

    let seq = linear_from(&data, simd).search(q, 25).expect("Search failed");
    let par = linear_from(&data, simd.with_exec(ExecPolicy::Parallel))
        .search(q, 25)
        .expect("Search failed");
    assert_eq!(seq, par);
}

#[test]
fn column_layout_bit_identical_to_scalar_rows() {
    let data = gaussian_vectors(3_000, 13, 21);
    let q = &gaussian_vectors(1, 13, 22)[0];

    let rows = linear_from(&data, SearchConfig::default());
    let cols = linear_from(&data, SearchConfig::default().with_layout(Layout::ColumnMajor));
    let expected = rows.search(q, 3_000).expect("Search failed");
    let got = cols.search(q, 3_000).expect("Search failed");
    assert_eq!(expected.len(), 3_000);
    for (a, b) in expected.iter().zip(&got) {
        assert_eq!(a.0, b.0);
        assert_eq!(a.1.to_bits(), b.1.to_bits());
    }
}

#[cfg(feature = "kdtree")]
#[test]
fn kd_tree_matches_linear_scan_on_gaussian_data() {
    let data = gaussian_vectors(100_000, 4, 31);
    let queries = gaussian_vectors(20, 4, 32);

    let flat = linear_from(&data, SearchConfig::default().with_exec(ExecPolicy::Parallel));
    let tree = KDTreeIndex::from_dataset(4, data).expect("Failed to build");
    assert_eq!(tree.len(), 100_000);
    assert_eq!(tree.depth(), 17);

    for q in &queries {
        let (got, stats) = tree.search_with_stats(q, 10).expect("Search failed");
        assert_eq!(got, flat.search(q, 10).expect("Search failed"));
        assert!(stats.pruned_branches > 0);
        assert!(stats.visited_nodes < 100_000 / 10, "visited {}", stats.visited_nodes);
    }
}

#[cfg(feature = "kdtree")]
#[test]
fn kd_tree_stays_exact_in_high_dimension() {
    let data = gaussian_vectors(2_000, 64, 41);
    let queries = gaussian_vectors(5, 64, 42);
    let flat = linear_from(&data, SearchConfig::default());
    let tree = KDTreeIndex::from_dataset(64, data).expect("Failed to build");

    for q in &queries {
        let (got, stats) = tree.search_with_stats(q, 5).expect("Search failed");
        assert_eq!(got, flat.search(q, 5).expect("Search failed"));
        // Little can be pruned at this dimension.
        assert!(stats.visited_nodes > 2_000 / 2, "visited {}", stats.visited_nodes);
    }
}

/// Same ids and bit-identical distances; NaN entries compare equal here.
#[cfg(feature = "kdtree")]
fn assert_same_neighbors(got: &[(u32, f32)], expected: &[(u32, f32)]) {
    assert_eq!(got.len(), expected.len(), "got {got:?}, expected {expected:?}");
    for (g, e) in got.iter().zip(expected) {
        assert_eq!(g.0, e.0, "got {got:?}, expected {expected:?}");
        assert_eq!(g.1.to_bits(), e.1.to_bits(), "got {got:?}, expected {expected:?}");
    }
}

#[cfg(feature = "kdtree")]
#[test]
fn kd_tree_keeps_exact_match_with_nan_pivots() {
    // Six finite points on the x axis, then seven points with a NaN x.
    // NaN sorts last on the split axis, so NaN points become pivots.
    let mut data: Vec<Vector> = (0..6).map(|i| Vector::from([i as f32, 0.0])).collect();
    data.extend((0..7).map(|y| Vector::from([f32::NAN, y as f32])));

    let flat = linear_from(&data, SearchConfig::default());
    let tree = KDTreeIndex::from_dataset(2, data).expect("Failed to build");
    let query = [0.0_f32, 0.0];

    let all = tree.search(&query, 13).expect("Search failed");
    assert_eq!(all.len(), 13);
    assert_eq!(all[0], (0, 0.0));
    assert_same_neighbors(&all, &flat.search(&query, 13).expect("Search failed"));

    let top = tree.search(&query, 3).expect("Search failed");
    assert_eq!(top, vec![(0, 0.0), (1, 1.0), (2, 4.0)]);
}

#[cfg(feature = "kdtree")]
#[test]
fn kd_tree_nan_query_returns_min_k_n() {
    let data: Vec<Vector> = (0..7)
        .map(|i| Vector::from([i as f32, (i * 3 % 5) as f32]))
        .collect();
    let flat = linear_from(&data, SearchConfig::default());
    let tree = KDTreeIndex::from_dataset(2, data).expect("Failed to build");
    let query = [f32::NAN, 0.0];

    let (got, stats) = tree.search_with_stats(&query, 7).expect("Search failed");
    assert_eq!(got.len(), 7);
    assert_eq!(stats.pruned_branches, 0);
    assert_eq!(stats.visited_nodes, 7);
    assert_same_neighbors(&got, &flat.search(&query, 7).expect("Search failed"));
    // Every distance is NaN, so ids come back in ascending order.
    let ids: Vec<u32> = got.iter().map(|r| r.0).collect();
    assert_eq!(ids, (0..7).collect::<Vec<u32>>());
}

// =============================================================================
// Vector count edge cases
// =============================================================================

#[test]
fn empty_linear_index_returns_empty() {
    for cfg in all_configs() {
        let index = LinearScanIndex::new(8, cfg).expect("Failed to create");
        assert!(index.is_empty());
        assert!(index.search(&[0.5; 8], 1).expect("Search failed").is_empty());
        assert!(index.search(&[0.5; 8], 100).expect("Search failed").is_empty());
    }
}

#[cfg(feature = "kdtree")]
#[test]
fn empty_kd_tree_returns_empty() {
    let tree = KDTreeIndex::from_dataset(8, Vec::<Vector>::new()).expect("Failed to build");
    assert!(tree.is_empty());
    let (results, stats) = tree.search_with_stats(&[0.5; 8], 3).expect("Search failed");
    assert!(results.is_empty());
    assert_eq!(stats, KDTreeStats::default());
}

#[test]
fn k_larger_than_index_returns_everything() {
    let data = gaussian_vectors(7, 3, 1);
    for cfg in all_configs() {
        let index = linear_from(&data, cfg);
        let results = index.search(&[0.0; 3], 50).expect("Search failed");
        assert_eq!(results.len(), 7);
        assert!(results.windows(2).all(|w| w[0].1 <= w[1].1));
        assert_eq!(index.search(&[0.0; 3], usize::MAX).expect("Search failed").len(), 7);
    }

    #[cfg(feature = "kdtree")]
    {
        let tree = KDTreeIndex::from_dataset(3, data).expect("Failed to build");
        assert_eq!(tree.search(&[0.0; 3], 50).expect("Search failed").len(), 7);
        assert_eq!(tree.search(&[0.0; 3], usize::MAX).expect("Search failed").len(), 7);
    }
}

#[test]
fn k_zero_returns_empty() {
    let data = gaussian_vectors(10, 3, 2);
    let index = linear_from(&data, SearchConfig::default());
    assert!(index.search(&[0.0; 3], 0).expect("Search failed").is_empty());

    #[cfg(feature = "kdtree")]
    {
        let tree = KDTreeIndex::from_dataset(3, data).expect("Failed to build");
        assert!(tree.search(&[0.0; 3], 0).expect("Search failed").is_empty());
    }
}

#[test]
fn single_vector_index() {
    let data = vec![Vector::from([2.0, -1.0, 0.5])];
    let index = linear_from(&data, SearchConfig::default().with_exec(ExecPolicy::Parallel));
    assert_eq!(index.search(&[2.0, -1.0, 0.5], 3).expect("Search failed"), vec![(0, 0.0)]);
}

// =============================================================================
// Dimension errors
// =============================================================================

#[test]
fn distance_functions_reject_mismatched_dims() {
    let a = [1.0_f32; 5];
    let b = [1.0_f32; 4];
    let err = RetrieveError::DimensionMismatch {
        expected: 5,
        actual: 4,
    };
    assert_eq!(squared_l2(&a, &b), Err(err.clone()));
    assert_eq!(squared_l2_simd(&a, &b), Err(err.clone()));
    assert_eq!(cosine_distance(&a, &b), Err(err));
}

#[test]
fn linear_index_dimension_errors_do_not_mutate() {
    for cfg in all_configs() {
        let mut index = linear_from(&gaussian_vectors(20, 6, 3), cfg);
        let q = [0.1_f32; 6];
        let before = index.search(&q, 20).expect("Search failed");
        let bytes = index.size_bytes();

        assert!(matches!(
            index.add(&[0.0; 5]),
            Err(RetrieveError::DimensionMismatch {
                expected: 6,
                actual: 5
            })
        ));
        assert!(matches!(
            index.add(&[0.0; 7]),
            Err(RetrieveError::DimensionMismatch { .. })
        ));
        assert!(matches!(
            index.search(&[0.0; 3], 1),
            Err(RetrieveError::DimensionMismatch { .. })
        ));

        assert_eq!(index.len(), 20);
        assert_eq!(index.size_bytes(), bytes);
        assert_eq!(index.search(&q, 20).expect("Search failed"), before);
        // Next id continues from the last successful add.
        assert_eq!(index.add(&[0.0; 6]).expect("Failed to add"), 20);
    }
}

#[test]
fn batch_search_fails_on_any_bad_query() {
    let index = linear_from(&gaussian_vectors(10, 2, 4), SearchConfig::default());
    let queries: Vec<Vec<f32>> = vec![vec![0.0, 0.0], vec![0.0]];
    assert!(index.batch_search(&queries, 3).is_err());
}

// =============================================================================
// Special vector patterns
// =============================================================================

#[test]
fn cosine_of_zero_vector_is_exactly_one() {
    let zero = Vector::zeros(16);
    for v in gaussian_vectors(10, 16, 5) {
        assert_eq!(cosine_distance(&zero, &v).expect("cosine failed"), 1.0);
        assert_eq!(cosine_distance(&v, &zero).expect("cosine failed"), 1.0);
    }
}

#[test]
fn identical_vectors_tie_break_by_id() {
    let base = Vector::from([0.25, 0.5, 0.75]);
    let data: Vec<Vector> = (0..10).map(|_| base.clone()).collect();
    for cfg in all_configs() {
        let index = linear_from(&data, cfg);
        let ids: Vec<u32> = index
            .search(&base, 4)
            .expect("Search failed")
            .iter()
            .map(|r| r.0)
            .collect();
        assert_eq!(ids, vec![0, 1, 2, 3], "{cfg:?}");
    }

    #[cfg(feature = "kdtree")]
    {
        let tree = KDTreeIndex::from_dataset(3, data).expect("Failed to build");
        let ids: Vec<u32> = tree
            .search(&base, 4)
            .expect("Search failed")
            .iter()
            .map(|r| r.0)
            .collect();
        assert_eq!(ids, vec![0, 1, 2, 3]);
    }
}

// =============================================================================
// Shared trait surface
// =============================================================================

fn nearest_id(index: &dyn VectorIndex, query: &[f32]) -> u32 {
    index.search(query, 1).expect("Search failed")[0].0
}

#[test]
fn indexes_share_trait_surface() {
    let data = gaussian_vectors(500, 3, 6);
    let probe = data[123].clone();
    let flat = linear_from(&data, SearchConfig::default());
    assert_eq!(nearest_id(&flat, &probe), 123);

    let stats = flat.stats();
    assert_eq!(stats.num_vectors, 500);
    assert_eq!(stats.dimension, 3);
    assert_eq!(stats.size_bytes, 500 * 3 * 4);
    assert_eq!(stats.algorithm, "Linear-Scan");

    #[cfg(feature = "kdtree")]
    {
        let tree = KDTreeIndex::from_dataset(3, data).expect("Failed to build");
        assert_eq!(nearest_id(&tree, &probe), 123);
        assert_eq!(tree.stats().algorithm, "KD-Tree");

        let origin = [0.0_f32; 3];
        let queries: Vec<&[f32]> = vec![probe.as_slice(), origin.as_slice()];
        let batched = VectorIndex::batch_search(&tree, &queries, 3).expect("Search failed");
        assert_eq!(batched.len(), 2);
        assert_eq!(batched[0][0].0, 123);
    }
}
