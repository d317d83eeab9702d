use hdrhistogram::Histogram;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::node::RawNode;
use crate::RedBlackTree;

fn gen_unique_keys(count: usize, random: bool, key_max: u64) -> Vec<u64> {
    let keys: Vec<u64> = if random {
        let mut rng = ChaCha8Rng::seed_from_u64(123);
        rand::seq::index::sample(&mut rng, key_max as usize, count)
            .into_iter()
            .map(|a| a as u64)
            .collect()
    } else {
        (0..count as u64).collect()
    };

    assert_eq!(keys.len(), count);
    keys
}

/// Depth of every node, the root is at depth 1.
fn depths(tree: &RedBlackTree<u64>) -> Histogram<u64> {
    fn inner(node: Option<RawNode<u64>>, depth: u64, hist: &mut Histogram<u64>) {
        if let Some(node) = node {
            hist.record(depth).unwrap();
            unsafe {
                inner(node.left(), depth + 1, hist);
                inner(node.right(), depth + 1, hist);
            }
        }
    }

    let mut hist = Histogram::new(3).unwrap();
    inner(tree.root, 1, &mut hist);
    hist
}

#[test]
#[ignore = "not really a test but prints node depth statistics"]
fn metrics() {
    fn print(name: &str, tree: &RedBlackTree<u64>) {
        let hist = depths(tree);
        let bound = 2.0 * ((tree.len() + 1) as f64).log2();
        println!(
            "{name:>24}: len={:<7} mean={:>6.2} p50={:>3} p99={:>3} max={:>3} bound={bound:>6.2}",
            tree.len(),
            hist.mean(),
            hist.value_at_quantile(0.5),
            hist.value_at_quantile(0.99),
            hist.max(),
        );
        assert!(tree.height() as f64 <= bound);
    }

    for count in [1_000, 100_000] {
        for random in [false, true] {
            let keys = gen_unique_keys(count, random, 10 * count as u64);
            let order = if random { "random" } else { "ascending" };

            let mut tree = RedBlackTree::new();
            for key in &keys {
                tree.insert(*key);
            }
            print(&format!("{order} inserts"), &tree);

            for key in keys.iter().step_by(2) {
                tree.delete(key);
            }
            print(&format!("{order} half deleted"), &tree);
        }
    }
}
