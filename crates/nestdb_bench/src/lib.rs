//! Benchmark utilities.

use nestdb_core::{Resource, Snapshot, Value};
use rand::Rng;

/// Generates a random document with `width` keys per level, nested `depth`
/// levels deep. Leaves are integers or short strings.
pub fn random_document(width: usize, depth: usize) -> Resource {
    let mut rng = rand::thread_rng();
    build(&mut rng, width, depth)
}

fn build<R: Rng>(rng: &mut R, width: usize, depth: usize) -> Resource {
    (0..width)
        .map(|i| {
            let value = if depth > 1 {
                Value::Object(build(rng, width, depth - 1))
            } else if rng.gen_bool(0.5) {
                Value::from(rng.gen::<i64>())
            } else {
                let len = rng.gen_range(1..16);
                let s: String = (0..len).map(|_| rng.gen_range(b'a'..=b'z') as char).collect();
                Value::from(s)
            };
            (format!("k{}", i), value)
        })
        .collect()
}

/// Generates a snapshot of `namespaces` documents, each `width` wide and
/// `depth` deep.
pub fn random_snapshot(namespaces: usize, width: usize, depth: usize) -> Snapshot {
    (0..namespaces)
        .map(|i| (format!("ns_{}", i), random_document(width, depth)))
        .collect()
}
