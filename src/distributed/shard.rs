//! Input sharding
//!
//! Lines are dealt round-robin: line `i` belongs to shard `i % n`. Shard 0 is
//! always served by the local node, shard `k` by the `k`-th peer.

/// Partition `lines` into `parts` interleaved shards
///
/// `parts <= 1` returns the input as a single shard. Relative order inside
/// each shard follows the input order.
pub fn shard_lines(lines: Vec<String>, parts: usize) -> Vec<Vec<String>> {
    if parts <= 1 {
        return vec![lines];
    }

    let per_shard = lines.len() / parts + 1;
    let mut shards: Vec<Vec<String>> = (0..parts).map(|_| Vec::with_capacity(per_shard)).collect();
    for (i, line) in lines.into_iter().enumerate() {
        shards[i % parts].push(line);
    }
    shards
}
