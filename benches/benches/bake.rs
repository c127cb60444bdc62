// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use criterion::{BatchSize, Criterion, black_box, criterion_group, criterion_main};
use understory_bake::{BakeHost, BakeOptions, Baker, BlockOrder, OwnershipTable};
use understory_path::{Hierarchy, PathIndex};

#[derive(Clone)]
struct Lcg(u64);

impl Lcg {
    fn new(seed: u64) -> Self {
        Self(seed)
    }

    fn next_u32(&mut self) -> u32 {
        // Numerical Recipes LCG parameters.
        self.0 = self.0.wrapping_mul(6364136223846793005).wrapping_add(1);
        (self.0 >> 32) as u32
    }

    fn gen_range_usize(&mut self, upper_exclusive: usize) -> usize {
        if upper_exclusive == 0 {
            return 0;
        }
        (self.next_u32() as usize) % upper_exclusive
    }
}

/// Random tree with element 0 as root; every parent precedes its children.
#[derive(Clone)]
struct Scene {
    parent: Vec<Option<u32>>,
    slot: Vec<usize>,
    children: Vec<Vec<u32>>,
    leaf_host: Vec<u32>,
    table: OwnershipTable<u32, u32>,
}

impl Scene {
    /// `depth_bias` of 0 gives bushy trees, higher values longer chains.
    fn build(n: u32, leaves: u32, depth_bias: usize, seed: u64) -> Self {
        let mut rng = Lcg::new(seed);
        let mut scene = Self {
            parent: vec![None],
            slot: vec![0],
            children: vec![Vec::new()],
            leaf_host: Vec::new(),
            table: OwnershipTable::new(),
        };
        for id in 1..n {
            let parent = if rng.gen_range_usize(depth_bias + 1) > 0 {
                id - 1
            } else {
                rng.gen_range_usize(id as usize) as u32
            };
            scene.parent.push(Some(parent));
            scene.slot.push(scene.children[parent as usize].len());
            scene.children[parent as usize].push(id);
            scene.children.push(Vec::new());
        }
        for _ in 0..leaves {
            scene.leaf_host.push(rng.gen_range_usize(n as usize) as u32);
        }
        scene
    }

    /// Every `stride`-th element of a pre-order walk, plus the root.
    fn nodes(&self, stride: usize) -> Vec<u32> {
        let mut out = Vec::new();
        let mut stack = vec![0_u32];
        let mut seen = 0;
        while let Some(e) = stack.pop() {
            if seen % stride == 0 {
                out.push(e);
            }
            seen += 1;
            stack.extend(self.children[e as usize].iter().rev());
        }
        out
    }
}

impl Hierarchy<u32> for Scene {
    fn parent(&self, node: u32) -> Option<u32> {
        self.parent[node as usize]
    }

    fn sibling_index(&self, node: u32) -> usize {
        self.slot[node as usize]
    }
}

impl BakeHost<u32, u32> for Scene {
    fn leaf_host(&self, leaf: u32) -> u32 {
        self.leaf_host[leaf as usize]
    }

    fn assign_leaves(&mut self, node: u32, leaves: &[u32]) -> bool {
        self.table.assign_leaves(node, leaves)
    }

    fn assign_nested(&mut self, node: u32, nested: &[u32]) -> bool {
        self.table.assign_nested(node, nested)
    }
}

fn bench_paths(c: &mut Criterion) {
    let mut group = c.benchmark_group("understory_path");
    group.sample_size(50);

    for &(n, depth_bias) in &[(1_024_u32, 0_usize), (1_024, 8), (8_192, 0), (8_192, 8)] {
        let scene = Scene::build(n, 0, depth_bias, 0xBA4E_0000_0000_0001);

        group.bench_function(format!("create_all(n={n},bias={depth_bias})"), |b| {
            b.iter_batched(
                PathIndex::<u32>::new,
                |mut index| {
                    for node in 0..n {
                        let _ = black_box(index.create(&scene, node));
                    }
                    black_box(index.chunk_count());
                },
                BatchSize::LargeInput,
            );
        });

        group.bench_function(format!("sort_all(n={n},bias={depth_bias})"), |b| {
            let mut index = PathIndex::new();
            let mut paths: Vec<_> = (0..n)
                .rev()
                .filter_map(|node| index.create(&scene, node).ok())
                .collect();
            b.iter(|| {
                index.sort(&mut paths);
                black_box(&paths);
                paths.reverse();
            });
        });
    }

    group.finish();
}

fn bench_bake(c: &mut Criterion) {
    let mut group = c.benchmark_group("understory_bake");
    group.sample_size(50);

    for &(n, stride, depth_bias) in &[
        (1_024_u32, 4_usize, 0_usize),
        (1_024, 4, 8),
        (8_192, 4, 0),
        (8_192, 16, 8),
    ] {
        let scene = Scene::build(n, n, depth_bias, 0xBA4E_0000_0000_0002);
        let nodes = scene.nodes(stride);
        let tag = format!("n={n},stride={stride},bias={depth_bias}");

        for order in [BlockOrder::Verify, BlockOrder::Regroup] {
            group.bench_function(format!("fresh_{order:?}({tag})"), |b| {
                let mut baker = Baker::with_options(BakeOptions::new().with_block_order(order));
                b.iter_batched(
                    || scene.clone(),
                    |mut scene| {
                        let result = baker.bake(&mut scene, nodes.iter().copied(), 0..n);
                        black_box(result).ok();
                    },
                    BatchSize::LargeInput,
                );
            });
        }

        // Measures a bake whose results match what the host already holds.
        group.bench_function(format!("clean({tag})"), |b| {
            let mut scene = scene.clone();
            let mut baker = Baker::new();
            let _ = baker.bake(&mut scene, nodes.iter().copied(), 0..n);
            b.iter(|| {
                let result = baker.bake(&mut scene, nodes.iter().copied(), 0..n);
                black_box(result).ok();
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_paths, bench_bake);
criterion_main!(benches);
