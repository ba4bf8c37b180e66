use std::collections::HashMap;

use super::*;
use itertools::Itertools;

fn host(addr: u32) -> RadixPrefix {
    RadixPrefix::v4(Ipv4Addr::from(addr), 32).unwrap()
}

/// Replay a random operation sequence against both the tree and a plain
/// hash-map model, keeping the returned handles so removals go through the
/// real API.
fn apply(ops: Vec<Operation>) -> (RadixTree<u32>, HashMap<TestPrefix, u32>) {
    let mut tree = RadixTree::new(32);
    let mut handles: HashMap<TestPrefix, NodeHandle> = HashMap::new();
    let mut model = HashMap::new();

    for op in ops {
        match op {
            Operation::Add(p, t) => {
                let h = tree.insert(&p.prefix());
                tree.set_data(h, Slot::V4, t).unwrap();
                handles.insert(p, h);
                model.insert(p, t);
            }
            Operation::Remove(p) => {
                if let Some(h) = handles.remove(&p) {
                    tree.remove(h).unwrap();
                }
                model.remove(&p);
            }
        }
    }
    (tree, model)
}

fn model_lpm(model: &HashMap<TestPrefix, u32>, addr: u32) -> Option<u32> {
    model
        .iter()
        .filter(|(p, _)| p.contains(addr))
        .max_by_key(|(p, _)| p.1)
        .map(|(_, t)| *t)
}

qc!(lookup, _lookup);
fn _lookup((ops, queries): (Vec<Operation>, Vec<u32>)) -> bool {
    let (tree, model) = apply(ops.clone());

    // probe the arbitrary addresses plus every prefix base, which is where
    // the interesting boundaries sit
    let mut addrs = queries;
    addrs.extend(ops.iter().map(|op| match op {
        Operation::Add(p, _) | Operation::Remove(p) => p.0,
    }));

    addrs
        .iter()
        .all(|&a| tree.search_data(&host(a)).copied() == model_lpm(&model, a))
}

qc!(exact, _exact);
fn _exact(ops: Vec<Operation>) -> bool {
    let (tree, model) = apply(ops);
    tree.len() == model.len()
        && model
            .iter()
            .all(|(p, t)| tree.search_data(&p.prefix()) == Some(t))
}

qc!(iter_matches_model, _iter_matches_model);
fn _iter_matches_model(ops: Vec<Operation>) -> bool {
    let (tree, model) = apply(ops);
    let got = tree
        .iter()
        .map(|(p, d)| {
            let addr = u32::from_be_bytes(p.addr()[..4].try_into().unwrap());
            (TestPrefix(addr, p.bitlen()), d[Slot::V4.index()].unwrap())
        })
        .sorted();
    got.eq(model.into_iter().sorted())
}

qc!(rebuild_equality, _rebuild_equality);
fn _rebuild_equality(ops: Vec<Operation>) -> bool {
    let (tree, _) = apply(ops);

    let mut rebuilt = RadixTree::new(32);
    for (p, d) in tree.iter() {
        let h = rebuilt.insert(p);
        rebuilt
            .set_data(h, Slot::V4, d[Slot::V4.index()].unwrap())
            .unwrap();
    }
    tree == rebuilt && tree == tree.clone()
}

qc!(first_match, _first_match);
fn _first_match((list, queries): (Vec<(TestPrefix, u32)>, Vec<u32>)) -> bool {
    let mut tree = RadixTree::new(32);
    // the model keeps first-insertion order, with later data overwrites
    let mut order: Vec<(TestPrefix, u32)> = Vec::new();

    for (p, t) in list {
        let h = tree.insert(&p.prefix());
        tree.set_data(h, Slot::V4, t).unwrap();
        match order.iter_mut().find(|(q, _)| *q == p) {
            Some(entry) => entry.1 = t,
            None => order.push((p, t)),
        }
    }

    let mut addrs = queries;
    addrs.extend(order.iter().map(|(p, _)| p.0));

    addrs.iter().all(|&a| {
        let want = order.iter().find(|(p, _)| p.contains(a)).map(|(_, t)| t);
        let got = tree
            .search_earliest(&host(a))
            .and_then(|h| tree.data(h, Slot::V4));
        got == want
    })
}

qc!(node_accounting, _node_accounting);
fn _node_accounting(ops: Vec<Operation>) -> bool {
    let (tree, model) = apply(ops);
    let len = model.len() as u32;
    let active = tree.active_nodes();
    // every glue node has two children, so glue count stays below len
    if len == 0 {
        active == 0
    } else {
        active >= len && active < 2 * len
    }
}

qc!(teardown, _teardown);
fn _teardown(ops: Vec<Operation>) -> bool {
    let (mut tree, model) = apply(ops);
    let mut destroyed = 0;
    tree.clear_with(|_, _| destroyed += 1);
    destroyed == model.len() && tree.is_empty() && tree.active_nodes() == 0
}
