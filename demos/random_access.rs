use std::collections::HashMap;
use std::net::Ipv4Addr;

use radix_prefix::*;

use rand::prelude::*;

fn main() {
    let mut tree = RadixTree::<u32>::new(32);
    let mut handles = HashMap::new();

    let mut rng = thread_rng();

    for _ in 0..1_000_000 {
        let len: u8 = rng.gen_range(1..=8);
        let addr = Ipv4Addr::new(rng.gen::<u8>() & (0xff << (8 - len)), 0, 0, 0);
        let prefix = RadixPrefix::v4(addr, len).unwrap();

        if rng.gen_bool(0.7) {
            let h = tree.insert(&prefix);
            tree.set_data(h, Slot::V4, rng.gen::<u8>() as u32).unwrap();
            handles.insert((addr, len), h);
        } else if let Some(h) = handles.remove(&(addr, len)) {
            tree.remove(h).unwrap();
        }
    }

    println!(
        "{} prefixes across {} nodes",
        tree.len(),
        tree.active_nodes()
    );
}
