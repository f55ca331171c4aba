#![cfg(test)]

// Property tests for ProbeTable kept inside the crate so they can drive the
// structural layer directly, without going through record storage.

use crate::probe_table::ProbeTable;
use proptest::prelude::*;
use std::collections::HashMap;

// Pool-indexed operations to improve shrinking: indices shrink to earlier
// addresses and op lists shrink in length.
#[derive(Clone, Debug)]
enum Op {
    Claim(usize, u32),
    Clear(usize),
    Lookup(usize),
}

fn addr_for(idx: usize) -> usize {
    0x1000 + idx * 0x10
}

fn arb_ops() -> impl Strategy<Value = Vec<Op>> {
    let idx = 0usize..600;
    let op = prop_oneof![
        (idx.clone(), any::<u32>()).prop_map(|(i, v)| Op::Claim(i, v)),
        idx.clone().prop_map(Op::Clear),
        idx.prop_map(Op::Lookup),
    ];
    proptest::collection::vec(op, 1..800)
}

// Property: state-machine equivalence against a HashMap<Address, Head>
// model across random claim/clear/lookup sequences, including runs long
// enough to cross a reorganisation.
//
// Invariants exercised:
// - `chain_head` parity with the model after every operation.
// - Stale buckets never surface as matches for other addresses.
// - `unused + stale + occupied == size` at every step, across rebuilds.
proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_probe_table_matches_model(ops in arb_ops()) {
        let mut t: ProbeTable<u32> = ProbeTable::new();
        let mut model: HashMap<usize, u32> = HashMap::new();

        for op in ops {
            match op {
                Op::Claim(i, v) => {
                    let addr = addr_for(i);
                    t.reserve(addr).expect("allocation");
                    t.claim(addr, v);
                    model.insert(addr, v);
                }
                Op::Clear(i) => {
                    let addr = addr_for(i);
                    // Clearing is only defined for a claimed address.
                    if model.remove(&addr).is_some() {
                        t.clear_chain(addr);
                    }
                }
                Op::Lookup(i) => {
                    let addr = addr_for(i);
                    prop_assert_eq!(t.chain_head(addr), model.get(&addr).copied());
                }
            }
            prop_assert!(t.unused() + t.stale() + model.len() == t.size());
        }

        for (&addr, &head) in &model {
            prop_assert_eq!(t.chain_head(addr), Some(head));
        }
    }
}
