use arena_avl::AvlMap;
use proptest::prelude::*;
use std::collections::BTreeMap as StdMap;
use std::ops::Bound;

mod common;
use common::*;

#[derive(Clone)]
struct Maps<K, V> {
    avl_map: AvlMap<K, V>,
    std_map: StdMap<K, V>, // std::collections::BTreeMap
}

impl<K, V> Maps<K, V>
where
    K: Clone + Ord,
    V: Clone,
{
    fn new(v: Vec<(K, V)>) -> Maps<K, V> {
        Maps {
            avl_map: AvlMap::from_iter(v.clone()),
            std_map: StdMap::from_iter(v),
        }
    }

    fn chk(&self)
    where
        K: std::fmt::Debug,
        V: Eq + std::fmt::Debug,
    {
        assert_eq!(self.avl_map.len(), self.std_map.len());
        assert_eq_iters(self.avl_map.iter(), self.std_map.iter());
        self.avl_map.check().unwrap();
    }
}

fn check_ops(ops: Vec<Op>) {
    let mut maps: Maps<u16, u16> = Maps::new(Vec::new());

    for op in ops {
        match op {
            Op::Insert(k, v) => {
                let old = maps.std_map.insert(k, v);
                assert_eq!(maps.avl_map.insert(k, v), old);
                assert_eq!(maps.avl_map.find(&k), Some(&v));
                assert!(maps.avl_map.count(&k));
            }

            Op::Erase(k) => {
                let old = maps.std_map.remove(&k);
                assert_eq!(maps.avl_map.remove(&k), old);
                assert!(!maps.avl_map.count(&k));
                assert_eq!(maps.avl_map.find(&k), None);
            }
        }
    }

    maps.chk();
}

fn check_find(v: SmallIntPairs, probes: Vec<u16>) {
    let maps = Maps::new(v);
    maps.chk();

    for p in probes {
        assert_eq!(maps.avl_map.find(&p), maps.std_map.get(&p));
        assert_eq!(maps.avl_map.count(&p), maps.std_map.contains_key(&p));
    }
}

fn check_succ_prec(v: SmallIntPairs, probes: Vec<u16>) {
    let maps = Maps::new(v);

    for p in probes {
        assert_eq!(maps.avl_map.succ(&p), maps.std_map.range(p..).next());
        assert_eq!(
            maps.avl_map.prec(&p),
            maps.std_map.range(..=p).next_back()
        );
    }
}

fn check_erase_absent(v: SmallIntPairs, probes: Vec<u16>) {
    let mut maps = Maps::new(v);
    let before: Vec<_> = maps.avl_map.iter().map(|(k, v)| (*k, *v)).collect();

    for p in probes {
        if !maps.std_map.contains_key(&p) {
            maps.avl_map.erase(&p);
        }
    }

    assert_eq_iters(
        maps.avl_map.iter().map(|(k, v)| (*k, *v)),
        before.into_iter(),
    );
    maps.chk();
}

fn check_erase_all(v: SmallIntPairs) {
    let mut maps = Maps::new(v);
    let keys: Vec<_> = maps.std_map.keys().copied().collect();

    // alternate ends so both spines get thinned
    let (evens, odds): (Vec<_>, Vec<_>) =
        keys.iter().enumerate().partition(|(i, _)| i % 2 == 0);
    for (_, k) in evens.into_iter().chain(odds.into_iter().rev()) {
        assert_eq!(maps.avl_map.remove(k), maps.std_map.remove(k));
        maps.avl_map.check().unwrap();
    }

    assert!(maps.avl_map.is_empty());
    assert_eq!(maps.avl_map.height(), 0);
}

fn check_strings(v: Vec<(String, u16)>) {
    let mut maps = Maps::new(v);
    maps.chk();

    let keys: Vec<String> = maps.std_map.keys().cloned().collect();
    for k in keys.iter().step_by(2) {
        assert_eq!(
            maps.avl_map.remove(k.as_str()),
            maps.std_map.remove(k.as_str())
        );
    }
    maps.chk();

    for probe in ["", "a", "m", "zz"] {
        assert_eq!(
            maps.avl_map.succ(probe),
            maps.std_map
                .range::<str, _>((Bound::Included(probe), Bound::Unbounded))
                .next()
        );
    }
}

#[test]
fn succ_prec_regr1() {
    check_succ_prec(vec![(5, 0), (3, 1), (9, 2)], vec![0, 3, 4, 9, 10]);
}

#[test]
fn ops_regr1() {
    use common::Op::*;
    check_ops(vec![
        Insert(5, 0),
        Insert(3, 0),
        Insert(8, 0),
        Insert(4, 0),
        Erase(5),
        Erase(5),
        Insert(5, 1),
        Erase(3),
    ]);
}

proptest! {
    #[test]
    fn test_ops(ops in small_ops()) {
        check_ops(ops);
    }

    #[test]
    fn test_find(v in small_int_pairs(), p in probes()) {
        check_find(v, p);
    }

    #[test]
    fn test_succ_prec(v in small_int_pairs(), p in probes()) {
        check_succ_prec(v, p);
    }

    #[test]
    fn test_erase_absent(v in small_int_pairs(), p in probes()) {
        check_erase_absent(v, p);
    }

    #[test]
    fn test_erase_all(v in small_int_pairs()) {
        check_erase_all(v);
    }

    #[test]
    fn test_strings(v in string_u16_pairs()) {
        check_strings(v);
    }
}
