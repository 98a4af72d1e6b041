use proptest::prelude::*;

pub(super) fn assert_eq_iters<I: Iterator, J: Iterator<Item = I::Item>>(
    mut i: I,
    mut j: J,
) where
    I::Item: std::fmt::Debug + Eq, // same inferred for J::Item
{
    loop {
        match (i.next(), j.next()) {
            (None, None) => return,
            (a, b) => assert_eq!(a, b),
        }
    }
}

pub(super) type SmallIntPairs = Vec<(u16, u16)>;

pub(super) fn small_int_pairs() -> impl Strategy<Value = SmallIntPairs> {
    prop::collection::vec((0u16..1024u16, 0u16..1024u16), 0..512)
}

pub(super) fn string_u16_pairs() -> impl Strategy<Value = Vec<(String, u16)>> {
    prop::collection::vec(("[a-z]{0,2}", 0u16..1024u16), 0..512)
}

/// One mutation applied to a map under test.
#[derive(Clone, Debug)]
pub(super) enum Op {
    Insert(u16, u16),
    Erase(u16),
}

// Keys are drawn from a narrow range so erases often hit.
pub(super) fn small_ops() -> impl Strategy<Value = Vec<Op>> {
    let op = prop_oneof![
        3 => (0u16..128, any::<u16>()).prop_map(|(k, v)| Op::Insert(k, v)),
        2 => (0u16..128).prop_map(Op::Erase),
    ];
    prop::collection::vec(op, 0..400)
}

pub(super) fn probes() -> impl Strategy<Value = Vec<u16>> {
    prop::collection::vec(0u16..1100u16, 0..64)
}
