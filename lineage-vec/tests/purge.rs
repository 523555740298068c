use std::cell::Cell;

use lineage::purge::{CONTINUE, STOP};
use lineage_vec::ArrayView;
use rand::{rngs::StdRng, Rng, SeedableRng};

// neither Clone nor Copy, so the only way to relocate one is a move
struct Token<'a> {
    value: u32,
    drops: &'a Cell<usize>,
}

impl Drop for Token<'_> {
    fn drop(&mut self) {
        self.drops.set(self.drops.get() + 1);
    }
}

fn tokens(drops: &Cell<usize>, values: std::ops::Range<u32>) -> ArrayView<Token<'_>> {
    values.map(|value| Token { value, drops }).collect()
}

fn values(view: &ArrayView<Token<'_>>) -> Vec<u32> {
    view.read(|slice| slice.iter().map(|token| token.value).collect())
        .unwrap_or_default()
}

#[test]
fn removing_evens_moves_each_survivor_once() {
    let drops = Cell::new(0);
    let mut view = tokens(&drops, 0..6);

    let purged = view
        .purge(|remove, token| {
            *remove = token.value % 2 == 0;
            CONTINUE
        })
        .unwrap();

    assert_eq!(values(&view), [1, 3, 5]);
    assert_eq!(purged.visited, 6);
    assert_eq!(purged.removed, 3);
    assert_eq!(purged.relocated, 3);
    assert!(purged.finished);
    assert_eq!(drops.get(), 3);
}

#[test]
fn keeping_everything_moves_nothing() {
    let drops = Cell::new(0);
    let mut view = tokens(&drops, 0..8);
    let generation = view.generation();

    let purged = view.purge(|_, _| CONTINUE).unwrap();

    assert_eq!(values(&view), (0..8).collect::<Vec<_>>());
    assert_eq!(purged.relocated, 0);
    assert_eq!(purged.removed, 0);
    assert_eq!(drops.get(), 0);
    assert_eq!(view.generation(), generation);
}

#[test]
fn purge_through_a_descendant() {
    let drops = Cell::new(0);
    let all = tokens(&drops, 0..10);
    let mut middle = all.slice(2, 8).unwrap();

    let purged = middle
        .purge(|remove, token| {
            *remove = token.value % 2 == 0;
            CONTINUE
        })
        .unwrap();

    assert_eq!(purged.removed, 3);
    assert_eq!(values(&middle), [3, 5, 7]);
    assert_eq!(values(&all), [0, 1, 3, 5, 7, 8, 9]);
    assert_eq!(all.len(), 7);
}

#[test]
fn failing_predicate_settles_what_it_visited() {
    let mut view = (0..8).collect::<ArrayView<i32>>();
    let result = view.try_purge(|remove, value| {
        if *value == 5 {
            return Err(lineage::Error::InvalidAccess { what: "five" });
        }
        *remove = *value % 2 == 0;
        Ok(CONTINUE)
    });

    assert!(result.unwrap_err().is_invalid_access());
    assert_eq!(view.to_vec(), Ok(vec![1, 3, 5, 6, 7]));
    assert_eq!(view.len(), 5);
}

#[test]
fn purge_matches_retain() {
    let seed = rand::random();
    let mut rng = StdRng::from_seed(seed);

    scopeguard::defer_on_unwind! {
        println!("SEED: {seed:?}");
    }

    for i in 0..256 {
        scopeguard::defer_on_unwind! {
            println!("failed on iteration {i}")
        }

        let len = rng.random_range(0..64);
        let data = (0..len).map(|_| rng.random_range(0..16)).collect::<Vec<u8>>();
        let modulus = rng.random_range(1..5);
        let stop_after = rng.random_range(0..=len);

        let mut view = ArrayView::from_vec(data.clone());
        let mut visited = 0;
        let purged = view
            .purge(|remove, value| {
                *remove = *value % modulus == 0;
                visited += 1;
                if visited == stop_after {
                    STOP
                } else {
                    CONTINUE
                }
            })
            .unwrap();

        // a zero never matches the visit count, so the purge runs to the end
        let visited = if stop_after == 0 { len } else { stop_after };
        let mut expected = data[..visited]
            .iter()
            .copied()
            .filter(|value| *value % modulus != 0)
            .collect::<Vec<_>>();
        expected.extend_from_slice(&data[visited..]);

        assert_eq!(view.to_vec(), Ok(expected));
        assert_eq!(purged.finished, stop_after == 0 || stop_after == len);
    }
}
