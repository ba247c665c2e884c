use super::*;

#[test]
fn seeded_rng_is_reproducible() {
    let a: Vec<u32> = (0..4).map(|_| seeded_rng(7).next_u32()).collect();
    assert!(a.windows(2).all(|w| w[0] == w[1]));

    let mut x = seeded_rng(7);
    let mut y = seeded_rng(7);
    for _ in 0..16 {
        assert_eq!(x.next_u64(), y.next_u64());
    }
}

#[test]
fn batch_streams_differ() {
    let mut a = rng_for(1, 0);
    let mut b = rng_for(1, 1);
    let va: Vec<u64> = (0..4).map(|_| a.next_u64()).collect();
    let vb: Vec<u64> = (0..4).map(|_| b.next_u64()).collect();
    assert_ne!(va, vb);
}

#[test]
fn counting_rng_counts_calls() {
    let mut rng = CountingRng::new(seeded_rng(3));
    assert_eq!(rng.draws(), 0);
    let _ = rng.random_range(0..10u32);
    let _ = coin(&mut rng);
    assert!(rng.draws() >= 2);
}
