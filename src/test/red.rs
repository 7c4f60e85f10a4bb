use crate::net::Packet;
use crate::queue::{DropTailQueue, EgressError, PacketQueue, RedParams, RedQueue};

fn pkt(id: u64, size_bytes: u32) -> Packet {
    Packet::new(id, 0, size_bytes)
}

fn red(min_th_bytes: u64, max_th_bytes: u64, max_p: f64, weight: f64, seed: u64) -> RedQueue {
    RedQueue::new(
        DropTailQueue::bytes_limited(1_000_000),
        RedParams {
            min_th_bytes,
            max_th_bytes,
            max_p,
            weight,
            seed,
        },
    )
    .expect("valid red params")
}

#[test]
fn red_admits_everything_below_min_threshold() {
    let mut q = red(10_000, 20_000, 1.0, 1.0, 7);
    for id in 0..5 {
        assert!(q.enqueue(pkt(id, 1_000)).is_ok());
    }
    assert_eq!(q.len(), 5);
    assert_eq!(q.bytes(), 5_000);
}

#[test]
fn red_drops_once_average_reaches_max_threshold() {
    let mut q = red(1_000, 2_000, 0.1, 1.0, 7);
    // avg = 0 at first arrival
    assert!(q.enqueue(pkt(1, 3_000)).is_ok());
    // avg = 3000 >= max_th
    let dropped = q.enqueue(pkt(2, 10)).expect_err("should drop");
    assert_eq!(dropped.id, 2);
    assert_eq!(q.len(), 1);
    assert_eq!(q.bytes(), 3_000);
}

#[test]
fn red_average_follows_ewma() {
    let mut q = red(100_000, 200_000, 0.1, 0.5, 1);
    assert!(q.enqueue(pkt(1, 1_000)).is_ok());
    assert_eq!(q.avg_bytes(), 0.0);
    assert!(q.enqueue(pkt(2, 1_000)).is_ok());
    assert_eq!(q.avg_bytes(), 500.0);
}

#[test]
fn red_verdicts_are_reproducible_for_the_same_seed() {
    let run = |seed: u64| {
        let mut q = red(0, 100_000, 0.5, 1.0, seed);
        (0..50)
            .map(|id| q.enqueue(pkt(id, 1_000)).is_ok())
            .collect::<Vec<_>>()
    };
    let a = run(42);
    let b = run(42);
    assert_eq!(a, b);
    // avg 为 0 时丢包概率为 0
    assert!(a[0]);
}

#[test]
fn red_keeps_inner_drop_tail_ceiling() {
    let mut q = RedQueue::new(
        DropTailQueue::packets_limited(1),
        RedParams {
            min_th_bytes: 1_000_000,
            max_th_bytes: 2_000_000,
            max_p: 0.1,
            weight: 0.002,
            seed: 0,
        },
    )
    .expect("valid red params");
    assert!(q.enqueue(pkt(1, 100)).is_ok());
    assert!(q.enqueue(pkt(2, 100)).is_err());
    assert_eq!(q.peek().expect("head").id, 1);
    assert_eq!(q.remove().expect("head").id, 1);
    assert!(q.dequeue().is_none());
}

#[test]
fn red_rejects_unusable_parameters() {
    let params = RedParams {
        min_th_bytes: 1_000,
        max_th_bytes: 2_000,
        max_p: f64::NAN,
        weight: 0.002,
        seed: 0,
    };
    let err = RedQueue::new(DropTailQueue::default(), params).expect_err("nan max_p");
    assert_eq!(
        err,
        EgressError::InvalidRedParams {
            reason: "red max_p must be in (0, 1]"
        }
    );

    let flipped = RedParams {
        min_th_bytes: 2_000,
        max_th_bytes: 1_000,
        max_p: 0.1,
        ..params
    };
    assert!(RedQueue::new(DropTailQueue::default(), flipped).is_err());

    let no_weight = RedParams {
        max_p: 0.1,
        weight: 0.0,
        ..params
    };
    assert!(no_weight.validate().is_err());
}
