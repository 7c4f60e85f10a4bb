use crate::sim::SimTime;

#[test]
fn unit_constructors_scale_to_nanos() {
    assert_eq!(SimTime::from_nanos(42), SimTime(42));
    assert_eq!(SimTime::from_micros(20), SimTime(20_000));
    assert_eq!(SimTime::from_millis(1), SimTime(1_000_000));
    assert_eq!(SimTime::from_secs(1).as_nanos(), 1_000_000_000);
}

#[test]
fn unit_constructors_saturate() {
    assert_eq!(SimTime::from_micros(u64::MAX), SimTime(u64::MAX));
    assert_eq!(SimTime::from_secs(u64::MAX), SimTime(u64::MAX));
}

#[test]
fn after_adds_and_saturates() {
    assert_eq!(SimTime(20_000).after(SimTime(50_000)), SimTime(70_000));
    assert_eq!(SimTime(u64::MAX - 1).after(SimTime(10)), SimTime(u64::MAX));
    assert!(SimTime(1) < SimTime(2));
}
