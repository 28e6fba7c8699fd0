use tempora::prelude::*;

fn init() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn ts(day: i64) -> Timestamp {
    Timestamp::from_secs(day * 86_400)
}

fn inst(value: f64, day: i64) -> TInstant<f64> {
    TInstant::new(value, ts(day))
}

#[test]
fn test_collinear_instants_are_dropped() {
    init();

    let seq = TSequence::new(
        vec![inst(1.0, 1), inst(2.0, 2), inst(3.0, 3), inst(1.0, 4)],
        true,
        true,
        Interpolation::Linear,
    )
    .unwrap();
    assert_eq!(seq.num_instants(), 3);
    assert_eq!(seq.value_at_timestamp(ts(2)).unwrap(), 2.0);
}

#[test]
fn test_stepwise_repeats_are_dropped() {
    init();

    let seq = TSequence::new(
        vec![inst(1.0, 1), inst(1.0, 2), inst(1.0, 3), inst(2.0, 4)],
        true,
        true,
        Interpolation::Stepwise,
    )
    .unwrap();
    assert_eq!(seq.num_instants(), 2);
    assert_eq!(seq.value_at_timestamp(ts(3)).unwrap(), 1.0);
    assert_eq!(seq.value_at_timestamp(ts(4)).unwrap(), 2.0);
}

#[test]
fn test_normalization_is_idempotent() {
    init();

    let inputs = [
        "[1@2000-01-01, 2@2000-01-02, 3@2000-01-03, 3@2000-01-04, 3@2000-01-05]",
        "{[1@2000-01-01, 2@2000-01-02), [2@2000-01-02, 3@2000-01-03]}",
        "Interp=Stepwise;[1@2000-01-01, 1@2000-01-02, 2@2000-01-03]",
    ];
    for input in inputs {
        let temp: Temporal<f64> = input.parse().unwrap();
        let set = temp.to_sequence_set();
        assert_eq!(set.normalize(), set, "normalizing twice changed {}", input);
    }
}

#[test]
fn test_adjacent_sequences_are_joined() {
    init();

    let temp: Temporal<f64> = "{[1@2000-01-01, 2@2000-01-02), [2@2000-01-02, 3@2000-01-03]}".parse().unwrap();
    match temp {
        Temporal::SequenceSet(set) => {
            assert_eq!(set.num_sequences(), 1);
            assert_eq!(set.num_instants(), 2);
        }
        other => panic!("expected a sequence set, got {:?}", other.subtype()),
    }
}

#[test]
fn test_make_without_normalization_keeps_instants() {
    init();

    let seq = TSequence::make(
        vec![inst(1.0, 1), inst(2.0, 2), inst(3.0, 3)],
        true,
        true,
        Interpolation::Linear,
        false,
    )
    .unwrap();
    assert_eq!(seq.num_instants(), 3);
}

#[test]
fn test_builder_matches_constructor() {
    init();

    let mut builder = SequenceBuilder::new(Interpolation::Linear).unwrap();
    for (value, day) in [(1.0, 1), (2.0, 2), (3.0, 3), (0.0, 4)] {
        builder.push(inst(value, day)).unwrap();
    }
    let built = builder.finish(true).unwrap();

    let direct = TSequence::new(
        vec![inst(1.0, 1), inst(2.0, 2), inst(3.0, 3), inst(0.0, 4)],
        true,
        true,
        Interpolation::Linear,
    )
    .unwrap();
    assert_eq!(built, direct);
}
