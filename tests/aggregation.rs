use std::thread;
use tempora::agg::{self, Aggregator, TMax, TMin, TSum};
use tempora::prelude::*;

fn init() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn day(d: u32, hour: u32) -> Timestamp {
    Timestamp::parse(&format!("2000-01-{:02} {:02}:00:00", d, hour)).unwrap()
}

fn inputs() -> Vec<Temporal<i32>> {
    [
        "[1@2000-01-01, 1@2000-01-04]",
        "[2@2000-01-02, 5@2000-01-03, 5@2000-01-06]",
        "{[10@2000-01-05, 10@2000-01-08]}",
    ]
    .iter()
    .map(|text| text.parse().unwrap())
    .collect()
}

fn sample<V: tempora::BaseValue>(temp: &Temporal<V>) -> Vec<Option<V>> {
    (1..=8)
        .flat_map(|d| [day(d, 0), day(d, 12)])
        .map(|t| temp.value_at_timestamp(t).ok())
        .collect()
}

#[test]
fn test_sum_is_order_independent() {
    init();

    let config = Config::default();
    let values = inputs();
    let expected = sample(&agg::tsum(&values, &config).unwrap().unwrap());

    for order in [[0, 1, 2], [2, 1, 0], [1, 0, 2], [2, 0, 1]] {
        let reordered: Vec<_> = order.iter().map(|&i| values[i].clone()).collect();
        let sum = agg::tsum(&reordered, &config).unwrap().unwrap();
        assert_eq!(sample(&sum), expected, "order {:?}", order);
    }

    let sum = agg::tsum(&values, &config).unwrap().unwrap();
    assert_eq!(sum.value_at_timestamp(day(1, 12)).unwrap(), 1);
    assert_eq!(sum.value_at_timestamp(day(2, 12)).unwrap(), 3);
    assert_eq!(sum.value_at_timestamp(day(4, 0)).unwrap(), 6);
    assert_eq!(sum.value_at_timestamp(day(5, 12)).unwrap(), 15);
    assert_eq!(sum.value_at_timestamp(day(7, 0)).unwrap(), 10);
    assert!(sum.value_at_timestamp(day(9, 0)).is_err());
}

#[test]
fn test_min_and_max_bracket_every_input() {
    init();

    let config = Config::default();
    let values = inputs();
    let min = agg::tmin(&values, &config).unwrap().unwrap();
    let max = agg::tmax(&values, &config).unwrap().unwrap();

    for d in 1..=8 {
        let t = day(d, 12);
        let defined: Vec<i32> = values.iter().filter_map(|v| v.value_at_timestamp(t).ok()).collect();
        if defined.is_empty() {
            continue;
        }
        assert_eq!(min.value_at_timestamp(t).unwrap(), *defined.iter().min().unwrap());
        assert_eq!(max.value_at_timestamp(t).unwrap(), *defined.iter().max().unwrap());
    }
}

#[test]
fn test_partial_states_combine_like_one_fold() {
    init();

    let config = Config::default().with_seed(7);
    let values = inputs();

    let mut left = Aggregator::new(TSum, &config).unwrap();
    left.transition(&values[0]).unwrap();
    left.transition(&values[2]).unwrap();
    let mut right = Aggregator::new(TSum, &config).unwrap();
    right.transition(&values[1]).unwrap();
    left.combine(right).unwrap();

    let combined = left.finalize().unwrap().unwrap();
    let folded = agg::tsum(&values, &config).unwrap().unwrap();
    assert_eq!(sample(&combined), sample(&folded));
}

#[test]
fn test_parallel_partial_aggregation() {
    init();

    let config = Config::default();
    let values: Vec<Temporal<f64>> = (0..8)
        .map(|i| {
            format!("[{}@2000-01-01, {}@2000-01-05]", i, 8 - i)
                .parse()
                .unwrap()
        })
        .collect();

    let handles: Vec<_> = values
        .chunks(2)
        .map(|chunk| {
            let chunk = chunk.to_vec();
            let config = config.clone();
            thread::spawn(move || {
                let mut agg = Aggregator::new(TMax, &config).unwrap();
                for temp in &chunk {
                    agg.transition(temp).unwrap();
                }
                agg
            })
        })
        .collect();

    let mut total = Aggregator::new(TMax, &config).unwrap();
    for handle in handles {
        total.combine(handle.join().unwrap()).unwrap();
    }
    let max = total.finalize().unwrap().unwrap();
    let folded = agg::tmax(&values, &config).unwrap().unwrap();

    for d in 1..=5 {
        let t = day(d, 0);
        let (a, b) = (max.value_at_timestamp(t).unwrap(), folded.value_at_timestamp(t).unwrap());
        assert!((a - b).abs() < 1e-6, "{} != {} at {}", a, b, t);
    }
    assert_eq!(max.value_at_timestamp(day(1, 0)).unwrap(), 7.0);
    assert_eq!(max.value_at_timestamp(day(5, 0)).unwrap(), 8.0);
}

#[test]
fn test_linear_min_switches_at_crossing() {
    init();

    let config = Config::default();
    let values: Vec<Temporal<f64>> = vec![
        "[0@2000-01-01 00:00:00, 10@2000-01-01 00:00:10]".parse().unwrap(),
        "[10@2000-01-01 00:00:00, 0@2000-01-01 00:00:10]".parse().unwrap(),
    ];
    let min = agg::aggregate(TMin, &values, &config).unwrap().unwrap();
    let crossing = Timestamp::parse("2000-01-01 00:00:05").unwrap();
    assert!(min.timestamps().contains(&crossing));
    assert_eq!(min.value_at_timestamp(crossing).unwrap(), 5.0);
    assert_eq!(min.max_value(), 5.0);
}

#[test]
fn test_counts_and_averages_of_instants() {
    init();

    let config = Config::default();
    let values: Vec<Temporal<f64>> = vec![
        "{1@2000-01-01, 3@2000-01-02}".parse().unwrap(),
        "{5@2000-01-02, 7@2000-01-03}".parse().unwrap(),
    ];

    let count = agg::tcount(&values, &config).unwrap().unwrap();
    let counts: Vec<i32> = count.instants().iter().map(|inst| *inst.value()).collect();
    assert_eq!(counts, vec![1, 2, 1]);

    let avg = agg::tavg(&values, &config).unwrap().unwrap();
    let averages: Vec<f64> = avg.instants().iter().map(|inst| *inst.value()).collect();
    assert_eq!(averages, vec![1.0, 4.0, 7.0]);
}

#[test]
fn test_empty_input_has_no_result() {
    init();

    let config = Config::default();
    assert!(agg::tsum::<i32>(&[], &config).unwrap().is_none());
    assert!(agg::extent::<f64, _>(Vec::<&Temporal<f64>>::new()).is_none());
}

#[test]
fn test_invalid_config_is_rejected() {
    init();

    let mut config = Config::default();
    config.aggregation.max_level = 0;
    assert!(matches!(
        Aggregator::<i32, TSum>::new(TSum, &config),
        Err(TemporaError::Config(_))
    ));
}

#[test]
fn test_integer_sum_overflow_fails() {
    init();

    let config = Config::default();
    let values: Vec<Temporal<i32>> = vec![
        "[2147483647@2000-01-01, 2147483647@2000-01-03]".parse().unwrap(),
        "[1@2000-01-02, 1@2000-01-04]".parse().unwrap(),
    ];
    assert!(matches!(agg::tsum(&values, &config), Err(TemporaError::OutOfRange(_))));

    let apart: Vec<Temporal<i32>> = vec![
        "[2147483647@2000-01-01, 2147483647@2000-01-02]".parse().unwrap(),
        "[1@2000-01-03, 1@2000-01-04]".parse().unwrap(),
    ];
    assert!(agg::tsum(&apart, &config).unwrap().is_some());
}
