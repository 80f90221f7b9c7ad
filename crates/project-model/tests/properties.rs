use proptest::prelude::*;

use quadcam_project_model::{
    nearest, FeedPose, LayoutConfig, Scalar, SyncOffsets, TelemetrySample, TelemetrySeries,
};

fn sorted_samples() -> impl Strategy<Value = Vec<TelemetrySample>> {
    prop::collection::vec(-1_000i32..1_000, 1..64).prop_map(|mut ticks| {
        ticks.sort();
        ticks
            .into_iter()
            .enumerate()
            .map(|(i, tick)| TelemetrySample {
                speed: Some(Scalar::Number(i as f64)),
                ..TelemetrySample::at(tick as f64 * 0.25)
            })
            .collect()
    })
}

fn pose() -> impl Strategy<Value = FeedPose> {
    (
        0.1f64..3.0,
        prop::array::uniform3(-50.0f64..50.0),
        prop::array::uniform3(-7.0f64..7.0),
    )
        .prop_map(|(scale, position, rotation)| FeedPose::new(scale, position, rotation))
}

fn layout() -> impl Strategy<Value = LayoutConfig> {
    (
        pose(),
        pose(),
        pose(),
        pose(),
        prop::array::uniform4(-10.0f64..10.0),
    )
        .prop_map(|(front, back, left, right, o)| LayoutConfig {
            front,
            back,
            left,
            right,
            sync_offsets: SyncOffsets {
                front: o[0],
                back: o[1],
                left: o[2],
                right: o[3],
            },
        })
}

proptest! {
    #[test]
    fn test_nearest_is_minimal_and_left_biased(samples in sorted_samples(), target in -300.0f64..300.0) {
        let hit = nearest(&samples, target).unwrap();
        let hit_index = samples.iter().position(|s| std::ptr::eq(s, hit)).unwrap();
        let best = (hit.timestamp - target).abs();

        for (i, other) in samples.iter().enumerate() {
            let d = (other.timestamp - target).abs();
            prop_assert!(best <= d);
            if d == best {
                prop_assert!(hit_index <= i);
            }
        }
    }

    #[test]
    fn test_series_lookup_matches_slice_lookup(samples in sorted_samples(), t in 0.0f64..100.0, front in -10.0f64..10.0) {
        let series = TelemetrySeries::new(samples.clone());
        let target = samples[0].timestamp + t + front;
        let offsets = SyncOffsets { front, ..SyncOffsets::default() };
        prop_assert_eq!(series.sample_at(t, &offsets), nearest(&samples, target));
    }

    #[test]
    fn test_layout_roundtrips_through_wire_json(layout in layout()) {
        let json = serde_json::to_string(&layout.to_value().unwrap()).unwrap();
        let parsed = LayoutConfig::from_value(serde_json::from_str(&json).unwrap()).unwrap();
        prop_assert_eq!(parsed, layout);
    }
}

#[test]
fn test_empty_slice_has_no_nearest_sample() {
    for target in [-1.0, 0.0, 1e9] {
        assert!(nearest(&[], target).is_none());
    }
}
