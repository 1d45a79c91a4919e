#[cfg(test)]
mod telemetry_tests {
    use std::time::Duration;

    use codec_stream_core::prelude::*;
    use codec_stream_core::telemetry::{Stage, StageTimes, TelemetryCounters};

    fn make_counters() -> TelemetryCounters {
        TelemetryCounters {
            requests_submitted: 4,
            requests_executed: 4,
            requests_delivered: 3,
            deliveries_dropped: 0,
            errors: 1,
            bytes_in: 200,
            bytes_out: 50,
            dispatch_loops: 2,
            peak_dispatch_concurrency: 1,
        }
    }

    #[test]
    fn counters_merge_and_add_assign() {
        let mut a = make_counters();
        a += make_counters();
        assert_eq!(a.requests_submitted, 8);
        assert_eq!(a.bytes_out, 100);
        assert_eq!(a.in_flight(), 2);
        assert_eq!(a.peak_dispatch_concurrency, 1);
    }

    #[test]
    fn stage_times_accumulate() {
        let mut times = StageTimes::default();
        times.add(Stage::Write, Duration::from_millis(2));
        times.add(Stage::Write, Duration::from_millis(3));
        times.add(Stage::Deliver, Duration::from_millis(1));

        assert_eq!(times.get(Stage::Write), Duration::from_millis(5));
        assert_eq!(times.get(Stage::Finish), Duration::ZERO);
        assert_eq!(times.total(), Duration::from_millis(6));
        assert!(times.has_all(&[Stage::Write, Stage::Deliver]));
        assert!(!times.has_all(&[Stage::Destroy]));
        assert_eq!(Stage::Finish.to_string(), "finish");

        assert!((times.get_ms(Stage::Write) - 5.0).abs() < 1e-6);
        assert!((times.get_us(Stage::Deliver) - 1_000.0).abs() < 1e-6);
        let mut seen: Vec<Stage> = times.iter().map(|(stage, _)| *stage).collect();
        seen.sort_by_key(|stage| stage.to_string());
        assert_eq!(seen, vec![Stage::Deliver, Stage::Write]);
    }

    #[test]
    fn snapshot_ratio_and_throughput() {
        let snap = TelemetrySnapshot::new(
            7,
            "deflate",
            StreamState::Data,
            make_counters(),
            StageTimes::default(),
            Duration::from_secs(2),
        );
        assert!((snap.ratio - 0.25).abs() < f64::EPSILON);
        assert!((snap.throughput_in_bytes_per_sec - 100.0).abs() < f64::EPSILON);
        assert_eq!(snap.total_stage_time(), Duration::ZERO);
    }

    #[test]
    fn snapshot_without_input_has_zero_ratio() {
        let snap = TelemetrySnapshot::new(
            1,
            "identity",
            StreamState::Idle,
            TelemetryCounters::default(),
            StageTimes::default(),
            Duration::ZERO,
        );
        assert_eq!(snap.ratio, 0.0);
        assert_eq!(snap.throughput_in_bytes_per_sec, 0.0);
    }

    #[test]
    fn stream_snapshot_tracks_requests() {
        let d = Dispatcher::new(DispatcherConfig::single_threaded()).unwrap();
        let s = d.open_stream(StreamConfig::default()).unwrap();

        s.write(&b"abcd"[..], |_, _| {}).unwrap();
        s.write(&b"ef"[..], |_, _| {}).unwrap();
        s.close(|_, _| {}).unwrap();
        d.run_until_idle();

        let snap = s.telemetry();
        assert_eq!(snap.codec, "identity");
        assert_eq!(snap.state, StreamState::Destroyed);
        assert_eq!(snap.counters.requests_submitted, 3);
        assert_eq!(snap.counters.requests_executed, 3);
        assert_eq!(snap.counters.requests_delivered, 3);
        assert_eq!(snap.counters.bytes_in, 6);
        assert_eq!(snap.counters.bytes_out, 6);
        assert_eq!(snap.counters.errors, 0);
        assert!(snap.stage_times.has_all(&[Stage::Write, Stage::Finish, Stage::Deliver]));
        assert!(snap.total_stage_time() <= snap.elapsed);

        let json = snap.to_json().unwrap();
        assert!(json.contains("\"codec\":\"identity\""));
        assert!(json.contains("\"state\":\"Destroyed\""));
    }
}
