use crate::queue::{EgressError, QueueMode};
use crate::scenario::{PauseWindow, RunSummary, ScenarioError, ScenarioSpec};
use crate::sim::Simulator;
use crate::viz::VizEventKind;

fn parse(json: &str) -> ScenarioSpec {
    serde_json::from_str(json).expect("parse scenario")
}

fn run(spec: &ScenarioSpec) -> RunSummary {
    let mut sim = Simulator::default();
    let mut world = spec.install(&mut sim).expect("install");
    sim.run(&mut world);
    RunSummary::collect(&world, &sim)
}

#[test]
fn json_scenario_runs_to_completion() {
    let spec = parse(
        r#"{
            "egress": { "kind": "nic", "queue_count": 2 },
            "link_gbps": 1,
            "classifier": "flow_id",
            "flows": [
                { "flow_id": 0, "pkts": 4, "pkt_bytes": 1000 },
                { "flow_id": 1, "pkts": 4, "pkt_bytes": 1000, "start_ns": 500 }
            ]
        }"#,
    );
    assert_eq!(spec.flows[0].gap_ns, 0);

    let summary = run(&spec);
    assert!(summary.fault.is_none());
    assert_eq!(summary.port.arrived_pkts, 8);
    assert_eq!(summary.port.transmitted_pkts, 8);
    assert_eq!(summary.total_bytes, 0);
    // 1G 下 1000B 需要 8us，8 个包串行发送
    assert_eq!(summary.now_ns, 64_000);
    for q in &summary.queues {
        assert_eq!(q.stats.dequeued_pkts, 4);
        assert_eq!(q.pkts, 0);
    }
}

#[test]
fn demo_conserves_packets() {
    let summary = run(&ScenarioSpec::demo());
    assert!(summary.fault.is_none());
    assert_eq!(summary.port.arrived_pkts, 600);

    let dropped: u64 = summary.queues.iter().map(|q| q.stats.dropped_pkts).sum();
    assert!(dropped > 0, "demo offers more than line rate");
    assert_eq!(summary.port.transmitted_pkts + dropped, summary.port.arrived_pkts);
    assert_eq!(summary.total_bytes, 0);

    let paused_class = &summary.queues[1].stats;
    assert_eq!(paused_class.dequeued_pkts + paused_class.dropped_pkts, 200);
}

#[test]
fn pause_outside_queue_range_is_rejected() {
    let spec = parse(
        r#"{
            "egress": { "queue_count": 2 },
            "pauses": [ { "queue": 2, "at_ns": 0 } ]
        }"#,
    );
    assert!(matches!(
        spec.validate(),
        Err(ScenarioError::Egress(EgressError::QueueIndexOutOfRange { index: 2, count: 2 }))
    ));
}

#[test]
fn zero_link_rate_is_rejected() {
    let mut spec = ScenarioSpec::demo();
    spec.link_gbps = 0;
    assert!(matches!(spec.validate(), Err(ScenarioError::Invalid(_))));
}

#[test]
fn oversized_switch_fails_install() {
    let spec = parse(r#"{ "egress": { "kind": "switch", "queue_count": 9 } }"#);
    let mut sim = Simulator::default();
    let err = spec.install(&mut sim).expect_err("too many queues");
    assert!(err.to_string().contains("exceeds the limit of 8"), "{err}");
    assert_eq!(sim.pending(), 0);
}

#[test]
fn limit_overrides_touch_every_queue_config() {
    let mut spec = parse(
        r#"{
            "egress": {
                "queue_count": 2,
                "overrides": [ { "index": 1, "mode": "packets", "max_pkts": 3 } ]
            }
        }"#,
    );
    spec.override_queue_bytes(4_500);
    for i in 0..2 {
        let cfg = spec.egress.queue_config(i);
        assert_eq!(cfg.mode, QueueMode::Bytes);
        assert_eq!(cfg.max_bytes, 4_500);
    }

    spec.override_queue_pkts(7);
    assert_eq!(spec.egress.queue_config(1).mode, QueueMode::Packets);
    assert_eq!(spec.egress.queue_config(0).max_pkts, 7);
}

#[test]
fn open_ended_pause_holds_queue_until_the_end() {
    let spec = parse(
        r#"{
            "egress": { "queue_count": 2 },
            "flows": [
                { "flow_id": 1, "class": 0, "pkts": 2 },
                { "flow_id": 2, "class": 1, "pkts": 2 }
            ],
            "pauses": [ { "queue": 1, "at_ns": 0 } ]
        }"#,
    );
    let summary = run(&spec);
    assert_eq!(summary.port.transmitted_pkts, 2);
    assert_eq!(summary.queues[1].pkts, 2);
    assert_eq!(summary.queues[1].bytes, 3_000);
    assert_eq!(summary.total_bytes, 3_000);
}

#[test]
fn overlapping_pause_windows_are_merged_per_queue() {
    let spec = parse(
        r#"{
            "egress": { "queue_count": 3 },
            "pauses": [
                { "queue": 1, "at_ns": 50000, "duration_ns": 950000 },
                { "queue": 1, "at_ns": 0, "duration_ns": 100000 },
                { "queue": 1, "at_ns": 2000000, "duration_ns": 10 },
                { "queue": 2, "at_ns": 0, "duration_ns": 10 },
                { "queue": 2, "at_ns": 10 }
            ]
        }"#,
    );
    assert_eq!(
        spec.pause_windows(),
        vec![
            PauseWindow {
                queue: 1,
                start_ns: 0,
                end_ns: Some(1_000_000)
            },
            PauseWindow {
                queue: 1,
                start_ns: 2_000_000,
                end_ns: Some(2_000_010)
            },
            // 首尾相接且后者不恢复
            PauseWindow {
                queue: 2,
                start_ns: 0,
                end_ns: None
            },
        ]
    );
}

#[test]
fn earlier_resume_does_not_cut_a_later_overlapping_pause() {
    let spec = parse(
        r#"{
            "egress": { "queue_count": 2 },
            "flows": [ { "flow_id": 7, "class": 1, "pkts": 1, "start_ns": 60000 } ],
            "pauses": [
                { "queue": 1, "at_ns": 0, "duration_ns": 100000 },
                { "queue": 1, "at_ns": 50000, "duration_ns": 950000 }
            ]
        }"#,
    );
    let mut sim = Simulator::default();
    let mut world = spec.install(&mut sim).expect("install");
    world.port.enable_viz();
    sim.run(&mut world);

    let viz = world.port.viz().expect("viz").borrow();
    let first_tx = viz.events.iter().find_map(|e| match e.kind {
        VizEventKind::TxStart { .. } => Some(e.t_ns),
        _ => None,
    });
    assert_eq!(first_tx, Some(1_000_000));
    assert_eq!(world.port.stats.transmitted_pkts, 1);
}
