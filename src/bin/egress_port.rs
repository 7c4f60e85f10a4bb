//! 出口端口仿真
//!
//! 运行一个多队列出口缓冲场景：按 class/flow 分类入队、轮询出队、外部 pause 时间窗

use clap::Parser;
use egress_sim::scenario::{self, RunSummary, ScenarioError, ScenarioSpec};
use egress_sim::sim::{SimTime, Simulator};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(
    name = "egress-port",
    about = "出口端口多队列缓冲仿真：准入控制、轮询调度与 pause"
)]
struct Args {
    /// 场景文件（JSON）；缺省时使用内置的三类流量示例
    #[arg(long)]
    scenario: Option<PathBuf>,

    /// 覆盖所有子队列的包数上限（按包数限额）
    #[arg(long)]
    queue_pkts: Option<u64>,

    /// 覆盖所有子队列的字节上限（按字节限额）
    #[arg(long)]
    queue_bytes: Option<u64>,

    /// 仿真运行到多少毫秒；缺省时运行到事件耗尽
    #[arg(long)]
    until_ms: Option<u64>,

    /// 输出可视化事件 JSON
    #[arg(long)]
    viz_json: Option<PathBuf>,

    /// 输出运行汇总 JSON
    #[arg(long)]
    summary_json: Option<PathBuf>,
}

fn main() -> ExitCode {
    // 初始化 tracing（输出到 stderr，stdout 留给汇总）
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .with_file(true)
        .with_line_number(true)
        .with_target(true)
        .init();

    let args = Args::parse();
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<(), ScenarioError> {
    let mut spec = match &args.scenario {
        Some(path) => scenario::load(path)?,
        None => ScenarioSpec::demo(),
    };
    if let Some(pkts) = args.queue_pkts {
        spec.override_queue_pkts(pkts);
    }
    if let Some(bytes) = args.queue_bytes {
        spec.override_queue_bytes(bytes);
    }

    let mut sim = Simulator::default();
    let mut world = spec.install(&mut sim)?;
    let viz = args.viz_json.as_ref().map(|_| world.port.enable_viz());

    match args.until_ms {
        Some(ms) => sim.run_until(SimTime::from_millis(ms), &mut world),
        None => sim.run(&mut world),
    }

    let summary = RunSummary::collect(&world, &sim);
    for q in &summary.queues {
        println!(
            "queue={} enq_pkts={} deq_pkts={} drop_pkts={} removed_pkts={} left_pkts={} left_bytes={}",
            q.index,
            q.stats.enqueued_pkts,
            q.stats.dequeued_pkts,
            q.stats.dropped_pkts,
            q.stats.removed_pkts,
            q.pkts,
            q.bytes
        );
    }
    println!(
        "done @ {:?}, arrived_pkts={}, transmitted_pkts={}, transmitted_bytes={}",
        sim.now(),
        summary.port.arrived_pkts,
        summary.port.transmitted_pkts,
        summary.port.transmitted_bytes
    );

    if let (Some(path), Some(v)) = (&args.viz_json, &viz) {
        let json = serde_json::to_string_pretty(&v.borrow().events)?;
        write_output(path, &json)?;
        eprintln!("wrote viz events to {}", path.display());
    }
    if let Some(path) = &args.summary_json {
        let json = serde_json::to_string_pretty(&summary)?;
        write_output(path, &json)?;
        eprintln!("wrote summary to {}", path.display());
    }

    match world.fault() {
        Some(e) => Err(e.clone().into()),
        None => Ok(()),
    }
}

fn write_output(path: &Path, contents: &str) -> Result<(), ScenarioError> {
    fs::write(path, contents).map_err(|source| ScenarioError::Write {
        path: path.to_path_buf(),
        source,
    })
}
