use std::process::ExitCode;
use std::time::Duration;

use colored::*;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::mprint;
use crate::terminal::input::KeyListener;
use crate::terminal::{colors, format, print, spinner};
use sweepr_common::config::{Config, ScanConfig};
use sweepr_common::network::target::TargetSet;
use sweepr_common::success;
use sweepr_core::{OpenPortEvent, ScanEngine, ScanError, ScanSummary};

const EXIT_CANCELLED: u8 = 130;

pub async fn scan(targets: TargetSet, scan_cfg: ScanConfig, cfg: &Config) -> anyhow::Result<ExitCode> {
    let engine = ScanEngine::new(scan_cfg)?;

    print::header("sweep plan", cfg.quiet);
    print_plan(&targets, &scan_cfg, cfg);

    let cancel = CancellationToken::new();
    let signal_handle = spawn_ctrl_c_watch(cancel.clone());
    let listener = match cfg.disable_input {
        true => None,
        false => KeyListener::start(cancel.clone())?,
    };

    let mut run = engine.start_with_token(targets, cancel);
    let reporter = match cfg.quiet {
        0 => Some(spinner::start_progress_reporter(run.progress(), listener.is_some())),
        _ => None,
    };

    let mut open: Vec<OpenPortEvent> = Vec::new();
    while let Some(event) = run.next_event().await {
        print_open_port(&event, cfg);
        open.push(event);
    }

    if let Some(handle) = reporter {
        handle.abort();
    }
    spinner::clear();
    drop(listener);
    signal_handle.abort();

    match run.finish().await {
        Ok(summary) => {
            sweep_ends(&open, &summary, cfg);
            Ok(ExitCode::SUCCESS)
        }
        Err(ScanError::Cancelled { summary }) => {
            warn!(
                "Sweep stopped early after {} of {} probes",
                summary.completed,
                summary.total_probes()
            );
            sweep_ends(&open, &summary, cfg);
            Ok(ExitCode::from(EXIT_CANCELLED))
        }
        Err(e) => Err(e.into()),
    }
}

fn spawn_ctrl_c_watch(cancel: CancellationToken) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            debug!("Interrupt received");
            cancel.cancel();
        }
    })
}

fn print_plan(targets: &TargetSet, scan_cfg: &ScanConfig, cfg: &Config) {
    if cfg.quiet > 0 {
        return;
    }
    let key_width: usize = 11;
    print::aligned_line("Targets", key_width, targets.to_string().color(colors::IPV4_ADDR));
    print::aligned_line("Hosts", key_width, targets.len().to_string().color(colors::TEXT_DEFAULT));
    print::aligned_line("Ports", key_width, scan_cfg.ports.to_string().color(colors::PORT));
    print::aligned_line("Timeout", key_width, format::seconds(scan_cfg.timeout).color(colors::TEXT_DEFAULT));
    print::aligned_line(
        "Concurrency",
        key_width,
        scan_cfg.concurrency.to_string().color(colors::TEXT_DEFAULT),
    );
    mprint!();
}

fn print_open_port(event: &OpenPortEvent, cfg: &Config) {
    match cfg.quiet {
        2 => print::print(&event.to_string()),
        _ => print::print_status(format::open_port_line(event)),
    }
}

fn sweep_ends(open: &[OpenPortEvent], summary: &ScanSummary, cfg: &Config) {
    if cfg.quiet == 2 {
        return;
    }

    let hosts = format::group_by_host(open);
    if hosts.is_empty() {
        print::header("no open ports", cfg.quiet);
        if cfg.quiet == 0 {
            print::no_results();
        }
    } else if cfg.quiet == 0 {
        mprint!();
        print::header("open ports", cfg.quiet);
        for (idx, (addr, ports)) in hosts.iter().enumerate() {
            print::tree_head(idx, &addr.to_string());
            print::as_tree_one_level(format::ports_to_detail(ports));
            if idx + 1 != hosts.len() {
                mprint!();
            }
        }
    }

    print_summary(open.len() as u64, hosts.len() as u64, summary.elapsed, cfg);
}

fn print_summary(open_count: u64, host_count: u64, elapsed: Duration, cfg: &Config) {
    let open_ports: ColoredString =
        format!("{open_count} open {}", format::plural(open_count, "port", "ports")).bold().green();
    let hosts: ColoredString =
        format!("{host_count} {}", format::plural(host_count, "host", "hosts")).bold().green();
    let total_time: ColoredString = format::seconds(elapsed).bold().yellow();
    let output: ColoredString =
        format!("Sweep Complete: {open_ports} on {hosts} in {total_time}").color(colors::TEXT_DEFAULT);

    match cfg.quiet {
        0 => {
            print::fat_separator();
            print::centerln(&output.to_string());
        }
        _ => success!("{}", output),
    }
}
