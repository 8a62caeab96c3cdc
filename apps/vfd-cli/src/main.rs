use anyhow::Result;
use clap::{ArgAction, Parser, Subcommand};
use std::thread;
use std::time::Duration;
use tracing::{info, warn};

use register_transport::MockTransport;
use vfd_controller as vfd;
use vfd_controller::Telemetry;

#[derive(Parser, Debug)]
#[command(
    name = "vfd",
    version,
    about = "Variable-frequency drive register tool",
    disable_help_subcommand = true
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Validate a device descriptor file or a directory of descriptors
    DeviceValidate {
        #[arg(long)]
        file: Option<String>,
        #[arg(long)]
        dir: Option<String>,
        /// Print the resolved descriptors as JSON
        #[arg(long, action = ArgAction::SetTrue)]
        json: bool,
        /// Print Prometheus metrics after loading
        #[arg(long, action = ArgAction::SetTrue)]
        metrics: bool,
    },
    /// List descriptors in a directory
    DeviceList {
        #[arg(long, default_value = "configs/devices")]
        dir: String,
        /// Print Prometheus metrics after loading
        #[arg(long, action = ArgAction::SetTrue)]
        metrics: bool,
    },
    /// Poll a simulated drive and print JSON snapshots
    Poll {
        /// Descriptor file (defaults to the Delixi map on slave 1)
        #[arg(long)]
        file: Option<String>,
        /// Number of polls
        #[arg(long, default_value_t = 1u32)]
        count: u32,
        /// Delay between polls in milliseconds
        #[arg(long, default_value_t = 1000u64)]
        interval_ms: u64,
        /// Raw monitoring registers the simulated drive reports
        #[arg(long, value_delimiter = ' ', default_values_t = vec![1500u16, 1200, 250, 380, 5400])]
        monitor: Vec<u16>,
        /// Raw status register value
        #[arg(long, default_value_t = 1u16)]
        status: u16,
        /// Raw issue register value
        #[arg(long, default_value_t = 0u16)]
        issue: u16,
        /// Print Prometheus metrics after polling
        #[arg(long, action = ArgAction::SetTrue)]
        metrics: bool,
    },
    /// Write a frequency set-point (percent) to a simulated drive
    SetFreq {
        #[arg(long)]
        file: Option<String>,
        /// Set-point in percent of maximum frequency (0.00 to 100.00)
        #[arg(long)]
        percent: f32,
    },
    /// Print the status and issue code tables
    Codes,
}

fn main() -> Result<()> {
    setup_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::DeviceValidate {
            file,
            dir,
            json,
            metrics,
        } => device_validate(file.as_deref(), dir.as_deref(), json, metrics),
        Commands::DeviceList { dir, metrics } => device_list(&dir, metrics),
        Commands::Poll {
            file,
            count,
            interval_ms,
            monitor,
            status,
            issue,
            metrics,
        } => poll(
            file.as_deref(),
            count,
            interval_ms,
            &monitor,
            status,
            issue,
            metrics,
        ),
        Commands::SetFreq { file, percent } => set_freq(file.as_deref(), percent),
        Commands::Codes => codes(),
    }
}

fn setup_tracing() {
    // Best-effort; avoid panics if already set
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}

fn device_validate(
    file: Option<&str>,
    dir: Option<&str>,
    json: bool,
    print_metrics: bool,
) -> Result<()> {
    let reg = match (file, dir) {
        (Some(f), None) => {
            let desc = vfd::load_descriptor_file(f)?;
            println!(
                "ok: {} (model={}, slave={})",
                desc.id,
                desc.model.as_str(),
                desc.slave
            );
            if json {
                println!("{}", serde_json::to_string_pretty(&desc)?);
            }
            let mut reg = vfd::DeviceRegistry::default();
            reg.insert(desc);
            reg
        }
        (None, Some(d)) => {
            let reg = vfd::load_descriptors_dir(d)?;
            println!("ok: loaded {} devices", reg.len());
            if json {
                println!("{}", serde_json::to_string_pretty(&reg.devices)?);
            }
            reg
        }
        _ => {
            return Err(anyhow::anyhow!("provide --file <path> or --dir <dir>"));
        }
    };
    if print_metrics {
        print_loaded_metrics(&reg)?;
    }
    Ok(())
}

fn print_loaded_metrics(reg: &vfd::DeviceRegistry) -> Result<()> {
    let hub = vfd::MetricsHub::new()?;
    reg.record_loaded(&hub.dev);
    print!("{}", hub.encode_text());
    Ok(())
}

fn device_list(dir: &str, print_metrics: bool) -> Result<()> {
    let reg = vfd::load_descriptors_dir(dir)?;
    let mut ids: Vec<&String> = reg.devices.keys().collect();
    ids.sort();
    for id in ids {
        if let Some(d) = reg.get(id) {
            let map = d.register_map();
            println!(
                "{id}\tmodel={}\tslave={}\tmonitoring=0x{:04X}+{}",
                d.model.as_str(),
                d.slave,
                map.monitoring_address,
                map.monitoring_len
            );
        }
    }
    if print_metrics {
        print_loaded_metrics(&reg)?;
    }
    Ok(())
}

fn resolve_descriptor(file: Option<&str>) -> Result<vfd::DeviceDescriptor> {
    match file {
        Some(f) => vfd::load_descriptor_file(f),
        None => Ok(vfd::DeviceDescriptor {
            id: "default".to_string(),
            model: vfd::VfdModel::Delixi,
            slave: 1,
            registers: None,
        }),
    }
}

fn poll(
    file: Option<&str>,
    count: u32,
    interval_ms: u64,
    monitor: &[u16],
    status: u16,
    issue: u16,
    print_metrics: bool,
) -> Result<()> {
    let desc = resolve_descriptor(file)?;
    let map = desc.register_map();

    let mut drive = MockTransport::new();
    drive.set_registers(map.monitoring_address, monitor);
    drive.set_register(map.status_address, status);
    drive.set_register(map.issue_address, issue);

    let mut reg = vfd::DeviceRegistry::default();
    reg.insert(desc.clone());
    let hub = vfd::MetricsHub::new()?;
    reg.record_loaded(&hub.dev);
    let mut ctl = vfd::VfdController::new(desc.slave, drive, map)?.with_metrics(hub.dev.clone());

    for i in 0..count {
        if i > 0 {
            thread::sleep(Duration::from_millis(interval_ms));
        }
        match ctl.update() {
            Ok(()) => {
                let snap = vfd::Snapshot::from(ctl.state());
                println!("{}", serde_json::to_string(&snap)?);
            }
            Err(e) => {
                // State is stale; report and keep polling
                warn!(device = %desc.id, error = %e, "poll failed");
                eprintln!("poll {}: {e}", i + 1);
            }
        }
    }
    info!(
        device = %desc.id,
        status = ctl.status_string(),
        issue = ctl.issue_string(),
        "polling done"
    );
    if print_metrics {
        print!("{}", hub.encode_text());
    }
    Ok(())
}

fn set_freq(file: Option<&str>, percent: f32) -> Result<()> {
    let desc = resolve_descriptor(file)?;
    let map = desc.register_map();
    let mut ctl = vfd::VfdController::new(desc.slave, MockTransport::new(), map)?;
    ctl.set_running_frequency(percent)?;
    let drive = ctl.into_transport();
    let raw = drive.register(map.freq_address).unwrap_or_default();
    println!(
        "wrote {raw} to 0x{:04X} on slave {} ({percent:.2}%)",
        map.freq_address, desc.slave
    );
    Ok(())
}

fn codes() -> Result<()> {
    println!("status:");
    for s in vfd::Status::ALL {
        println!("  {}\t{}", s.ordinal(), s.as_str());
    }
    println!("issue:");
    for issue in vfd::Issue::ALL {
        println!("  {}\t{}", issue.ordinal(), issue.as_str());
    }
    Ok(())
}
