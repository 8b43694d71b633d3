//! netviz - one-page visual summary of a packet capture.
//!
//! Reads a pcap file, aggregates traffic statistics and renders them as a
//! single-page PDF report.

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;
#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

use std::path::PathBuf;
use std::time::Instant;

use clap::Parser;
use clap::builder::RangedU64ValueParser;
use tracing::{Level, debug, info, warn};
use tracing_subscriber::EnvFilter;

use netviz_core::fmt::{comma_number_string, format_byte_size};
use netviz_core::render::default_backend;
use netviz_core::report::{DEFAULT_FILENAME, DEFAULT_PAGE_HEIGHT, DEFAULT_PAGE_WIDTH, MAX_TOP_N};
use netviz_core::source::PcapSource;
use netviz_core::{OnePageReport, ReportConfig};

/// One-page packet capture report.
#[derive(Parser)]
#[command(name = "netviz", about = "One-page packet capture report", version)]
struct Args {
    /// Capture file (pcap format).
    input: PathBuf,

    /// Directory the report is written to.
    #[arg(short, long, default_value = ".")]
    output_dir: PathBuf,

    /// Report file name inside the output directory.
    #[arg(long, default_value = DEFAULT_FILENAME)]
    filename: String,

    /// Entries listed under each histogram pair (0-50).
    #[arg(
        long,
        default_value = "3",
        value_parser = RangedU64ValueParser::<usize>::new().range(0..=MAX_TOP_N as u64)
    )]
    top_n: usize,

    /// Font size of the header lines.
    #[arg(long, default_value = "8")]
    header_font_size: f64,

    /// Font size of the top-N lines.
    #[arg(long, default_value = "8")]
    top_list_font_size: f64,

    /// Page width in points.
    #[arg(long, default_value_t = DEFAULT_PAGE_WIDTH)]
    page_width: f64,

    /// Page height in points.
    #[arg(long, default_value_t = DEFAULT_PAGE_HEIGHT)]
    page_height: f64,

    /// Distinct addresses kept per address tree before prefixes are merged.
    #[arg(long, default_value = "1024")]
    max_addresses: usize,

    /// Also print the statistics as JSON to stdout.
    #[arg(long)]
    json: bool,

    /// Increase logging verbosity (-v for debug, -vv for trace). Default is info level.
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Quiet mode - only show errors.
    #[arg(short, long)]
    quiet: bool,
}

fn init_logging(verbose: u8, quiet: bool) {
    let level = if quiet {
        Level::ERROR
    } else {
        match verbose {
            0 => Level::INFO,
            1 => Level::DEBUG,
            _ => Level::TRACE,
        }
    };

    let filter = EnvFilter::from_default_env()
        .add_directive(format!("netviz={}", level).parse().unwrap())
        .add_directive(format!("netviz_core={}", level).parse().unwrap());

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let args = Args::parse();
    init_logging(args.verbose, args.quiet);

    if args.page_width <= 0.0 || args.page_height <= 0.0 {
        eprintln!("Error: page size must be positive");
        std::process::exit(1);
    }

    let config = ReportConfig::default()
        .with_filename(&args.filename)
        .with_page_size(args.page_width, args.page_height)
        .with_header_font_size(args.header_font_size)
        .with_top_list_font_size(args.top_list_font_size)
        .with_top_n(args.top_n)
        .with_address_tree_max_leaves(args.max_addresses);

    let mut source = match PcapSource::open(&args.input) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error opening '{}': {}", args.input.display(), e);
            std::process::exit(1);
        }
    };

    let mut report =
        OnePageReport::new(config).with_source_identifier(args.input.display().to_string());

    let started = Instant::now();
    let read = source.for_each_packet(|packet| report.ingest_packet(packet));
    match read {
        Ok(n) => info!(
            "Ingested {} packets ({}) in {:.2?}",
            comma_number_string(n),
            format_byte_size(report.byte_count()),
            started.elapsed()
        ),
        // A truncated capture still yields a report of what was read.
        Err(e) => warn!(
            "Stopped reading '{}' after {} packets: {}",
            args.input.display(),
            comma_number_string(report.packet_count()),
            e
        ),
    }

    let dropped = report.packetfall().dropped();
    if dropped > 0 {
        debug!(
            "Packet waterfall kept {} samples, dropped {}",
            report.packetfall().sample_count(),
            comma_number_string(dropped)
        );
    }

    let backend = default_backend();
    match report.render(&args.output_dir, backend.as_ref()) {
        Ok(Some(path)) => info!("Report: {}", path.display()),
        Ok(None) => {}
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }

    if args.json {
        match serde_json::to_string_pretty(&report.summary()) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
        }
    }
}
