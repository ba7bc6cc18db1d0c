//! Drives a `Reader` over UDP: reassembles frames from a peer sender-demo
//! and logs each disposition.

mod udp_bus;

use std::sync::Arc;

use clap::Parser;
use log::{info, warn};

use udp_bus::UdpDatagramBus;
use xstream::{ChannelId, Config, Reader, ReaderCause};

const DATA: ChannelId = ChannelId(0);
const ACK: ChannelId = ChannelId(1);

#[derive(Parser, Debug)]
#[command(about = "Reassembles frames from a peer sender-demo over UDP")]
struct Args {
    /// Local address to bind the data socket to.
    #[arg(long, default_value = "0.0.0.0:8000")]
    local_data_addr: String,

    /// Local address to bind the ack socket to.
    #[arg(long, default_value = "0.0.0.0:8001")]
    local_ack_addr: String,

    /// Peer's data socket address.
    #[arg(long)]
    peer_data_addr: String,

    /// Peer's ack socket address.
    #[arg(long)]
    peer_ack_addr: String,

    /// Bytes per fragment. Must match the sender's setting.
    #[arg(long, default_value_t = 1200)]
    max_fragment_size: usize,

    /// Fragments per frame (1..=64). Must match the sender's setting.
    #[arg(long, default_value_t = 32)]
    max_fragments_per_frame: u8,

    /// Initial reassembly buffer capacity, in bytes.
    #[arg(long, default_value_t = 32_000)]
    initial_buffer_size: usize,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    let bus = UdpDatagramBus::connect(
        &args.local_data_addr,
        &args.peer_data_addr,
        &args.local_ack_addr,
        &args.peer_ack_addr,
    )
    .expect("failed to bind/connect udp sockets");
    let bus = Arc::new(bus);

    let config = Config::default()
        .with_max_fragment_size(args.max_fragment_size)
        .with_max_fragments_per_frame(args.max_fragments_per_frame);

    let initial_buffer = vec![0u8; args.initial_buffer_size];

    let reader = Reader::new(
        bus,
        DATA,
        ACK,
        config,
        initial_buffer,
        move |event: xstream::ReaderEvent<'_>| match event.cause {
            ReaderCause::Complete => {
                info!(
                    "frame complete: {} bytes, flush={}, skipped={}",
                    event.data.len(),
                    event.is_flush,
                    event.skipped_frames
                );
                vec![0u8; args.initial_buffer_size]
            }
            ReaderCause::TooSmall => {
                warn!("buffer too small, growing to {} bytes", event.required_size);
                vec![0u8; event.required_size]
            }
            ReaderCause::CopyComplete => Vec::new(),
            ReaderCause::Cancel => {
                info!("reader shutting down");
                Vec::new()
            }
        },
    )
    .expect("failed to start reader");

    // Run until interrupted; Ctrl-C drops `reader`, which joins both
    // background threads via its `Drop` impl.
    loop {
        std::thread::sleep(std::time::Duration::from_secs(5));
        info!(
            "efficiency = {:.3}, corrupt_packets = {}",
            reader.efficiency(),
            reader.corrupt_packets()
        );
    }
}
