//! Drives a `Sender` over UDP: submits synthetic frames at a fixed cadence,
//! marking every `gop_size`-th frame as a flush.

mod udp_bus;

use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use log::{error, info};

use udp_bus::UdpDatagramBus;
use xstream::{ChannelId, Config, Sender, SenderStatus};

const DATA: ChannelId = ChannelId(0);
const ACK: ChannelId = ChannelId(1);

#[derive(Parser, Debug)]
#[command(about = "Submits synthetic frames to a peer reader-demo over UDP")]
struct Args {
    /// Local address to bind the data socket to.
    #[arg(long, default_value = "0.0.0.0:7000")]
    local_data_addr: String,

    /// Local address to bind the ack socket to.
    #[arg(long, default_value = "0.0.0.0:7001")]
    local_ack_addr: String,

    /// Peer's data socket address.
    #[arg(long)]
    peer_data_addr: String,

    /// Peer's ack socket address.
    #[arg(long)]
    peer_ack_addr: String,

    /// Bytes per fragment.
    #[arg(long, default_value_t = 1200)]
    max_fragment_size: usize,

    /// Fragments per frame (1..=64).
    #[arg(long, default_value_t = 32)]
    max_fragments_per_frame: u8,

    /// Sender frame-queue capacity.
    #[arg(long, default_value_t = 8)]
    frames_buffer_size: usize,

    /// Bytes of synthetic payload per submitted frame.
    #[arg(long, default_value_t = 16_000)]
    frame_size: usize,

    /// Milliseconds between frame submissions.
    #[arg(long, default_value_t = 33)]
    interval_ms: u64,

    /// Mark every Nth frame as a flush (group-of-pictures boundary).
    #[arg(long, default_value_t = 30)]
    gop_size: u64,

    /// Number of frames to submit before exiting (0 = run forever).
    #[arg(long, default_value_t = 0)]
    frame_count: u64,
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
        .with_max_fragments_per_frame(args.max_fragments_per_frame)
        .with_frames_buffer_size(args.frames_buffer_size);

    let mut sender = Sender::new(bus, DATA, ACK, config, move |status, payload| match status {
        SenderStatus::Sent => info!("frame of {} bytes sent", payload.len()),
        SenderStatus::Cancelled => info!("frame of {} bytes cancelled (pre-empted)", payload.len()),
    })
    .expect("failed to start sender");

    let mut frame_number = 0u64;
    loop {
        if args.frame_count != 0 && frame_number >= args.frame_count {
            break;
        }
        let flush = args.gop_size != 0 && frame_number % args.gop_size == 0;
        let payload: Vec<u8> = (0..args.frame_size)
            .map(|i| (frame_number.wrapping_add(i as u64) & 0xFF) as u8)
            .collect();

        match sender.submit(payload, flush) {
            Ok(occupancy) => info!("submitted frame {frame_number} (queue was {occupancy} deep)"),
            Err(e) => error!("submit failed: {e}"),
        }

        frame_number += 1;
        std::thread::sleep(Duration::from_millis(args.interval_ms));
    }

    info!(
        "shutting down, efficiency = {:.3}",
        sender.efficiency()
    );
    sender.stop();
}
