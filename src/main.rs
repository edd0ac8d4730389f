//! B-Out entry point
//!
//! Parses the command line, then either runs the network check or a headless
//! fixed-rate game loop. Rendering and input polling are supplied by a
//! frontend linking the library; this binary only paces the simulation.

use std::thread;
use std::time::Instant;

use anyhow::Context;

use b_out::net::{SequencedChannel, UdpLink, decode_point, encode_point};
use b_out::settings::Launch;
use b_out::{Game, GameMode, Settings};

/// Stop the headless loop after this many seconds of play
const HEADLESS_SECONDS: u64 = 120;

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let launch = Launch::from_args(std::env::args().skip(1)).context("reading settings")?;
    let settings = launch.settings;
    log::info!("Starting B-Out in {} mode", settings.mode.as_str());

    let result = if launch.net_test {
        net_test(&settings)
    } else {
        run(&settings)
    };
    if let Err(e) = &result {
        log::error!("{e:#}");
    }
    result
}

/// Exchange one payload and report it
fn net_test(settings: &Settings) -> anyhow::Result<()> {
    let net = &settings.net;
    match &settings.mode {
        GameMode::Guest { hostname } => {
            let mut link = UdpLink::bind(net.client_port).context("binding client port")?;
            link.connect(hostname, net.server_port)
                .with_context(|| format!("resolving {hostname}"))?;
            let mut channel = SequencedChannel::with_window(link, net.recv_timeout());
            channel.connect().context("announcing to server")?;

            let payload = settings.ball.start;
            channel.send(encode_point(payload)).context("sending test payload")?;
            println!("Sent {payload:?}");
        }
        GameMode::Local | GameMode::Host => {
            let link = UdpLink::bind(net.server_port).context("binding server port")?;
            log::info!("Listening on {}", link.local_addr()?);
            let mut channel = SequencedChannel::with_window(link, net.recv_timeout());
            channel.accept(net.handshake_attempts).context("waiting for client")?;

            let bytes = channel.receive().context("receiving test payload")?;
            println!("Received {:?}", decode_point(&bytes)?);
        }
    }
    Ok(())
}

fn run(settings: &Settings) -> anyhow::Result<()> {
    let mut game = Game::start(settings).context("starting game")?;
    let step = settings.step();
    let frame_limit = u64::from(settings.frame_rate) * HEADLESS_SECONDS;

    let mut last = Instant::now();
    let mut frames = 0u64;
    while frames < frame_limit && !game.is_cleared() {
        thread::sleep(step);
        let now = Instant::now();
        game.tick(now - last).context("simulation step")?;
        last = now;
        frames += 1;

        if frames % u64::from(settings.frame_rate.max(1)) == 0 {
            log::debug!(
                "frame {frames}: {} blocks left, {} shapes",
                game.world().blocks_remaining(),
                game.drawable_shapes().len()
            );
        }
    }

    if game.is_cleared() {
        log::info!("All blocks cleared after {} ticks", game.world().time_ticks);
    } else {
        log::info!(
            "Stopped after {} ticks with {} blocks left",
            game.world().time_ticks,
            game.world().blocks_remaining()
        );
    }
    if let Some(stats) = game.stats() {
        log::info!(
            "Channel: {} sent, {} accepted, {} stale, {} timeouts",
            stats.sent,
            stats.accepted,
            stats.stale,
            stats.timeouts
        );
    }
    Ok(())
}

