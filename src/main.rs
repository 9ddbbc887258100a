use anyhow::Result;
use clap::Parser;
use meeting_streams::{Config, LiveSession, NatsClient};
use tracing::info;

/// Follow a live meeting's event stream and print the reconstructed
/// transcript and sentiment as they evolve.
#[derive(Parser)]
#[command(name = "meeting-streams", version)]
struct Cli {
    /// Meeting id to follow
    meeting_id: String,

    /// Config file path (without extension)
    #[arg(long, default_value = "config/meeting-streams")]
    config: String,

    /// Override the NATS server URL
    #[arg(long)]
    nats_url: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let mut cfg = Config::load(&cli.config)?;
    if let Some(url) = cli.nats_url {
        cfg.stream.nats_url = url;
    }

    info!("{} v0.1.0", cfg.service.name);

    let nats = NatsClient::connect(&cfg.stream.nats_url, cfg.stream.subject_prefix.clone()).await?;
    let messages = nats.subscribe_stream(&cli.meeting_id).await?;

    let session = LiveSession::new(cli.meeting_id.clone());
    let mut transcript_rx = session.transcript();
    let mut sentiment_rx = session.sentiment();
    let handle = session.subscribe(messages)?;

    info!("Following meeting {} (ctrl-c to stop)", cli.meeting_id);

    let mut printed_turns = 0usize;
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            changed = transcript_rx.changed() => {
                if changed.is_err() {
                    break;
                }
                let turns = transcript_rx.borrow_and_update().clone();
                if let Some(last) = turns.last() {
                    if turns.len() > printed_turns {
                        // New turn: finish the previous line first
                        if printed_turns > 0 {
                            println!();
                        }
                        printed_turns = turns.len();
                    }
                    // Refinements of the current turn overwrite in place
                    print!("\r{}: {}", last.name, last.content);
                    std::io::Write::flush(&mut std::io::stdout()).ok();
                }
            }
            changed = sentiment_rx.changed() => {
                if changed.is_err() {
                    break;
                }
                let current = sentiment_rx.borrow_and_update().clone();
                if let Some(snapshot) = current {
                    match snapshot.dominant_emotion {
                        Some(dominant) => info!(
                            "sentiment: {:?} ({:.2}), dominant emotion {} ({:.2})",
                            snapshot.sentiment, snapshot.score, dominant.name, dominant.score
                        ),
                        None => info!(
                            "sentiment: {:?} ({:.2})",
                            snapshot.sentiment, snapshot.score
                        ),
                    }
                }
            }
        }
    }

    println!();
    handle.shutdown().await;
    nats.close().await?;

    Ok(())
}
