use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use colored::*;
use dialoguer::Input;
use duet_core::{RecordType, RoomId, RoomPaths};
use duet_session::{
    CandidateLayout, EngineConfig, IceServerConfig, MemoryStore, NegotiationState, Session,
    SessionConfig, SessionError, SessionEvent, SignalingConfig, WebRtcEngine,
    engine_event_channel,
};
use std::io::IsTerminal;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "duet", version, about = "Two-party call setup over a shared document store")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Runs an initiator and a joiner in this process against an in-memory
    /// store with real WebRTC engines, then hangs up.
    Demo {
        /// Room to call in. Prompted for when omitted on a terminal.
        #[arg(long, env = "DUET_ROOM")]
        room: Option<String>,

        /// Which side ends the call.
        #[arg(long, value_enum, default_value_t = Side::Initiator)]
        hang_up_by: Side,

        /// STUN/TURN urls. Without any, only host and loopback candidates are used.
        #[arg(long = "ice-server", env = "DUET_ICE_SERVERS", value_delimiter = ',')]
        ice_servers: Vec<String>,

        /// Keep one candidate document per side instead of one per candidate.
        #[arg(long)]
        single_slot: bool,

        #[arg(long, default_value_t = 20)]
        timeout_secs: u64,
    },

    /// Prints a fresh room id.
    NewRoom,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Side {
    Initiator,
    Joiner,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    match Cli::parse().command {
        Commands::Demo {
            room,
            hang_up_by,
            ice_servers,
            single_slot,
            timeout_secs,
        } => {
            let room_id = resolve_room(room)?;
            let engine_config = engine_config(ice_servers);
            let session_config = SessionConfig {
                signaling: SignalingConfig {
                    candidate_layout: if single_slot {
                        CandidateLayout::SingleSlot
                    } else {
                        CandidateLayout::AppendOnly
                    },
                    ..SignalingConfig::default()
                },
                ..SessionConfig::default()
            };

            run_demo(
                room_id,
                engine_config,
                session_config,
                hang_up_by,
                Duration::from_secs(timeout_secs),
            )
            .await?;
        }

        Commands::NewRoom => println!("{}", RoomId::generate()),
    }

    Ok(())
}

fn resolve_room(room: Option<String>) -> Result<RoomId> {
    let raw = match room {
        Some(room) => room,
        None if std::io::stdin().is_terminal() => Input::<String>::new()
            .with_prompt("Room id")
            .default(RoomId::generate().to_string())
            .interact_text()
            .context("Failed to read room id")?,
        None => RoomId::generate().to_string(),
    };

    RoomId::parse(&raw).with_context(|| format!("Invalid room id '{}'", raw))
}

fn engine_config(ice_servers: Vec<String>) -> EngineConfig {
    EngineConfig {
        ice_servers: ice_servers.into_iter().map(IceServerConfig::new).collect(),
        ..EngineConfig::local()
    }
}

async fn new_session(
    store: &MemoryStore,
    engine_config: EngineConfig,
    session_config: SessionConfig,
) -> Result<Session> {
    let (event_tx, event_rx) = engine_event_channel();
    let engine = WebRtcEngine::new(engine_config, event_tx)
        .await
        .context("Failed to create WebRTC engine")?;

    Ok(Session::new(
        session_config,
        Arc::new(store.clone()),
        Arc::new(engine),
        event_rx,
    ))
}

async fn run_demo(
    room_id: RoomId,
    engine_config: EngineConfig,
    session_config: SessionConfig,
    hang_up_by: Side,
    timeout: Duration,
) -> Result<()> {
    println!("{} {}", "📞 Starting call in room".green().bold(), room_id);

    info!(
        "Demo in room {} with {} ICE server(s)",
        room_id,
        engine_config.ice_servers.len()
    );
    let store = MemoryStore::new();
    let initiator = new_session(&store, engine_config.clone(), session_config.clone()).await?;
    let joiner = new_session(&store, engine_config, session_config).await?;

    match initiator.start_as_initiator(room_id.clone()).await {
        Err(SessionError::RoomOccupied(room, kind)) => {
            anyhow::bail!("Room {} is taken ({}), pick another id", room, kind.as_str())
        }
        other => other.context("Initiator failed to start")?,
    }
    joiner
        .start_as_joiner(room_id.clone())
        .await
        .context("Joiner failed to start")?;

    println!("{}", "⏳ Negotiating...".cyan());
    tokio::time::timeout(timeout, async {
        initiator.wait_for_state(NegotiationState::Connected).await?;
        joiner.wait_for_state(NegotiationState::Connected).await
    })
    .await
    .context("Timed out waiting for the call to connect")??;
    println!("{}", "✅ Both sides connected".green().bold());

    let (caller, other) = match hang_up_by {
        Side::Initiator => (&initiator, &joiner),
        Side::Joiner => (&joiner, &initiator),
    };
    info!("Both sides connected, hanging up");
    caller.hang_up().await?;
    tokio::time::timeout(timeout, other.wait_for_state(NegotiationState::Ended))
        .await
        .context("Timed out waiting for the other side to hang up")??;
    println!("{}", "👋 Call ended on both sides".green().bold());

    print_events("initiator", &initiator).await;
    print_events("joiner", &joiner).await;

    let record = store.document(&RoomPaths::default().room_document(&room_id));
    let kind = record.as_ref().and_then(RecordType::of_document);
    println!(
        "   📄 Room record: {}",
        kind.map_or("none", RecordType::as_str)
    );
    println!(
        "   📄 Candidates stored: {}",
        store
            .collection(&RoomPaths::default().candidates(&room_id))
            .len()
    );

    Ok(())
}

async fn print_events(label: &str, session: &Session) {
    println!("{}", format!("── {} ──", label).bold());
    while let Ok(Some(event)) =
        tokio::time::timeout(Duration::from_millis(50), session.next_event()).await
    {
        let line = match event {
            SessionEvent::StateChanged(state) => format!("state → {}", state).normal(),
            SessionEvent::NegotiationFailed(reason) => format!("failed: {}", reason).red(),
            SessionEvent::CallEnded(reason) => format!("ended: {:?}", reason).yellow(),
            other => format!("{:?}", other).dimmed(),
        };
        println!("   {}", line);
    }
}
