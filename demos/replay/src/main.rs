//! Replay demo - offline-dispatch example
//!
//! Scripts a short session against an [`OfflineStore`]:
//! 1. The connection drops
//! 2. Feed pages are requested and land in the offline queue
//! 3. A thunk runs and its nested fetch is queued too
//! 4. Optionally the user navigates back, dismissing the queued pages
//! 5. Connectivity returns through a watch channel and the queue replays
//!
//! Every item that reaches the reducers is printed as it is forwarded.
//!
//! # Usage
//!
//! ```sh
//! cargo run -p replay-demo
//!
//! # Dismiss the queued pages before reconnecting
//! cargo run -p replay-demo -- --navigate-back
//!
//! # Match with a config file, e.g. {"regexActionType": {"regex": "^FETCH_"}}
//! cargo run -p replay-demo -- --config offline.json
//!
//! # Show pipeline decisions
//! RUST_LOG=offline_dispatch_core=debug cargo run -p replay-demo
//! ```

use std::error::Error;
use std::path::PathBuf;

use clap::Parser;
use offline_dispatch::prelude::*;
use serde_json::json;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "replay")]
#[command(about = "Scripted offline session demonstrating queueing and replay")]
struct Args {
    /// JSON file with actionTypes / regexActionType / regexFunctionName
    #[arg(long, short)]
    config: Option<PathBuf>,

    /// Number of feed pages requested while offline
    #[arg(long, short, default_value = "3")]
    pages: u64,

    /// Navigate back before reconnecting
    #[arg(long)]
    navigate_back: bool,
}

#[derive(Debug, Default)]
struct AppState {
    network: NetworkSlice<DynAction>,
    pages: Vec<u64>,
    profile_loaded: bool,
    screen: &'static str,
}

impl HasNetwork<DynAction> for AppState {
    fn network(&self) -> &NetworkSlice<DynAction> {
        &self.network
    }

    fn network_mut(&mut self) -> &mut NetworkSlice<DynAction> {
        &mut self.network
    }
}

fn reducer(state: &mut AppState, action: DynAction) -> bool {
    match action.kind.as_str() {
        "FETCH_FEED_REQUEST" => match action.payload["page"].as_u64() {
            Some(page) => {
                state.pages.push(page);
                true
            }
            None => false,
        },
        "FETCH_PROFILE_REQUEST" => {
            state.profile_loaded = true;
            true
        }
        "OPEN_FEED" => {
            state.screen = "feed";
            true
        }
        "NAVIGATE_BACK" => {
            state.screen = "home";
            true
        }
        _ => false,
    }
}

/// Prints every forwarded item, indented under the step that caused it.
#[derive(Debug, Default)]
struct PrintMiddleware {
    log: LoggingMiddleware,
}

impl Middleware<DynAction> for PrintMiddleware {
    fn before(&mut self, item: &Forwarded<DynAction>) {
        self.log.before(item);
        match item {
            Forwarded::Network(NetworkAction::FetchOfflineMode(entry)) => {
                println!("    -> {} {} ({})", item.name(), entry.id, entry.item.name())
            }
            Forwarded::Network(NetworkAction::RemoveFromQueue(id)) => {
                println!("    -> {} {id}", item.name())
            }
            Forwarded::Network(NetworkAction::DismissFromQueue { action_type, id }) => {
                println!("    -> {} {id} (by {action_type})", item.name())
            }
            Forwarded::Network(NetworkAction::ConnectionChange { is_connected }) => {
                println!("    -> {} connected={is_connected}", item.name())
            }
            Forwarded::Action(action) if !action.payload.is_null() => {
                println!("    -> {} {}", item.name(), action.payload)
            }
            Forwarded::Action(_) => println!("    -> {}", item.name()),
            Forwarded::Thunk(_) => println!("    -> thunk {}", item.name()),
        }
    }

    fn after(&mut self, item: &Forwarded<DynAction>, state_changed: bool) {
        self.log.after(item, state_changed);
    }
}

type DemoStore = OfflineStore<AppState, DynAction, PrintMiddleware>;

fn step(store: &DemoStore, title: &str) {
    println!(
        "\n[{}] {title}",
        if store.is_connected() { "online " } else { "offline" }
    );
}

fn summary(store: &DemoStore) {
    let state = store.state();
    println!(
        "    queue={} pages={:?} profile_loaded={} screen={}",
        store.queue().len(),
        state.pages,
        state.profile_loaded,
        state.screen
    );
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = Args::parse();

    let config = match &args.config {
        Some(path) => OfflineConfig::from_path(path)?,
        None => OfflineConfig::new(),
    };
    tracing::debug!(?config, "Loaded offline config");

    let state = AppState {
        screen: "home",
        ..AppState::default()
    };
    let middleware = PrintMiddleware {
        log: LoggingMiddleware::new(),
    };
    let mut store = OfflineStore::with_middleware(state, reducer, config, middleware);

    step(&store, "open feed");
    store.dispatch(DynAction::new("OPEN_FEED"))?;

    step(&store, "connection lost");
    store.set_connected(false)?;

    for page in 1..=args.pages {
        step(&store, &format!("request page {page}"));
        store.dispatch(
            DynAction::new("FETCH_FEED_REQUEST")
                .with_payload(json!({ "page": page }))
                .with_dismiss(["NAVIGATE_BACK"]),
        )?;
    }

    step(&store, "load profile");
    store.dispatch(Thunk::new("loadProfile", |dispatch: &mut dyn Dispatch<DynAction>| {
        dispatch.dispatch(DynAction::new("FETCH_PROFILE_REQUEST").into())
    }))?;
    summary(&store);

    if args.navigate_back {
        step(&store, "navigate back");
        store.dispatch(DynAction::new("NAVIGATE_BACK"))?;
        summary(&store);
    }

    let (tx, rx) = watch::channel(false);
    tx.send(true)?;
    drop(tx);

    step(&store, "connection restored");
    watch_connectivity(&mut store, rx, CancellationToken::new()).await?;
    summary(&store);

    Ok(())
}
