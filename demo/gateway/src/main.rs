use std::sync::Arc;

use serde_json::json;
use tracing_subscriber::fmt;

use deckhand_core::store::{MemoryStore, ProjectStore};
use deckhand_core::{Deckhand, RolePolicy};

mod config;
use config::GatewayConfig;

#[tokio::main]
async fn main() -> deckhand_core::Result<()> {
    fmt().compact().init();

    let cfg = GatewayConfig::load();

    let store = Arc::new(MemoryStore::new());
    seed_demo_board(store.as_ref()).await?;

    let deckhand = Deckhand::new(store, Arc::new(RolePolicy::new(cfg.role)));

    // Queue one bridge per config entry; they connect sequentially when
    // the manager fires its init hooks inside start().
    for bridge in cfg.bridges.clone() {
        deckhand
            .bridges
            .on_init(move |manager| async move {
                manager
                    .create_client(&bridge.id, &bridge.url, bridge.config)
                    .await;
            })
            .await;
    }

    deckhand.start().await;

    // One native round trip so the log shows the surface is live.
    let boards = deckhand.registry.execute("boards/list", json!({})).await?;
    tracing::info!(target: "gateway", boards = %boards, "Native ability check");

    let status = deckhand.bridges.get_client_status().await;
    tracing::info!(target: "gateway", bridges = status.len(), "Bridge status");
    for (id, s) in status {
        tracing::info!(
            target: "gateway",
            client = %id,
            url = %s.url,
            tools = s.tools,
            resources = s.resources,
            prompts = s.prompts,
            "Bridge"
        );
    }

    Ok(())
}

/// Seed a small board so the ability surface has something to serve.
async fn seed_demo_board(store: &MemoryStore) -> deckhand_core::Result<()> {
    let board = store
        .create_board("Launch".into(), "Demo board".into())
        .await?;
    let todo = store.create_stage(board.id, "Todo".into()).await?;
    let doing = store.create_stage(board.id, "Doing".into()).await?;
    store.create_stage(board.id, "Done".into()).await?;

    store
        .create_task(board.id, todo.id, "Write docs".into(), String::new())
        .await?;
    store
        .create_task(board.id, doing.id, "Wire bridges".into(), String::new())
        .await?;

    Ok(())
}
