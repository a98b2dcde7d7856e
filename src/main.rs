// Stakehouse Prediction Market - Main Entry Point
// Single composition root: state, router, shutdown persistence

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use stakehouse_prediction_market::app_state::{AppState, SharedState};
use stakehouse_prediction_market::handlers;

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt::init();

    println!("\n═══════════════════════════════════════════════");
    println!("     🎲 Stakehouse Prediction Market");
    println!("═══════════════════════════════════════════════\n");

    let state: SharedState = Arc::new(Mutex::new(AppState::new()));

    // Clone state for shutdown handler before moving into router
    let shutdown_state = state.clone();

    let app = handlers::router(state);

    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(1234);
    let addr = SocketAddr::from(([0, 0, 0, 0], port));

    println!("📋 Available Endpoints:");
    println!("   GET    /markets             - List markets with options");
    println!("   POST   /markets             - Create market");
    println!("   GET    /markets/:id         - Market detail");
    println!("   DELETE /markets/:id         - Delete market and children");
    println!("   POST   /positions           - Stake on a market option");
    println!("   GET    /positions/:address  - User positions (reconciled)");
    println!("   POST   /resolve             - Declare a winning option");
    println!("   POST   /claim               - Claim payout on a resolved market");
    println!("   GET    /users/:address      - User account and balance");
    println!("   GET    /activity            - Recent activity log");
    println!();

    tracing::info!("listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await.unwrap();

    // Save state on shutdown
    tokio::spawn(async move {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install CTRL+C handler");

        tracing::info!("shutdown signal received, saving state");
        if let Ok(app_state) = shutdown_state.lock() {
            if let Err(e) = app_state.save_to_disk() {
                tracing::error!("failed to save state: {}", e);
            }
        }
        std::process::exit(0);
    });

    axum::serve(listener, app).await.unwrap();
}
