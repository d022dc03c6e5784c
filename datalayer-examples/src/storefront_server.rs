//! Demo storefront serving the dataLayer endpoints.
//!
//! ```text
//! cargo run -p datalayer-examples --example storefront_server
//! curl -X POST localhost:3000/googletagmanager/getItem -d '{"productUrl":"/shirt-10.html"}'
//! curl localhost:3000/pages/order-delivery
//! ```

use anyhow::Context;
use datalayer_examples::app::{create_app, AppState};
use datalayer_examples::demo::demo_storefront;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let shop = demo_storefront().context("seeding the demo storefront")?;
    let app = create_app(AppState::new(shop));

    let addr = std::env::var("DATALAYER_ADDR").unwrap_or_else(|_| "127.0.0.1:3000".to_string());
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    info!(%addr, "storefront listening");

    axum::serve(listener, app).await?;
    Ok(())
}
