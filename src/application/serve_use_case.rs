// ============================================================
// Layer 2 — ServeUseCase
// ============================================================
// Loads the artifact once, wraps it in AppState and serves the
// router until the process is stopped:
//
//   Step 1: Load manifest, weights, adapters   (Layer 5/6)
//   Step 2: Build AppState + router            (Layer 1)
//   Step 3: Bind and serve on a tokio runtime

use anyhow::{Context, Result};
use std::sync::Arc;

use crate::api::{build_router, AppState};
use crate::application::train_use_case::ModelVariant;
use crate::domain::traits::Predictor;
use crate::infra::artifact::ArtifactStore;
use crate::ml::inferencer::Inferencer;

pub struct ServeUseCase {
    artifact_dir: String,
    bind:         String,
}

impl ServeUseCase {
    pub fn new(artifact_dir: String, bind: String) -> Self {
        Self { artifact_dir, bind }
    }

    /// Blocks until the server stops.
    pub fn execute(&self) -> Result<()> {
        // ── Step 1: Load the model before accepting connections ──────────────
        let inferencer = Inferencer::from_artifact(&ArtifactStore::new(&self.artifact_dir))?;
        let variant = if inferencer.schema().uses_text {
            ModelVariant::Text
        } else {
            ModelVariant::Numeric
        };

        // ── Step 2: Service context ───────────────────────────────────────────
        let state = AppState::new(Arc::new(inferencer), variant.to_string());
        let app   = build_router(state);

        // ── Step 3: Serve ─────────────────────────────────────────────────────
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
            .context("Cannot start the tokio runtime")?;

        runtime.block_on(async {
            let listener = tokio::net::TcpListener::bind(&self.bind)
                .await
                .with_context(|| format!("Cannot bind '{}'", self.bind))?;
            tracing::info!("Serving {} model on http://{}", variant, self.bind);
            tracing::info!("Endpoints: POST /predict_eng, GET /health");

            axum::serve(listener, app).await.context("Server error")?;
            Ok::<(), anyhow::Error>(())
        })
    }
}
