use std::path::Path;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use ecg_quiz::config::Settings;
use ecg_quiz::content::LessonCatalog;
use ecg_quiz::gate::{AccessGate, EmailVerifier, HttpEmailVerifier, UnconfiguredVerifier};
use ecg_quiz::state::AppState;
use ecg_quiz::{app, db, paths};

#[tokio::main]
async fn main() {
  tracing_subscriber::registry()
    .with(
      tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "ecg_quiz=debug,tower_http=debug".into()),
    )
    .with(tracing_subscriber::fmt::layer())
    .init();

  let settings = Settings::load();

  let pool = db::init_db(&settings.database_path).expect("Failed to initialize database");

  let lessons = LessonCatalog::load_dir(&settings.lessons_dir).expect("Failed to load lessons");

  let verifier: Arc<dyn EmailVerifier> = match &settings.verify_endpoint {
    Some(endpoint) => Arc::new(
      HttpEmailVerifier::new(endpoint.clone(), settings.verify_timeout)
        .expect("Failed to build verification client"),
    ),
    None => {
      tracing::warn!("No verification endpoint configured; the email gate will reject every address");
      Arc::new(UnconfiguredVerifier)
    }
  };

  let state = AppState::new(pool, lessons, AccessGate::new(verifier));
  let app = app::build_router(state, Path::new(paths::STATIC_DIR));

  let bind_addr = settings.bind_addr();
  let listener = tokio::net::TcpListener::bind(&bind_addr)
    .await
    .unwrap_or_else(|_| panic!("Failed to bind to {}", bind_addr));

  tracing::info!("Server running on http://localhost:{}", settings.port);

  axum::serve(listener, app)
    .await
    .expect("Server failed to start");
}
