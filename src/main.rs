//src/main.rs

use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

use estoque::{app::build_app, config::AppState};

#[tokio::main]
async fn main() {
    // RUST_LOG manda; sem ele, "info".
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .compact()
        .init();

    // Se a configuração falhar, a aplicação não deve iniciar.
    let app_state = AppState::new()
        .await
        .expect("Falha ao inicializar o estado da aplicação.");

    // Migrações só fazem sentido com o backend Postgres
    if let Some(pool) = &app_state.db_pool {
        sqlx::migrate!()
            .run(pool)
            .await
            .expect("Falha ao rodar as migrações do banco de dados.");

        tracing::info!("✅ Migrações do banco de dados executadas com sucesso!");
    }

    let addr = app_state.config.server_addr.clone();
    let app = build_app(app_state);

    // Inicia o servidor
    let listener = TcpListener::bind(&addr)
        .await
        .expect("Falha ao iniciar o listener TCP");
    tracing::info!("🚀 Servidor escutando em {}", addr);
    axum::serve(listener, app)
        .await
        .expect("Erro no servidor Axum");
}
