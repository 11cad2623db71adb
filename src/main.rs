mod config;
mod controllers;
mod database;
mod dto;
mod middleware;
mod models;
mod routes;
mod services;
mod state;
mod store;
mod utils;

use anyhow::Result;
use axum::{response::Json, routing::get, Router};
use dotenvy::dotenv;
use serde_json::json;
use std::net::SocketAddr;
use tokio::signal;
use tracing::{error, info};

use config::environment::EnvironmentConfig;
use database::DatabaseConnection;
use middleware::cors::cors_middleware;
use state::AppState;
use store::PgEntityStore;

#[tokio::main]
async fn main() -> Result<()> {
    // Cargar variables de entorno
    dotenv().ok();

    // Configurar logging
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    info!("🚗 AutoMaster - Backend de inventario y ventas");
    info!("==============================================");

    let config = EnvironmentConfig::from_env();

    // Inicializar base de datos
    let db_connection = match DatabaseConnection::new_default().await {
        Ok(conn) => conn,
        Err(e) => {
            error!("❌ Error conectando a la base de datos: {}", e);
            return Err(anyhow::anyhow!("Error de base de datos: {}", e));
        }
    };

    let store = PgEntityStore::new(db_connection.pool().clone());
    if let Err(e) = store.ensure_schema().await {
        error!("❌ Error preparando el esquema: {}", e);
        return Err(anyhow::anyhow!("Error de esquema: {}", e));
    }
    info!("✅ Esquema de almacenamiento verificado");

    // CORS: orígenes del entorno, o permisivo en desarrollo
    let cors = cors_middleware(&config.cors_origins);

    // Crear router de la API
    let app_state = AppState::new(store, config.clone());

    let app = Router::new()
        .route("/test", get(test_endpoint))
        .nest("/api/cars", routes::vehicle_routes::create_vehicle_router())
        .nest(
            "/api/transactions",
            routes::transaction_routes::create_transaction_router(),
        )
        .nest(
            "/api/dashboard",
            routes::dashboard_routes::create_dashboard_router(),
        )
        .nest(
            "/api/customers",
            routes::customer_routes::create_customer_router(),
        )
        .nest("/api/users", routes::user_routes::create_user_router())
        .layer(cors)
        .with_state(app_state);

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;

    info!("🌐 Servidor iniciando en http://{}", addr);
    info!("🔍 Endpoints disponibles:");
    info!("   GET  /test - Endpoint de prueba");
    info!("🚗 Inventario:");
    info!("   POST /api/cars - Dar de alta vehículo");
    info!("   GET  /api/cars - Listar vehículos");
    info!("   GET  /api/cars/by-status - Filtrar por estado");
    info!("   GET  /api/cars/check-vin - Verificar VIN");
    info!("   GET  /api/cars/:id - Obtener vehículo");
    info!("   PUT  /api/cars/:id - Actualizar vehículo");
    info!("   DELETE /api/cars/:id - Eliminar vehículo");
    info!("📌 Reservas:");
    info!("   PUT  /api/cars/:id/reserve - Reservar vehículo");
    info!("   PUT  /api/cars/:id/back-to-sale - Cancelar reserva");
    info!("   PUT  /api/cars/:id/complete-reservation - Completar reserva");
    info!("💰 Transacciones:");
    info!("   POST /api/transactions - Venta directa");
    info!("   GET  /api/transactions - Listar transacciones");
    info!("   GET  /api/transactions/search - Buscar transacciones");
    info!("   GET  /api/transactions/:id - Obtener transacción");
    info!("   DELETE /api/transactions/:id - Eliminar transacción");
    info!("📊 Dashboard:");
    info!("   GET  /api/dashboard/stats - Estadísticas del negocio");
    info!("   GET  /api/dashboard/sales-trend - Tendencia mensual de ventas");
    info!("👤 Clientes:");
    info!("   POST /api/customers - Dar de alta cliente");
    info!("   GET  /api/customers - Listar clientes");
    info!("   GET  /api/customers/search - Buscar clientes");
    info!("   GET/PUT/DELETE /api/customers/:id - Cliente por id");
    info!("👥 Usuarios:");
    info!("   POST /api/users - Dar de alta usuario");
    info!("   GET  /api/users - Listar usuarios");
    info!("   GET  /api/users/by-role - Filtrar por rol");
    info!("   GET  /api/users/search - Buscar por nombre");
    info!("   GET/PUT/DELETE /api/users/:id - Usuario por id");
    info!("   PUT  /api/users/:id/status - Cambiar estado de cuenta");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| {
            error!("❌ Error del servidor: {}", e);
            anyhow::anyhow!(e)
        })?;

    info!("👋 Servidor terminado");
    Ok(())
}

/// Endpoint de prueba simple
async fn test_endpoint() -> Json<serde_json::Value> {
    Json(json!({
        "message": "¡AutoMaster backend funcionando correctamente!",
        "status": "ok",
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}

/// Señal de apagado graceful
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("🛑 Señal Ctrl+C recibida, apagando servidor...");
        },
        _ = terminate => {
            info!("🛑 Señal de terminación recibida, apagando servidor...");
        },
    }
}
