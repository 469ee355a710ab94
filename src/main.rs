use commande_admin_rust::{api, create_pool, AppConfig, ChangeBus, PgDocumentStore};
use tokio::sync::broadcast::error::RecvError;
use tower::ServiceBuilder;
use tracing::{info, warn};
use tracing_subscriber::fmt::time::ChronoLocal;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 初始化日志 - 本地时间格式
    tracing_subscriber::fmt()
        .with_timer(ChronoLocal::new("%Y-%m-%d %H:%M:%S".to_string()))
        .with_target(true)
        .with_level(true)
        .init();

    // 加载配置
    let config = AppConfig::from_env();
    info!("Starting server with config: {:?}", config);

    // 创建数据库连接池
    let pool = create_pool(&config.database).await?;
    info!("Database pool created");

    // 变更总线: 记录所有保存/删除事件
    let bus = ChangeBus::default();
    let mut changes = bus.subscribe();
    tokio::spawn(async move {
        loop {
            match changes.recv().await {
                Ok(event) => info!("data changed: {} {} {:?}", event.resource, event.id, event.action),
                Err(RecvError::Lagged(skipped)) => warn!("change log lagged, {} events skipped", skipped),
                Err(RecvError::Closed) => break,
            }
        }
    });

    let documents = PgDocumentStore::new(pool, config.persistence.write_timeout());
    let state = api::AppState::new(documents, bus, config.persistence.submit_timeout());

    let app = api::router(state).layer(ServiceBuilder::new());

    // 启动服务器
    let addr = config.server_addr();
    info!("Server listening on {}", addr);
    info!("API Endpoints:");
    info!("  GET|POST|PUT|DELETE /api/export      - export declarations");
    info!("  GET                 /api/export/:id/csv");
    info!("  GET|POST|PUT|DELETE /api/livraison   - deliveries");
    info!("  GET|POST|PUT|DELETE /api/client-model");
    info!("  GET|POST            /api/commande");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
