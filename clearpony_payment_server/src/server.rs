use std::{future::Future, pin::Pin, time::Duration};

use actix_web::{dev::Server, http::KeepAlive, middleware::Logger, web, App, HttpServer};
use clearpony_payment_engine::{
    events::{EventHandlers, EventHooks, EventProducers},
    MerchantApi,
    PaymentFlowApi,
    SqliteDatabase,
};

use crate::{
    config::{ServerConfig, ServerOptions, EVENT_BUFFER_SIZE},
    errors::ServerError,
    expiry_worker::start_expiry_worker,
    notifier,
    notifier::Notifier,
    routes::{blockchain_webhook, create_intent, create_merchant, health, intent_by_id, merchant_by_id},
};

pub async fn run_server(config: ServerConfig) -> Result<(), ServerError> {
    let db = SqliteDatabase::new_with_url(&config.database_url, 25)
        .await
        .map_err(|e| ServerError::InitializeError(e.to_string()))?;
    db.run_migrations().await.map_err(|e| ServerError::InitializeError(e.to_string()))?;

    // Confirmation dispatch runs on the event channel, outside the reconciliation consistency boundary. A dead
    // callback endpoint can therefore never block or roll back a payment.
    let notifier = Notifier::new(config.notifier_timeout)?;
    let mut hooks = EventHooks::default();
    {
        let db = db.clone();
        hooks.on_payment_confirmed(move |event| {
            let notifier = notifier.clone();
            let db = db.clone();
            Box::pin(async move {
                notifier::handle_confirmation(notifier, db, event).await;
            }) as Pin<Box<dyn Future<Output = ()> + Send>>
        });
    }
    let handlers = EventHandlers::new(EVENT_BUFFER_SIZE, hooks);
    let producers = handlers.producers();
    handlers.start_handlers().await;

    start_expiry_worker(db.clone(), producers.clone(), config.expiry_interval);

    let srv = create_server_instance(config, db, producers)?;
    srv.await.map_err(|e| ServerError::Unspecified(e.to_string()))
}

pub fn create_server_instance(
    config: ServerConfig,
    db: SqliteDatabase,
    producers: EventProducers,
) -> Result<Server, ServerError> {
    let options = ServerOptions::from_config(&config);
    let srv = HttpServer::new(move || {
        let payments_api = PaymentFlowApi::new(db.clone(), producers.clone());
        let merchants_api = MerchantApi::new(db.clone());
        App::new()
            .wrap(Logger::new("%t (%D ms) %s %a %{Host}i %U").log_target("cpg::access_log"))
            .app_data(web::Data::new(payments_api))
            .app_data(web::Data::new(merchants_api))
            .app_data(web::Data::new(options))
            .service(health)
            .service(web::resource("/merchants").route(web::post().to(create_merchant::<SqliteDatabase>)))
            .service(web::resource("/merchants/{id}").route(web::get().to(merchant_by_id::<SqliteDatabase>)))
            .service(web::resource("/payment-intents").route(web::post().to(create_intent::<SqliteDatabase>)))
            .service(web::resource("/payment-intents/{id}").route(web::get().to(intent_by_id::<SqliteDatabase>)))
            .service(web::resource("/webhooks/blockchain").route(web::post().to(blockchain_webhook::<SqliteDatabase>)))
    })
    .keep_alive(KeepAlive::Timeout(Duration::from_secs(600)))
    .bind((config.host.as_str(), config.port))?
    .run();
    Ok(srv)
}
