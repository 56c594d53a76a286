use clearpony_payment_engine::{db_types::PaymentIntent, events::EventProducers, PaymentFlowApi, SqliteDatabase};
use log::*;
use tokio::task::JoinHandle;

/// Starts the intent expiry worker. Do not await the returned JoinHandle, as it will run indefinitely.
///
/// The sweep calls the same guarded state transition that payments use, so it can never race a concurrent
/// reconciliation into an inconsistent state: a pending intent becomes either `Paid` or `Expired`, exactly once.
pub fn start_expiry_worker(
    db: SqliteDatabase,
    producers: EventProducers,
    interval: std::time::Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut timer = tokio::time::interval(interval);
        let api = PaymentFlowApi::new(db, producers);
        info!("🕰️ Intent expiry worker started");
        loop {
            timer.tick().await;
            trace!("🕰️ Running intent expiry job");
            match api.expire_intents().await {
                Ok(expired) if expired.is_empty() => {},
                Ok(expired) => {
                    info!("🕰️ {} intents expired", expired.len());
                    debug!("🕰️ Expired intents: {}", intent_list(&expired));
                },
                Err(e) => {
                    error!("🕰️ Error running intent expiry job: {e}");
                },
            }
        }
    })
}

fn intent_list(intents: &[PaymentIntent]) -> String {
    intents
        .iter()
        .map(|i| format!("[{}] merchant: {} amount: {}", i.id, i.merchant_id, i.amount))
        .collect::<Vec<String>>()
        .join(", ")
}
