use actix_web::{HttpResponse, Responder, web};
use serde_json::json;
use tracing::warn;

use crate::model::collections;
use crate::store::DocStore;

/// Static list of the collections this backend manages.
pub async fn schema() -> impl Responder {
    HttpResponse::Ok().json(json!({ "collections": collections::ALL }))
}

/// Connectivity probe: pings the store and reports which collections hold
/// data. Always answers 200 so the backend itself reads as alive.
pub async fn store_probe(store: web::Data<DocStore>) -> impl Responder {
    match store.ping().await {
        Ok(()) => {
            let names = store.collection_names().await.unwrap_or_else(|e| {
                warn!(error = %e, "collection listing failed during probe");
                Vec::new()
            });
            HttpResponse::Ok().json(json!({
                "backend": "running",
                "database": "connected",
                "collections": names,
            }))
        }
        Err(e) => {
            warn!(error = %e, "store probe failed");
            HttpResponse::Ok().json(json!({
                "backend": "running",
                "database": "unavailable",
                "collections": [],
            }))
        }
    }
}
