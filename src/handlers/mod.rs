pub mod changes;
pub mod departments;
pub mod inventory;
pub mod stores;
pub mod transfers;

use crate::cache::InMemoryCache;
use crate::config::CacheConfig;
use crate::db::DbPool;
use crate::events::EventSender;
use std::sync::Arc;
use std::time::Duration;

// Re-export AppState so handler modules can import it as crate::handlers::AppState
pub use crate::AppState;

/// Services layer that encapsulates business logic used by HTTP handlers
#[derive(Clone)]
pub struct AppServices {
    pub inventory: Arc<crate::services::inventory::InventoryService>,
    pub transfers: Arc<crate::services::transfers::TransferService>,
    pub changes: Arc<crate::services::changes::ChangeLedgerService>,
    pub stores: Arc<crate::services::stores::StoreService>,
    pub departments: Arc<crate::services::departments::DepartmentService>,
}

impl AppServices {
    pub fn new(db_pool: Arc<DbPool>, event_sender: EventSender, cache_cfg: &CacheConfig) -> Self {
        let inventory_cache = Arc::new(InMemoryCache::new());
        let stores_cache = Arc::new(InMemoryCache::new());

        let inventory = Arc::new(crate::services::inventory::InventoryService::new(
            db_pool.clone(),
            event_sender.clone(),
            inventory_cache,
            Duration::from_secs(cache_cfg.inventory_ttl_secs),
        ));
        let transfers = Arc::new(crate::services::transfers::TransferService::new(
            db_pool.clone(),
            event_sender.clone(),
        ));
        let changes = Arc::new(crate::services::changes::ChangeLedgerService::new(
            db_pool.clone(),
            event_sender.clone(),
        ));
        let stores = Arc::new(crate::services::stores::StoreService::new(
            db_pool.clone(),
            event_sender,
            stores_cache,
            Duration::from_secs(cache_cfg.stores_ttl_secs),
        ));
        let departments = Arc::new(crate::services::departments::DepartmentService::new(db_pool));

        Self {
            inventory,
            transfers,
            changes,
            stores,
            departments,
        }
    }
}
