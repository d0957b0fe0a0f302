//! # Collection Repository
//!
//! Whole-collection load and save for the four shop collections.
//!
//! ## Write Paths
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Operator action           Repository call        Rows written          │
//! │  ───────────────           ───────────────        ────────────          │
//! │  cart add / remove / clear save_cart()            cart                  │
//! │  product save / remove     save_catalog()         catalog               │
//! │  customer save / remove    save_customers()       customers             │
//! │  checkout confirm          save_all()             all four, ONE tx      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Load Path
//! ```text
//! SELECT value ──► serde_json::Value ──► backfill pass ──► typed collection
//!                                             │
//!                                             └── changed? write it back
//! ```
//! A missing row decodes as an empty collection.
//!
//! ## Id Marks
//! The catalog and the customer registry carry the highest id they ever
//! assigned. It lives in `id_sequences` and is written in the same
//! transaction as its collection. On load it is restored, then raised above
//! any id the cart or orders still reference.

use chrono::Utc;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use sqlx::{Sqlite, SqlitePool, Transaction};
use std::fmt;
use tracing::{debug, info};

use crate::backfill;
use crate::error::{StoreError, StoreResult};
use maligai_core::{Cart, Catalog, CustomerRegistry, OrderLedger, ShopState};

const UPSERT_SQL: &str = r#"
    INSERT INTO collections (key, value, updated_at)
    VALUES (?1, ?2, ?3)
    ON CONFLICT (key) DO UPDATE SET
        value = excluded.value,
        updated_at = excluded.updated_at
"#;

const UPSERT_SEQUENCE_SQL: &str = r#"
    INSERT INTO id_sequences (collection, last_id)
    VALUES (?1, ?2)
    ON CONFLICT (collection) DO UPDATE SET
        last_id = MAX(last_id, excluded.last_id)
"#;

/// Row keys in the `collections` table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectionKey {
    Catalog,
    Cart,
    Customers,
    Orders,
}

impl CollectionKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            CollectionKey::Catalog => "catalog",
            CollectionKey::Cart => "cart",
            CollectionKey::Customers => "customers",
            CollectionKey::Orders => "orders",
        }
    }

    fn backfill(&self, doc: &mut Value) -> bool {
        match self {
            CollectionKey::Catalog => backfill::backfill_catalog(doc),
            CollectionKey::Cart => backfill::backfill_cart(doc),
            CollectionKey::Customers => backfill::backfill_customers(doc),
            CollectionKey::Orders => backfill::backfill_orders(doc),
        }
    }
}

impl fmt::Display for CollectionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Repository for the collection documents.
#[derive(Debug, Clone)]
pub struct CollectionRepository {
    pool: SqlitePool,
}

impl CollectionRepository {
    pub fn new(pool: SqlitePool) -> Self {
        CollectionRepository { pool }
    }

    /// Loads all four collections, upgrading old documents on the way.
    pub async fn load_state(&self) -> StoreResult<ShopState> {
        let mut state = ShopState {
            catalog: self.load_catalog().await?,
            cart: self.load(CollectionKey::Cart).await?,
            customers: self.load_customers().await?,
            orders: self.load(CollectionKey::Orders).await?,
        };
        state.reserve_referenced_ids();

        info!(
            products = state.catalog.len(),
            cart_lines = state.cart.item_count(),
            customers = state.customers.len(),
            orders = state.orders.len(),
            "Shop state loaded"
        );
        Ok(state)
    }

    pub async fn load_catalog(&self) -> StoreResult<Catalog> {
        let mut catalog: Catalog = self.load(CollectionKey::Catalog).await?;
        catalog.reserve_ids(self.last_id(CollectionKey::Catalog).await?);
        Ok(catalog)
    }

    pub async fn load_customers(&self) -> StoreResult<CustomerRegistry> {
        let mut customers: CustomerRegistry = self.load(CollectionKey::Customers).await?;
        customers.reserve_ids(self.last_id(CollectionKey::Customers).await?);
        Ok(customers)
    }

    pub async fn save_catalog(&self, catalog: &Catalog) -> StoreResult<()> {
        self.save_with_mark(CollectionKey::Catalog, catalog, catalog.last_id())
            .await
    }

    pub async fn save_cart(&self, cart: &Cart) -> StoreResult<()> {
        self.save(CollectionKey::Cart, cart).await
    }

    pub async fn save_customers(&self, customers: &CustomerRegistry) -> StoreResult<()> {
        self.save_with_mark(CollectionKey::Customers, customers, customers.last_id())
            .await
    }

    pub async fn save_orders(&self, orders: &OrderLedger) -> StoreResult<()> {
        self.save(CollectionKey::Orders, orders).await
    }

    /// Writes all four collections in one transaction.
    ///
    /// Either every row is replaced or none is.
    pub async fn save_all(&self, state: &ShopState) -> StoreResult<()> {
        // Encode everything first so a serialization error never opens a tx.
        let docs = [
            (CollectionKey::Catalog, encode(CollectionKey::Catalog, &state.catalog)?),
            (CollectionKey::Cart, encode(CollectionKey::Cart, &state.cart)?),
            (CollectionKey::Customers, encode(CollectionKey::Customers, &state.customers)?),
            (CollectionKey::Orders, encode(CollectionKey::Orders, &state.orders)?),
        ];

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| StoreError::TransactionFailed(e.to_string()))?;

        for (key, json) in &docs {
            upsert(&mut tx, *key, json).await?;
        }
        upsert_mark(&mut tx, CollectionKey::Catalog, state.catalog.last_id()).await?;
        upsert_mark(&mut tx, CollectionKey::Customers, state.customers.last_id()).await?;

        tx.commit()
            .await
            .map_err(|e| StoreError::TransactionFailed(e.to_string()))?;

        debug!(orders = state.orders.len(), "All collections saved");
        Ok(())
    }

    /// Raw stored text for a key, if the row exists.
    pub async fn load_raw(&self, key: CollectionKey) -> StoreResult<Option<String>> {
        let value: Option<String> =
            sqlx::query_scalar("SELECT value FROM collections WHERE key = ?1")
                .bind(key.as_str())
                .fetch_optional(&self.pool)
                .await?;
        Ok(value)
    }

    /// Overwrites the stored text for a key.
    pub async fn save_raw(&self, key: CollectionKey, json: &str) -> StoreResult<()> {
        sqlx::query(UPSERT_SQL)
            .bind(key.as_str())
            .bind(json)
            .bind(Utc::now().to_rfc3339())
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn load<T>(&self, key: CollectionKey) -> StoreResult<T>
    where
        T: DeserializeOwned + Default,
    {
        let Some(raw) = self.load_raw(key).await? else {
            debug!(key = %key, "Collection not stored yet");
            return Ok(T::default());
        };

        let mut doc: Value =
            serde_json::from_str(&raw).map_err(|e| StoreError::corrupt(key.as_str(), e))?;

        let upgraded = key.backfill(&mut doc);
        if upgraded {
            info!(key = %key, "Back-filled collection from an older layout");
            self.save_raw(key, &doc.to_string()).await?;
        }

        serde_json::from_value(doc).map_err(|e| StoreError::corrupt(key.as_str(), e))
    }

    /// Highest id ever assigned in `key`, 0 when none is stored.
    pub async fn last_id(&self, key: CollectionKey) -> StoreResult<i64> {
        let last: Option<i64> =
            sqlx::query_scalar("SELECT last_id FROM id_sequences WHERE collection = ?1")
                .bind(key.as_str())
                .fetch_optional(&self.pool)
                .await?;
        Ok(last.unwrap_or(0))
    }

    /// Saves a collection and its id mark together.
    async fn save_with_mark<T: Serialize>(
        &self,
        key: CollectionKey,
        collection: &T,
        last_id: i64,
    ) -> StoreResult<()> {
        let json = encode(key, collection)?;

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| StoreError::TransactionFailed(e.to_string()))?;
        upsert(&mut tx, key, &json).await?;
        upsert_mark(&mut tx, key, last_id).await?;
        tx.commit()
            .await
            .map_err(|e| StoreError::TransactionFailed(e.to_string()))?;

        debug!(key = %key, bytes = json.len(), last_id, "Collection saved");
        Ok(())
    }

    async fn save<T: Serialize>(&self, key: CollectionKey, collection: &T) -> StoreResult<()> {
        let json = encode(key, collection)?;
        self.save_raw(key, &json).await?;
        debug!(key = %key, bytes = json.len(), "Collection saved");
        Ok(())
    }
}

fn encode<T: Serialize>(key: CollectionKey, collection: &T) -> StoreResult<String> {
    serde_json::to_string(collection).map_err(|e| StoreError::corrupt(key.as_str(), e))
}

async fn upsert(
    tx: &mut Transaction<'_, Sqlite>,
    key: CollectionKey,
    json: &str,
) -> StoreResult<()> {
    sqlx::query(UPSERT_SQL)
        .bind(key.as_str())
        .bind(json)
        .bind(Utc::now().to_rfc3339())
        .execute(&mut **tx)
        .await?;
    Ok(())
}

async fn upsert_mark(
    tx: &mut Transaction<'_, Sqlite>,
    key: CollectionKey,
    last_id: i64,
) -> StoreResult<()> {
    sqlx::query(UPSERT_SEQUENCE_SQL)
        .bind(key.as_str())
        .bind(last_id)
        .execute(&mut **tx)
        .await?;
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use chrono::TimeZone;
    use maligai_core::{CheckoutSession, CustomerDraft, Money, ProductDraft, Quantity};

    async fn db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    fn onion() -> ProductDraft {
        ProductDraft {
            name: "Onion".to_string(),
            category: "vegetables".to_string(),
            price: Money::from_paise(4500),
            unit: "kg".to_string(),
            stock: Quantity::from_units(10),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_empty_database_loads_empty_state() {
        let db = db().await;
        let state = db.collections().load_state().await.unwrap();
        assert_eq!(state, ShopState::default());
    }

    #[tokio::test]
    async fn test_save_all_round_trip_after_checkout() {
        let db = db().await;
        let repo = db.collections();

        let mut shop = ShopState::new();
        shop.catalog.upsert(onion()).unwrap();
        shop.add_to_cart(1, Quantity::from_units(6)).unwrap();
        let mut session = CheckoutSession::open(&shop).unwrap();
        let now = Utc.with_ymd_and_hms(2026, 3, 14, 9, 30, 0).unwrap();
        session.confirm(&mut shop, now).unwrap();

        repo.save_all(&shop).await.unwrap();
        let loaded = repo.load_state().await.unwrap();

        assert_eq!(loaded, shop);
        assert_eq!(loaded.catalog.get(1).unwrap().stock, Quantity::from_units(4));
        assert!(loaded.cart.is_empty());
        assert_eq!(loaded.orders.get(1).unwrap().total, Money::from_paise(27000));
    }

    #[tokio::test]
    async fn test_single_collection_saves() {
        let db = db().await;
        let repo = db.collections();

        let mut shop = ShopState::new();
        shop.catalog.upsert(onion()).unwrap();
        repo.save_catalog(&shop.catalog).await.unwrap();
        shop.add_to_cart(1, Quantity::ONE).unwrap();
        repo.save_cart(&shop.cart).await.unwrap();

        let loaded = repo.load_state().await.unwrap();
        assert_eq!(loaded.catalog, shop.catalog);
        assert_eq!(loaded.cart, shop.cart);
        assert!(loaded.orders.is_empty());
    }

    #[tokio::test]
    async fn test_legacy_documents_are_upgraded_and_rewritten() {
        let db = db().await;
        let repo = db.collections();

        repo.save_raw(
            CollectionKey::Catalog,
            r#"[{"id":1,"name":"Onion","category":"vegetables","price":45,"unit":"kg","stock":50}]"#,
        )
        .await
        .unwrap();
        repo.save_raw(
            CollectionKey::Customers,
            r#"[{"id":1,"name":"Ravi","phone":"98400","orders":[1]}]"#,
        )
        .await
        .unwrap();

        let state = repo.load_state().await.unwrap();
        assert_eq!(state.catalog.get(1).unwrap().image, "");
        assert_eq!(state.customers.get(1).unwrap().order_ids, vec![1]);

        let raw = repo.load_raw(CollectionKey::Customers).await.unwrap().unwrap();
        assert!(raw.contains("orderIds"));
        assert!(!raw.contains("\"orders\""));
    }

    #[tokio::test]
    async fn test_deleted_ids_stay_retired_across_reload() {
        let db = db().await;
        let repo = db.collections();

        let mut shop = ShopState::new();
        shop.catalog.upsert(onion()).unwrap();
        let ravi = shop
            .customers
            .upsert(CustomerDraft {
                id: None,
                name: "Ravi".to_string(),
                phone: "9840011111".to_string(),
            })
            .unwrap();
        repo.save_all(&shop).await.unwrap();

        shop.catalog.remove(1);
        shop.customers.remove(ravi.id);
        repo.save_catalog(&shop.catalog).await.unwrap();
        repo.save_customers(&shop.customers).await.unwrap();

        let mut loaded = repo.load_state().await.unwrap();
        assert!(loaded.catalog.is_empty());
        assert_eq!(repo.last_id(CollectionKey::Catalog).await.unwrap(), 1);

        let sugar = loaded
            .catalog
            .upsert(ProductDraft {
                name: "Sugar".to_string(),
                ..onion()
            })
            .unwrap();
        let meena = loaded
            .customers
            .upsert(CustomerDraft {
                id: None,
                name: "Meena".to_string(),
                phone: "9840022222".to_string(),
            })
            .unwrap();
        assert_eq!(sugar.id, 2);
        assert_eq!(meena.id, 2);
    }

    #[tokio::test]
    async fn test_ids_referenced_by_cart_are_reserved_without_marks() {
        let db = db().await;
        let repo = db.collections();

        // A shop saved before id marks existed: product 5 only survives
        // inside the cart.
        repo.save_raw(
            CollectionKey::Cart,
            r#"[{"productId":5,"name":"Potato","price":35,"unit":"kg","quantity":2,"total":70}]"#,
        )
        .await
        .unwrap();

        let mut loaded = repo.load_state().await.unwrap();
        let sugar = loaded.catalog.upsert(onion()).unwrap();
        assert_eq!(sugar.id, 6);
    }

    #[tokio::test]
    async fn test_corrupt_collection_is_reported() {
        let db = db().await;
        let repo = db.collections();
        repo.save_raw(CollectionKey::Orders, "not json").await.unwrap();

        match repo.load_state().await {
            Err(StoreError::Corrupt { key, .. }) => assert_eq!(key, "orders"),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_state_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("shop.db");

        let mut shop = ShopState::new();
        shop.catalog.upsert(onion()).unwrap();
        {
            let db = Database::new(DbConfig::new(&path)).await.unwrap();
            db.collections().save_all(&shop).await.unwrap();
            db.close().await;
        }

        let db = Database::new(DbConfig::new(&path)).await.unwrap();
        let loaded = db.collections().load_state().await.unwrap();
        assert_eq!(loaded.catalog, shop.catalog);
    }
}
