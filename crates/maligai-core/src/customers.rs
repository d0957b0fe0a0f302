//! # Customer Registry
//!
//! Create, edit and delete customers.
//!
//! ## Phone Uniqueness
//! ```text
//! create (id: None)      ──► phone checked against every customer
//! edit   (id: Some(n))   ──► NOT checked; two customers may end up
//!                            sharing a phone this way
//! ```
//! The edit path keeps that behavior on purpose until the shop decides
//! otherwise; see the registry tests that pin it.
//!
//! Ids follow a high-water mark like the catalog's: a deleted customer's id
//! is never given to a new one, so past orders never show up under someone
//! else's history.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{CoreError, CoreResult};
use crate::types::{next_id, Customer, CustomerDraft};
use crate::validation::{validate_name, validate_phone};

/// The customer registry. Persisted as a bare JSON array; `last_id` is
/// stored next to it by the store.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CustomerRegistry {
    customers: Vec<Customer>,
    last_id: i64,
}

impl CustomerRegistry {
    pub fn new() -> Self {
        CustomerRegistry::default()
    }

    pub fn from_customers(customers: Vec<Customer>) -> Self {
        let last_id = customers.iter().map(|c| c.id).max().unwrap_or(0);
        CustomerRegistry { customers, last_id }
    }

    /// Highest id ever assigned, including deleted customers.
    pub fn last_id(&self) -> i64 {
        self.last_id
    }

    /// Makes sure no id at or below `floor` is assigned again.
    pub fn reserve_ids(&mut self, floor: i64) {
        self.last_id = self.last_id.max(floor);
    }

    /// Creates or edits a customer.
    ///
    /// ## Errors
    /// - `DuplicatePhone` when creating with a phone already on file
    /// - `Validation` for an empty name or malformed phone
    pub fn upsert(&mut self, draft: CustomerDraft) -> CoreResult<Customer> {
        validate_name("name", &draft.name)?;
        validate_phone(&draft.phone)?;

        let name = draft.name.trim().to_string();
        let phone = draft.phone.trim().to_string();

        if let Some(id) = draft.id {
            if let Some(customer) = self.customers.iter_mut().find(|c| c.id == id) {
                customer.name = name;
                customer.phone = phone;
                return Ok(customer.clone());
            }
        }

        if self.customers.iter().any(|c| c.phone == phone) {
            return Err(CoreError::DuplicatePhone { phone });
        }

        let id = next_id(
            self.customers
                .iter()
                .map(|c| c.id)
                .chain(std::iter::once(self.last_id)),
        );
        self.last_id = id;

        let customer = Customer {
            id,
            name,
            phone,
            order_ids: Vec::new(),
        };
        self.customers.push(customer.clone());
        Ok(customer)
    }

    /// Deletes a customer. Their orders stay in the ledger untouched.
    pub fn remove(&mut self, id: i64) -> Option<Customer> {
        let index = self.customers.iter().position(|c| c.id == id)?;
        Some(self.customers.remove(index))
    }

    pub fn get(&self, id: i64) -> Option<&Customer> {
        self.customers.iter().find(|c| c.id == id)
    }

    /// Appends `order_id` to a customer's history.
    ///
    /// Only the checkout engine calls this.
    pub(crate) fn record_order(&mut self, customer_id: i64, order_id: i64) -> CoreResult<()> {
        let customer = self
            .customers
            .iter_mut()
            .find(|c| c.id == customer_id)
            .ok_or(CoreError::CustomerNotFound(customer_id))?;
        customer.order_ids.push(order_id);
        Ok(())
    }

    pub fn customers(&self) -> &[Customer] {
        &self.customers
    }

    pub fn len(&self) -> usize {
        self.customers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.customers.is_empty()
    }
}

impl Serialize for CustomerRegistry {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.customers.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for CustomerRegistry {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Vec::<Customer>::deserialize(deserializer).map(CustomerRegistry::from_customers)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn draft(id: Option<i64>, name: &str, phone: &str) -> CustomerDraft {
        CustomerDraft {
            id,
            name: name.to_string(),
            phone: phone.to_string(),
        }
    }

    #[test]
    fn test_create_assigns_ids() {
        let mut registry = CustomerRegistry::new();
        let a = registry.upsert(draft(None, "Ravi", "9840011111")).unwrap();
        let b = registry.upsert(draft(None, "Meena", "9840022222")).unwrap();
        assert_eq!((a.id, b.id), (1, 2));
        assert!(a.order_ids.is_empty());
    }

    #[test]
    fn test_deleted_max_id_is_not_reused() {
        let mut registry = CustomerRegistry::new();
        registry.upsert(draft(None, "Ravi", "9840011111")).unwrap();
        let meena = registry.upsert(draft(None, "Meena", "9840022222")).unwrap();
        registry.remove(meena.id);

        let kumar = registry.upsert(draft(None, "Kumar", "9840033333")).unwrap();
        assert_eq!(kumar.id, 3);

        // A restart rebuilds the registry from JSON; the store then restores
        // the mark it kept.
        let json = serde_json::to_string(&registry).unwrap();
        let mut reloaded: CustomerRegistry = serde_json::from_str(&json).unwrap();
        registry.remove(kumar.id);
        reloaded.remove(kumar.id);
        reloaded.reserve_ids(registry.last_id());
        let next = reloaded.upsert(draft(None, "Lakshmi", "9840044444")).unwrap();
        assert_eq!(next.id, 4);
    }

    #[test]
    fn test_create_with_duplicate_phone_fails() {
        let mut registry = CustomerRegistry::new();
        registry.upsert(draft(None, "Ravi", "9840011111")).unwrap();

        let err = registry
            .upsert(draft(None, "Someone Else", "9840011111"))
            .unwrap_err();
        assert!(matches!(err, CoreError::DuplicatePhone { .. }));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_edit_may_reuse_another_customers_phone() {
        let mut registry = CustomerRegistry::new();
        registry.upsert(draft(None, "Ravi", "9840011111")).unwrap();
        let meena = registry.upsert(draft(None, "Meena", "9840022222")).unwrap();

        let edited = registry
            .upsert(draft(Some(meena.id), "Meena", "9840011111"))
            .unwrap();
        assert_eq!(edited.phone, "9840011111");
        assert_eq!(
            registry
                .customers()
                .iter()
                .filter(|c| c.phone == "9840011111")
                .count(),
            2
        );
    }

    #[test]
    fn test_edit_keeps_order_history() {
        let mut registry = CustomerRegistry::new();
        let ravi = registry.upsert(draft(None, "Ravi", "9840011111")).unwrap();
        registry.record_order(ravi.id, 7).unwrap();

        let edited = registry
            .upsert(draft(Some(ravi.id), "Ravi K", "9840011111"))
            .unwrap();
        assert_eq!(edited.order_ids, vec![7]);
    }

    #[test]
    fn test_record_order_unknown_customer() {
        let mut registry = CustomerRegistry::new();
        assert!(matches!(
            registry.record_order(3, 1),
            Err(CoreError::CustomerNotFound(3))
        ));
    }
}
