//! Client identity resolution.

use std::sync::Arc;

use tracing::{debug, error};
use uuid::Uuid;

use crate::error::StoreError;
use crate::models::invoice::ClientContact;

use super::Database;

/// Resolves a billed party's contact block to a stable client id.
///
/// Resolution order: exact email match, then exact phone match, then a
/// new identity. An existing identity is never updated from a new
/// document's contact block.
pub struct ClientResolver {
    db: Arc<Database>,
}

impl ClientResolver {
    /// Create a resolver over the given database.
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// Resolve a contact block to a client id.
    ///
    /// Never fails: any store error falls back to a placeholder
    /// identity so client handling cannot abort invoice persistence.
    pub fn resolve(&self, contact: &ClientContact) -> String {
        match self.try_resolve(contact) {
            Ok(id) => id,
            Err(e) => {
                error!("client resolution failed, using placeholder: {}", e);
                self.placeholder()
            }
        }
    }

    fn try_resolve(&self, contact: &ClientContact) -> Result<String, StoreError> {
        if let Some(email) = contact.email.as_deref() {
            if let Some(existing) = self.db.find_client_by_email(email)? {
                debug!("matched client {} by email", existing.id);
                return Ok(existing.id);
            }
        }

        if let Some(phone) = contact.phone.as_deref() {
            if let Some(existing) = self.db.find_client_by_phone(phone)? {
                debug!("matched client {} by phone", existing.id);
                return Ok(existing.id);
            }
        }

        let name = contact.name.as_deref().unwrap_or("Unknown Client");
        self.db.insert_client(
            name,
            contact.email.as_deref(),
            contact.phone.as_deref(),
            contact.address.as_deref(),
        )
    }

    fn placeholder(&self) -> String {
        self.db
            .insert_client("Unknown Client", Some("unknown@example.com"), None, None)
            .unwrap_or_else(|e| {
                error!("placeholder client creation failed: {}", e);
                Uuid::new_v4().to_string()
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn contact(email: Option<&str>, phone: Option<&str>) -> ClientContact {
        ClientContact {
            name: Some("Acme Corp".to_string()),
            email: email.map(String::from),
            phone: phone.map(String::from),
            address: None,
        }
    }

    #[test]
    fn test_same_email_resolves_to_same_identity() {
        let db = Arc::new(Database::open_in_memory().unwrap());
        let resolver = ClientResolver::new(db.clone());

        let first = resolver.resolve(&contact(Some("a@a.com"), None));
        let second = resolver.resolve(&contact(Some("a@a.com"), None));

        assert_eq!(first, second);
        assert_eq!(db.client_count().unwrap(), 1);
    }

    #[test]
    fn test_phone_fallback_when_no_email() {
        let db = Arc::new(Database::open_in_memory().unwrap());
        let resolver = ClientResolver::new(db.clone());

        let first = resolver.resolve(&contact(None, Some("+1 555-0100")));
        let second = resolver.resolve(&contact(None, Some("+1 555-0100")));

        assert_eq!(first, second);
        assert_eq!(db.client_count().unwrap(), 1);
    }

    #[test]
    fn test_empty_contact_creates_unknown_client() {
        let db = Arc::new(Database::open_in_memory().unwrap());
        let resolver = ClientResolver::new(db.clone());

        let id = resolver.resolve(&ClientContact::default());
        let found = db.find_client_by_phone("nope").unwrap();
        assert!(found.is_none());
        assert!(!id.is_empty());
        assert_eq!(db.client_count().unwrap(), 1);
    }

    #[test]
    fn test_existing_identity_not_mutated() {
        let db = Arc::new(Database::open_in_memory().unwrap());
        let resolver = ClientResolver::new(db.clone());

        resolver.resolve(&contact(Some("a@a.com"), None));

        let renamed = ClientContact {
            name: Some("Acme Holdings".to_string()),
            email: Some("a@a.com".to_string()),
            phone: None,
            address: None,
        };
        resolver.resolve(&renamed);

        let found = db.find_client_by_email("a@a.com").unwrap().unwrap();
        assert_eq!(found.name, "Acme Corp");
    }
}
