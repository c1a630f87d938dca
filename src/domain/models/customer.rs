use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use crate::domain::models::address::Address;

#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct Customer {
    pub id: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub phone_number: Option<String>,
    pub address: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Customer {
    pub fn new(full_name: &str, email: String, contact: &Address) -> Self {
        let (first_name, last_name) = split_name(full_name);
        let now = Utc::now();

        Self {
            id: Uuid::new_v4().to_string(),
            email,
            first_name,
            last_name,
            phone_number: None,
            address: contact.address.clone(),
            city: contact.city.clone(),
            state: contact.state.clone(),
            zip_code: contact.zip_code.clone(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name).trim().to_string()
    }

    pub fn contact_address(&self) -> Address {
        Address {
            address: self.address.clone(),
            city: self.city.clone(),
            state: self.state.clone(),
            zip_code: self.zip_code.clone(),
        }
    }

    /// Overwrites the stored contact address. Returns false when nothing changed.
    pub fn apply_contact_address(&mut self, contact: &Address) -> bool {
        if self.contact_address() == *contact {
            return false;
        }

        self.address = contact.address.clone();
        self.city = contact.city.clone();
        self.state = contact.state.clone();
        self.zip_code = contact.zip_code.clone();
        self.updated_at = Utc::now();
        true
    }
}

/// Splits on the first space: "Mary Ann Smith" -> ("Mary", "Ann Smith").
pub fn split_name(full_name: &str) -> (String, String) {
    let trimmed = full_name.trim();
    match trimmed.split_once(' ') {
        Some((first, last)) => (first.to_string(), last.trim().to_string()),
        None => (trimmed.to_string(), String::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_splits_on_first_space() {
        assert_eq!(split_name("John Doe"), ("John".into(), "Doe".into()));
        assert_eq!(split_name("Mary Ann Smith"), ("Mary".into(), "Ann Smith".into()));
        assert_eq!(split_name("Cher"), ("Cher".into(), String::new()));
    }

    #[test]
    fn unchanged_address_keeps_timestamp() {
        let addr = Address::new("1 Field Rd", "Darlington", "IN", "47940");
        let mut customer = Customer::new("Jane Doe", "jane@example.com".into(), &addr);
        let before = customer.updated_at;

        assert!(!customer.apply_contact_address(&addr));
        assert_eq!(customer.updated_at, before);

        let moved = Address::new("2 Barn Ln", "Crawfordsville", "IN", "47933");
        assert!(customer.apply_contact_address(&moved));
        assert_eq!(customer.city, "Crawfordsville");
        assert_eq!(customer.full_name(), "Jane Doe");
    }
}
