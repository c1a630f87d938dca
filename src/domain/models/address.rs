use serde::{Deserialize, Serialize};

/// A US-style street address, used both for event sites and customer contact details.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    pub address: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
}

impl Address {
    pub fn new(address: impl Into<String>, city: impl Into<String>, state: impl Into<String>, zip_code: impl Into<String>) -> Self {
        Self {
            address: address.into().trim().to_string(),
            city: city.into().trim().to_string(),
            state: state.into().trim().to_string(),
            zip_code: zip_code.into().trim().to_string(),
        }
    }

    /// Single-line form handed to the geocoder, e.g. `123 Main St, Anytown, CA 12345`.
    pub fn formatted(&self) -> String {
        format!("{}, {}, {} {}", self.address, self.city, self.state, self.zip_code)
    }

    pub fn is_complete(&self) -> bool {
        [&self.address, &self.city, &self.state, &self.zip_code]
            .iter()
            .all(|part| !part.trim().is_empty())
    }
}

/// The address stored on the customer record: billing when one was given, otherwise the event site.
pub fn contact_address(event_address: &Address, billing_address: Option<&Address>) -> Address {
    billing_address
        .filter(|billing| billing.is_complete())
        .unwrap_or(event_address)
        .clone()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_single_line() {
        let a = Address::new("123 Main St", "Anytown", "CA", "12345");
        assert_eq!(a.formatted(), "123 Main St, Anytown, CA 12345");
    }

    #[test]
    fn billing_overrides_event_address_only_when_complete() {
        let event = Address::new("1 Field Rd", "Darlington", "IN", "47940");
        let billing = Address::new("9 Office Way", "Lafayette", "IN", "47901");
        let partial = Address::new("9 Office Way", "", "IN", "47901");

        assert_eq!(contact_address(&event, Some(&billing)), billing);
        assert_eq!(contact_address(&event, Some(&partial)), event);
        assert_eq!(contact_address(&event, None), event);
    }
}
