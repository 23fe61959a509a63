use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    error::{AppResult, Validator},
    models::Address,
};

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateAddressRequest {
    pub full_name: String,
    pub phone: String,
    pub street_address: String,
    pub city: String,
    pub state: String,
    pub postal_code: String,
}

impl CreateAddressRequest {
    pub fn validate(&self) -> AppResult<()> {
        let required = |value: &str| !value.trim().is_empty();
        Validator::new()
            .check(required(&self.full_name), "full_name is required")
            .check(self.full_name.len() <= 100, "full_name must be at most 100 characters")
            .check(required(&self.phone), "phone is required")
            .check(self.phone.len() <= 15, "phone must be at most 15 characters")
            .check(required(&self.street_address), "street_address is required")
            .check(required(&self.city), "city is required")
            .check(self.city.len() <= 50, "city must be at most 50 characters")
            .check(required(&self.state), "state is required")
            .check(self.state.len() <= 50, "state must be at most 50 characters")
            .check(required(&self.postal_code), "postal_code is required")
            .check(self.postal_code.len() <= 10, "postal_code must be at most 10 characters")
            .finish()
    }
}

#[derive(Serialize, ToSchema)]
#[serde(transparent)]
pub struct AddressList {
    #[schema(value_type = Vec<Address>)]
    pub items: Vec<Address>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;

    fn address() -> CreateAddressRequest {
        CreateAddressRequest {
            full_name: "Asha Rao".into(),
            phone: "9876543210".into(),
            street_address: "12 MG Road".into(),
            city: "Bengaluru".into(),
            state: "Karnataka".into(),
            postal_code: "560001".into(),
        }
    }

    #[test]
    fn complete_address_is_valid() {
        assert!(address().validate().is_ok());
    }

    #[test]
    fn long_postal_code_and_missing_city_are_reported() {
        let mut req = address();
        req.city = String::new();
        req.postal_code = "56000100000".into();
        match req.validate() {
            Err(AppError::Validation(errors)) => assert_eq!(
                errors,
                vec!["city is required", "postal_code must be at most 10 characters"]
            ),
            other => panic!("unexpected result: {other:?}"),
        }
    }
}
