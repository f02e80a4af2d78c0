use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

/// Shipping and contact details as typed into the checkout form.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CheckoutForm {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
}

/// A form that passed validation, trimmed and normalized.
#[derive(Debug, Clone, PartialEq)]
pub struct ShippingDetails {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Name must be between 3 and 100 characters")]
    Name,
    #[error("Invalid email address")]
    Email,
    #[error("Invalid phone number")]
    Phone,
    #[error("Address must be between 5 and 200 characters")]
    Address,
    #[error("Invalid city")]
    City,
    #[error("Use the two-letter state code (e.g. SP)")]
    State,
    #[error("Invalid postal code")]
    ZipCode,
}

impl ValidationError {
    pub fn field(&self) -> &'static str {
        match self {
            ValidationError::Name => "name",
            ValidationError::Email => "email",
            ValidationError::Phone => "phone",
            ValidationError::Address => "address",
            ValidationError::City => "city",
            ValidationError::State => "state",
            ValidationError::ZipCode => "zip_code",
        }
    }
}

const MAX_EMAIL_LENGTH: usize = 255;

fn length_within(value: &str, min: usize, max: usize) -> bool {
    (min..=max).contains(&value.chars().count())
}

/// Checks fields in form order and reports the first failure.
pub fn validate(form: &CheckoutForm) -> Result<ShippingDetails, ValidationError> {
    let name = form.name.trim();
    if !length_within(name, 3, 100) {
        return Err(ValidationError::Name);
    }

    let email = form.email.trim();
    if !is_email_shaped(email) {
        return Err(ValidationError::Email);
    }

    let phone = form.phone.trim();
    if !length_within(phone, 10, 20) {
        return Err(ValidationError::Phone);
    }

    let address = form.address.trim();
    if !length_within(address, 5, 200) {
        return Err(ValidationError::Address);
    }

    let city = form.city.trim();
    if !length_within(city, 2, 100) {
        return Err(ValidationError::City);
    }

    let state = form.state.trim().to_ascii_uppercase();
    if state.len() != 2 || !state.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(ValidationError::State);
    }

    let zip_code = form.zip_code.trim();
    if !length_within(zip_code, 8, 10) {
        return Err(ValidationError::ZipCode);
    }

    Ok(ShippingDetails {
        name: name.to_owned(),
        email: email.to_owned(),
        phone: phone.to_owned(),
        address: address.to_owned(),
        city: city.to_owned(),
        state,
        zip_code: zip_code.to_owned(),
    })
}

/// `local@domain.tld` with no whitespace and exactly one `@`.
fn is_email_shaped(email: &str) -> bool {
    if email.is_empty() || email.len() > MAX_EMAIL_LENGTH {
        return false;
    }
    if email.chars().any(char::is_whitespace) {
        return false;
    }

    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    if local.starts_with('.') || local.ends_with('.') || local.contains("..") {
        return false;
    }

    let labels: Vec<&str> = domain.split('.').collect();
    labels.len() >= 2
        && labels.iter().all(|label| {
            !label.is_empty()
                && !label.starts_with('-')
                && !label.ends_with('-')
                && label.chars().all(|c| c.is_alphanumeric() || c == '-')
        })
        && labels
            .last()
            .is_some_and(|tld| tld.chars().count() >= 2 && tld.chars().all(char::is_alphabetic))
}
