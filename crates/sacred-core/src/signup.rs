//! The sign-up form: its fields, rules, and the request handed to the
//! registrar once every field is valid.

use serde::{Deserialize, Serialize};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::form::FormState;
use crate::rule::{Check, FieldRule};

/// Field names, as the presentation layer submits them.
pub mod fields {
    pub const FULL_NAME: &str = "fullName";
    pub const EMAIL: &str = "email";
    pub const PHONE: &str = "phone";
    pub const COUNTRY: &str = "country";
    pub const PASSWORD: &str = "password";
    pub const CONFIRM_PASSWORD: &str = "confirmPassword";

    /// Every field, in form order.
    pub const ALL: [&str; 6] = [FULL_NAME, EMAIL, PHONE, COUNTRY, PASSWORD, CONFIRM_PASSWORD];
}

/// Rules for the sign-up form, in form order.
#[must_use]
pub fn rules() -> Vec<FieldRule> {
    vec![
        FieldRule::new(fields::FULL_NAME, "Full Name").required("Full name is required"),
        FieldRule::new(fields::EMAIL, "Email Address")
            .required("Email is required")
            .check(Check::email("Invalid email address")),
        FieldRule::new(fields::PHONE, "Phone Number").required("Phone number is required"),
        FieldRule::new(fields::COUNTRY, "Country").required("Country is required"),
        FieldRule::new(fields::PASSWORD, "Password")
            .required("Password is required")
            .check(Check::PasswordStrength {
                message: "Password must meet all criteria below".to_owned(),
            }),
        FieldRule::new(fields::CONFIRM_PASSWORD, "Confirm Password")
            .required("Please confirm your password")
            .check(Check::Matches {
                field: fields::PASSWORD.to_owned(),
                message: "Passwords do not match".to_owned(),
            }),
    ]
}

/// Account details forwarded to the registrar.
///
/// The confirmation field is not forwarded. The password is redacted from
/// `Debug` and wiped when the request is dropped.
#[derive(Clone, Serialize, Deserialize, Zeroize, ZeroizeOnDrop)]
#[serde(rename_all = "camelCase")]
pub struct SignupRequest {
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub country: String,
    pub password: String,
}

impl SignupRequest {
    /// Copy the sign-up fields out of a snapshot.
    #[must_use]
    pub fn from_form(snapshot: &FormState) -> Self {
        Self {
            full_name: snapshot.get(fields::FULL_NAME).to_owned(),
            email: snapshot.get(fields::EMAIL).to_owned(),
            phone: snapshot.get(fields::PHONE).to_owned(),
            country: snapshot.get(fields::COUNTRY).to_owned(),
            password: snapshot.get(fields::PASSWORD).to_owned(),
        }
    }
}

impl std::fmt::Debug for SignupRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignupRequest")
            .field("full_name", &self.full_name)
            .field("email", &self.email)
            .field("phone", &self.phone)
            .field("country", &self.country)
            .field("password", &"[redacted]")
            .finish()
    }
}
