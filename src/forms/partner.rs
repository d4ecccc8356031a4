use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::domain::partner::{Customer, NewCustomer, NewSupplier, Supplier};
use crate::domain::types::{CustomerCode, EmailAddress, EntityName, PhoneNumber};
use crate::forms::{FieldErrors, ResourceForm, optional_text};

const PHONE_MESSAGE: &str = "Enter a valid phone number in international format";

#[derive(Clone, Debug, Default, Serialize, Deserialize, Validate)]
#[serde(default)]
/// Form data for creating or editing a supplier.
pub struct SupplierForm {
    #[validate(length(min = 1, max = 100, message = "Name must be 1 to 100 characters"))]
    pub name: String,
    #[validate(email(message = "Enter a valid email address"))]
    pub email: String,
    pub phone: String,
    #[validate(length(max = 300, message = "Address must be at most 300 characters"))]
    pub address: String,
}

impl SupplierForm {
    fn payload(&self) -> Result<NewSupplier, FieldErrors> {
        let mut errors = FieldErrors::from_validation(self.validate());

        let name = errors.check("name", EntityName::new(&self.name), "Name is required");
        let email = errors.check(
            "email",
            EmailAddress::new(&self.email),
            "Enter a valid email address",
        );
        let phone = errors.check("phone", PhoneNumber::new(&self.phone), PHONE_MESSAGE);

        let (Some(name), Some(email), Some(phone)) = (name, email, phone) else {
            return Err(errors);
        };
        errors.into_result()?;

        Ok(NewSupplier {
            name,
            email,
            phone,
            address: optional_text(&self.address),
        })
    }
}

impl ResourceForm<Supplier> for SupplierForm {
    fn from_record(record: &Supplier) -> Self {
        Self {
            name: record.name.clone(),
            email: record.email.clone(),
            phone: record.phone.clone(),
            address: record.address.clone().unwrap_or_default(),
        }
    }

    fn to_create(&self) -> Result<NewSupplier, FieldErrors> {
        self.payload()
    }

    fn to_update(&self, _current: &Supplier) -> Result<NewSupplier, FieldErrors> {
        self.payload()
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, Validate)]
#[serde(default)]
/// Form data for creating or editing a customer.
pub struct CustomerForm {
    #[validate(length(min = 1, max = 100, message = "Name must be 1 to 100 characters"))]
    pub name: String,
    #[validate(length(min = 2, max = 20, message = "Code must be 2 to 20 characters"))]
    pub code: String,
    #[validate(email(message = "Enter a valid email address"))]
    pub email: String,
    pub phone: String,
}

impl CustomerForm {
    fn payload(&self) -> Result<NewCustomer, FieldErrors> {
        let mut errors = FieldErrors::from_validation(self.validate());

        let name = errors.check("name", EntityName::new(&self.name), "Name is required");
        let code = errors.check(
            "code",
            CustomerCode::new(&self.code),
            "Code may only contain letters and digits",
        );
        let email = errors.check(
            "email",
            EmailAddress::new(&self.email),
            "Enter a valid email address",
        );
        let phone = errors.check("phone", PhoneNumber::new(&self.phone), PHONE_MESSAGE);

        let (Some(name), Some(code), Some(email), Some(phone)) = (name, code, email, phone) else {
            return Err(errors);
        };
        errors.into_result()?;

        Ok(NewCustomer {
            name,
            code,
            email,
            phone,
        })
    }
}

impl ResourceForm<Customer> for CustomerForm {
    fn from_record(record: &Customer) -> Self {
        Self {
            name: record.name.clone(),
            code: record.code.clone(),
            email: record.email.clone(),
            phone: record.phone.clone(),
        }
    }

    fn to_create(&self) -> Result<NewCustomer, FieldErrors> {
        self.payload()
    }

    fn to_update(&self, _current: &Customer) -> Result<NewCustomer, FieldErrors> {
        self.payload()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn supplier() -> SupplierForm {
        SupplierForm {
            name: "Mills & Co".to_string(),
            email: "Sales@Mills.example".to_string(),
            phone: "+1 650-253-0000".to_string(),
            address: String::new(),
        }
    }

    #[test]
    fn supplier_values_are_normalized() {
        let payload = supplier().to_create().unwrap();

        assert_eq!(payload.email.as_str(), "sales@mills.example");
        assert_eq!(payload.phone.as_str(), "+16502530000");
        assert_eq!(payload.address, None);
    }

    #[test]
    fn supplier_with_bad_contact_details_is_rejected() {
        let form = SupplierForm {
            email: "not-an-email".to_string(),
            phone: "12".to_string(),
            ..supplier()
        };
        let errors = form.to_create().unwrap_err();

        assert_eq!(errors.get("email"), ["Enter a valid email address"]);
        assert_eq!(errors.get("phone"), [PHONE_MESSAGE]);
        assert!(!errors.has("name"));
    }

    #[test]
    fn customer_code_is_upper_cased_and_checked() {
        let form = CustomerForm {
            name: "Atelier Nord".to_string(),
            code: "at01".to_string(),
            email: "buyer@nord.example".to_string(),
            phone: "+1 650-253-0000".to_string(),
        };
        assert_eq!(form.to_create().unwrap().code.as_str(), "AT01");

        let bad = CustomerForm {
            code: "A-1".to_string(),
            ..form
        };
        assert_eq!(
            bad.to_create().unwrap_err().get("code"),
            ["Code may only contain letters and digits"]
        );
    }
}
