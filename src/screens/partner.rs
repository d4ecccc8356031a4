use crate::domain::partner::{Customer, Supplier};
use crate::forms::partner::{CustomerForm, SupplierForm};
use crate::screens::EntityScreen;
use crate::sheet::{Dropdowns, Field, Input};
use crate::table::Table;

impl EntityScreen for Supplier {
    const NOUN: &'static str = "supplier";
    type Form = SupplierForm;

    fn table() -> Table<Self> {
        Table::<Supplier>::new(|record| record.id.to_string())
            .column("name", "Name", |record| record.name.as_str().into())
            .column("email", "Email", |record| record.email.as_str().into())
            .column("phone", "Phone", |record| record.phone.as_str().into())
            .column("address", "Address", |record| record.address.clone().into())
    }

    fn fields(form: &SupplierForm, _current: Option<&Self>, _dropdowns: &Dropdowns) -> Vec<Field> {
        vec![
            Field::text("name", "Name").value(&form.name).required(),
            Field::new("email", "Email", Input::Email)
                .value(&form.email)
                .required(),
            Field::new("phone", "Phone", Input::Tel)
                .value(&form.phone)
                .required(),
            Field::new("address", "Address", Input::Textarea).value(&form.address),
        ]
    }
}

impl EntityScreen for Customer {
    const NOUN: &'static str = "customer";
    type Form = CustomerForm;

    fn table() -> Table<Self> {
        Table::<Customer>::new(|record| record.id.to_string())
            .column("name", "Name", |record| record.name.as_str().into())
            .column("code", "Code", |record| record.code.as_str().into())
            .column("email", "Email", |record| record.email.as_str().into())
            .column("phone", "Phone", |record| record.phone.as_str().into())
    }

    fn fields(form: &CustomerForm, _current: Option<&Self>, _dropdowns: &Dropdowns) -> Vec<Field> {
        vec![
            Field::text("name", "Name").value(&form.name).required(),
            Field::text("code", "Code").value(&form.code).required(),
            Field::new("email", "Email", Input::Email)
                .value(&form.email)
                .required(),
            Field::new("phone", "Phone", Input::Tel)
                .value(&form.phone)
                .required(),
        ]
    }
}
