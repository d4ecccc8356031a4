use crate::domain::entity::EntityKind;
use crate::domain::sample::{Sample, SampleStatus};
use crate::forms::sample::{IMAGE_TYPES, SampleForm};
use crate::screens::{EntityScreen, RowAction};
use crate::sheet::{Dropdowns, Field, Input, select};
use crate::table::Table;

impl EntityScreen for Sample {
    const NOUN: &'static str = "sample";
    const DROPDOWNS: &'static [EntityKind] = &[EntityKind::Fabric, EntityKind::Customer];
    const MULTIPART: bool = true;
    type Form = SampleForm;

    fn table() -> Table<Self> {
        Table::<Sample>::new(|record| record.id.to_string())
            .column("name", "Name", |record| record.name.as_str().into())
            .column("fabric", "Fabric", |record| record.fabric.name.as_str().into())
            .column("customer", "Customer", |record| record.customer.name.as_str().into())
            .column("image", "Image", |record| record.image_url.clone().into())
            .column("status", "Status", |record| record.status.label().into())
            .column("created_at", "Created", |record| record.created_at.into())
    }

    fn fields(form: &SampleForm, current: Option<&Self>, dropdowns: &Dropdowns) -> Vec<Field> {
        let image = Field::new(
            "image",
            "Image",
            Input::File {
                accept: IMAGE_TYPES.join(","),
            },
        )
        .value(current.and_then(|record| record.image_url.clone()).unwrap_or_default());

        vec![
            Field::text("name", "Name").value(&form.name).required(),
            select(dropdowns, "fabric_id", "Fabric", EntityKind::Fabric, &form.fabric_id),
            select(dropdowns, "customer_id", "Customer", EntityKind::Customer, &form.customer_id),
            image,
        ]
    }

    fn row_actions(record: &Self) -> Vec<RowAction> {
        if record.status == SampleStatus::Verified {
            return Vec::new();
        }
        vec![RowAction {
            label: "Verify".to_string(),
            action: format!("{}/{}/verify", Self::path(), record.id),
            fields: Vec::new(),
        }]
    }
}
