use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::domain::catalog::{Collection, Fabric, Material, NewCollection, NewFabric, NewMaterial};
use crate::domain::types::{Description, EntityName, NonEmptyString};
use crate::forms::{FieldErrors, ResourceForm, optional_text};

#[derive(Clone, Debug, Default, Serialize, Deserialize, Validate)]
#[serde(default)]
/// Form data for creating or editing a collection.
pub struct CollectionForm {
    #[validate(length(min = 1, max = 100, message = "Name must be 1 to 100 characters"))]
    pub name: String,
    #[validate(length(max = 40, message = "Season must be at most 40 characters"))]
    pub season: String,
    pub year: String,
    #[validate(length(max = 1000, message = "Description must be at most 1000 characters"))]
    pub description: String,
}

impl CollectionForm {
    fn payload(&self) -> Result<NewCollection, FieldErrors> {
        let mut errors = FieldErrors::from_validation(self.validate());

        let name = errors.check("name", EntityName::new(&self.name), "Name is required");
        let year = errors.number("year", &self.year, 2000u16..=2100);
        let description = if self.description.trim().is_empty() {
            Some(None)
        } else {
            errors
                .check(
                    "description",
                    Description::new(&self.description),
                    "Description contains no text",
                )
                .map(Some)
        };

        let (Some(name), Some(year), Some(description)) = (name, year, description) else {
            return Err(errors);
        };
        errors.into_result()?;

        Ok(NewCollection {
            name,
            season: optional_text(&self.season),
            year,
            description,
        })
    }
}

impl ResourceForm<Collection> for CollectionForm {
    fn from_record(record: &Collection) -> Self {
        Self {
            name: record.name.clone(),
            season: record.season.clone().unwrap_or_default(),
            year: record.year.to_string(),
            description: record.description.clone().unwrap_or_default(),
        }
    }

    fn to_create(&self) -> Result<NewCollection, FieldErrors> {
        self.payload()
    }

    fn to_update(&self, _current: &Collection) -> Result<NewCollection, FieldErrors> {
        self.payload()
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, Validate)]
#[serde(default)]
/// Form data for creating or editing a fabric. `color_ids` is a repeated
/// field.
pub struct FabricForm {
    #[validate(length(min = 1, max = 100, message = "Name must be 1 to 100 characters"))]
    pub name: String,
    #[validate(length(min = 1, max = 200, message = "Composition must be 1 to 200 characters"))]
    pub composition: String,
    pub weight_gsm: String,
    pub width_cm: String,
    pub supplier_id: String,
    pub color_ids: Vec<String>,
}

impl FabricForm {
    fn payload(&self) -> Result<NewFabric, FieldErrors> {
        let mut errors = FieldErrors::from_validation(self.validate());

        let name = errors.check("name", EntityName::new(&self.name), "Name is required");
        let composition = errors.check(
            "composition",
            NonEmptyString::new(&self.composition),
            "Composition is required",
        );
        let weight_gsm = errors.number("weight_gsm", &self.weight_gsm, 1u32..=2000);
        let width_cm = errors.number("width_cm", &self.width_cm, 1u32..=400);
        let supplier_id = errors.id("supplier_id", &self.supplier_id, "supplier");
        let color_ids: Vec<_> = self
            .color_ids
            .iter()
            .filter(|raw| !raw.trim().is_empty())
            .filter_map(|raw| errors.id("color_ids", raw, "color"))
            .collect();

        let (Some(name), Some(composition), Some(weight_gsm), Some(width_cm), Some(supplier_id)) =
            (name, composition, weight_gsm, width_cm, supplier_id)
        else {
            return Err(errors);
        };
        errors.into_result()?;

        Ok(NewFabric {
            name,
            composition,
            weight_gsm,
            width_cm,
            supplier_id,
            color_ids,
        })
    }
}

impl ResourceForm<Fabric> for FabricForm {
    fn from_record(record: &Fabric) -> Self {
        Self {
            name: record.name.clone(),
            composition: record.composition.clone(),
            weight_gsm: record.weight_gsm.to_string(),
            width_cm: record.width_cm.to_string(),
            supplier_id: record.supplier.id.to_string(),
            color_ids: record.colors.iter().map(|color| color.id.to_string()).collect(),
        }
    }

    fn to_create(&self) -> Result<NewFabric, FieldErrors> {
        self.payload()
    }

    fn to_update(&self, _current: &Fabric) -> Result<NewFabric, FieldErrors> {
        self.payload()
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, Validate)]
#[serde(default)]
/// Form data for creating or editing a material.
pub struct MaterialForm {
    #[validate(length(min = 1, max = 100, message = "Name must be 1 to 100 characters"))]
    pub name: String,
    #[validate(length(min = 1, max = 20, message = "Unit must be 1 to 20 characters"))]
    pub unit: String,
    pub unit_cost: String,
    pub cost_type_id: String,
    pub supplier_id: String,
}

impl MaterialForm {
    fn payload(&self) -> Result<NewMaterial, FieldErrors> {
        let mut errors = FieldErrors::from_validation(self.validate());

        let name = errors.check("name", EntityName::new(&self.name), "Name is required");
        let unit = errors.check("unit", NonEmptyString::new(&self.unit), "Unit is required");
        let unit_cost = errors.number("unit_cost", &self.unit_cost, 0.0f64..=1_000_000.0);
        let cost_type_id = errors.id("cost_type_id", &self.cost_type_id, "cost type");
        let supplier_id = errors.id("supplier_id", &self.supplier_id, "supplier");

        let (Some(name), Some(unit), Some(unit_cost), Some(cost_type_id), Some(supplier_id)) =
            (name, unit, unit_cost, cost_type_id, supplier_id)
        else {
            return Err(errors);
        };
        errors.into_result()?;

        Ok(NewMaterial {
            name,
            unit,
            unit_cost,
            cost_type_id,
            supplier_id,
        })
    }
}

impl ResourceForm<Material> for MaterialForm {
    fn from_record(record: &Material) -> Self {
        Self {
            name: record.name.clone(),
            unit: record.unit.clone(),
            unit_cost: record.unit_cost.to_string(),
            cost_type_id: record.cost_type.id.to_string(),
            supplier_id: record.supplier.id.to_string(),
        }
    }

    fn to_create(&self) -> Result<NewMaterial, FieldErrors> {
        self.payload()
    }

    fn to_update(&self, _current: &Material) -> Result<NewMaterial, FieldErrors> {
        self.payload()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forms::parse_body;

    const SUPPLIER: &str = "0d6f8c1e-64a4-4d8e-9d34-8d6c2f1a7b10";
    const RED: &str = "7e57d004-2b97-4e7a-b45b-5a3f1c2d9e01";

    #[test]
    fn collection_rejects_year_out_of_range_and_blank_name() {
        let form = CollectionForm {
            name: "  ".to_string(),
            year: "1999".to_string(),
            ..Default::default()
        };
        let errors = form.to_create().unwrap_err();

        assert_eq!(errors.get("name"), ["Name is required"]);
        assert_eq!(errors.get("year"), ["Must be between 2000 and 2100"]);
    }

    #[test]
    fn collection_description_is_sanitized() {
        let form = CollectionForm {
            name: "Spring".to_string(),
            year: "2025".to_string(),
            description: "Linen <script>alert(1)</script>blends".to_string(),
            ..Default::default()
        };
        let payload = form.to_create().unwrap();

        assert_eq!(payload.season, None);
        assert_eq!(
            payload.description.as_ref().map(Description::as_str),
            Some("Linen blends")
        );
    }

    #[test]
    fn fabric_parses_repeated_color_ids() {
        let body = format!(
            "name=Denim&composition=100%25+cotton&weight_gsm=340&width_cm=150&supplier_id={SUPPLIER}&color_ids={RED}&color_ids="
        );
        let form: FabricForm = parse_body(body.as_bytes()).unwrap();
        let payload = form.to_create().unwrap();

        assert_eq!(payload.composition.as_str(), "100% cotton");
        assert_eq!(payload.color_ids.len(), 1);
        assert_eq!(payload.color_ids[0].as_str(), RED);
    }

    #[test]
    fn fabric_reports_every_invalid_field() {
        let form = FabricForm {
            name: "Denim".to_string(),
            weight_gsm: "0".to_string(),
            width_cm: "abc".to_string(),
            supplier_id: "7".to_string(),
            ..Default::default()
        };
        let errors = form.to_create().unwrap_err();
        let fields: Vec<&str> = errors.fields().collect();

        assert_eq!(
            fields,
            vec!["composition", "supplier_id", "weight_gsm", "width_cm"]
        );
    }

    #[test]
    fn material_accepts_zero_cost() {
        let form = MaterialForm {
            name: "Button".to_string(),
            unit: "pcs".to_string(),
            unit_cost: "0".to_string(),
            cost_type_id: RED.to_string(),
            supplier_id: SUPPLIER.to_string(),
        };
        assert_eq!(form.to_create().unwrap().unit_cost, 0.0);

        let negative = MaterialForm {
            unit_cost: "-1".to_string(),
            ..form
        };
        assert!(negative.to_create().unwrap_err().has("unit_cost"));
    }
}
