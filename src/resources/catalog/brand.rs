use crate::core::pagination::PaginationSettings;
use crate::core::pipeline::SearchSpec;
use crate::core::validation::{FieldRules, ValidationConfig, filters, validators};
use crate::resources::descriptor::ResourceDescriptor;

pub const NAME: &str = "brand";
pub const COLLECTION: &str = "brands";
pub const ROUTE: &str = "/api/v1/brands";

pub fn descriptor() -> ResourceDescriptor {
    ResourceDescriptor::new(NAME, COLLECTION, ROUTE)
        .with_search(SearchSpec::new(&["search"], &["name"]))
        .with_pagination(PaginationSettings::new(5, 100))
        .with_validation(validation())
}

pub fn validation() -> ValidationConfig {
    ValidationConfig::new()
        .field(
            "name",
            FieldRules::new()
                .required()
                .filter(filters::trim())
                .validate(validators::string_length(2, 50)),
        )
        .field(
            "image",
            FieldRules::new()
                .filter(filters::trim())
                .validate(validators::is_string()),
        )
        .slug_from("name")
}
