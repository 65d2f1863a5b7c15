use crate::core::pagination::PaginationSettings;
use crate::core::pipeline::SearchSpec;
use crate::core::validation::{FieldRules, ValidationConfig, filters, validators};
use crate::resources::descriptor::ResourceDescriptor;

pub const NAME: &str = "category";
pub const COLLECTION: &str = "categories";
pub const ROUTE: &str = "/api/v1/categories";

pub fn descriptor() -> ResourceDescriptor {
    ResourceDescriptor::new(NAME, COLLECTION, ROUTE)
        .with_search(SearchSpec::new(&["search"], &["name"]))
        .with_pagination(PaginationSettings::new(5, 100))
        .with_validation(validation())
}

/// `name` is required, 2-50 characters of letters, digits, spaces or dashes
pub fn validation() -> ValidationConfig {
    ValidationConfig::new()
        .field(
            "name",
            FieldRules::new()
                .required()
                .filter(filters::trim())
                .validate(validators::string_length(2, 50))
                .validate(validators::name_pattern()),
        )
        .field(
            "image",
            FieldRules::new()
                .filter(filters::trim())
                .validate(validators::is_string()),
        )
        .slug_from("name")
}
