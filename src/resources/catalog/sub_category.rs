use super::category;
use crate::core::pagination::PaginationSettings;
use crate::core::pipeline::SearchSpec;
use crate::core::validation::{FieldRules, ValidationConfig, filters, validators};
use crate::resources::descriptor::{ResourceDescriptor, ScopeBinding};

pub const NAME: &str = "subcategory";
pub const COLLECTION: &str = "subcategories";
pub const ROUTE: &str = "/api/v1/sub-categories";

/// Sub-categories are also reachable under their parent category:
/// `/api/v1/categories/{categoryId}/sub-categories`
pub fn descriptor() -> ResourceDescriptor {
    ResourceDescriptor::new(NAME, COLLECTION, ROUTE)
        .with_search(SearchSpec::new(&["search"], &["name"]))
        .with_pagination(PaginationSettings::new(10, 100))
        .with_scope(ScopeBinding {
            path_param: "categoryId".to_string(),
            field: "category".to_string(),
            parent_route: category::ROUTE.to_string(),
            nested_segment: "sub-categories".to_string(),
        })
        .with_validation(validation())
}

pub fn validation() -> ValidationConfig {
    ValidationConfig::new()
        .field(
            "name",
            FieldRules::new()
                .required()
                .filter(filters::trim())
                .validate(validators::string_length(3, 32))
                .validate(validators::name_pattern()),
        )
        .field(
            "category",
            FieldRules::new()
                .required()
                .filter(filters::trim())
                .validate(validators::uuid()),
        )
        .slug_from("name")
}
