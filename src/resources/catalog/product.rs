use crate::core::pagination::PaginationSettings;
use crate::core::pipeline::SearchSpec;
use crate::core::validation::{FieldRules, ValidationConfig, filters, validators};
use crate::resources::descriptor::ResourceDescriptor;

pub const NAME: &str = "product";
pub const COLLECTION: &str = "products";
pub const ROUTE: &str = "/api/v1/products";

/// Products search `title` and `description` through `keyword` (or `search`)
pub fn descriptor() -> ResourceDescriptor {
    ResourceDescriptor::new(NAME, COLLECTION, ROUTE)
        .with_search(SearchSpec::new(
            &["keyword", "search"],
            &["title", "description"],
        ))
        .with_pagination(PaginationSettings::new(10, 100))
        .with_validation(validation())
}

pub fn validation() -> ValidationConfig {
    ValidationConfig::new()
        .field(
            "title",
            FieldRules::new()
                .required()
                .filter(filters::trim())
                .validate(validators::string_length(3, 50)),
        )
        .field(
            "description",
            FieldRules::new()
                .required()
                .filter(filters::trim())
                .validate(validators::min_length(3)),
        )
        .field(
            "quantity",
            FieldRules::new()
                .required()
                .filter(filters::to_integer())
                .validate(validators::integer_min(0)),
        )
        .field(
            "sold",
            FieldRules::new()
                .filter(filters::to_integer())
                .validate(validators::integer_min(0)),
        )
        .field(
            "price",
            FieldRules::new()
                .required()
                .filter(filters::to_number())
                .validate(validators::number_range(Some(0.01), Some(20000.0))),
        )
        .field(
            "priceAfterDiscount",
            FieldRules::new()
                .filter(filters::to_number())
                .validate(validators::number_range(Some(0.0), None)),
        )
        .field(
            "colors",
            FieldRules::new().validate(validators::is_string()),
        )
        .field(
            "imageCover",
            FieldRules::new()
                .required()
                .filter(filters::trim())
                .validate(validators::is_string()),
        )
        .field(
            "images",
            FieldRules::new()
                .filter(filters::trim_each())
                .validate(validators::string_array()),
        )
        .field(
            "category",
            FieldRules::new()
                .required()
                .filter(filters::trim())
                .validate(validators::uuid()),
        )
        .field(
            "subCategory",
            FieldRules::new().validate(validators::uuid_or_uuid_array()),
        )
        .field("brand", FieldRules::new().validate(validators::uuid()))
        .field(
            "ratingsAverage",
            FieldRules::new()
                .filter(filters::to_number())
                .validate(validators::number_range(Some(1.0), Some(5.0))),
        )
        .field(
            "ratingsQuantity",
            FieldRules::new()
                .filter(filters::to_integer())
                .validate(validators::integer_min(0)),
        )
        .slug_from("title")
}
