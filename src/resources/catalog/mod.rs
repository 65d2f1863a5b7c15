//! Descriptors of the e-commerce catalog resources

pub mod brand;
pub mod category;
pub mod product;
pub mod sub_category;

use super::descriptor::ResourceDescriptor;

/// Every catalog resource, in mount order
pub fn all() -> Vec<ResourceDescriptor> {
    vec![
        category::descriptor(),
        sub_category::descriptor(),
        brand::descriptor(),
        product::descriptor(),
    ]
}
