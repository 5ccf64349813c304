//! Product Records

use crate::ids::TypedId;

/// Product Id
pub type ProductId = TypedId<ProductStock>;

/// Price and stock of a catalog product.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductStock {
    pub id: ProductId,
    pub price: u64,
    pub stock_quantity: u64,
}
