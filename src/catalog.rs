//! Admin product form and the rules that turn it into a catalog record.

use rust_decimal::Decimal;
use serde::Deserialize;
use thiserror::Error;
use utoipa::ToSchema;

use crate::models::CreateProductEntity;

/// Sizes arrive either as a list or as the comma-separated text box value.
#[derive(Debug, Clone, PartialEq, Deserialize, ToSchema)]
#[serde(untagged)]
pub enum SizesInput {
    List(Vec<String>),
    Csv(String),
}

impl Default for SizesInput {
    fn default() -> Self {
        SizesInput::List(Vec::new())
    }
}

impl SizesInput {
    fn normalize(self) -> Vec<String> {
        let raw: Vec<String> = match self {
            SizesInput::List(sizes) => sizes,
            SizesInput::Csv(text) => text.split(',').map(str::to_owned).collect(),
        };
        raw.into_iter()
            .map(|size| size.trim().to_owned())
            .filter(|size| !size.is_empty())
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, ToSchema)]
pub struct ProductForm {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub price: Decimal,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub stock: Option<i32>,
    #[serde(default)]
    pub sizes: SizesInput,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProductFormError {
    #[error("Product name is required")]
    MissingName,
    #[error("Price must not be negative")]
    NegativePrice,
    #[error("Stock must not be negative")]
    NegativeStock,
}

impl ProductForm {
    pub fn into_product(self) -> Result<CreateProductEntity, ProductFormError> {
        let name = self.name.trim().to_owned();
        if name.is_empty() {
            return Err(ProductFormError::MissingName);
        }
        if self.price.is_sign_negative() && !self.price.is_zero() {
            return Err(ProductFormError::NegativePrice);
        }
        let stock = self.stock.unwrap_or(0);
        if stock < 0 {
            return Err(ProductFormError::NegativeStock);
        }

        Ok(CreateProductEntity {
            name,
            description: optional_text(self.description),
            price: self.price,
            image_url: optional_text(self.image_url),
            category: optional_text(self.category),
            stock,
            sizes: self.sizes.normalize(),
        })
    }
}

fn optional_text(value: Option<String>) -> Option<String> {
    value
        .map(|text| text.trim().to_owned())
        .filter(|text| !text.is_empty())
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    fn form() -> ProductForm {
        ProductForm {
            name: "  Anel Solitário ".into(),
            description: Some("   ".into()),
            price: Decimal::from(4890),
            image_url: Some(" https://cdn.example/ring.jpg ".into()),
            category: None,
            stock: None,
            sizes: SizesInput::Csv("12, 14,, 16 ,".into()),
        }
    }

    #[test]
    fn normalizes_text_stock_and_sizes() -> TestResult {
        let product = form().into_product()?;

        assert_eq!(product.name, "Anel Solitário");
        assert_eq!(product.description, None);
        assert_eq!(
            product.image_url.as_deref(),
            Some("https://cdn.example/ring.jpg")
        );
        assert_eq!(product.stock, 0);
        assert_eq!(product.sizes, vec!["12", "14", "16"]);
        Ok(())
    }

    #[test]
    fn accepts_sizes_as_list_or_text() -> TestResult {
        let from_list: ProductForm = serde_json::from_str(
            r#"{"name":"Colar","price":100,"sizes":["P"," M ",""]}"#,
        )?;
        assert_eq!(from_list.into_product()?.sizes, vec!["P", "M"]);

        let from_text: ProductForm =
            serde_json::from_str(r#"{"name":"Colar","price":100,"sizes":"P, M"}"#)?;
        assert_eq!(from_text.into_product()?.sizes, vec!["P", "M"]);

        let without: ProductForm = serde_json::from_str(r#"{"name":"Colar","price":100}"#)?;
        assert!(without.into_product()?.sizes.is_empty());
        Ok(())
    }

    #[test]
    fn rejects_blank_name_and_negative_numbers() {
        let blank = ProductForm {
            name: "   ".into(),
            ..form()
        };
        assert_eq!(blank.into_product(), Err(ProductFormError::MissingName));

        let negative_price = ProductForm {
            price: Decimal::from(-1),
            ..form()
        };
        assert_eq!(
            negative_price.into_product(),
            Err(ProductFormError::NegativePrice)
        );

        let negative_stock = ProductForm {
            stock: Some(-3),
            ..form()
        };
        assert_eq!(
            negative_stock.into_product(),
            Err(ProductFormError::NegativeStock)
        );
    }
}
