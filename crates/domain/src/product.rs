use serde::{Deserialize, Serialize};

use crate::DomainError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct ProductId(i64);

impl ProductId {
    pub fn new(value: i64) -> Result<Self, DomainError> {
        if value <= 0 {
            return Err(DomainError::InvalidProductId(value));
        }
        Ok(Self(value))
    }

    pub fn get(self) -> i64 {
        self.0
    }
}

impl TryFrom<i64> for ProductId {
    type Error = DomainError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ProductId> for i64 {
    fn from(value: ProductId) -> Self {
        value.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    #[serde(rename = "type")]
    pub product_type: String,
    pub criteria: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductDraft {
    pub name: String,
    pub product_type: String,
    pub criteria: String,
}

impl ProductDraft {
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.name.trim().is_empty() {
            return Err(DomainError::BlankProductField("name"));
        }
        if self.product_type.trim().is_empty() {
            return Err(DomainError::BlankProductField("type"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleKind {
    Good,
    Defective,
}

impl SampleKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Good => "good",
            Self::Defective => "defective",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrainingSamples {
    pub good: u64,
    pub defective: u64,
}

impl TrainingSamples {
    pub fn add(&mut self, kind: SampleKind, count: u64) {
        match kind {
            SampleKind::Good => self.good += count,
            SampleKind::Defective => self.defective += count,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UploadReport {
    pub kind: SampleKind,
    pub accepted: u64,
    pub totals: TrainingSamples,
}

/// Product catalog plus the company metadata persisted alongside it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanyProfile {
    pub name: String,
    pub products: Vec<Product>,
    #[serde(default, rename = "trainingSamples")]
    pub training_samples: TrainingSamples,
}

impl Default for CompanyProfile {
    fn default() -> Self {
        Self {
            name: "Demo Manufacturing Ltd".to_string(),
            products: vec![
                Product {
                    id: ProductId(1),
                    name: "Water Bottle 500ml".to_string(),
                    product_type: "Bottle".to_string(),
                    criteria: "Label position, Cap integrity, Fill level".to_string(),
                },
                Product {
                    id: ProductId(2),
                    name: "Carbonated Drink 330ml".to_string(),
                    product_type: "Can".to_string(),
                    criteria: "Dent detection, Print quality".to_string(),
                },
            ],
            training_samples: TrainingSamples::default(),
        }
    }
}

impl CompanyProfile {
    // Ids follow the list length, so a delete followed by an add can reuse an id.
    pub fn add_product(&mut self, draft: ProductDraft) -> Result<ProductId, DomainError> {
        draft.validate()?;
        let id = ProductId::new(self.products.len() as i64 + 1)?;
        self.products.push(Product {
            id,
            name: draft.name,
            product_type: draft.product_type,
            criteria: draft.criteria,
        });
        Ok(id)
    }

    pub fn update_product(&mut self, id: ProductId, draft: &ProductDraft) -> Result<usize, DomainError> {
        draft.validate()?;
        let mut updated = 0;
        for product in self.products.iter_mut().filter(|product| product.id == id) {
            product.name = draft.name.clone();
            product.product_type = draft.product_type.clone();
            product.criteria = draft.criteria.clone();
            updated += 1;
        }
        Ok(updated)
    }

    pub fn delete_product(&mut self, id: ProductId) -> usize {
        let before = self.products.len();
        self.products.retain(|product| product.id != id);
        before - self.products.len()
    }

    pub fn find_product(&self, id: ProductId) -> Option<&Product> {
        self.products.iter().find(|product| product.id == id)
    }
}
