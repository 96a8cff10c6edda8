use serde::{Serialize, Deserialize};

use crate::error::{Result, TrackerError};

pub const DEFAULT_CATEGORY: &str = "Other";

pub const CATEGORIES: [&str; 6] = ["Electronics", "Furniture", "Fashion", "Books", "Sports", "Other"];

/// A tracked resale item.
///
/// `profit` and `profit_percent` are cached and only ever written by
/// [`Item::new`] and [`Item::apply`], so index structures can rely on them
/// staying put between writes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    pub id: u64,
    pub name: String,
    pub category: String,
    pub buying_price: f64,
    pub market_price: f64,
    pub profit: f64,
    pub profit_percent: f64,
    #[serde(default)]
    pub image_url: String,
    pub created_at: i64,
}

impl Item {
    pub fn new(id: u64, draft: NewItem, created_at: i64) -> Self {
        let (profit, profit_percent) = metrics(draft.buying_price, draft.market_price);
        Item {
            id,
            name: draft.name,
            category: normalize_category(&draft.category),
            buying_price: draft.buying_price,
            market_price: draft.market_price,
            profit,
            profit_percent,
            image_url: draft.image_url,
            created_at: draft.created_at.unwrap_or(created_at),
        }
    }

    /// Apply an edit and refresh the cached profit fields.
    pub fn apply(&mut self, edit: ItemEdit) {
        if let Some(name) = edit.name {
            self.name = name;
        }
        if let Some(category) = edit.category {
            self.category = normalize_category(&category);
        }
        if let Some(buy) = edit.buying_price {
            self.buying_price = buy;
        }
        if let Some(market) = edit.market_price {
            self.market_price = market;
        }
        if let Some(url) = edit.image_url {
            self.image_url = url;
        }
        let (profit, profit_percent) = metrics(self.buying_price, self.market_price);
        self.profit = profit;
        self.profit_percent = profit_percent;
    }

    pub fn to_record(&self) -> ItemRecord {
        ItemRecord {
            id: Some(self.id),
            name: self.name.clone(),
            category: self.category.clone(),
            buying_price: self.buying_price,
            market_price: self.market_price,
            image_url: self.image_url.clone(),
            created_at: Some(self.created_at),
        }
    }
}

/// Fields supplied by the caller when adding an item.
#[derive(Debug, Clone, PartialEq)]
pub struct NewItem {
    pub name: String,
    pub category: String,
    pub buying_price: f64,
    pub market_price: f64,
    pub image_url: String,
    pub created_at: Option<i64>,
}

impl NewItem {
    pub fn new(name: impl Into<String>, category: impl Into<String>, buying_price: f64, market_price: f64) -> Self {
        NewItem {
            name: name.into(),
            category: category.into(),
            buying_price,
            market_price,
            image_url: String::new(),
            created_at: None,
        }
    }

    pub fn with_image(mut self, url: impl Into<String>) -> Self {
        self.image_url = url.into();
        self
    }

    pub fn created_at(mut self, millis: i64) -> Self {
        self.created_at = Some(millis);
        self
    }
}

/// Partial update for an existing item; `None` keeps the current value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ItemEdit {
    pub name: Option<String>,
    pub category: Option<String>,
    pub buying_price: Option<f64>,
    pub market_price: Option<f64>,
    pub image_url: Option<String>,
}

impl ItemEdit {
    pub fn prices(buying_price: f64, market_price: f64) -> Self {
        ItemEdit {
            buying_price: Some(buying_price),
            market_price: Some(market_price),
            ..Default::default()
        }
    }
}

/// Plain item as kept in per-user exports, without derived fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemRecord {
    #[serde(default)]
    pub id: Option<u64>,
    pub name: String,
    #[serde(default)]
    pub category: String,
    pub buying_price: f64,
    pub market_price: f64,
    #[serde(default)]
    pub image_url: String,
    #[serde(default)]
    pub created_at: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryStats {
    pub total_items: usize,
    pub total_profit: f64,
    pub total_investment: f64,
    pub total_market_value: f64,
    pub profitable_items: usize,
    pub loss_items: usize,
    pub avg_profit_percent: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryTotals {
    pub count: usize,
    pub total_profit: f64,
}

pub fn metrics(buying_price: f64, market_price: f64) -> (f64, f64) {
    let profit = market_price - buying_price;
    let profit_percent = if buying_price == 0.0 { 0.0 } else { profit / buying_price * 100.0 };
    (profit, profit_percent)
}

pub fn normalize_category(category: &str) -> String {
    let trimmed = category.trim();
    if trimmed.is_empty() {
        DEFAULT_CATEGORY.to_string()
    } else {
        trimmed.to_string()
    }
}

/// Form-level validation done before anything reaches the store.
pub fn validate_draft(name: &str, category: &str, buying: &str, market: &str) -> Result<NewItem> {
    let name = name.trim();
    if name.is_empty() {
        return Err(TrackerError::InvalidInput("item name is required".into()));
    }
    if category.trim().is_empty() {
        return Err(TrackerError::InvalidInput("category is required".into()));
    }
    let buying_price = parse_price(buying, "buying price")?;
    let market_price = parse_price(market, "market price")?;
    Ok(NewItem::new(name, category.trim(), buying_price, market_price))
}

fn parse_price(text: &str, field: &str) -> Result<f64> {
    let value: f64 = text
        .trim()
        .parse()
        .map_err(|_| TrackerError::InvalidInput(format!("{field} must be a number")))?;
    if !value.is_finite() || value < 0.0 {
        return Err(TrackerError::InvalidInput(format!("{field} must be a non-negative number")));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics() {
        let (profit, pct) = metrics(100.0, 150.0);
        assert_eq!(profit, 50.0);
        assert_eq!(pct, 50.0);

        let (profit, pct) = metrics(200.0, 180.0);
        assert_eq!(profit, -20.0);
        assert_eq!(pct, -10.0);
    }

    #[test]
    fn test_zero_buying_price_has_zero_percent() {
        let (profit, pct) = metrics(0.0, 75.0);
        assert_eq!(profit, 75.0);
        assert_eq!(pct, 0.0);
    }

    #[test]
    fn test_blank_category_defaults_to_other() {
        let item = Item::new(1, NewItem::new("Lamp", "  ", 10.0, 12.0), 0);
        assert_eq!(item.category, "Other");
    }

    #[test]
    fn test_apply_recomputes_profit() {
        let mut item = Item::new(1, NewItem::new("Lamp", "Furniture", 10.0, 12.0), 0);
        item.apply(ItemEdit::prices(20.0, 15.0));
        assert_eq!(item.profit, -5.0);
        assert_eq!(item.profit_percent, -25.0);
        assert_eq!(item.name, "Lamp");
    }

    #[test]
    fn test_validate_draft() {
        let draft = validate_draft(" Chair ", "Furniture", "2900", "3600.5").unwrap();
        assert_eq!(draft.name, "Chair");
        assert_eq!(draft.market_price, 3600.5);

        assert!(validate_draft("", "Furniture", "1", "2").is_err());
        assert!(validate_draft("Chair", "", "1", "2").is_err());
        assert!(validate_draft("Chair", "Furniture", "abc", "2").is_err());
        assert!(validate_draft("Chair", "Furniture", "-1", "2").is_err());
    }
}
