//! Fixed market enumerations: products, categories, shipment codes, operations.
//!
//! These lists are closed by design — the desk tracks exactly three commodity
//! products across three delivery categories and three shipment codes. Pivot
//! row/column orders come from the `ALL` arrays, never from the data.

use crate::domain::error::PnldeskError;
use std::fmt;
use std::str::FromStr;

/// 3-letter month labels in fixed column order for the monthly PnL view.
pub const MONTH_LABELS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Product {
    SoyBean,
    SoyMeal,
    YelCorn,
}

impl Product {
    pub const ALL: [Product; 3] = [Product::SoyBean, Product::SoyMeal, Product::YelCorn];

    pub fn as_str(self) -> &'static str {
        match self {
            Product::SoyBean => "SoyBean",
            Product::SoyMeal => "SoyMeal",
            Product::YelCorn => "YelCorn",
        }
    }

    /// Fixed per-product conversion factor (currency per ton at 100% level).
    pub fn conversion_factor(self) -> f64 {
        conversion_factor(self.as_str())
    }
}

/// Conversion factor lookup at the string boundary. Products outside the
/// fixed list convert at 1.
pub fn conversion_factor(product: &str) -> f64 {
    match product {
        "SoyBean" => 36.7454,
        "SoyMeal" => 1.1023,
        "YelCorn" => 39.3678,
        _ => 1.0,
    }
}

impl FromStr for Product {
    type Err = PnldeskError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "soybean" => Ok(Product::SoyBean),
            "soymeal" => Ok(Product::SoyMeal),
            "yelcorn" => Ok(Product::YelCorn),
            _ => Err(PnldeskError::UnknownProduct { value: s.into() }),
        }
    }
}

impl fmt::Display for Product {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    FobVessel,
    FobPaper,
    CnfVessel,
}

impl Category {
    pub const ALL: [Category; 3] = [Category::FobVessel, Category::FobPaper, Category::CnfVessel];

    pub fn as_str(self) -> &'static str {
        match self {
            Category::FobVessel => "FOB Vessel",
            Category::FobPaper => "FOB Paper",
            Category::CnfVessel => "C&F Vessel",
        }
    }
}

impl FromStr for Category {
    type Err = PnldeskError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "fob vessel" => Ok(Category::FobVessel),
            "fob paper" => Ok(Category::FobPaper),
            "c&f vessel" => Ok(Category::CnfVessel),
            _ => Err(PnldeskError::UnknownCategory { value: s.into() }),
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Shipment {
    Vsl,
    Ppr,
    Cnf,
}

impl Shipment {
    pub const ALL: [Shipment; 3] = [Shipment::Vsl, Shipment::Ppr, Shipment::Cnf];

    pub fn as_str(self) -> &'static str {
        match self {
            Shipment::Vsl => "VSL",
            Shipment::Ppr => "PPR",
            Shipment::Cnf => "CNF",
        }
    }
}

impl FromStr for Shipment {
    type Err = PnldeskError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "VSL" => Ok(Shipment::Vsl),
            "PPR" => Ok(Shipment::Ppr),
            "CNF" => Ok(Shipment::Cnf),
            _ => Err(PnldeskError::UnknownShipment { value: s.into() }),
        }
    }
}

impl fmt::Display for Shipment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Purchase,
    Sale,
}

impl Operation {
    pub fn as_str(self) -> &'static str {
        match self {
            Operation::Purchase => "Purchase",
            Operation::Sale => "Sale",
        }
    }
}

impl FromStr for Operation {
    type Err = PnldeskError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "purchase" => Ok(Operation::Purchase),
            "sale" => Ok(Operation::Sale),
            _ => Err(PnldeskError::UnknownOperation { value: s.into() }),
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Logical key for "current state" queries. Not a database uniqueness
/// constraint — history is append-only and the latest row wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BookKey {
    pub product: Product,
    pub category: Category,
    pub shipment: Shipment,
    pub year: i32,
}

impl BookKey {
    pub fn new(product: Product, category: Category, shipment: Shipment, year: i32) -> Self {
        Self {
            product,
            category,
            shipment,
            year,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn product_parse_round_trip() {
        for product in Product::ALL {
            assert_eq!(product.as_str().parse::<Product>().unwrap(), product);
        }
    }

    #[test]
    fn product_parse_case_insensitive() {
        assert_eq!("soybean".parse::<Product>().unwrap(), Product::SoyBean);
        assert_eq!("YELCORN".parse::<Product>().unwrap(), Product::YelCorn);
    }

    #[test]
    fn product_parse_unknown() {
        let err = "Wheat".parse::<Product>().unwrap_err();
        assert!(matches!(err, PnldeskError::UnknownProduct { value } if value == "Wheat"));
    }

    #[test]
    fn conversion_factors() {
        assert_eq!(Product::SoyBean.conversion_factor(), 36.7454);
        assert_eq!(Product::SoyMeal.conversion_factor(), 1.1023);
        assert_eq!(Product::YelCorn.conversion_factor(), 39.3678);
    }

    #[test]
    fn conversion_factor_defaults_to_one() {
        assert_eq!(conversion_factor("Wheat"), 1.0);
        assert_eq!(conversion_factor(""), 1.0);
    }

    #[test]
    fn category_labels_in_fixed_order() {
        let labels: Vec<&str> = Category::ALL.iter().map(|c| c.as_str()).collect();
        assert_eq!(labels, ["FOB Vessel", "FOB Paper", "C&F Vessel"]);
    }

    #[test]
    fn category_parse_round_trip() {
        for cat in Category::ALL {
            assert_eq!(cat.as_str().parse::<Category>().unwrap(), cat);
        }
    }

    #[test]
    fn shipment_parse_round_trip() {
        for ship in Shipment::ALL {
            assert_eq!(ship.as_str().parse::<Shipment>().unwrap(), ship);
        }
        assert_eq!("vsl".parse::<Shipment>().unwrap(), Shipment::Vsl);
    }

    #[test]
    fn operation_parse() {
        assert_eq!("Purchase".parse::<Operation>().unwrap(), Operation::Purchase);
        assert_eq!("sale".parse::<Operation>().unwrap(), Operation::Sale);
        assert!("Loan".parse::<Operation>().is_err());
    }

    #[test]
    fn month_labels_fixed_order() {
        assert_eq!(MONTH_LABELS[0], "Jan");
        assert_eq!(MONTH_LABELS[11], "Dec");
        assert_eq!(MONTH_LABELS.len(), 12);
    }
}
