//! Core data models for the spending tracker

use chrono::{DateTime, FixedOffset};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::TrackerError;

//
// ================= Category =================
//

/// Spending category. The tags mirror Up Bank's category ids, plus `friends`
/// for person-to-person payments and anything the classifier cannot place.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    // Good life
    GamesAndSoftware,
    Booze,
    EventsAndGigs,
    Hobbies,
    HolidaysAndTravel,
    LotteryAndGambling,
    PubsAndBars,
    RestaurantsAndCafes,
    Takeaway,
    TobaccoAndVaping,
    // Personal
    Adult,
    ClothingAndAccessories,
    EducationAndStudentLoans,
    FitnessAndWellbeing,
    GiftsAndCharity,
    HairAndBeauty,
    HealthAndMedical,
    Investments,
    LifeAdmin,
    MobilePhone,
    NewsMagazinesAndBooks,
    Technology,
    // Home
    Groceries,
    HomewareAndAppliances,
    Internet,
    HomeMaintenanceAndImprovements,
    Pets,
    HomeInsuranceAndRates,
    RentAndMortgage,
    Utilities,
    // Transport
    CarInsuranceAndMaintenance,
    Cycling,
    Fuel,
    Parking,
    PublicTransport,
    CarRepayments,
    TaxisAndShareCars,
    TollRoads,
    // Fallback
    Friends,
    /// Aggregation bucket for transactions that were never classified.
    /// Not part of the classifier vocabulary.
    Uncategorized,
}

impl Category {
    /// Every tag the classifier is allowed to answer with.
    pub const VOCABULARY: [Category; 39] = [
        Category::GamesAndSoftware,
        Category::Booze,
        Category::EventsAndGigs,
        Category::Hobbies,
        Category::HolidaysAndTravel,
        Category::LotteryAndGambling,
        Category::PubsAndBars,
        Category::RestaurantsAndCafes,
        Category::Takeaway,
        Category::TobaccoAndVaping,
        Category::Adult,
        Category::ClothingAndAccessories,
        Category::EducationAndStudentLoans,
        Category::FitnessAndWellbeing,
        Category::GiftsAndCharity,
        Category::HairAndBeauty,
        Category::HealthAndMedical,
        Category::Investments,
        Category::LifeAdmin,
        Category::MobilePhone,
        Category::NewsMagazinesAndBooks,
        Category::Technology,
        Category::Groceries,
        Category::HomewareAndAppliances,
        Category::Internet,
        Category::HomeMaintenanceAndImprovements,
        Category::Pets,
        Category::HomeInsuranceAndRates,
        Category::RentAndMortgage,
        Category::Utilities,
        Category::CarInsuranceAndMaintenance,
        Category::Cycling,
        Category::Fuel,
        Category::Parking,
        Category::PublicTransport,
        Category::CarRepayments,
        Category::TaxisAndShareCars,
        Category::TollRoads,
        Category::Friends,
    ];

    /// The kebab-case tag, identical to the serde representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::GamesAndSoftware => "games-and-software",
            Category::Booze => "booze",
            Category::EventsAndGigs => "events-and-gigs",
            Category::Hobbies => "hobbies",
            Category::HolidaysAndTravel => "holidays-and-travel",
            Category::LotteryAndGambling => "lottery-and-gambling",
            Category::PubsAndBars => "pubs-and-bars",
            Category::RestaurantsAndCafes => "restaurants-and-cafes",
            Category::Takeaway => "takeaway",
            Category::TobaccoAndVaping => "tobacco-and-vaping",
            Category::Adult => "adult",
            Category::ClothingAndAccessories => "clothing-and-accessories",
            Category::EducationAndStudentLoans => "education-and-student-loans",
            Category::FitnessAndWellbeing => "fitness-and-wellbeing",
            Category::GiftsAndCharity => "gifts-and-charity",
            Category::HairAndBeauty => "hair-and-beauty",
            Category::HealthAndMedical => "health-and-medical",
            Category::Investments => "investments",
            Category::LifeAdmin => "life-admin",
            Category::MobilePhone => "mobile-phone",
            Category::NewsMagazinesAndBooks => "news-magazines-and-books",
            Category::Technology => "technology",
            Category::Groceries => "groceries",
            Category::HomewareAndAppliances => "homeware-and-appliances",
            Category::Internet => "internet",
            Category::HomeMaintenanceAndImprovements => "home-maintenance-and-improvements",
            Category::Pets => "pets",
            Category::HomeInsuranceAndRates => "home-insurance-and-rates",
            Category::RentAndMortgage => "rent-and-mortgage",
            Category::Utilities => "utilities",
            Category::CarInsuranceAndMaintenance => "car-insurance-and-maintenance",
            Category::Cycling => "cycling",
            Category::Fuel => "fuel",
            Category::Parking => "parking",
            Category::PublicTransport => "public-transport",
            Category::CarRepayments => "car-repayments",
            Category::TaxisAndShareCars => "taxis-and-share-cars",
            Category::TollRoads => "toll-roads",
            Category::Friends => "friends",
            Category::Uncategorized => "uncategorized",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = TrackerError;

    /// Parses a vocabulary tag. `uncategorized` is rejected.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::VOCABULARY
            .iter()
            .copied()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| TrackerError::InvalidRecord(format!("unknown category '{}'", s)))
    }
}

//
// ================= Transaction =================
//

/// A flattened bank transaction. Negative amounts are outflows.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Transaction {
    pub merchant_name: String,
    pub category: Option<Category>,
    pub amount: Decimal,
    pub date: DateTime<FixedOffset>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transfer_account: Option<String>,
}

impl Transaction {
    pub fn is_outflow(&self) -> bool {
        self.amount < Decimal::ZERO
    }
}

//
// ================= Up Bank wire format =================
//

/// One page of `GET /transactions`.
#[derive(Debug, Clone, Deserialize)]
pub struct TransactionPage {
    #[serde(default)]
    pub data: Vec<RawTransaction>,
    #[serde(default)]
    pub links: PageLinks,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PageLinks {
    pub next: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawTransaction {
    #[serde(default)]
    pub id: String,
    pub attributes: RawAttributes,
    #[serde(default)]
    pub relationships: RawRelationships,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawAttributes {
    pub description: String,
    pub amount: RawAmount,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawAmount {
    pub value: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawRelationships {
    #[serde(default)]
    pub transfer_account: Relationship,
    #[serde(default)]
    pub category: Relationship,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Relationship {
    pub data: Option<ResourceRef>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceRef {
    pub id: String,
}

impl TryFrom<RawTransaction> for Transaction {
    type Error = TrackerError;

    fn try_from(raw: RawTransaction) -> Result<Self, Self::Error> {
        let amount = Decimal::from_str(raw.attributes.amount.value.trim()).map_err(|e| {
            TrackerError::InvalidRecord(format!(
                "transaction {} has amount '{}': {}",
                raw.id, raw.attributes.amount.value, e
            ))
        })?;

        let date = DateTime::parse_from_rfc3339(&raw.attributes.created_at).map_err(|e| {
            TrackerError::InvalidRecord(format!(
                "transaction {} has createdAt '{}': {}",
                raw.id, raw.attributes.created_at, e
            ))
        })?;

        // Categories Up has added since the vocabulary was written are left
        // for the classifier.
        let category = raw
            .relationships
            .category
            .data
            .and_then(|r| r.id.parse::<Category>().ok());

        Ok(Self {
            merchant_name: raw.attributes.description,
            category,
            amount: amount.round_dp(2),
            date,
            transfer_account: raw.relationships.transfer_account.data.map(|r| r.id),
        })
    }
}
