//! The 42-column CRM schema registry.
//!
//! `Field` is the single source of truth for the canonical contact schema:
//! one variant per spreadsheet column, with the snake_case key used in JSON
//! payloads, the exact header label expected in the sheet, and the semantic
//! group shown in the UI. Adding a 43rd column means adding a variant here
//! and letting the compiler point at every match that needs a decision.

use serde::de::{self, Deserializer, Visitor};
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Semantic grouping of the 42 fields, used for dashboard roll-ups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldGroup {
    Personal,
    Company,
    Location,
    Billing,
    Shipping,
    Online,
    Business,
}

impl FieldGroup {
    pub const ALL: [FieldGroup; 7] = [
        FieldGroup::Personal,
        FieldGroup::Company,
        FieldGroup::Location,
        FieldGroup::Billing,
        FieldGroup::Shipping,
        FieldGroup::Online,
        FieldGroup::Business,
    ];

    pub fn key(self) -> &'static str {
        match self {
            FieldGroup::Personal => "personal",
            FieldGroup::Company => "company",
            FieldGroup::Location => "location",
            FieldGroup::Billing => "billing",
            FieldGroup::Shipping => "shipping",
            FieldGroup::Online => "online",
            FieldGroup::Business => "business",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            FieldGroup::Personal => "Personal Info",
            FieldGroup::Company => "Company Info",
            FieldGroup::Location => "Location",
            FieldGroup::Billing => "Billing",
            FieldGroup::Shipping => "Shipping",
            FieldGroup::Online => "Online",
            FieldGroup::Business => "Business",
        }
    }
}

/// One canonical contact attribute. Declaration order is sheet column order
/// (`A` through `AP`) in a freshly created sheet; the live header row is
/// always the authority for actual positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Field {
    Firstname,
    Lastname,
    Email,
    ContactPhone,
    Position,
    CompanyName,
    Vat,
    Phonenumber,
    Country,
    City,
    Zip,
    State,
    Address,
    Website,
    BillingStreet,
    BillingCity,
    BillingState,
    BillingZip,
    BillingCountry,
    ShippingStreet,
    ShippingCity,
    ShippingState,
    ShippingZip,
    ShippingCountry,
    Longitude,
    Latitude,
    StripeId,
    AffiliateCode,
    LoyPoint,
    WooCustomer,
    WooChannel,
    ClientType,
    Balance,
    BalanceAs,
    AutoInvoice,
    EmailAddress,
    IsNonIndividual,
    BukkuId,
    Birthday,
    TermsConditions,
    Identification,
    IdentificationNo,
}

impl Field {
    /// All 42 fields in canonical column order.
    pub const ALL: [Field; 42] = [
        Field::Firstname,
        Field::Lastname,
        Field::Email,
        Field::ContactPhone,
        Field::Position,
        Field::CompanyName,
        Field::Vat,
        Field::Phonenumber,
        Field::Country,
        Field::City,
        Field::Zip,
        Field::State,
        Field::Address,
        Field::Website,
        Field::BillingStreet,
        Field::BillingCity,
        Field::BillingState,
        Field::BillingZip,
        Field::BillingCountry,
        Field::ShippingStreet,
        Field::ShippingCity,
        Field::ShippingState,
        Field::ShippingZip,
        Field::ShippingCountry,
        Field::Longitude,
        Field::Latitude,
        Field::StripeId,
        Field::AffiliateCode,
        Field::LoyPoint,
        Field::WooCustomer,
        Field::WooChannel,
        Field::ClientType,
        Field::Balance,
        Field::BalanceAs,
        Field::AutoInvoice,
        Field::EmailAddress,
        Field::IsNonIndividual,
        Field::BukkuId,
        Field::Birthday,
        Field::TermsConditions,
        Field::Identification,
        Field::IdentificationNo,
    ];

    /// Fields that must be non-empty for a contact to count as "Lengkap".
    pub const REQUIRED: [Field; 5] = [
        Field::Firstname,
        Field::ContactPhone,
        Field::Zip,
        Field::Address,
        Field::State,
    ];

    /// Canonical snake_case identifier used in JSON payloads.
    pub fn key(self) -> &'static str {
        match self {
            Field::Firstname => "firstname",
            Field::Lastname => "lastname",
            Field::Email => "email",
            Field::ContactPhone => "contact_phone",
            Field::Position => "position",
            Field::CompanyName => "company_name",
            Field::Vat => "vat",
            Field::Phonenumber => "phonenumber",
            Field::Country => "country",
            Field::City => "city",
            Field::Zip => "zip",
            Field::State => "state",
            Field::Address => "address",
            Field::Website => "website",
            Field::BillingStreet => "billing_street",
            Field::BillingCity => "billing_city",
            Field::BillingState => "billing_state",
            Field::BillingZip => "billing_zip",
            Field::BillingCountry => "billing_country",
            Field::ShippingStreet => "shipping_street",
            Field::ShippingCity => "shipping_city",
            Field::ShippingState => "shipping_state",
            Field::ShippingZip => "shipping_zip",
            Field::ShippingCountry => "shipping_country",
            Field::Longitude => "longitude",
            Field::Latitude => "latitude",
            Field::StripeId => "stripe_id",
            Field::AffiliateCode => "affiliate_code",
            Field::LoyPoint => "loy_point",
            Field::WooCustomer => "woo_customer",
            Field::WooChannel => "woo_channel",
            Field::ClientType => "client_type",
            Field::Balance => "balance",
            Field::BalanceAs => "balance_as",
            Field::AutoInvoice => "auto_invoice",
            Field::EmailAddress => "email_address",
            Field::IsNonIndividual => "is_non_individual",
            Field::BukkuId => "bukku_id",
            Field::Birthday => "birthday",
            Field::TermsConditions => "terms_conditions",
            Field::Identification => "identification",
            Field::IdentificationNo => "identification_no",
        }
    }

    /// Exact header label as it appears in the sheet. These must not drift:
    /// header matching and write-back are both label-exact.
    pub fn label(self) -> &'static str {
        match self {
            Field::Firstname => "Firstname",
            Field::Lastname => "Lastname",
            Field::Email => "Email",
            Field::ContactPhone => "Contact phonenumber",
            Field::Position => "Position",
            Field::CompanyName => "Name",
            Field::Vat => "Vat",
            Field::Phonenumber => "Phonenumber",
            Field::Country => "Country",
            Field::City => "City",
            Field::Zip => "Zip",
            Field::State => "State",
            Field::Address => "Address",
            Field::Website => "Website",
            Field::BillingStreet => "Billing street",
            Field::BillingCity => "Billing city",
            Field::BillingState => "Billing state",
            Field::BillingZip => "Billing zip",
            Field::BillingCountry => "Billing country",
            Field::ShippingStreet => "Shipping street",
            Field::ShippingCity => "Shipping city",
            Field::ShippingState => "Shipping state",
            Field::ShippingZip => "Shipping zip",
            Field::ShippingCountry => "Shipping country",
            Field::Longitude => "Longitude",
            Field::Latitude => "Latitude",
            Field::StripeId => "Stripe id",
            Field::AffiliateCode => "Affiliate code",
            Field::LoyPoint => "Loy point",
            Field::WooCustomer => "Woo customer id",
            Field::WooChannel => "Woo channel id",
            Field::ClientType => "Client type",
            Field::Balance => "Balance",
            Field::BalanceAs => "Balance as of",
            Field::AutoInvoice => "Auto invoice",
            Field::EmailAddress => "Email address",
            Field::IsNonIndividual => "Is non individual",
            Field::BukkuId => "Bukku id",
            Field::Birthday => "Birthday",
            Field::TermsConditions => "Terms & Conditions",
            Field::Identification => "Identification Type",
            Field::IdentificationNo => "Identification No",
        }
    }

    pub fn group(self) -> FieldGroup {
        match self {
            Field::Firstname | Field::Lastname | Field::Email | Field::ContactPhone => {
                FieldGroup::Personal
            }
            Field::Position | Field::CompanyName | Field::Vat | Field::Phonenumber => {
                FieldGroup::Company
            }
            Field::Country | Field::City | Field::Zip | Field::State | Field::Address => {
                FieldGroup::Location
            }
            Field::BillingStreet
            | Field::BillingCity
            | Field::BillingState
            | Field::BillingZip
            | Field::BillingCountry => FieldGroup::Billing,
            Field::ShippingStreet
            | Field::ShippingCity
            | Field::ShippingState
            | Field::ShippingZip
            | Field::ShippingCountry => FieldGroup::Shipping,
            Field::Website | Field::Longitude | Field::Latitude => FieldGroup::Online,
            Field::StripeId
            | Field::AffiliateCode
            | Field::LoyPoint
            | Field::WooCustomer
            | Field::WooChannel
            | Field::ClientType
            | Field::Balance
            | Field::BalanceAs
            | Field::AutoInvoice
            | Field::EmailAddress
            | Field::IsNonIndividual
            | Field::BukkuId
            | Field::Birthday
            | Field::TermsConditions
            | Field::Identification
            | Field::IdentificationNo => FieldGroup::Business,
        }
    }

    /// Advisory column letter for a freshly created sheet (`A`..`AP`).
    /// Never used to address cells in a live sheet.
    pub fn col_letter(self) -> String {
        let mut idx = Field::ALL.iter().position(|f| *f == self).unwrap_or(0);
        let mut letter = String::new();
        loop {
            letter.insert(0, (b'A' + (idx % 26) as u8) as char);
            if idx < 26 {
                break;
            }
            idx = idx / 26 - 1;
        }
        letter
    }

    pub fn from_key(key: &str) -> Option<Field> {
        Field::ALL.iter().copied().find(|f| f.key() == key)
    }

    pub fn from_label(label: &str) -> Option<Field> {
        Field::ALL.iter().copied().find(|f| f.label() == label)
    }

    pub fn from_label_ci(label: &str) -> Option<Field> {
        Field::ALL
            .iter()
            .copied()
            .find(|f| f.label().eq_ignore_ascii_case(label))
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl Serialize for Field {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.key())
    }
}

struct FieldVisitor;

impl Visitor<'_> for FieldVisitor {
    type Value = Field;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a canonical field key")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Field, E> {
        Field::from_key(v).ok_or_else(|| E::custom(format!("unknown field key: {v}")))
    }
}

impl<'de> Deserialize<'de> for Field {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Field, D::Error> {
        deserializer.deserialize_str(FieldVisitor)
    }
}
