//! Listing form and its validation schema.

use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::Regex;

use drivex_core::{
    Amount, BodyType, Color, FuelType, Make, PhoneError, PhoneNumber, PlateEnding, StateCode,
    Transmission, YesNo,
};

use crate::models::{ImageReference, ListingFields, SessionIdentity};
use crate::validation::FieldErrors;

/// Maximum model length, in characters.
pub const MODEL_MAX_CHARS: usize = 30;

/// Maximum version/trim length, in characters.
pub const VERSION_MAX_CHARS: usize = 40;

/// `2021` or `2021/2022`.
static YEAR_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{4}(/\d{4})?$").expect("Invalid regex"));

const REQUIRED: &str = "Required field";
const NOT_AN_OPTION: &str = "Choose one of the listed options";

/// Raw form input, one string per field as typed or picked by the seller.
///
/// Field names follow the stored document (`km`, `gas`, `body`, ...) in the
/// error map produced by [`ListingForm::validate`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListingForm {
    pub name: String,
    pub model: String,
    pub version: String,
    pub year: String,
    pub odometer: String,
    pub price: String,
    pub city: String,
    pub state: String,
    pub phone: String,
    pub description: String,
    pub fuel: String,
    pub color: String,
    pub body_type: String,
    pub plate_end: String,
    pub transmission: String,
    pub tax_paid: String,
    pub single_owner: String,
    pub trade_accepted: String,
    pub licensed: String,
    pub armored: String,
    pub inspections: String,
}

/// A listing form that passed validation, with option fields resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedListing {
    pub make: Make,
    pub model: String,
    pub version: String,
    pub year: String,
    pub odometer: String,
    pub price: String,
    pub city: String,
    pub state: StateCode,
    pub phone: PhoneNumber,
    pub description: String,
    pub fuel: FuelType,
    pub color: Color,
    pub body_type: BodyType,
    pub plate_end: PlateEnding,
    pub transmission: Transmission,
    pub tax_paid: YesNo,
    pub single_owner: YesNo,
    pub trade_accepted: YesNo,
    pub licensed: YesNo,
    pub armored: YesNo,
    pub inspections: YesNo,
}

fn required_text(
    errors: &mut FieldErrors,
    field: &'static str,
    value: &str,
    max_chars: Option<usize>,
) -> String {
    let value = value.trim();
    if errors.require(field, value, REQUIRED)
        && let Some(max) = max_chars
        && value.chars().count() > max
    {
        errors.insert(field, format!("At most {max} characters"));
    }
    value.to_string()
}

fn option<T>(
    errors: &mut FieldErrors,
    field: &'static str,
    value: &str,
    parse: impl Fn(&str) -> Option<T>,
) -> Option<T> {
    let value = value.trim();
    if !errors.require(field, value, REQUIRED) {
        return None;
    }
    let parsed = parse(value);
    if parsed.is_none() {
        errors.insert(field, NOT_AN_OPTION);
    }
    parsed
}

fn year(errors: &mut FieldErrors, value: &str) -> String {
    let value = value.trim();
    if errors.require("year", value, REQUIRED) && !YEAR_PATTERN.is_match(value) {
        errors.insert("year", "Use YYYY or YYYY/YYYY");
    }
    value.to_string()
}

fn phone(errors: &mut FieldErrors, value: &str) -> Option<PhoneNumber> {
    match PhoneNumber::parse(value.trim()) {
        Ok(phone) => Some(phone),
        Err(PhoneError::Empty) => {
            errors.insert("whatsapp", REQUIRED);
            None
        }
        Err(_) => {
            errors.insert("whatsapp", "Invalid number");
            None
        }
    }
}

impl ListingForm {
    /// Reset every field.
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Run the schema over every field.
    ///
    /// Makes are matched case-insensitively against the fixed list; the other
    /// option sets match their labels exactly.
    ///
    /// # Errors
    ///
    /// Returns a map naming every invalid field.
    pub fn validate(&self) -> Result<ValidatedListing, FieldErrors> {
        let mut errors = FieldErrors::new();

        let make = option(&mut errors, "name", &self.name, |v| {
            Make::parse(&v.to_uppercase())
        });
        let model = required_text(&mut errors, "model", &self.model, Some(MODEL_MAX_CHARS));
        let version = required_text(
            &mut errors,
            "version",
            &self.version,
            Some(VERSION_MAX_CHARS),
        );
        let year = year(&mut errors, &self.year);
        let odometer = required_text(&mut errors, "km", &self.odometer, None);
        let price = required_text(&mut errors, "price", &self.price, None);
        let city = required_text(&mut errors, "city", &self.city, None);
        let state = option(&mut errors, "state", &self.state, |v| {
            StateCode::parse(&v.to_uppercase())
        });
        let phone = phone(&mut errors, &self.phone);
        let description = required_text(&mut errors, "description", &self.description, None);
        let fuel = option(&mut errors, "gas", &self.fuel, FuelType::parse);
        let color = option(&mut errors, "color", &self.color, Color::parse);
        let body_type = option(&mut errors, "body", &self.body_type, BodyType::parse);
        let plate_end = option(&mut errors, "plateEnd", &self.plate_end, PlateEnding::parse);
        let transmission = option(
            &mut errors,
            "transmission",
            &self.transmission,
            Transmission::parse,
        );
        let tax_paid = option(&mut errors, "ipva", &self.tax_paid, YesNo::parse);
        let single_owner = option(&mut errors, "owner", &self.single_owner, YesNo::parse);
        let trade_accepted = option(&mut errors, "trade", &self.trade_accepted, YesNo::parse);
        let licensed = option(&mut errors, "license", &self.licensed, YesNo::parse);
        let armored = option(&mut errors, "armored", &self.armored, YesNo::parse);
        let inspections = option(&mut errors, "inspections", &self.inspections, YesNo::parse);

        let (
            Some(make),
            Some(state),
            Some(phone),
            Some(fuel),
            Some(color),
            Some(body_type),
            Some(plate_end),
            Some(transmission),
            Some(tax_paid),
            Some(single_owner),
            Some(trade_accepted),
            Some(licensed),
            Some(armored),
            Some(inspections),
        ) = (
            make,
            state,
            phone,
            fuel,
            color,
            body_type,
            plate_end,
            transmission,
            tax_paid,
            single_owner,
            trade_accepted,
            licensed,
            armored,
            inspections,
        )
        else {
            return Err(errors);
        };

        errors.into_result(ValidatedListing {
            make,
            model,
            version,
            year,
            odometer,
            price,
            city,
            state,
            phone,
            description,
            fuel,
            color,
            body_type,
            plate_end,
            transmission,
            tax_paid,
            single_owner,
            trade_accepted,
            licensed,
            armored,
            inspections,
        })
    }
}

impl ValidatedListing {
    /// Build the stored document body.
    ///
    /// Make, model and version are uppercased and `searchName` is derived
    /// from them so uppercase prefix search matches.
    #[must_use]
    pub fn into_fields(
        self,
        owner: &SessionIdentity,
        images: Vec<ImageReference>,
        created_at: DateTime<Utc>,
    ) -> ListingFields {
        let name = self.make.as_str().to_string();
        let model = self.model.to_uppercase();
        let search_name = format!("{name} {model}");

        ListingFields {
            search_name,
            name,
            model,
            version: self.version.to_uppercase(),
            year: self.year,
            odometer: Amount::from(self.odometer),
            price: Amount::from(self.price),
            city: self.city,
            state: self.state.as_str().to_string(),
            phone: self.phone.as_str().to_string(),
            description: self.description,
            fuel: self.fuel.as_str().to_string(),
            color: self.color.as_str().to_string(),
            body_type: self.body_type.as_str().to_string(),
            plate_end: self.plate_end.as_str().to_string(),
            transmission: self.transmission.as_str().to_string(),
            tax_paid: self.tax_paid.as_str().to_string(),
            single_owner: self.single_owner.as_str().to_string(),
            trade_accepted: self.trade_accepted.as_str().to_string(),
            licensed: self.licensed.as_str().to_string(),
            armored: self.armored.as_str().to_string(),
            inspections: self.inspections.as_str().to_string(),
            created_at,
            owner_id: owner.uid.clone(),
            owner_name: owner.display_name().to_string(),
            images,
        }
    }
}
