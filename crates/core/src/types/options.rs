//! Enumerated option sets offered by the listing form.
//!
//! Each option set is stored in listing documents by its label (the exact
//! text the seller picked, e.g. `"Gasolina"`, `"Sim"`). The labels are part
//! of the stored data format and must not change.

/// Macro to define an option set backed by fixed stored labels.
///
/// Creates a `Copy` enum with:
/// - `ALL` listing every option in form order
/// - `as_str()` returning the stored label
/// - `parse()` accepting exactly a stored label
/// - `Serialize`/`Deserialize` through the label
#[macro_export]
macro_rules! define_options {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $label:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            /// Every option, in the order the form offers them.
            pub const ALL: &'static [Self] = &[$(Self::$variant),+];

            /// The label stored in listing documents.
            #[must_use]
            pub const fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $label),+
                }
            }

            /// Parse a stored label. Matching is exact.
            #[must_use]
            pub fn parse(s: &str) -> Option<Self> {
                match s {
                    $($label => Some(Self::$variant),)+
                    _ => None,
                }
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl ::serde::Serialize for $name {
            fn serialize<S: ::serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(self.as_str())
            }
        }

        impl<'de> ::serde::Deserialize<'de> for $name {
            fn deserialize<D: ::serde::Deserializer<'de>>(
                deserializer: D,
            ) -> Result<Self, D::Error> {
                let label = <String as ::serde::Deserialize>::deserialize(deserializer)?;
                Self::parse(&label).ok_or_else(|| {
                    ::serde::de::Error::custom(format!(
                        "unknown {} option: {label}",
                        stringify!($name)
                    ))
                })
            }
        }
    };
}

define_options!(
    /// Vehicle make. Stored uppercase, which also keeps prefix search working.
    Make {
        Audi => "AUDI",
        Bmw => "BMW",
        Byd => "BYD",
        CaoaChery => "CAOA CHERY",
        Chevrolet => "CHEVROLET",
        Citroen => "CITROËN",
        Ferrari => "FERRARI",
        Fiat => "FIAT",
        Ford => "FORD",
        Honda => "HONDA",
        Hyundai => "HYUNDAI",
        Jac => "JAC",
        Jeep => "JEEP",
        Kia => "KIA",
        Lamborghini => "LAMBORGHINI",
        LandRover => "LAND ROVER",
        Lexus => "LEXUS",
        Maserati => "MASERATI",
        MercedesBenz => "MERCEDES-BENZ",
        Mini => "MINI",
        Mitsubishi => "MITSUBISHI",
        Nissan => "NISSAN",
        Peugeot => "PEUGEOT",
        Porsche => "PORSCHE",
        Ram => "RAM",
        Renault => "RENAULT",
        Subaru => "SUBARU",
        Suzuki => "SUZUKI",
        Toyota => "TOYOTA",
        Volkswagen => "VOLKSWAGEN",
        Volvo => "VOLVO",
    }
);

define_options!(
    /// Body type ("carroceria"); also the catalog category.
    BodyType {
        Sedan => "Sedan",
        Hatchback => "Hatchback",
        Suv => "SUV",
        Crossover => "Crossover",
        Minivan => "Minivan",
        Pickup => "Picape",
        Coupe => "Coupé",
        Convertible => "Conversível",
        Sports => "Esportivo",
        Utility => "Utilitário",
    }
);

define_options!(
    FuelType {
        Gasoline => "Gasolina",
        Ethanol => "Álcool",
        Flex => "Flex",
        Diesel => "Diesel",
        NaturalGas => "GNV",
        Electric => "Elétrico",
    }
);

define_options!(
    Color {
        Black => "Preto",
        White => "Branco",
        Silver => "Prata",
        Gray => "Cinza",
        Red => "Vermelho",
        Blue => "Azul",
        Green => "Verde",
        Yellow => "Amarelo",
        Orange => "Laranja",
        Brown => "Marrom",
        Purple => "Roxo",
        Other => "Outra",
    }
);

define_options!(
    Transmission {
        Automatic => "Automático",
        Manual => "Manual",
        Cvt => "CVT",
        SemiAutomatic => "Semi-Automático",
    }
);

define_options!(
    /// Last digit of the licence plate.
    PlateEnding {
        Zero => "0",
        One => "1",
        Two => "2",
        Three => "3",
        Four => "4",
        Five => "5",
        Six => "6",
        Seven => "7",
        Eight => "8",
        Nine => "9",
    }
);

define_options!(
    /// Answer to the boolean-like form questions (trade accepted, licensed,
    /// tax paid, inspected, armored, single owner).
    YesNo {
        Yes => "Sim",
        No => "Não",
    }
);

define_options!(
    /// Brazilian federative unit (two-letter state code).
    StateCode {
        Ac => "AC",
        Al => "AL",
        Ap => "AP",
        Am => "AM",
        Ba => "BA",
        Ce => "CE",
        Df => "DF",
        Es => "ES",
        Go => "GO",
        Ma => "MA",
        Mt => "MT",
        Ms => "MS",
        Mg => "MG",
        Pa => "PA",
        Pb => "PB",
        Pr => "PR",
        Pe => "PE",
        Pi => "PI",
        Rj => "RJ",
        Rn => "RN",
        Rs => "RS",
        Ro => "RO",
        Rr => "RR",
        Sc => "SC",
        Sp => "SP",
        Se => "SE",
        To => "TO",
    }
);

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_is_exact() {
        assert_eq!(BodyType::parse("SUV"), Some(BodyType::Suv));
        assert_eq!(BodyType::parse("suv"), None);
        assert_eq!(YesNo::parse("Não"), Some(YesNo::No));
        assert_eq!(YesNo::parse(""), None);
    }

    #[test]
    fn test_all_labels_round_trip() {
        for state in StateCode::ALL {
            assert_eq!(StateCode::parse(state.as_str()), Some(*state));
        }
        assert_eq!(StateCode::ALL.len(), 27);
    }

    #[test]
    fn test_serde_uses_label() {
        let json = serde_json::to_string(&FuelType::Ethanol).unwrap();
        assert_eq!(json, "\"Álcool\"");
        let parsed: Transmission = serde_json::from_str("\"Semi-Automático\"").unwrap();
        assert_eq!(parsed, Transmission::SemiAutomatic);
        assert!(serde_json::from_str::<Color>("\"Rosa\"").is_err());
    }

    #[test]
    fn test_make_labels_are_uppercase() {
        for make in Make::ALL {
            assert_eq!(make.as_str(), make.as_str().to_uppercase());
        }
    }
}
