//! Declarative helpers shared by the query modules.
//!
//! - [`params!`](crate::params) builds a [`ParameterSet`](crate::query::ParameterSet)
//! - [`sql_enum!`](crate::sql_enum) declares a closed enum stored as a text label

use std::fmt;

/// Builds a [`ParameterSet`](crate::query::ParameterSet) from `"name" => value` pairs.
///
/// ```
/// use courtside::params;
/// let params = params! { "limit" => 10, "name" => "arena" };
/// assert_eq!(params.len(), 2);
/// ```
#[macro_export]
macro_rules! params {
    () => {
        $crate::query::ParameterSet::new()
    };
    ($($name:expr => $value:expr),+ $(,)?) => {{
        let mut params = $crate::query::ParameterSet::new();
        $(params.insert($name, $value);)+
        params
    }};
}

/// Declares an enum whose variants map to fixed text labels.
///
/// The generated type implements `as_str`, `Display`, `FromStr`, serde by label,
/// `From<T> for Value` (bound as the label, which also fits PostgreSQL enum columns) and
/// `TryGetable` (decoded from the label).
///
/// ```
/// courtside::sql_enum! {
///     pub enum Surface {
///         Clay => "clay",
///         Grass => "grass",
///     }
/// }
/// assert_eq!(Surface::Clay.as_str(), "clay");
/// assert_eq!("grass".parse::<Surface>().unwrap(), Surface::Grass);
/// ```
#[macro_export]
macro_rules! sql_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $($(#[$vmeta:meta])* $variant:ident => $label:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        $vis enum $name {
            $($(#[$vmeta])* $variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $label),+
                }
            }
        }

        impl ::std::fmt::Display for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl ::std::str::FromStr for $name {
            type Err = $crate::macros::UnknownLabel;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($label => Ok($name::$variant),)+
                    other => Err($crate::macros::UnknownLabel::new(stringify!($name), other)),
                }
            }
        }

        impl ::serde::Serialize for $name {
            fn serialize<S: ::serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(self.as_str())
            }
        }

        impl<'de> ::serde::Deserialize<'de> for $name {
            fn deserialize<D: ::serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let label = <String as ::serde::Deserialize>::deserialize(deserializer)?;
                label.parse().map_err(::serde::de::Error::custom)
            }
        }

        impl From<$name> for $crate::value::Value {
            fn from(value: $name) -> Self {
                $crate::value::Value::Text(value.as_str().to_string())
            }
        }

        impl $crate::value::TryGetable for $name {
            fn try_get(
                value: $crate::value::Value,
            ) -> Result<Self, $crate::value::ValueExtractionError> {
                match value {
                    $crate::value::Value::Text(label) => label.parse().map_err(
                        |e: $crate::macros::UnknownLabel| {
                            $crate::value::ValueExtractionError::ConversionError(e.to_string())
                        },
                    ),
                    $crate::value::Value::Null => {
                        Err($crate::value::ValueExtractionError::NullValue)
                    }
                    other => Err($crate::value::ValueExtractionError::TypeMismatch {
                        expected: stringify!($name).to_string(),
                        actual: other.type_name().to_string(),
                    }),
                }
            }
        }
    };
}

/// A label that names no variant of a [`sql_enum!`](crate::sql_enum) type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownLabel {
    type_name: &'static str,
    label: String,
}

impl UnknownLabel {
    pub fn new(type_name: &'static str, label: &str) -> Self {
        Self {
            type_name,
            label: label.to_string(),
        }
    }
}

impl fmt::Display for UnknownLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown {} label: {:?}", self.type_name, self.label)
    }
}

impl std::error::Error for UnknownLabel {}
