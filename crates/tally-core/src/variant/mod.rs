//! Discriminated unions over records.
//!
//! A union is an enum with one tuple variant per known shape plus an
//! `Unknown` variant holding raw JSON. Decoding reads a fixed discriminator
//! field and looks it up in the union's branch table:
//!
//! - no discriminator, a non-string discriminator, or an unlisted value
//!   produces `Unknown`, which only fails when validated or visited
//! - a listed value decodes that branch strictly, and any failure there is
//!   a hard [`DataError::VariantDecode`]
//!
//! Unions are declared with the [`tagged_union!`](crate::tagged_union!) macro.

use serde_json::Value;
use tracing::debug;

use crate::error::DataError;
use crate::record::{RawRecord, Record};

/// Decoder for one branch of a union.
pub type Decoder<U> = fn(Value) -> Result<U, DataError>;

/// A closed set of record shapes selected by a discriminator field.
pub trait Union: Sized {
    /// Type name used in error messages.
    const NAME: &'static str;

    /// Wire name of the discriminator field.
    const DISCRIMINATOR: &'static str;

    /// Look up the decoder for a discriminator value.
    fn branch(tag: &str) -> Option<Decoder<Self>>;

    /// Wrap input that matched no branch.
    fn unknown(value: Value) -> Self;
}

/// Decode a union from JSON.
///
/// # Errors
///
/// Returns [`DataError::VariantDecode`] if the discriminator names a known
/// branch but the payload is not a valid instance of it. Unrecognized input
/// is never an error here.
pub fn decode<U: Union>(value: Value) -> Result<U, DataError> {
    let tag = value
        .get(U::DISCRIMINATOR)
        .and_then(Value::as_str)
        .map(str::to_string);

    let Some(tag) = tag else {
        debug!(
            union = U::NAME,
            discriminator = U::DISCRIMINATOR,
            "Discriminator absent or not a string, keeping raw value"
        );
        return Ok(U::unknown(value));
    };

    match U::branch(&tag) {
        Some(decode) => decode(value),
        None => {
            debug!(union = U::NAME, tag = %tag, "Unrecognized discriminator, keeping raw value");
            Ok(U::unknown(value))
        }
    }
}

/// Decode and validate one branch of a union.
///
/// Used by the branch tables that [`tagged_union!`](crate::tagged_union!)
/// generates.
pub fn decode_branch<U: Union, T: Record>(
    variant: &'static str,
    value: Value,
) -> Result<T, DataError> {
    let wrap = |source: DataError| DataError::VariantDecode {
        union: U::NAME,
        variant,
        source: Box::new(source),
    };

    let record = T::from_raw(RawRecord::from_value(value).map_err(wrap)?);
    record.validate().map_err(wrap)?;
    Ok(record)
}

/// Check that a branch record carries its own tag.
///
/// A record converted into the wrong branch would otherwise encode under
/// another branch's tag and fail to decode again.
pub fn check_discriminator<U: Union, T: Record>(
    variant: &'static str,
    record: &T,
) -> Result<(), DataError> {
    let found = record.raw().get(U::DISCRIMINATOR).and_then(Value::as_str);
    if found == Some(variant) {
        return Ok(());
    }
    Err(DataError::VariantDecode {
        union: U::NAME,
        variant,
        source: Box::new(DataError::DiscriminatorMismatch {
            field: U::DISCRIMINATOR.to_string(),
            expected: variant,
            found: found.map(str::to_string),
        }),
    })
}

/// The error for a union holding unrecognized input.
pub fn unrecognized<U: Union>(value: &Value) -> DataError {
    DataError::UnrecognizedVariant {
        union: U::NAME,
        discriminator: value
            .get(U::DISCRIMINATOR)
            .and_then(Value::as_str)
            .map(str::to_string),
    }
}

/// Declare a discriminated union over record types.
///
/// Each branch line reads `"tag" => Variant(Record), as_fn, visit_fn;`.
/// The macro generates:
///
/// - the enum, with an extra `Unknown(serde_json::Value)` variant
/// - a visitor trait with one required method per branch, and `accept`
/// - `decode`, `discriminator`, `is_unknown`, and one `as_fn` accessor per branch
/// - [`Union`], [`Validate`](crate::record::Validate),
///   [`Decode`](crate::record::Decode), `Serialize`, `Deserialize`, and
///   `From<Record>` for every branch
///
/// Converting a record into the union stores the branch's tag in the
/// discriminator field if it is not already set. Validation rejects a
/// branch whose record carries a different tag.
#[macro_export]
macro_rules! tagged_union {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident (discriminator = $disc:literal, visitor = $visitor:ident) {
            $(
                $(#[$vmeta:meta])*
                $tag:literal => $variant:ident($ty:ty), $as_fn:ident, $visit_fn:ident;
            )+
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq)]
        $vis enum $name {
            $(
                $(#[$vmeta])*
                $variant($ty),
            )+
            /// Input that matched no known branch, kept as raw JSON.
            Unknown($crate::__private::serde_json::Value),
        }

        #[doc = concat!("Exhaustive visitor over every known [`", stringify!($name), "`] branch.")]
        $vis trait $visitor {
            /// Value produced by a visit.
            type Output;

            $(
                #[doc = concat!("Visit the `", $tag, "` branch.")]
                fn $visit_fn(&mut self, value: &$ty) -> Self::Output;
            )+
        }

        impl $name {
            /// Decode from JSON, falling back to `Unknown` for unrecognized input.
            pub fn decode(
                value: $crate::__private::serde_json::Value,
            ) -> ::std::result::Result<Self, $crate::error::DataError> {
                $crate::variant::decode(value)
            }

            /// The discriminator value of the held shape.
            pub fn discriminator(&self) -> ::std::option::Option<&str> {
                match self {
                    $(
                        $name::$variant(_) => ::std::option::Option::Some($tag),
                    )+
                    $name::Unknown(value) => value.get($disc).and_then(|tag| tag.as_str()),
                }
            }

            /// Returns true if the input matched no known branch.
            pub fn is_unknown(&self) -> bool {
                matches!(self, $name::Unknown(_))
            }

            $(
                #[doc = concat!("Returns the `", $tag, "` shape, if held.")]
                pub fn $as_fn(&self) -> ::std::option::Option<&$ty> {
                    match self {
                        $name::$variant(value) => ::std::option::Option::Some(value),
                        _ => ::std::option::Option::None,
                    }
                }
            )+

            /// Dispatch to the visitor method for the held shape.
            ///
            /// Fails with `UnrecognizedVariant` for unknown input.
            pub fn accept<V: $visitor>(
                &self,
                visitor: &mut V,
            ) -> ::std::result::Result<V::Output, $crate::error::DataError> {
                match self {
                    $(
                        $name::$variant(value) => ::std::result::Result::Ok(visitor.$visit_fn(value)),
                    )+
                    $name::Unknown(value) => ::std::result::Result::Err(
                        $crate::variant::unrecognized::<Self>(value),
                    ),
                }
            }
        }

        impl $crate::variant::Union for $name {
            const NAME: &'static str = stringify!($name);
            const DISCRIMINATOR: &'static str = $disc;

            fn branch(tag: &str) -> ::std::option::Option<$crate::variant::Decoder<Self>> {
                let decode: $crate::variant::Decoder<Self> = match tag {
                    $(
                        $tag => |value| {
                            $crate::variant::decode_branch::<Self, $ty>($tag, value).map($name::$variant)
                        },
                    )+
                    _ => return ::std::option::Option::None,
                };
                ::std::option::Option::Some(decode)
            }

            fn unknown(value: $crate::__private::serde_json::Value) -> Self {
                $name::Unknown(value)
            }
        }

        impl $crate::record::Validate for $name {
            fn validate(&self) -> ::std::result::Result<(), $crate::error::DataError> {
                match self {
                    $(
                        $name::$variant(value) => {
                            $crate::variant::check_discriminator::<Self, $ty>($tag, value)?;
                            $crate::record::Validate::validate(value)
                        }
                    )+
                    $name::Unknown(value) => ::std::result::Result::Err(
                        $crate::variant::unrecognized::<Self>(value),
                    ),
                }
            }
        }

        impl $crate::record::Decode for $name {
            fn decode_value(
                value: $crate::__private::serde_json::Value,
            ) -> ::std::result::Result<Self, $crate::error::DataError> {
                $crate::variant::decode(value)
            }
        }

        $(
            impl ::std::convert::From<$ty> for $name {
                fn from(mut value: $ty) -> Self {
                    let raw = $crate::record::Record::raw_mut(&mut value);
                    if !raw.contains($disc) {
                        raw.insert(
                            $disc,
                            $crate::__private::serde_json::Value::String($tag.to_string()),
                        );
                    }
                    $name::$variant(value)
                }
            }
        )+

        impl $crate::__private::serde::Serialize for $name {
            fn serialize<S>(&self, serializer: S) -> ::std::result::Result<S::Ok, S::Error>
            where
                S: $crate::__private::serde::Serializer,
            {
                match self {
                    $(
                        $name::$variant(value) => {
                            $crate::__private::serde::Serialize::serialize(value, serializer)
                        }
                    )+
                    $name::Unknown(value) => {
                        $crate::__private::serde::Serialize::serialize(value, serializer)
                    }
                }
            }
        }

        impl<'de> $crate::__private::serde::Deserialize<'de> for $name {
            fn deserialize<D>(deserializer: D) -> ::std::result::Result<Self, D::Error>
            where
                D: $crate::__private::serde::Deserializer<'de>,
            {
                let value = <$crate::__private::serde_json::Value as $crate::__private::serde::Deserialize<'de>>::deserialize(
                    deserializer,
                )?;
                $crate::variant::decode(value)
                    .map_err(<D::Error as $crate::__private::serde::de::Error>::custom)
            }
        }
    };
}
