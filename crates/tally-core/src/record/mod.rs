//! Raw-map-backed records.
//!
//! Every model in this crate stores its fields in a [`RawRecord`] and exposes
//! typed getters and setters over it, generated by the [`record!`](crate::record!)
//! macro. Reading a field deserializes it on demand; writing a field
//! serializes it back into the map. Fields the model does not declare are
//! kept as they arrived and written back out unchanged.

mod raw;
mod validate;

pub use raw::RawRecord;
pub use validate::Validate;

use serde_json::Value;

use crate::error::DataError;

/// A model backed by a [`RawRecord`].
pub trait Record: Validate + Sized {
    /// Wrap a raw map without checking it. Call [`Validate::validate`] to
    /// check every declared field.
    fn from_raw(raw: RawRecord) -> Self;

    /// Get a reference to the underlying map.
    fn raw(&self) -> &RawRecord;

    /// Get a mutable reference to the underlying map.
    fn raw_mut(&mut self) -> &mut RawRecord;

    /// Consume and return the underlying map.
    fn into_raw(self) -> RawRecord;

    /// Returns the record as a JSON value.
    fn to_value(&self) -> serde_json::Value {
        serde_json::Value::Object(self.raw().as_map().clone())
    }
}

/// A value built from raw JSON with a typed [`DataError`] on failure.
///
/// List pages decode their items through this trait, so a failed union
/// branch stays a [`DataError::VariantDecode`] instead of being flattened
/// into a serde message.
pub trait Decode: Sized {
    /// Build the value from JSON.
    fn decode_value(value: Value) -> Result<Self, DataError>;
}

/// Declare a raw-map-backed record type.
///
/// Each field line reads `kind getter, setter: Type = "wire_name";` where
/// `kind` is one of:
///
/// - `required`: getter returns `Result<T, DataError>`; absent or `null` is an error
/// - `nullable`: getter returns `Result<Option<T>, DataError>`; absent is an error
/// - `optional`: getter returns `Result<Option<T>, DataError>`; absent or `null` is `None`
///
/// The generated type implements [`Record`], [`Validate`] (reading every
/// field and validating nested values), `Serialize` and `Deserialize`
/// (transparently, as the raw map).
///
/// ```
/// use tally_core::record;
/// use tally_core::record::Validate;
///
/// record! {
///     /// A named thing.
///     pub struct Widget {
///         required name, set_name: String = "name";
///         optional size, set_size: u32 = "size";
///     }
/// }
///
/// let mut widget = Widget::new();
/// widget.set_name("gear").unwrap();
/// assert_eq!(widget.name().unwrap(), "gear");
/// assert_eq!(widget.size().unwrap(), None);
/// assert!(widget.validate().is_ok());
/// ```
#[macro_export]
macro_rules! record {
    (@get required $(#[$fmeta:meta])* $field:ident: $ty:ty = $wire:literal) => {
        $(#[$fmeta])*
        pub fn $field(&self) -> ::std::result::Result<$ty, $crate::error::DataError> {
            self.raw.required($wire)
        }
    };
    (@get nullable $(#[$fmeta:meta])* $field:ident: $ty:ty = $wire:literal) => {
        $(#[$fmeta])*
        pub fn $field(
            &self,
        ) -> ::std::result::Result<::std::option::Option<$ty>, $crate::error::DataError> {
            self.raw.nullable($wire)
        }
    };
    (@get optional $(#[$fmeta:meta])* $field:ident: $ty:ty = $wire:literal) => {
        $(#[$fmeta])*
        pub fn $field(
            &self,
        ) -> ::std::result::Result<::std::option::Option<$ty>, $crate::error::DataError> {
            self.raw.optional($wire)
        }
    };
    (@set required $setter:ident: $ty:ty = $wire:literal) => {
        #[doc = concat!("Set `", $wire, "`.")]
        pub fn $setter(
            &mut self,
            value: impl ::std::convert::Into<$ty>,
        ) -> ::std::result::Result<&mut Self, $crate::error::DataError> {
            let value: $ty = value.into();
            self.raw.set($wire, &value)?;
            Ok(self)
        }
    };
    (@set $kind:ident $setter:ident: $ty:ty = $wire:literal) => {
        #[doc = concat!("Set `", $wire, "`. `None` stores an explicit `null`.")]
        pub fn $setter(
            &mut self,
            value: ::std::option::Option<$ty>,
        ) -> ::std::result::Result<&mut Self, $crate::error::DataError> {
            self.raw.set($wire, &value)?;
            Ok(self)
        }
    };
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident {
            $(
                $(#[$fmeta:meta])*
                $kind:ident $field:ident, $setter:ident: $ty:ty = $wire:literal;
            )*
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Default, PartialEq)]
        $vis struct $name {
            raw: $crate::record::RawRecord,
        }

        impl $name {
            /// Create an empty record.
            pub fn new() -> Self {
                Self::default()
            }

            $(
                $crate::record!(@get $kind $(#[$fmeta])* $field: $ty = $wire);
                $crate::record!(@set $kind $setter: $ty = $wire);
            )*
        }

        impl $crate::record::Record for $name {
            fn from_raw(raw: $crate::record::RawRecord) -> Self {
                Self { raw }
            }

            fn raw(&self) -> &$crate::record::RawRecord {
                &self.raw
            }

            fn raw_mut(&mut self) -> &mut $crate::record::RawRecord {
                &mut self.raw
            }

            fn into_raw(self) -> $crate::record::RawRecord {
                self.raw
            }
        }

        impl $crate::record::Decode for $name {
            fn decode_value(
                value: $crate::__private::serde_json::Value,
            ) -> ::std::result::Result<Self, $crate::error::DataError> {
                $crate::record::RawRecord::from_value(value).map(|raw| Self { raw })
            }
        }

        impl $crate::record::Validate for $name {
            fn validate(&self) -> ::std::result::Result<(), $crate::error::DataError> {
                $(
                    $crate::record::Validate::validate(&self.$field()?)?;
                )*
                Ok(())
            }
        }

        impl $crate::__private::serde::Serialize for $name {
            fn serialize<S>(&self, serializer: S) -> ::std::result::Result<S::Ok, S::Error>
            where
                S: $crate::__private::serde::Serializer,
            {
                $crate::__private::serde::Serialize::serialize(&self.raw, serializer)
            }
        }

        impl<'de> $crate::__private::serde::Deserialize<'de> for $name {
            fn deserialize<D>(deserializer: D) -> ::std::result::Result<Self, D::Error>
            where
                D: $crate::__private::serde::Deserializer<'de>,
            {
                <$crate::record::RawRecord as $crate::__private::serde::Deserialize<'de>>::deserialize(
                    deserializer,
                )
                .map(|raw| Self { raw })
            }
        }
    };
}
