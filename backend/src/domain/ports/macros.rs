//! `define_port_error!` builds a port error enum with thiserror messages and
//! one snake_case constructor per variant, so adapters can write
//! `GameError::no_such_planet(id)` instead of spelling out struct variants.

macro_rules! define_port_error {
    (@ctor $variant:ident) => {
        ::paste::paste! {
            pub fn [<$variant:snake>]() -> Self {
                Self::$variant
            }
        }
    };

    (@ctor $variant:ident { $($field:ident : $ty:ty),* $(,)? }) => {
        define_port_error!(@ctor_impl $variant () () $( $field : $ty, )*);
    };

    (@ctor_impl $variant:ident ($($params:tt)*) ($($inits:tt)*) ) => {
        ::paste::paste! {
            pub fn [<$variant:snake>]($($params)*) -> Self {
                Self::$variant { $($inits)* }
            }
        }
    };

    (@ctor_impl $variant:ident ($($params:tt)*) ($($inits:tt)*) $field:ident : $ty:ty, $($rest:tt)*) => {
        define_port_error!(
            @ctor_impl
            $variant
            ($($params)* $field: impl Into<$ty>,)
            ($($inits)* $field: $field.into(),)
            $($rest)*
        );
    };
    (
        $(#[$outer:meta])*
        pub enum $name:ident {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident $( { $($field:ident : $ty:ty),* $(,)? } )? => $message:expr
            ),* $(,)?
        }
    ) => {
        $(#[$outer])*
        #[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
        pub enum $name {
            $(
                $(#[$variant_meta])*
                #[error($message)]
                $variant $( { $($field : $ty),* } )?,
            )*
        }

        impl $name {
            $(
                define_port_error!(@ctor $variant $( { $($field : $ty),* } )?);
            )*
        }
    };
}

pub(crate) use define_port_error;

#[cfg(test)]
mod tests {
    //! Constructor and message generation.
    use uuid::Uuid;

    define_port_error! {
        pub enum LedgerError {
            Closed => "ledger closed",
            Unreachable { message: String } => "ledger unreachable: {message}",
            Stale { version: i32 } => "stale row at version {version}",
            Missing { planet: Uuid, table: String } => "{table} row missing for {planet}",
        }
    }

    #[test]
    fn unit_variants_get_argumentless_constructors() {
        assert_eq!(LedgerError::closed(), LedgerError::Closed);
        assert_eq!(LedgerError::closed().to_string(), "ledger closed");
    }

    #[test]
    fn string_fields_accept_str() {
        let err = LedgerError::unreachable("pool exhausted");
        assert_eq!(err.to_string(), "ledger unreachable: pool exhausted");
    }

    #[test]
    fn non_string_fields_keep_their_type() {
        let err = LedgerError::stale(7);
        assert_eq!(err, LedgerError::Stale { version: 7 });
    }

    #[test]
    fn mixed_fields_are_passed_in_declaration_order() {
        let planet = Uuid::nil();
        let err = LedgerError::missing(planet, "planet_resources");
        assert_eq!(
            err.to_string(),
            format!("planet_resources row missing for {planet}")
        );
    }
}
