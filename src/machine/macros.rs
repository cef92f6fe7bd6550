//! Macros for declaring state enums.

/// Declare a fieldless enum usable as machine state.
///
/// Derives everything [`State`](crate::core::State) requires (including
/// `Copy`, `Eq` and `Hash`, since states key the chart) and implements the
/// trait. `name()` returns the variant identifier, also available as the
/// inherent `as_str()`; `ALL` lists the variants in declaration order.
///
/// # Example
///
/// ```
/// use flowguard::core::State;
/// use flowguard::state_enum;
///
/// state_enum! {
///     pub enum ShipmentState {
///         Packed,
///         InTransit,
///         Delivered,
///         Lost,
///     }
///     final: [Delivered, Lost]
///     error: [Lost]
/// }
///
/// assert_eq!(ShipmentState::InTransit.name(), "InTransit");
/// assert_eq!(ShipmentState::ALL.len(), 4);
/// assert!(ShipmentState::Lost.is_error());
/// ```
#[macro_export]
macro_rules! state_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident
            ),* $(,)?
        }

        $(final: [$($final:ident),* $(,)?])?
        $(error: [$($error:ident),* $(,)?])?
    ) => {
        $(#[$meta])*
        #[derive(
            Clone,
            Copy,
            PartialEq,
            Eq,
            Hash,
            Debug,
            serde::Serialize,
            serde::Deserialize
        )]
        $vis enum $name {
            $(
                $(#[$variant_meta])*
                $variant
            ),*
        }

        #[allow(dead_code)]
        impl $name {
            /// Every variant, in declaration order.
            $vis const ALL: &'static [$name] = &[$(Self::$variant),*];

            /// The variant identifier.
            $vis const fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => stringify!($variant)),*
                }
            }
        }

        impl $crate::core::State for $name {
            fn name(&self) -> &str {
                self.as_str()
            }

            fn is_final(&self) -> bool {
                match self {
                    $($(Self::$final => true,)*)?
                    _ => false,
                }
            }

            fn is_error(&self) -> bool {
                match self {
                    $($(Self::$error => true,)*)?
                    _ => false,
                }
            }
        }
    };
}
