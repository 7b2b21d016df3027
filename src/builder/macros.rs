//! Macros for ergonomic state machine construction.

/// Generate an enum of state names usable wherever the builders and queries
/// take a name.
///
/// The generated enum converts into `String` and [`StateBuilder`], implements
/// `AsRef<str>` and `Display`, and lists its variants in `ALL`.
///
/// [`StateBuilder`]: crate::builder::StateBuilder
///
/// # Example
///
/// ```
/// use strata::builder::{StateBuilder, StateMachineBuilder, TransitionBuilder};
/// use strata::core::FrameTime;
/// use strata::state_enum;
///
/// state_enum! {
///     pub enum Mode {
///         Idle,
///         Dodge,
///     }
/// }
///
/// let mut machine = StateMachineBuilder::new()
///     .state(StateBuilder::new(Mode::Idle).initial())
///     .state(Mode::Dodge)
///     .transition(TransitionBuilder::new().from(Mode::Idle).to(Mode::Dodge).after(1.0))
///     .unwrap()
///     .build()
///     .unwrap();
///
/// machine.tick(FrameTime::at(0.0));
/// assert!(machine.is_state_active(Mode::Idle));
/// assert_eq!(Mode::ALL.len(), 2);
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
    ) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, serde::Serialize, serde::Deserialize)]
        $vis enum $name {
            $(
                $(#[$variant_meta])*
                $variant
            ),*
        }

        impl $name {
            /// Every variant in declaration order.
            pub const ALL: &'static [$name] = &[$($name::$variant),*];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => stringify!($variant)),*
                }
            }
        }

        impl ::std::convert::AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                self.as_str()
            }
        }

        impl ::std::fmt::Display for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl ::std::convert::From<$name> for ::std::string::String {
            fn from(state: $name) -> Self {
                state.as_str().to_string()
            }
        }

        impl ::std::convert::From<$name> for $crate::builder::StateBuilder {
            fn from(state: $name) -> Self {
                $crate::builder::StateBuilder::new(state.as_str())
            }
        }
    };
}
