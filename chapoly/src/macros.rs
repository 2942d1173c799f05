macro_rules! std {
    ($($item:item)*) => {
        $(
            #[cfg(feature = "std")]
            $item
        )*
    };
}

macro_rules! alloc {
    ($($item:item)*) => {
        $(
            #[cfg(feature = "alloc")]
            $item
        )*
    };
}

macro_rules! no_std_io {
    ($($item:item)*) => {
        $(
            #[cfg(all(feature = "embedded-io", not(feature = "std")))]
            $item
        )*
    };
}

/// Implements `Debug` without revealing any of the internal state.
macro_rules! opaque_dbg {
    ($ident:ident $(<$($lt:lifetime),*>)?) => {
        impl $(<$($lt),*>)? ::core::fmt::Debug for $ident $(<$($lt),*>)? {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                f.write_str(concat!(stringify!($ident), " { ... }"))
            }
        }
    };
}

macro_rules! define_state {
    (
        $(#[$meta:meta])*
        $name:ident
    ) => {
        $(#[$meta])*
        pub struct $name;

        impl $crate::sealed::Sealed for $name {}
        impl State for $name {}
    };

    ($(
        $(#[$meta:meta])*
        $name:ident
    ),* $(,)?) => {
        $(
            define_state! {
                $(#[$meta])*
                $name
            }
        )*
    };
}

/// Provides a `proptest` `Arbitrary` implementation for 32-byte key types.
macro_rules! arb_key {
    (struct $ident:ident::$cons:ident([u8; $sz:literal])) => {
        #[cfg(test)]
        impl proptest::arbitrary::Arbitrary for $ident {
            type Parameters = ();

            fn arbitrary_with(_args: Self::Parameters) -> Self::Strategy {
                use proptest::strategy::Strategy as _;
                proptest::arbitrary::any::<[u8; $sz]>().prop_map($ident::$cons).boxed()
            }

            type Strategy = proptest::prelude::BoxedStrategy<Self>;
        }
    };
}

#[cfg(test)]
macro_rules! ensure {
    (($left:expr) <==> ($right:expr)) => {
        proptest::prop_assert_eq!($left, $right)
    };
}
