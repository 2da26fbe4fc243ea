/// Implements `&`, `|`, `^` and `-` plus their assigning forms for a bitmap type in
/// terms of its `and`/`or`/`xor`/`andnot` methods.
///
/// An owned left operand is updated in place instead of allocating a new result.
macro_rules! impl_set_operators {
    ($ty:ty) => {
        impl_set_operators!(@binop $ty, BitAnd, bitand, and, and_inplace);
        impl_set_operators!(@binop $ty, BitOr, bitor, or, or_inplace);
        impl_set_operators!(@binop $ty, BitXor, bitxor, xor, xor_inplace);
        impl_set_operators!(@binop $ty, Sub, sub, andnot, andnot_inplace);
        impl_set_operators!(@assign $ty, BitAndAssign, bitand_assign, and_inplace);
        impl_set_operators!(@assign $ty, BitOrAssign, bitor_assign, or_inplace);
        impl_set_operators!(@assign $ty, BitXorAssign, bitxor_assign, xor_inplace);
        impl_set_operators!(@assign $ty, SubAssign, sub_assign, andnot_inplace);
    };
    (@binop $ty:ty, $trait_name:ident, $fn_name:ident, $alias:ident, $inplace:ident) => {
        impl ::std::ops::$trait_name for $ty {
            type Output = $ty;

            #[doc = concat!("Syntactic sugar for `.", stringify!($inplace), "`")]
            #[inline]
            fn $fn_name(mut self, other: $ty) -> $ty {
                self.$inplace(&other);
                self
            }
        }

        impl ::std::ops::$trait_name<&$ty> for $ty {
            type Output = $ty;

            #[doc = concat!("Syntactic sugar for `.", stringify!($inplace), "`")]
            #[inline]
            fn $fn_name(mut self, other: &$ty) -> $ty {
                self.$inplace(other);
                self
            }
        }

        impl ::std::ops::$trait_name<$ty> for &$ty {
            type Output = $ty;

            #[doc = concat!("Syntactic sugar for `.", stringify!($alias), "`")]
            #[inline]
            fn $fn_name(self, other: $ty) -> $ty {
                self.$alias(&other)
            }
        }

        impl ::std::ops::$trait_name<&$ty> for &$ty {
            type Output = $ty;

            #[doc = concat!("Syntactic sugar for `.", stringify!($alias), "`")]
            #[inline]
            fn $fn_name(self, other: &$ty) -> $ty {
                self.$alias(other)
            }
        }
    };
    (@assign $ty:ty, $trait_name:ident, $fn_name:ident, $inplace:ident) => {
        impl ::std::ops::$trait_name for $ty {
            #[doc = concat!("Syntactic sugar for `.", stringify!($inplace), "`")]
            #[inline]
            fn $fn_name(&mut self, other: $ty) {
                self.$inplace(&other)
            }
        }

        impl ::std::ops::$trait_name<&$ty> for $ty {
            #[doc = concat!("Syntactic sugar for `.", stringify!($inplace), "`")]
            #[inline]
            fn $fn_name(&mut self, other: &$ty) {
                self.$inplace(other)
            }
        }
    };
}
