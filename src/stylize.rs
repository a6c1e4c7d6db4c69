//! Terminal Styles

#[cfg(feature = "extra")]
use owo_colors::{OwoColorize, Styled, style};

macro_rules! def_styles {
    ($($name:ident $init:block)*) => {
        #[cfg(feature = "extra")]
        pub trait Stylize: OwoColorize {
            $(fn $name(&self) -> Styled<&Self>;)*
        }
        #[cfg(feature = "extra")]
        impl<T> Stylize for T where T: OwoColorize {
            $(fn $name(&self) -> Styled<&T> { self.style($init) })*
        }

        #[cfg(not(feature = "extra"))]
        pub trait Stylize {
            $(fn $name(&self) -> &Self;)*
        }
        #[cfg(not(feature = "extra"))]
        impl<T> Stylize for T {
            $(#[inline(always)]
              fn $name(&self) -> &T { self })*
        }
    };
}

def_styles! {
    style_error { style().red().bold() }
    style_kind { style().cyan() }
    style_pos { style().white().bold() }
}
