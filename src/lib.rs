//! # luaslim
//!
//! A minifier for Lua 5.1 through 5.4 source code. Comments and layout are
//! dropped, local variables get the shortest names that do not collide, and
//! constant arithmetic can optionally be folded.
//!
//! ```lua
//! -- Greets the world
//! local message = "Hello, " .. "World!"
//! print(message)
//! ```
//! ```text
//! local a="Hello, ".."World!"print(a)
//! ```
//!
//! ## Minifying from Rust
//!
//! ```rust
//! use luaslim::{LuaMinifier, MinifyConfig, Transform};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let out = luaslim::minify("local x = 10\nprint(x)\n")?;
//!     assert_eq!(out, "local a=10 print(a)");
//!     // Or with explicit settings
//!     let cfg = MinifyConfig { fold_constants: true, ..Default::default() };
//!     let out = LuaMinifier.transform("return 60 * 60 * 24", &cfg)?;
//!     assert_eq!(out, "return 86400");
//!     Ok(())
//! }
//! ```

#[macro_use]
extern crate lazy_static;
#[macro_use]
pub(crate) mod error;
pub mod tok;
pub mod tokit;
pub mod scope;
pub(crate) mod opt;
pub mod parse;
pub(crate) mod rename;
pub(crate) mod emit;
pub mod config;
pub mod transform;
pub mod runner;
pub mod logging;
pub mod stylize;

pub use crate::config::MinifyConfig;
pub use crate::error::{Error, ErrorKind, Meta, Source, Stage, Result};
pub use crate::runner::{Report, Runner};
pub use crate::transform::{LuaMinifier, Transform};

/// Minify `text` with the default settings.
pub fn minify(text: &str) -> Result<String> {
    LuaMinifier.transform(text, &MinifyConfig::default())
}
