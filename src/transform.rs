//! The Transformation Capability

use crate::config::MinifyConfig;
use crate::emit::emit;
use crate::error::{Error, ErrorKind, Result};
use crate::parse::parse;
use crate::rename::assign_names;

/// Text-to-text transformation driven by a [`MinifyConfig`].
pub trait Transform {
    fn transform(&self, text: &str, config: &MinifyConfig) -> Result<String>;

    /// Check an output before it is written anywhere. Every output is
    /// accepted unless an implementation knows better.
    fn validate(&self, _output: &str) -> Result<()> {
        Ok(())
    }
}

/// Lua 5.1 through 5.4 minifier.
#[derive(Debug, Default, Clone, Copy)]
pub struct LuaMinifier;

impl Transform for LuaMinifier {
    fn transform(&self, text: &str, config: &MinifyConfig) -> Result<String> {
        let chunk = parse(text, config.fold_constants)?;
        let names = assign_names(&chunk.scope, &chunk.toks, config);
        let out = emit(&chunk, &names);
        log::debug!("minified {} bytes into {} bytes ({} folds)",
                    text.len(), out.len(), chunk.folds.len());
        Ok(out)
    }

    /// The output must still be a Lua chunk.
    fn validate(&self, output: &str) -> Result<()> {
        parse(output, false).map(|_| ()).map_err(|cause| {
            Error::new(ErrorKind::InvalidOutput { cause: Box::new(cause) })
        })
    }
}
