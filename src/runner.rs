//! File-to-file Runner

use std::borrow::Cow;
use std::fs;
use std::path::Path;

use crate::config::MinifyConfig;
use crate::error::{Error, Meta, Result};
use crate::transform::Transform;

/// Sizes of a finished run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Report {
    pub read: usize,
    pub written: usize,
}

/**
 * Reads a source file, transforms it and writes the result. Each stage
 * blocks until it is done, and nothing is written unless the transform and
 * its validation succeed.
 */
pub struct Runner<T: Transform> {
    transform: T,
    config: MinifyConfig,
}

impl<T: Transform> Runner<T> {
    pub fn new(transform: T) -> Runner<T> {
        Runner { transform, config: MinifyConfig::default() }
    }

    pub fn with_config(mut self, config: MinifyConfig) -> Runner<T> {
        self.config = config;
        self
    }

    pub fn config(&self) -> &MinifyConfig {
        &self.config
    }

    pub fn load(&self, src: &Path) -> Result<String> {
        log::debug!("reading {}", src.display());
        fs::read_to_string(src).map_err(|e| Error::read(src, &e))
    }

    /// Transform `text` read from `src`, errors are tagged with that path.
    pub fn transform(&self, src: &Path, text: &str) -> Result<String> {
        let tag = |e: Error| e.fallback(Meta::SourceFile(Cow::Owned(src.display().to_string())));
        let out = self.transform.transform(text, &self.config).map_err(tag)?;
        self.transform.validate(&out).map_err(tag)?;
        Ok(out)
    }

    pub fn save(&self, dst: &Path, text: &str) -> Result<()> {
        log::debug!("writing {}", dst.display());
        fs::write(dst, text).map_err(|e| Error::write(dst, &e))
    }

    pub fn run(&self, src: &Path, dst: &Path) -> Result<Report> {
        let text = self.load(src)?;
        let out = self.transform(src, &text)?;
        self.save(dst, &out)?;
        log::info!("{} -> {}: {} bytes -> {} bytes",
                   src.display(), dst.display(), text.len(), out.len());
        Ok(Report { read: text.len(), written: out.len() })
    }
}
