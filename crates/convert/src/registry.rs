//! Converter registry: dispatches parse and render by format.

use prpm_canonical::{CanonicalPackage, Format, PackageInput, Subtype};
use rayon::prelude::*;
use tracing::debug;

use crate::error::ConvertError;
use crate::formats::generic::parse_as;
use crate::formats::{
    ClaudeConverter, ContinueConverter, CopilotConverter, CursorConverter, FormatConverter,
    GenericConverter, KiroConverter, WindsurfConverter,
};
use crate::options::ConversionOptions;
use crate::report::ConversionResult;

/// Registered converters, one per format, in registration order.
pub struct Registry {
    converters: Vec<Box<dyn FormatConverter>>,
}

impl Default for Registry {
    /// Every built-in converter. `mcp` has none.
    fn default() -> Self {
        Self::new()
            .with_converter(CursorConverter)
            .with_converter(ClaudeConverter)
            .with_converter(ContinueConverter)
            .with_converter(WindsurfConverter)
            .with_converter(CopilotConverter)
            .with_converter(KiroConverter)
            .with_converter(GenericConverter)
    }
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("formats", &self.formats())
            .finish()
    }
}

impl Registry {
    /// An empty registry.
    pub fn new() -> Self {
        Self {
            converters: Vec::new(),
        }
    }

    pub fn with_converter(mut self, converter: impl FormatConverter + 'static) -> Self {
        self.register(Box::new(converter));
        self
    }

    /// Adds a converter, replacing any registered for the same format.
    pub fn register(&mut self, converter: Box<dyn FormatConverter>) {
        let format = converter.format();
        match self.converters.iter().position(|c| c.format() == format) {
            Some(i) => self.converters[i] = converter,
            None => self.converters.push(converter),
        }
    }

    pub fn get(&self, format: Format) -> Option<&dyn FormatConverter> {
        self.converters
            .iter()
            .find(|c| c.format() == format)
            .map(|c| c.as_ref())
    }

    /// Formats that can be rendered, in registration order.
    pub fn formats(&self) -> Vec<Format> {
        self.converters.iter().map(|c| c.format()).collect()
    }

    /// Parse content as `format`. Formats without a converter get the
    /// generic markdown parse, recorded under their own format.
    pub fn parse(
        &self,
        format: Format,
        content: &str,
        input: &PackageInput,
        subtype: Option<Subtype>,
    ) -> CanonicalPackage {
        match self.get(format) {
            Some(converter) => converter.parse(content, input, subtype),
            None => {
                debug!(format = %format, "No dedicated parser, using generic markdown");
                parse_as(format, content, input, subtype)
            }
        }
    }

    /// Render into `target`. A target with no converter yields a degraded
    /// result rather than an error.
    pub fn render(
        &self,
        pkg: &CanonicalPackage,
        target: Format,
        options: &ConversionOptions,
    ) -> ConversionResult {
        match self.get(target) {
            Some(converter) => converter.render(pkg, options),
            None => ConversionResult::failed(target, &ConvertError::UnsupportedTarget(target)),
        }
    }

    /// Render into every registered format, in parallel. Results come back in
    /// registration order.
    pub fn render_all(&self, pkg: &CanonicalPackage, options: &ConversionOptions) -> Vec<ConversionResult> {
        self.converters
            .par_iter()
            .map(|converter| converter.render(pkg, options))
            .collect()
    }
}
