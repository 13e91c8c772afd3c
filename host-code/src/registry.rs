//! Named kernel variants, kept in registration order.

use crate::{
    error::{BenchError, KernelFailure, Result},
    image_io::{ImageDescriptor, PixelBuffer},
};
use clap::ValueEnum;
use std::{fmt, sync::Arc};
use strum::IntoEnumIterator;
use strum_macros::{Display, EnumIter};

type RunFn = dyn Fn(&[u8], &ImageDescriptor) -> Result<PixelBuffer, KernelFailure> + Send + Sync;

/// One named implementation of the transform under test.
///
/// `run` only borrows the input, so a variant can't disturb the pristine
/// buffer later variants are run against. It returns a freshly allocated
/// output buffer.
#[derive(Clone)]
pub struct KernelVariant {
    name: String,
    run: Arc<RunFn>,
}

impl KernelVariant {
    pub fn new<F>(name: impl Into<String>, run: F) -> Self
    where
        F: Fn(&[u8], &ImageDescriptor) -> Result<PixelBuffer, KernelFailure> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            run: Arc::new(run),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn run(&self, input: &[u8], descriptor: &ImageDescriptor) -> Result<PixelBuffer, KernelFailure> {
        (self.run)(input, descriptor)
    }
}

impl fmt::Debug for KernelVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KernelVariant")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// The built-in blur5 variants. The first one is the production variant.
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum, EnumIter, Display)]
pub enum Blur5Variant {
    /// Row-parallel blur5 (production)
    #[strum(to_string = "blur5")]
    Blur5,
    /// Serial blur5
    #[strum(to_string = "serial blur5")]
    Serial,
    /// Baseline parallel blur5, one task per pixel
    #[strum(to_string = "baseline parallel blur5")]
    Parallel,
}

type Blur5Fn = fn(&[u8], &mut [u8], usize, usize, usize) -> std::result::Result<(), kernels::KernelError>;

impl Blur5Variant {
    fn kernel(self) -> Blur5Fn {
        match self {
            Blur5Variant::Blur5 => kernels::blur5,
            Blur5Variant::Serial => kernels::blur5_serial,
            Blur5Variant::Parallel => kernels::blur5_parallel,
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct KernelRegistry {
    variants: Vec<KernelVariant>,
}

impl KernelRegistry {
    pub fn new() -> Self {
        Self {
            variants: Vec::new(),
        }
    }

    /// Registry holding every [`Blur5Variant`] in declaration order
    pub fn with_blur5_variants() -> Self {
        let mut registry = Self::new();
        for variant in Blur5Variant::iter() {
            let kernel = variant.kernel();
            registry.variants.push(KernelVariant::new(
                variant.to_string(),
                move |input, descriptor| {
                    let mut output = vec![0u8; descriptor.len()];
                    kernel(
                        input,
                        &mut output,
                        descriptor.width(),
                        descriptor.height(),
                        descriptor.channels(),
                    )?;
                    Ok(output)
                },
            ));
        }
        registry
    }

    /// Append a variant. Names must be unique; a duplicate leaves the
    /// registry untouched.
    pub fn register<F>(&mut self, name: impl Into<String>, run: F) -> Result<()>
    where
        F: Fn(&[u8], &ImageDescriptor) -> Result<PixelBuffer, KernelFailure> + Send + Sync + 'static,
    {
        let name = name.into();
        if self.find(&name).is_some() {
            return Err(BenchError::DuplicateVariant(name));
        }
        self.variants.push(KernelVariant::new(name, run));
        Ok(())
    }

    pub fn all(&self) -> &[KernelVariant] {
        &self.variants
    }

    pub fn find(&self, name: &str) -> Option<&KernelVariant> {
        self.variants.iter().find(|variant| variant.name == name)
    }

    pub fn len(&self) -> usize {
        self.variants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variants.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity(input: &[u8], _: &ImageDescriptor) -> Result<PixelBuffer, KernelFailure> {
        Ok(input.to_vec())
    }

    #[test]
    fn keeps_registration_order() {
        let mut registry = KernelRegistry::new();
        for name in ["c", "a", "b"] {
            registry.register(name, identity).unwrap();
        }
        let names: Vec<_> = registry.all().iter().map(KernelVariant::name).collect();
        assert_eq!(names, ["c", "a", "b"]);
    }

    #[test]
    fn rejects_duplicate_names() {
        let mut registry = KernelRegistry::new();
        registry.register("ref", identity).unwrap();
        let err = registry.register("ref", identity).unwrap_err();
        assert!(matches!(err, BenchError::DuplicateVariant(name) if name == "ref"));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn blur5_variants_are_registered_production_first() {
        let registry = KernelRegistry::with_blur5_variants();
        let names: Vec<_> = registry.all().iter().map(KernelVariant::name).collect();
        assert_eq!(names, ["blur5", "serial blur5", "baseline parallel blur5"]);
        assert!(registry.find(&Blur5Variant::Serial.to_string()).is_some());
    }

    #[test]
    fn blur5_variant_surfaces_kernel_errors() {
        let registry = KernelRegistry::with_blur5_variants();
        let descriptor = ImageDescriptor::new(2, 2, 1).unwrap();
        let err = registry.all()[0].run(&[0u8; 3], &descriptor).unwrap_err();
        assert!(err.to_string().contains("input buffer holds 3 bytes"));
    }
}
