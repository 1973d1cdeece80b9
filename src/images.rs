//! The default fetch handler of the `imgs` resource type.

use std::sync::Arc;

use crate::dispatch::FetchHandler;
use crate::errors::*;
use crate::res::prelude::{Locator, SchemaResolver};
use crate::resource::Resource;
use crate::sched::ScheduleSystemShared;
use crate::tracker::Completion;

/// The resource type name images are queued under.
pub const IMAGES: &str = "imgs";

/// A decoded image with RGBA8 pixels, tagged with its item name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Image {
    name: String,
    locator: String,
    dimensions: (u32, u32),
    pixels: Vec<u8>,
}

impl Image {
    /// Decodes an image from encoded bytes (PNG, BMP, JPEG, etc.).
    pub fn decode<T1, T2>(name: T1, locator: T2, bytes: &[u8]) -> Result<Self>
    where
        T1: Into<String>,
        T2: Into<String>,
    {
        let rgba = image::load_from_memory(bytes)?.to_rgba();
        let dimensions = rgba.dimensions();

        Ok(Image {
            name: name.into(),
            locator: locator.into(),
            dimensions,
            pixels: rgba.into_raw(),
        })
    }

    /// The locator this image has been fetched from.
    #[inline]
    pub fn locator(&self) -> &str {
        &self.locator
    }

    #[inline]
    pub fn dimensions(&self) -> (u32, u32) {
        self.dimensions
    }

    /// Pixels in row-major RGBA8.
    #[inline]
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }
}

impl Resource for Image {
    fn name(&self) -> &str {
        &self.name
    }
}

/// Reads bytes through the virtual filesystems and decodes them on the worker pool.
pub struct ImageHandler {
    schemas: SchemaResolver,
    sched: Arc<ScheduleSystemShared>,
}

impl ImageHandler {
    pub fn new(schemas: SchemaResolver, sched: Arc<ScheduleSystemShared>) -> Self {
        ImageHandler { schemas, sched }
    }

    fn load(schemas: &SchemaResolver, name: &str, locator: &str) -> Result<Image> {
        let bytes = schemas.read(&Locator::new(locator)?)?;
        let image = Image::decode(name, locator, &bytes)?;

        info!(
            "[ImageHandler] loads {} from {} ({}x{}).",
            name, locator, image.dimensions.0, image.dimensions.1
        );

        Ok(image)
    }
}

impl FetchHandler for ImageHandler {
    fn fetch(&self, name: &str, locator: &str, completion: Completion) {
        let schemas = self.schemas.clone();
        let name = name.to_owned();
        let locator = locator.to_owned();

        self.sched
            .spawn(move || match ImageHandler::load(&schemas, &name, &locator) {
                Ok(image) => completion.complete(image),
                Err(err) => completion.fail(err),
            });
    }
}
