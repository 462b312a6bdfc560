// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// iOS variant: adapts an error-first native module into promises.
//
// The iOS encoder only handles JPEG and PNG. Other formats are refused before
// dispatch with an already-rejected promise, so the native module never sees
// them and callers handle the failure exactly like any other rejection.

use imagetools_core::error::ImageToolsError;
use imagetools_core::{BinaryImageRequest, CompressFormat, Response};
use tracing::{debug, warn};

use crate::promise::{Promise, deferred};
use crate::traits::{ErrorFirstCallback, ErrorFirstModule, ImageTools};

/// Formats the iOS native module accepts.
pub const SUPPORTED_FORMATS: [CompressFormat; 2] = [CompressFormat::Jpeg, CompressFormat::Png];

/// Promise bridge over a Convention B module.
pub struct IosImageTools<M> {
    module: M,
}

impl<M: ErrorFirstModule> IosImageTools<M> {
    pub fn new(module: M) -> Self {
        Self { module }
    }

    pub fn module(&self) -> &M {
        &self.module
    }
}

/// Build the error-first callback that settles a fresh promise.
fn error_first() -> (ErrorFirstCallback, Promise<Response>) {
    let (resolve, reject, promise) = deferred();
    let callback: ErrorFirstCallback = Box::new(move |error, response| match (error, response) {
        (Some(error), _) => reject.reject(error),
        (None, Some(response)) => resolve.resolve(response),
        (None, None) => reject.reject(ImageToolsError::EmptyResponse),
    });
    (callback, promise)
}

impl<M: ErrorFirstModule> ImageTools for IosImageTools<M> {
    fn platform_name(&self) -> &str {
        "iOS"
    }

    fn create_binary_image(&self, request: BinaryImageRequest) -> Promise<Response> {
        if !SUPPORTED_FORMATS.contains(&request.format) {
            warn!(format = %request.format, "refusing format before dispatch");
            return Promise::rejected(ImageToolsError::UnsupportedFormat(format!(
                "{}: only JPEG and PNG are supported",
                request.format
            )));
        }

        let args = request.into_args();
        debug!(path = %args.image_path, format = %args.compress_format, "dispatching createBinaryImage");
        let (callback, promise) = error_first();
        self.module.create_binary_image(args, callback);
        promise
    }

    fn get_image_rgbas(&self, path: &str) -> Promise<Response> {
        debug!(path, "dispatching GetImageRGBAs");
        let (callback, promise) = error_first();
        self.module.get_image_rgbas(path.to_string(), callback);
        promise
    }
}
