// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Public call surface and the two native calling conventions it normalizes.

use imagetools_core::error::ImageToolsError;
use imagetools_core::{BinaryImageArgs, BinaryImageRequest, Response};

use crate::promise::{Promise, Rejecter, Resolver};

/// The promise-returning interface application code calls.
///
/// Every call returns immediately; the promise settles exactly once with the
/// native module's response or error, unchanged.
pub trait ImageTools: Send + Sync {
    /// Human-readable name of the platform variant (e.g. "Android", "iOS").
    fn platform_name(&self) -> &str;

    /// Binarize the image at `request.path` and write the result to the cache.
    fn create_binary_image(&self, request: BinaryImageRequest) -> Promise<Response>;

    /// Extract the raw RGBA pixels of the image at `path`.
    fn get_image_rgbas(&self, path: &str) -> Promise<Response>;
}

/// Convention A: the native call receives a resolver and a rejecter as
/// trailing arguments and invokes exactly one of them once.
pub trait ResolveRejectModule: Send + Sync {
    fn create_binary_image(&self, args: BinaryImageArgs, resolve: Resolver, reject: Rejecter);

    fn get_image_rgbas(&self, image_path: String, resolve: Resolver, reject: Rejecter);
}

/// Callback of Convention B, invoked as `(error, response)`.
pub type ErrorFirstCallback =
    Box<dyn FnOnce(Option<ImageToolsError>, Option<Response>) + Send + 'static>;

/// Convention B: the native call receives one error-first callback.
pub trait ErrorFirstModule: Send + Sync {
    fn create_binary_image(&self, args: BinaryImageArgs, callback: ErrorFirstCallback);

    fn get_image_rgbas(&self, image_path: String, callback: ErrorFirstCallback);
}
