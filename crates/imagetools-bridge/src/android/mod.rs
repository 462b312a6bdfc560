// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Android variant: adapts a resolve/reject native module into promises.
//
// Every compress format (PNG, JPEG, WEBP) is forwarded; validation of the
// remaining arguments is left to the native module.

use imagetools_core::{BinaryImageRequest, Response};
use tracing::debug;

use crate::promise::{Promise, deferred};
use crate::traits::{ImageTools, ResolveRejectModule};

/// Promise bridge over a Convention A module.
pub struct AndroidImageTools<M> {
    module: M,
}

impl<M: ResolveRejectModule> AndroidImageTools<M> {
    pub fn new(module: M) -> Self {
        Self { module }
    }

    pub fn module(&self) -> &M {
        &self.module
    }
}

impl<M: ResolveRejectModule> ImageTools for AndroidImageTools<M> {
    fn platform_name(&self) -> &str {
        "Android"
    }

    fn create_binary_image(&self, request: BinaryImageRequest) -> Promise<Response> {
        let args = request.into_args();
        debug!(path = %args.image_path, format = %args.compress_format, "dispatching createBinaryImage");
        let (resolve, reject, promise) = deferred();
        self.module.create_binary_image(args, resolve, reject);
        promise
    }

    fn get_image_rgbas(&self, path: &str) -> Promise<Response> {
        debug!(path, "dispatching GetImageRGBAs");
        let (resolve, reject, promise) = deferred();
        self.module.get_image_rgbas(path.to_string(), resolve, reject);
        promise
    }
}
