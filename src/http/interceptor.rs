//! Ordered request and response transforms.
//!
//! Chains are built once and shared read-only by every call. Interceptors run
//! left to right: with `[f, g]` registered, the result is `g(f(x))`.

use std::sync::Arc;

use super::request::RequestDescriptor;
use super::response::RawResponse;

pub type RequestInterceptor = Arc<dyn Fn(RequestDescriptor) -> RequestDescriptor + Send + Sync>;

pub type ResponseInterceptor = Arc<dyn Fn(RawResponse) -> RawResponse + Send + Sync>;

/// An immutable sequence of transforms over `T`.
pub struct Chain<T> {
    steps: Arc<[Arc<dyn Fn(T) -> T + Send + Sync>]>,
}

impl<T> Chain<T> {
    pub fn new(steps: Vec<Arc<dyn Fn(T) -> T + Send + Sync>>) -> Self {
        Self {
            steps: steps.into(),
        }
    }

    pub fn apply(&self, value: T) -> T {
        self.steps.iter().fold(value, |acc, step| step(acc))
    }
}

impl<T> Clone for Chain<T> {
    fn clone(&self) -> Self {
        Self {
            steps: Arc::clone(&self.steps),
        }
    }
}

impl<T> Default for Chain<T> {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl<T> std::fmt::Debug for Chain<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Chain").field("len", &self.steps.len()).finish()
    }
}

pub type RequestChain = Chain<RequestDescriptor>;
pub type ResponseChain = Chain<RawResponse>;
