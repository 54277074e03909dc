//! HTTP request execution with retry, per-attempt timeout, auth injection and
//! interceptor chains.

mod error;
mod executor;
mod interceptor;
mod logger;
mod request;
mod response;
mod retry;
mod upload;

pub use error::{AttemptTimeout, HttpStatusError};
pub use executor::{ExecutorBuilder, RequestExecutor};
pub use interceptor::{Chain, RequestChain, RequestInterceptor, ResponseChain, ResponseInterceptor};
pub use logger::{LogFacade, Logger};
pub use request::{CallConfig, Credentials, Method, RequestDescriptor};
pub use response::{RawResponse, Response};
pub use retry::{once, with_retry, with_timeout};
pub use upload::{FILE_FIELD, UploadFile};
