pub mod config;
pub mod http;

pub use config::ClientConfig;
pub use http::{
    AttemptTimeout, CallConfig, Credentials, ExecutorBuilder, HttpStatusError, LogFacade, Logger,
    Method, RawResponse, RequestDescriptor, RequestExecutor, Response, UploadFile,
};
