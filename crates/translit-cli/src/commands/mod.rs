pub mod convert;
pub mod method_ops;

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("{path}: {source}")]
    Config {
        path: String,
        #[source]
        source: translit_core::config::MethodConfigError,
    },
    #[error(transparent)]
    Method(#[from] translit_core::method::MethodError),
    #[error("unknown input method {0:?}")]
    UnknownMethod(String),
}
