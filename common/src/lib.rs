pub mod accessor;
pub mod cluster_api;
pub mod command;
pub mod config;
pub mod error;
pub mod import;
pub mod kubeadm;
pub mod machines;
pub mod provider;
pub mod validators;

#[macro_export]
macro_rules! exit {
    ($err:expr, $($arg:tt)*) => {
        {
            tracing::error!($($arg)*);
            anyhow::bail!($err)
        }
    };
}
