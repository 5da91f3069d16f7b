use anyhow::Result;
use clap_serde_derive::ClapSerde;
use serde::Deserialize;

#[derive(ClapSerde, Deserialize, Debug)]
pub struct Config {
    /// The address the listener binds to
    #[arg(short, long, env, default_value = "0.0.0.0")]
    pub(crate) address: String,

    /// The port the listener binds to
    #[arg(short, long, env, default_value = "3000")]
    pub(crate) port: u16,

    /// Invocation URL of the regression endpoint scoring tabular batches
    #[arg(
        long,
        env,
        default_value = "https://runtime.sagemaker.us-east-1.amazonaws.com/endpoints/linear-learner-endpoint/invocations"
    )]
    pub(crate) tabular_endpoint: String,

    /// Invocation URL of the text classification endpoint
    #[arg(
        long,
        env,
        default_value = "https://runtime.sagemaker.us-east-1.amazonaws.com/endpoints/blazingtext-classification/invocations"
    )]
    pub(crate) text_endpoint: String,

    /// Seconds to wait for an endpoint before giving up on the request
    #[arg(long, env, default_value = "30")]
    pub(crate) request_timeout: u64,
}

impl Config {
    pub fn from_toml(path: &str) -> Result<Self> {
        let str = std::fs::read_to_string(path)?;
        let config = toml::from_str(&str)?;
        Ok(config)
    }
}
