use crate::libraries::helpers::constants;
use structopt::StructOpt;

#[derive(Debug, StructOpt)]
pub struct SharedOptions {
    /// Message broker bootstrap endpoint
    #[structopt(
        short,
        long,
        global = true,
        env,
        default_value = constants::DEFAULT_BROKER,
        value_name = "host:port"
    )]
    pub broker: String,

    /// Broker topic carrying reading events
    #[structopt(
        short,
        long,
        global = true,
        env,
        default_value = constants::DEFAULT_TOPIC,
        value_name = "name"
    )]
    pub topic: String,

    /// Consumer group used when reading from the topic
    #[structopt(
        long,
        global = true,
        env,
        default_value = constants::DEFAULT_CONSUMER_GROUP,
        value_name = "name"
    )]
    pub consumer_group: String,

    /// Enable status reporting server with optional port.
    ///
    /// If the flag is used without a port it will default to 47002.
    #[structopt(long, global = true, env, value_name = "port")]
    pub status_server: Option<Option<u16>>,

    /// Log level, scopable to different modules
    ///
    /// Levels: trace, debug, info, warn, error
    #[structopt(
        short,
        long,
        global = true,
        default_value = "info",
        env = "RUST_LOG",
        value_name = "level"
    )]
    pub log: String,
}
