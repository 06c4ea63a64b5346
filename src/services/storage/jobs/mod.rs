mod ingest;
mod server;

pub use ingest::IngestJob;
pub use server::ServerJob;
