mod server;

pub use server::ServerJob;
