pub mod responses;

pub use responses::ProxyBody;
