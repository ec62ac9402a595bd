pub mod envelope;

pub use envelope::{Authorizer, RequestContext, RequestEnvelope};
