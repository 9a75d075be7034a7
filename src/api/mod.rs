//! Typed wrappers over the server's endpoints. All traffic goes through the
//! [`RequestPipeline`](crate::pipeline::RequestPipeline).

mod auth;
mod knowledge_base;

pub use auth::AuthApi;
pub use knowledge_base::KnowledgeBaseApi;
