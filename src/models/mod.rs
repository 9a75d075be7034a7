pub mod knowledge_base;
pub mod user;

pub use knowledge_base::{
    CreateKnowledgeBaseRequest, Document, KnowledgeBase, StatusReply, UpdateKnowledgeBaseRequest, UploadReceipt,
};
pub use user::{AuthResponse, FirstUserCheck, LoginRequest, RegisterRequest, UserProfile};
