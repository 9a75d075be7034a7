use crate::errors::ClientResult;
use crate::http::{FileUpload, Payload};
use crate::models::{
    CreateKnowledgeBaseRequest, Document, KnowledgeBase, StatusReply, UpdateKnowledgeBaseRequest, UploadReceipt,
};
use crate::pipeline::RequestPipeline;

const KNOWLEDGE_BASE_ENDPOINT: &str = "/api/knowledge-base";

#[derive(Clone)]
pub struct KnowledgeBaseApi {
    pipeline: RequestPipeline,
}

impl KnowledgeBaseApi {
    pub fn new(pipeline: RequestPipeline) -> Self {
        Self { pipeline }
    }

    pub async fn list(&self) -> ClientResult<Vec<KnowledgeBase>> {
        self.pipeline.get_json(KNOWLEDGE_BASE_ENDPOINT).await
    }

    pub async fn create(&self, name: &str, description: Option<&str>) -> ClientResult<KnowledgeBase> {
        let request = CreateKnowledgeBaseRequest {
            name: name.to_string(),
            description: description.map(str::to_string),
        };
        self.pipeline.post_json(KNOWLEDGE_BASE_ENDPOINT, &request).await
    }

    /// Rename a knowledge base.
    pub async fn update(&self, id: i64, name: &str) -> ClientResult<StatusReply> {
        let request = UpdateKnowledgeBaseRequest {
            name: name.to_string(),
        };
        self.pipeline
            .put(&format!("{KNOWLEDGE_BASE_ENDPOINT}/{id}"), Payload::json(&request)?)
            .await?
            .json()
    }

    pub async fn delete(&self, id: i64) -> ClientResult<()> {
        self.pipeline.delete(&format!("{KNOWLEDGE_BASE_ENDPOINT}/{id}")).await?;
        Ok(())
    }

    pub async fn documents(&self, id: i64) -> ClientResult<Vec<Document>> {
        self.pipeline
            .get_json(&format!("{KNOWLEDGE_BASE_ENDPOINT}/{id}/documents"))
            .await
    }

    pub async fn delete_document(&self, id: i64, document_id: i64) -> ClientResult<()> {
        self.pipeline
            .delete(&format!("{KNOWLEDGE_BASE_ENDPOINT}/{id}/documents/{document_id}"))
            .await?;
        Ok(())
    }

    pub async fn upload_document(&self, id: i64, file: FileUpload) -> ClientResult<UploadReceipt> {
        self.pipeline
            .upload_file(&format!("{KNOWLEDGE_BASE_ENDPOINT}/{id}/upload"), file)
            .await?
            .json()
    }
}
