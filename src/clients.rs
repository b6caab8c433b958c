pub mod ai_gateway;
pub use ai_gateway::{AiGatewayClient, ReceiptVerifier};
pub mod storage;
pub use storage::{ProofStorage, StorageClient};
