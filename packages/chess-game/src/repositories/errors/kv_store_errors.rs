#[derive(Debug)]
pub enum KvStoreError {
    Serialization(String),
    DynamoDb(String),
}

impl std::fmt::Display for KvStoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            KvStoreError::Serialization(msg) => write!(f, "Serialization error: {}", msg),
            KvStoreError::DynamoDb(msg) => write!(f, "DynamoDB error: {}", msg),
        }
    }
}

impl std::error::Error for KvStoreError {}
