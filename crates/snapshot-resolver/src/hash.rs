use blake3::Hasher;

pub const DOCUMENT_PREFIX: &str = "xml";

pub fn hash_bytes(prefix: &str, bytes: &[u8]) -> String {
    let mut hasher = Hasher::new();
    hasher.update(bytes);
    format!("{}_{}", prefix, hasher.finalize().to_hex())
}

pub fn document_hash(text: &str) -> String {
    hash_bytes(DOCUMENT_PREFIX, text.as_bytes())
}
