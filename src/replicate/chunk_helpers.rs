use std::slice::Chunks;

use fractic_server_error::ServerError;

use crate::errors::InvalidChunkSize;

/// Max number of items accepted by a single DynamoDB BatchWriteItem request.
pub const MAX_BATCH_WRITE_ITEMS: usize = 25;

/// Splits `items` into contiguous chunks of `stride` items (the last chunk
/// holds the remainder), in order. The returned iterator is lazy and can be
/// cloned to restart from the beginning.
pub fn chunked<T>(items: &[T], stride: usize) -> Result<Chunks<'_, T>, ServerError> {
    if stride == 0 {
        return Err(InvalidChunkSize::new("stride must be at least 1"));
    }
    Ok(items.chunks(stride))
}

/// Chunk size used when importing with the given item limit (0 = unbounded).
pub fn write_chunk_size(limit: usize) -> usize {
    match limit {
        0 => MAX_BATCH_WRITE_ITEMS,
        n => n.min(MAX_BATCH_WRITE_ITEMS),
    }
}
