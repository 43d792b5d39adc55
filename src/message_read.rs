use std::io::{self, Read};

use tokio::io::{AsyncRead, AsyncReadExt};

fn too_large(limit: usize) -> io::Error {
    io::Error::new(
        io::ErrorKind::InvalidData,
        format!("request body exceeds {limit} bytes"),
    )
}

/// Reads a whole request body, failing if it is longer than `limit` bytes.
pub(crate) fn read_body(reader: impl Read, limit: Option<usize>) -> io::Result<Vec<u8>> {
    let mut body = Vec::new();
    match limit {
        Some(limit) => {
            reader.take((limit as u64).saturating_add(1)).read_to_end(&mut body)?;
            if body.len() > limit {
                return Err(too_large(limit));
            }
        }
        None => {
            let mut reader = reader;
            reader.read_to_end(&mut body)?;
        }
    }
    Ok(body)
}

pub(crate) async fn read_body_async(
    reader: impl AsyncRead + Unpin,
    limit: Option<usize>,
) -> io::Result<Vec<u8>> {
    let mut body = Vec::new();
    match limit {
        Some(limit) => {
            reader.take((limit as u64).saturating_add(1)).read_to_end(&mut body).await?;
            if body.len() > limit {
                return Err(too_large(limit));
            }
        }
        None => {
            let mut reader = reader;
            reader.read_to_end(&mut body).await?;
        }
    }
    Ok(body)
}
