pub mod errors;
pub mod stream;

pub use errors::{backend_error, error_message_from_body};
pub use stream::{decode_step, decode_stream, Decoded, FrameFormat, TextExtractor};

use futures_util::StreamExt;

use crate::provider::{GenerationOptions, Result};

/// Drain a fragment stream, reporting each fragment before the next read.
pub(crate) async fn collect_fragments<S>(fragments: S, options: &mut GenerationOptions<'_>) -> Result<String>
where
    S: futures::Stream<Item = Result<String>>,
{
    let mut fragments = std::pin::pin!(fragments);
    let mut full_text = String::new();
    while let Some(fragment) = fragments.next().await {
        let fragment = fragment?;
        options.report(&fragment);
        full_text.push_str(&fragment);
    }
    Ok(full_text)
}
