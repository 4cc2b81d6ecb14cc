//! Remote image refresh: fetch once, or keep re-fetching at the source's interval.

use super::StopToken;
use crate::error::Result;
use crate::types::RemoteSource;
use std::time::Duration;

pub trait RefreshTarget: Send + Sync {
    /// Fetch the image of `layer`, recomposite and deliver it
    fn refresh_layer(&self, layer: usize, source: &RemoteSource) -> Result<()>;
}

/// Returns the number of fetches attempted
pub fn run_refresh(
    target: &dyn RefreshTarget,
    layer: usize,
    source: &RemoteSource,
    token: &StopToken,
    poll: Duration,
) -> usize {
    let mut attempts = 0;
    while !token.is_cancelled() {
        attempts += 1;
        if let Err(e) = target.refresh_layer(layer, source) {
            log::warn!("Refresh of {} failed: {}", source.url, e);
        }
        let Some(interval) = source.refresh else {
            break;
        };
        if !token.sleep(interval, poll) {
            break;
        }
    }
    attempts
}
