//! HLS media playlist for discovered segments

use super::{ContentHost, SegmentCount, SegmentRequest};
use crate::config::PlaylistConfig;

/// Content type served with generated playlists
pub const PLAYLIST_CONTENT_TYPE: &str = "application/vnd.apple.mpegurl";

/// Renders a VOD playlist that points the player straight at the content host.
///
/// Real per-segment durations are never known, so every entry carries the
/// same nominal duration.
#[derive(Debug, Clone)]
pub struct PlaylistSynthesizer {
    host: ContentHost,
    target_duration_secs: u32,
    nominal_segment_secs: f64,
}

impl PlaylistSynthesizer {
    pub fn new(host: ContentHost, config: &PlaylistConfig) -> Self {
        Self {
            host,
            target_duration_secs: config.target_duration_secs,
            nominal_segment_secs: config.nominal_segment_secs,
        }
    }

    pub fn render(&self, request: &SegmentRequest, count: SegmentCount) -> String {
        let mut playlist = String::from("#EXTM3U\n#EXT-X-PLAYLIST-TYPE:VOD\n");
        playlist.push_str(&format!("#EXT-X-TARGETDURATION:{}\n", self.target_duration_secs));

        for index in count.indices() {
            playlist.push_str(&format!("#EXTINF:{:.1},\n", self.nominal_segment_secs));
            playlist.push_str(&self.host.segment_url(request, index));
            playlist.push('\n');
        }

        playlist.push_str("#EXT-X-ENDLIST");
        playlist
    }
}
