//! Plain-text listings written to stdout

use std::fmt::Write;

use spotify_api::{Playlist, PlaylistTrack, UserProfile};

pub fn profile(user: &UserProfile) -> String {
    let mut out = format!("Logged in as {} ({})", user.name(), user.id);
    if let Some(email) = &user.email {
        let _ = write!(out, " <{email}>");
    }
    let _ = writeln!(out, ", {} followers", user.follower_count());
    out
}

pub fn playlists(items: &[Playlist]) -> String {
    let mut out = format!("{} playlists\n", items.len());
    for (i, playlist) in items.iter().enumerate() {
        let visibility = if playlist.collaborative {
            "collaborative"
        } else if playlist.is_public() {
            "public"
        } else {
            "private"
        };
        let owner = playlist
            .owner
            .display_name
            .as_deref()
            .unwrap_or(&playlist.owner.id);
        let _ = writeln!(
            out,
            "{:>4}. {} [{} tracks, {visibility}, by {owner}] id={}",
            i + 1,
            playlist.name,
            playlist.track_count(),
            playlist.id
        );
        if let Some(description) = playlist.description() {
            let _ = writeln!(out, "      {description}");
        }
    }
    out
}

pub fn tracks(items: &[PlaylistTrack]) -> String {
    let mut out = format!("{} tracks\n", items.len());
    for (i, item) in items.iter().enumerate() {
        match &item.track {
            Some(track) => {
                let _ = writeln!(
                    out,
                    "{:>4}. {} - {} ({}){}",
                    i + 1,
                    track.artist_names(),
                    track.name,
                    duration(track.duration_ms),
                    if track.explicit { " [E]" } else { "" }
                );
            }
            None => {
                let _ = writeln!(out, "{:>4}. <unavailable>", i + 1);
            }
        }
    }
    out
}

/// `m:ss`
fn duration(ms: u64) -> String {
    let secs = ms / 1000;
    format!("{}:{:02}", secs / 60, secs % 60)
}
