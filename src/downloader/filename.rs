// File and folder naming from video metadata

use super::models::{MediaItem, ResolvedName};

const EXTRA_ALLOWED: &[char] = &[' ', '-', '_', '.', '(', ')', '%'];

const UNTITLED_PLAYLIST: &str = "Untitled Playlist";

/// Keep ASCII letters, digits and ` -_.()%`; drop everything else.
pub fn sanitize(raw: &str) -> String {
    raw.chars().filter(|c| is_allowed(*c)).collect()
}

fn is_allowed(c: char) -> bool {
    c.is_ascii_alphanumeric() || EXTRA_ALLOWED.contains(&c)
}

/// Best-effort `(artist, title)` split of a video title.
///
/// `"Artist - Song"` splits on the first `-`. Titles without a dash fall
/// back to the channel name as artist. Titles with several dashes keep
/// everything after the first one in the track title.
pub fn derive_name(title: &str, author: &str) -> (String, String) {
    match title.split_once('-') {
        Some((artist, track)) => (artist.trim().to_string(), track.trim().to_string()),
        None => (author.trim().to_string(), title.trim().to_string()),
    }
}

/// `"{artist} - {title}.mp3"`, sanitized
pub fn mp3_file_name(artist: &str, title: &str) -> String {
    sanitize(&format!("{} - {}.mp3", artist, title))
}

pub fn resolve_name(item: &MediaItem) -> ResolvedName {
    let (artist, title) = derive_name(&item.title, &item.author_name);
    let file_base_name = mp3_file_name(&artist, &title);
    ResolvedName {
        artist,
        title,
        file_base_name,
    }
}

/// Folder name for a playlist's tracks.
///
/// Names made only of dots and spaces (`.`, `..`) would resolve outside
/// the destination folder and fall back to a fixed name.
pub fn playlist_folder_name(playlist_title: &str) -> String {
    let name = sanitize(playlist_title);
    if name.trim_matches(|c: char| c == '.' || c == ' ').is_empty() {
        UNTITLED_PLAYLIST.to_string()
    } else {
        name
    }
}
