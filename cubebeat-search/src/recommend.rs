use cubebeat_core::{Platform, SongRecord};

/// What gets recommended to everyone until there is a personalization backend
pub fn popular_songs() -> Vec<SongRecord> {
    [
        ("Blinding Lights", "The Weeknd", Platform::YouTube),
        ("Good 4 U", "Olivia Rodrigo", Platform::Spotify),
        ("Levitating", "Dua Lipa", Platform::SoundCloud),
    ]
    .into_iter()
    .map(|(title, artist, platform)| SongRecord {
        id: String::new(),
        title: title.to_string(),
        artist: artist.to_string(),
        duration_seconds: None,
        platform,
        url: String::new(),
        thumbnail: String::new(),
    })
    .collect()
}
