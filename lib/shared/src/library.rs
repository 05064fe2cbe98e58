use serde::{Deserialize, Serialize};

/// One audio file as reported by the scanning backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Track {
    /// Absolute file path, also the track identity
    pub path: String,
    pub filename: String,
    pub title: String,
    pub artist: String,
    #[serde(default)]
    pub album_artist: String,
    pub album: String,
    #[serde(default)]
    pub year: Option<u32>,
    #[serde(default)]
    pub track_number: Option<u32>,
    #[serde(default)]
    pub genre: Option<String>,
    #[serde(default)]
    pub duration_sec: u64,
    #[serde(default)]
    pub format: String,
    #[serde(default)]
    pub bit_rate: Option<u32>,
    #[serde(default)]
    pub size: u64,
    #[serde(default)]
    pub has_cover: bool,
    /// Set by local edits only, a scan always reports `false`
    #[serde(default)]
    pub is_modified: bool,
}

impl Track {
    pub fn new(path: impl Into<String>, filename: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            filename: filename.into(),
            title: String::new(),
            artist: String::new(),
            album_artist: String::new(),
            album: String::new(),
            year: None,
            track_number: None,
            genre: None,
            duration_sec: 0,
            format: String::new(),
            bit_rate: None,
            size: 0,
            has_cover: false,
            is_modified: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AlbumStatus {
    Clean,
    Dirty,
    Processing,
    Incomplete,
}

/// A directory of tracks. The `id` is assigned by the scanning backend and is
/// stable for a given path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Album {
    pub id: String,
    pub path: String,
    pub title: String,
    pub artist: String,
    #[serde(default)]
    pub year: Option<u32>,
    #[serde(default, rename = "yearMin", skip_serializing_if = "Option::is_none")]
    pub year_min: Option<u32>,
    #[serde(default, rename = "yearMax", skip_serializing_if = "Option::is_none")]
    pub year_max: Option<u32>,
    #[serde(default)]
    pub cover_path: Option<String>,
    #[serde(default)]
    pub has_playlist: bool,
    #[serde(default)]
    pub tracks: Vec<Track>,
    pub status: AlbumStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issues: Option<Vec<String>>,
}

impl Album {
    pub fn new(id: impl Into<String>, path: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            path: path.into(),
            title: title.into(),
            artist: String::new(),
            year: None,
            year_min: None,
            year_max: None,
            cover_path: None,
            has_playlist: false,
            tracks: Vec::new(),
            status: AlbumStatus::Processing,
            issues: None,
        }
    }

    pub fn is_modified(&self) -> bool {
        self.tracks.iter().any(|t| t.is_modified)
    }
}

/// Response of a directory scan: the albums found plus per-file read errors.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScanResult {
    pub albums: Vec<Album>,
    #[serde(default)]
    pub errors: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn album_deserializes_camel_case_year_range() {
        let json = r#"{
            "id": "a1",
            "path": "/Music/A",
            "title": "A",
            "artist": "Someone",
            "yearMin": 1991,
            "yearMax": 1994,
            "status": "Dirty"
        }"#;
        let album: Album = serde_json::from_str(json).unwrap();
        assert_eq!(album.year_min, Some(1991));
        assert_eq!(album.year_max, Some(1994));
        assert_eq!(album.status, AlbumStatus::Dirty);
        assert!(album.tracks.is_empty());
        assert!(album.issues.is_none());
    }

    #[test]
    fn is_modified_reflects_any_track() {
        let mut album = Album::new("a1", "/Music/A", "A");
        album.tracks.push(Track::new("/Music/A/01.mp3", "01.mp3"));
        album.tracks.push(Track::new("/Music/A/02.mp3", "02.mp3"));
        assert!(!album.is_modified());
        album.tracks[1].is_modified = true;
        assert!(album.is_modified());
    }
}
