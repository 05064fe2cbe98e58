use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use shared::library::{Album, Track};

use crate::error::LibraryError;

// Leading digits of a value, "1997" out of "1997/05/12" or "1997 (Remaster)".
static RE_LEADING_DIGITS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\s*(\d+)").unwrap());

/// Year from a date-like string: the leading numeric token before any `-`,
/// accepted only when it has exactly four digits.
pub fn parse_year(value: &str) -> Option<u32> {
    let head = value.split('-').next().unwrap_or_default();
    RE_LEADING_DIGITS
        .captures(head)
        .and_then(|caps| caps.get(1))
        .filter(|m| m.as_str().len() == 4)
        .and_then(|m| m.as_str().parse().ok())
}

/// The editable tag fields of a track.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrackField {
    Title,
    Artist,
    Album,
    AlbumArtist,
    Year,
    TrackNumber,
    Genre,
}

impl TrackField {
    pub const ALL: [TrackField; 7] = [
        TrackField::Title,
        TrackField::Artist,
        TrackField::Album,
        TrackField::AlbumArtist,
        TrackField::Year,
        TrackField::TrackNumber,
        TrackField::Genre,
    ];

    pub fn name(self) -> &'static str {
        match self {
            TrackField::Title => "title",
            TrackField::Artist => "artist",
            TrackField::Album => "album",
            TrackField::AlbumArtist => "album_artist",
            TrackField::Year => "year",
            TrackField::TrackNumber => "track_number",
            TrackField::Genre => "genre",
        }
    }

    /// Sets the field from its text form. Returns `false` and leaves the track
    /// untouched when the value is unchanged or not parsable for the field;
    /// otherwise marks the track modified.
    pub fn apply(self, track: &mut Track, value: &str) -> bool {
        let changed = match self {
            TrackField::Title => set_text(&mut track.title, value),
            TrackField::Artist => set_text(&mut track.artist, value),
            TrackField::Album => set_text(&mut track.album, value),
            TrackField::AlbumArtist => set_text(&mut track.album_artist, value),
            TrackField::Genre => {
                let genre = Some(value.to_string()).filter(|g| !g.trim().is_empty());
                set_value(&mut track.genre, genre)
            }
            TrackField::Year => match value.trim() {
                "" => set_value(&mut track.year, None),
                v => match parse_year(v) {
                    Some(year) => set_value(&mut track.year, Some(year)),
                    None => false,
                },
            },
            TrackField::TrackNumber => match value.trim() {
                "" => set_value(&mut track.track_number, None),
                v => match v.parse() {
                    Ok(n) => set_value(&mut track.track_number, Some(n)),
                    Err(_) => false,
                },
            },
        };
        if changed {
            track.is_modified = true;
        }
        changed
    }
}

fn set_text(slot: &mut String, value: &str) -> bool {
    if slot == value {
        return false;
    }
    *slot = value.to_string();
    true
}

fn set_value<T: PartialEq>(slot: &mut T, value: T) -> bool {
    if *slot == value {
        return false;
    }
    *slot = value;
    true
}

impl fmt::Display for TrackField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for TrackField {
    type Err = LibraryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TrackField::ALL
            .into_iter()
            .find(|f| f.name() == s)
            .ok_or_else(|| LibraryError::Config(format!("unknown track field: {s}")))
    }
}

/// Album-wide values chosen by the user, typically from a release lookup.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FieldOverrides {
    pub title: Option<String>,
    pub artist: Option<String>,
    /// Date-like string; only the leading year is used.
    pub date: Option<String>,
    pub genre: Option<String>,
}

impl FieldOverrides {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.artist.is_none() && self.date.is_none() && self.genre.is_none()
    }

    /// Writes the overrides into the album and each of its tracks. Returns the
    /// number of tracks that changed.
    pub fn apply_to(&self, album: &mut Album) -> usize {
        let year = self.date.as_deref().and_then(parse_year);

        if let Some(title) = &self.title {
            album.title = title.clone();
        }
        if let Some(artist) = &self.artist {
            album.artist = artist.clone();
        }
        if let Some(year) = year {
            album.year = Some(year);
            album.year_min = None;
            album.year_max = None;
        }

        let mut changed = 0;
        for track in &mut album.tracks {
            let mut touched = false;
            if let Some(title) = &self.title {
                touched |= TrackField::Album.apply(track, title);
            }
            if let Some(artist) = &self.artist {
                touched |= TrackField::AlbumArtist.apply(track, artist);
            }
            if let Some(year) = year {
                touched |= TrackField::Year.apply(track, &year.to_string());
            }
            if let Some(genre) = &self.genre {
                touched |= TrackField::Genre.apply(track, genre);
            }
            if touched {
                changed += 1;
            }
        }
        changed
    }
}
