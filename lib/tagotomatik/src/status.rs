use shared::library::{Album, AlbumStatus};

fn missing(value: &str) -> bool {
    value.trim().is_empty()
}

/// Problems with an album. The backend's own list wins when it has one.
pub fn album_issues(album: &Album) -> Vec<String> {
    if let Some(issues) = album.issues.as_ref().filter(|i| !i.is_empty()) {
        return issues.clone();
    }

    let mut issues = Vec::new();
    if album.cover_path.is_none() {
        issues.push("Missing cover".to_string());
    }
    if !album.has_playlist {
        issues.push("Missing playlist".to_string());
    }
    if album.year.unwrap_or(0) == 0 {
        issues.push("Missing year".to_string());
    }

    let count = |f: fn(&shared::library::Track) -> bool| album.tracks.iter().filter(|t| f(t)).count();
    let per_field = [
        ("title", count(|t| missing(&t.title))),
        ("artist", count(|t| missing(&t.artist))),
        ("album", count(|t| missing(&t.album))),
        ("genre", count(|t| missing(t.genre.as_deref().unwrap_or("")))),
    ];
    for (field, n) in per_field {
        if n > 0 {
            issues.push(format!("Missing {field} ({n} tracks)"));
        }
    }

    if album.tracks.is_empty() {
        issues.push("No audio tracks".to_string());
    }
    issues
}

/// Tooltip text for the album status badge.
pub fn status_summary(album: &Album) -> String {
    match album.status {
        AlbumStatus::Clean => "Album complete and consistent".to_string(),
        AlbumStatus::Processing => "Analysis in progress...".to_string(),
        AlbumStatus::Dirty | AlbumStatus::Incomplete => {
            let issues = album_issues(album);
            if issues.is_empty() {
                "Unknown status".to_string()
            } else {
                issues
                    .iter()
                    .map(|i| format!("• {i}"))
                    .collect::<Vec<_>>()
                    .join("\n")
            }
        }
    }
}
