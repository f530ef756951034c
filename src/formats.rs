use std::path::Path;

/// Supported video container extensions with descriptions.
pub const VIDEO_EXTENSIONS: &[(&str, &str)] = &[
    ("mp4", "MPEG-4 Video"),
    ("avi", "Audio Video Interleave"),
    ("mov", "QuickTime Movie"),
    ("mkv", "Matroska Video"),
    ("wmv", "Windows Media Video"),
    ("flv", "Flash Video"),
    ("webm", "WebM Video"),
    ("m4v", "MPEG-4 Video"),
    ("mpg", "MPEG Video"),
    ("mpeg", "MPEG Video"),
];

/// Supported audio extensions with descriptions.
pub const AUDIO_EXTENSIONS: &[(&str, &str)] = &[
    ("wav", "Waveform Audio File"),
    ("mp3", "MP3 Audio"),
    ("flac", "Free Lossless Audio Codec"),
    ("ogg", "Ogg Vorbis Audio"),
    ("m4a", "MPEG-4 Audio"),
    ("wma", "Windows Media Audio"),
    ("aac", "Advanced Audio Coding"),
    ("opus", "Opus Audio"),
];

fn extension_of(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
}

pub fn is_video_file(path: &Path) -> bool {
    extension_of(path)
        .is_some_and(|ext| VIDEO_EXTENSIONS.iter().any(|(e, _)| *e == ext))
}

pub fn is_audio_file(path: &Path) -> bool {
    extension_of(path)
        .is_some_and(|ext| AUDIO_EXTENSIONS.iter().any(|(e, _)| *e == ext))
}

/// Whether the file is a supported media format (video or audio).
pub fn is_supported_file(path: &Path) -> bool {
    is_video_file(path) || is_audio_file(path)
}

/// Human-readable description of the file type, or "Unknown".
pub fn file_type_description(path: &Path) -> &'static str {
    let Some(ext) = extension_of(path) else {
        return "Unknown";
    };
    VIDEO_EXTENSIONS
        .iter()
        .chain(AUDIO_EXTENSIONS.iter())
        .find(|(e, _)| *e == ext)
        .map(|(_, desc)| *desc)
        .unwrap_or("Unknown")
}
