use std::fmt::Display;

/// An enum representing the progress in preparing
/// a client version for launch.
///
/// # Order
/// 1) Version Json
/// 2) Libraries
/// 3) Client Jar
#[derive(Debug, Clone)]
pub enum DownloadProgress {
    DownloadingVersionJson,
    DownloadingLibraries { progress: usize, out_of: usize },
    DownloadingClientJar,
}

impl Display for DownloadProgress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DownloadProgress::DownloadingVersionJson => write!(f, "Downloading Version JSON."),
            DownloadProgress::DownloadingLibraries { progress, out_of } => {
                write!(f, "Downloading library {progress} / {out_of}.")
            }
            DownloadProgress::DownloadingClientJar => write!(f, "Downloading client jar file."),
        }
    }
}

impl From<&DownloadProgress> for f32 {
    fn from(val: &DownloadProgress) -> Self {
        match val {
            DownloadProgress::DownloadingVersionJson => 0.2,
            DownloadProgress::DownloadingLibraries {
                progress: progress_num,
                out_of,
            } => (*progress_num as f32 / *out_of as f32) + 1.0,
            DownloadProgress::DownloadingClientJar => 2.5,
        }
    }
}

pub struct GenericProgress {
    pub done: usize,
    pub total: usize,
    pub message: Option<String>,
    pub has_finished: bool,
}

impl Default for GenericProgress {
    fn default() -> Self {
        Self {
            done: 0,
            total: 1,
            message: None,
            has_finished: false,
        }
    }
}

impl GenericProgress {
    #[must_use]
    pub fn finished() -> Self {
        Self {
            has_finished: true,
            done: 1,
            total: 1,
            message: None,
        }
    }
}

pub trait Progress {
    fn get_num(&self) -> f32;
    fn get_message(&self) -> Option<String>;
    fn total() -> f32;
}

impl Progress for DownloadProgress {
    fn get_num(&self) -> f32 {
        f32::from(self)
    }

    fn get_message(&self) -> Option<String> {
        Some(self.to_string())
    }

    fn total() -> f32 {
        3.0
    }
}

impl Progress for GenericProgress {
    fn get_num(&self) -> f32 {
        self.done as f32 / self.total as f32
    }

    fn get_message(&self) -> Option<String> {
        self.message.clone()
    }

    fn total() -> f32 {
        1.0
    }
}
