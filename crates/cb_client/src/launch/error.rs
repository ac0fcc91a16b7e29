use std::path::PathBuf;

use thiserror::Error;

use cb_core::{IoError, JsonFileError};

use crate::{download::DownloadError, launch::args::ArgParseError, natives::NativesError};

const GAME_ERR_PREFIX: &str = "while launching game:\n";

#[derive(Debug, Error)]
pub enum GameLaunchError {
    #[error("{GAME_ERR_PREFIX}{0}")]
    Io(#[from] IoError),
    #[error("{GAME_ERR_PREFIX}{0}")]
    Download(#[from] DownloadError),
    #[error("{GAME_ERR_PREFIX}{0}")]
    JsonFile(#[from] JsonFileError),
    #[error("{GAME_ERR_PREFIX}{0}")]
    Natives(#[from] NativesError),
    #[error("{GAME_ERR_PREFIX}{0}")]
    ArgParse(#[from] ArgParseError),
    #[error("{GAME_ERR_PREFIX}instance directory not found: {0:?}")]
    InstanceNotFound(PathBuf),
    #[error("{GAME_ERR_PREFIX}resolved descriptor {0} has no main class")]
    MainClassMissing(String),
    #[error("{GAME_ERR_PREFIX}couldn't convert PathBuf to string: {0:?}")]
    PathBufToString(PathBuf),
    #[error("{GAME_ERR_PREFIX}no java executable found\n\nSet JAVA_HOME, add java to PATH, or configure an override")]
    JavaNotFound,
    #[error("{GAME_ERR_PREFIX}couldn't run java command: {0}")]
    CommandError(std::io::Error),
}
