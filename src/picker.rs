//! Folder picker capability.
//!
//! A deployment may or may not be able to show a native dialog; callers get
//! `None` from [`default_picker`] in that case and carry on without one.

use std::path::PathBuf;

pub const PICKER_TITLE: &str = "Select a folder to compress";

pub trait FolderPicker {
    /// Asks the user for a folder. `None` if nothing was chosen.
    fn pick_folder(&self) -> Option<PathBuf>;
}

/// Native dialog through `rfd`.
#[cfg(feature = "dialog")]
#[derive(Debug, Default, Clone, Copy)]
pub struct RfdPicker;

#[cfg(feature = "dialog")]
impl FolderPicker for RfdPicker {
    fn pick_folder(&self) -> Option<PathBuf> {
        rfd::FileDialog::new().set_title(PICKER_TITLE).pick_folder()
    }
}

/// The picker available in this build, if any.
pub fn default_picker() -> Option<Box<dyn FolderPicker>> {
    #[cfg(feature = "dialog")]
    {
        Some(Box::new(RfdPicker))
    }
    #[cfg(not(feature = "dialog"))]
    {
        None
    }
}

/// Picks a folder for a front end, as a display string. Empty when there is
/// no picker or the user cancelled.
pub fn select_folder(picker: Option<&dyn FolderPicker>) -> String {
    picker
        .and_then(|picker| picker.pick_folder())
        .map(|folder| folder.display().to_string())
        .unwrap_or_default()
}
