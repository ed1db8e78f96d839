//! Path helpers for the data directory.

use std::path::PathBuf;

/// Joins a directory path and a file name.
///
/// # Arguments
///
/// * `dir_path` - The base directory path
/// * `file_name` - The file name, or relative path, to append
///
/// # Examples
///
/// ```
/// # use scorebot::utils::get_path;
/// let path = get_path("/var/scorebot", "chats.json");
/// assert_eq!(path, "/var/scorebot/chats.json");
/// ```
pub fn get_path(dir_path: &str, file_name: &str) -> String {
    let path: PathBuf = [dir_path, file_name].iter().collect();
    path.to_string_lossy().into_owned()
}

/// Name of the player store file of a server.
///
/// Each server keeps its own accounts and records, in a file named after its
/// primary alias.
pub fn player_store_file(server_alias: &str) -> String {
    format!("players-{}.json", server_alias)
}
